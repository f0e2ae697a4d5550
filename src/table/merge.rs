use crate::enrich::mapping::FeatureMapping;
use crate::feature_key::key::FeatureKey;
use crate::table::error::TableError;
use indexmap::IndexSet;
use log::debug;
use polars::prelude::*;

/// Appends one `Float64` column per feature key seen in any row.
///
/// Columns appear in the order their key was first seen, scanning rows top to
/// bottom. A row without a value for a key gets null in that column.
///
/// # Errors
///
/// [`TableError::HeightMismatch`] if there is not exactly one mapping per row and
/// [`TableError::DuplicateColumn`] if a key collides with an existing column.
pub fn merge_features(table: DataFrame, features: &[FeatureMapping]) -> Result<DataFrame, TableError> {
    if features.len() != table.height() {
        return Err(TableError::HeightMismatch {
            rows: table.height(),
            features: features.len(),
        });
    }

    let keys: IndexSet<&FeatureKey> = features
        .iter()
        .flat_map(|mapping| mapping.keys())
        .collect();

    let columns = keys
        .into_iter()
        .map(|key| {
            if table.get_column_index(key.as_str()).is_some() {
                return Err(TableError::DuplicateColumn(key.to_string()));
            }
            let values: Vec<Option<f64>> = features
                .iter()
                .map(|mapping| mapping.get(key.as_str()))
                .collect();
            Ok(Column::new(key.as_str().into(), values))
        })
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Adding {} feature columns", columns.len());
    Ok(table.hstack(&columns)?)
}
