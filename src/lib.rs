mod enrich;
mod error;
mod feature_key;
mod source;
mod table;
mod types;
mod utils;

pub use error::EnrichError;

pub use feature_key::encoder::{
    encode, encode_str, offset_between, KeyQualifier, KEY_PREFIX, MAX_FIELD_VALUE,
};
pub use feature_key::error::FeatureKeyError;
pub use feature_key::key::{DecodedKey, FeatureKey};

pub use types::aggregation::{AggregationLevel, AggregationLocation};
pub use types::date_window::DateWindow;
pub use types::kind::MeasurementKind;
pub use types::lat_lon::LatLon;
pub use types::measurement::{
    MeasurementRecord, CLOUD_COVER, CUMULATIVE_PARAMETERS, PRECIPITATION, TEMPERATURE,
    TRACKED_PARAMETERS,
};

pub use source::error::MeasurementSourceError;
pub use source::gridded::{GriddedSource, DEFAULT_MAX_DISTANCE_KM};
pub use source::measurement_source::MeasurementSource;
pub use source::reduction::{BucketAggregator, HourRange};

pub use enrich::config::{EnrichmentConfig, FailurePolicy, KeyScheme};
pub use enrich::engine::WeatherEnricher;
pub use enrich::mapping::FeatureMapping;
pub use enrich::window::{WindowSpan, WindowSpec};

pub use table::error::TableError;
pub use table::io::{
    enriched_path, read_table, reference_dates, write_table, DATE_COLUMN, DEFAULT_SEPARATOR,
    ENRICHED_SUFFIX,
};
pub use table::merge::merge_features;
pub use table::select::FeatureSelector;
