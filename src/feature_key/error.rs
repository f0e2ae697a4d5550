use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeatureKeyError {
    #[error("Invalid value '{value}' for {argument}")]
    InvalidArgument {
        argument: &'static str,
        value: String,
    },

    #[error("{field} {value} does not fit the two-digit field of a feature key")]
    ValueOutOfRange { field: &'static str, value: i64 },

    #[error("Malformed feature key '{key}': {reason}")]
    Malformed { key: String, reason: &'static str },
}
