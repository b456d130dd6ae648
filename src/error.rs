use thiserror::Error;

/// Input that cannot be turned into a prediction.
///
/// Only structurally broken input ends up here. Out-of-range numbers are
/// clamped by the engine instead of being rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` must be a number, got {found}")]
    NotNumeric { field: String, found: String },

    #[error("field `{field}` must be {expected}, got {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("field `{field}` must be one of \"W\", \"D\", \"L\", got {found}")]
    UnknownResult { field: String, found: String },

    #[error("feature weights must sum to 1.0, got {sum:.6}")]
    WeightSum { sum: f64 },

    #[error("field `{field}` is out of range: {reason}")]
    OutOfRange { field: String, reason: String },
}

impl ValidationError {
    /// Path of the offending field, when the error names one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::MissingField { field }
            | ValidationError::NotNumeric { field, .. }
            | ValidationError::WrongType { field, .. }
            | ValidationError::UnknownResult { field, .. }
            | ValidationError::OutOfRange { field, .. } => Some(field),
            ValidationError::WeightSum { .. } => None,
        }
    }
}
