//! Error taxonomy exposed by the encrypted-vector layer.

use crate::crypto::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Type mismatch: expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Noise budget exhausted at multiplicative depth {depth}")]
    NoiseBudgetExhausted { depth: u32 },

    #[error("Unsupported operation: {operation}")]
    UnsupportedOperation { operation: &'static str },

    #[error("Key mismatch: {message}")]
    KeyMismatch { message: String },

    #[error("Serialization error: {message}")]
    Serialization { message: String },

    #[error(transparent)]
    Backend(BackendError),
}

impl HeError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub(crate) fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }
}

/// Sorts backend faults into the caller-facing taxonomy. Faults without a
/// dedicated kind pass through unchanged as [`HeError::Backend`].
impl From<BackendError> for HeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::InvalidParameter { message } => Self::Configuration { message },
            err @ (BackendError::LengthMismatch { .. } | BackendError::Encoding { .. }) => {
                Self::validation(err.to_string())
            }
            err @ BackendError::KeyMismatch { .. } => Self::KeyMismatch {
                message: err.to_string(),
            },
            err @ (BackendError::MalformedPayload { .. } | BackendError::Codec { .. }) => {
                Self::serialization(err.to_string())
            }
            other => Self::Backend(other),
        }
    }
}

impl From<bincode::Error> for HeError {
    fn from(err: bincode::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

pub type HeResult<T> = Result<T, HeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoding::EncodingError;

    #[test]
    fn backend_faults_are_classified() {
        assert!(matches!(
            HeError::from(BackendError::invalid("bad degree")),
            HeError::Configuration { message } if message == "bad degree"
        ));
        assert!(matches!(
            HeError::from(BackendError::from(EncodingError::NonFiniteInput { index: 2 })),
            HeError::Validation { .. }
        ));
        assert!(matches!(
            HeError::from(BackendError::KeyMismatch { expected: 1, actual: 2 }),
            HeError::KeyMismatch { .. }
        ));
        assert!(matches!(
            HeError::from(BackendError::malformed("truncated")),
            HeError::Serialization { .. }
        ));
    }

    #[test]
    fn other_faults_pass_through_unchanged() {
        assert!(matches!(
            HeError::from(BackendError::TransparentCiphertext),
            HeError::Backend(BackendError::TransparentCiphertext)
        ));
        assert!(matches!(
            HeError::from(BackendError::LevelExhausted { level: 0 }),
            HeError::Backend(BackendError::LevelExhausted { level: 0 })
        ));
    }
}
