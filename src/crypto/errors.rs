use crate::{encoding::EncodingError, rings::RnsError};
use thiserror::Error;

/// Faults raised by the CKKS backend.
///
/// `TransparentCiphertext` is a structured signal: callers that know how to
/// recover match on the variant, never on the message.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Invalid parameter: {message}")]
    InvalidParameter { message: String },

    #[error("Result ciphertext is transparent")]
    TransparentCiphertext,

    #[error("Scale out of bounds: no modulus left to rescale at level {level}")]
    LevelExhausted { level: usize },

    #[error("Scale {scale} leaves the usable range after rescaling")]
    ScaleOutOfRange { scale: f64 },

    #[error("Scales {lhs} and {rhs} cannot be aligned")]
    ScaleMismatch { lhs: f64, rhs: f64 },

    #[error("Length mismatch: expected {expected}, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("Key mismatch: context key {expected:#018x}, operand key {actual:#018x}")]
    KeyMismatch { expected: u64, actual: u64 },

    #[error("Context holds no relinearization keys")]
    MissingRelinearizationKey,

    #[error("Context holds no {what}")]
    MissingKeyMaterial { what: &'static str },

    #[error("Malformed payload: {message}")]
    MalformedPayload { message: String },

    #[error("Ring arithmetic failed: {source}")]
    Rns {
        #[from]
        source: RnsError,
    },

    #[error("Encoding failed: {source}")]
    Encoding {
        #[from]
        source: EncodingError,
    },

    #[error("Wire codec failed: {source}")]
    Codec {
        #[from]
        source: bincode::Error,
    },
}

impl BackendError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedPayload {
            message: message.into(),
        }
    }
}

pub type BackendResult<T> = Result<T, BackendError>;
