//! CKKS slot encoding through the canonical embedding.

mod encoder;

pub use encoder::CkksEncoder;
use thiserror::Error;

pub type EncodingResult<T> = Result<T, EncodingError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    #[error("Ring degree {degree} not supported")]
    InvalidRingDegree { degree: usize },

    #[error("Input is empty")]
    EmptyInput,

    #[error("Input too long: got {got}, max {max}")]
    InputTooLong { got: usize, max: usize },

    #[error("Input value at slot {index} is not finite")]
    NonFiniteInput { index: usize },

    #[error("Value {value} rounds to zero at scale {scale}")]
    Underflow { value: f64, scale: f64 },

    #[error("Coefficient {value} out of range (bound {bound})")]
    CoefficientOutOfRange { value: f64, bound: f64 },
}
