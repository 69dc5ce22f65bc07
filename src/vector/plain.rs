use super::EncryptedVector;
use crate::{
    crypto::PlainOperand,
    errors::{HeError, HeResult},
};

/// A plaintext scalar or vector of reals.
///
/// Used both as encryption input and as decryption output: a decrypted
/// vector of length one comes back as a [`PlainValue::Scalar`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlainValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl PlainValue {
    pub fn as_slice(&self) -> &[f64] {
        match self {
            Self::Scalar(value) => std::slice::from_ref(value),
            Self::Vector(values) => values,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    pub fn into_vec(self) -> Vec<f64> {
        match self {
            Self::Scalar(value) => vec![value],
            Self::Vector(values) => values,
        }
    }

    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            Self::Scalar(value) => Some(*value),
            Self::Vector(_) => None,
        }
    }

    /// Scalar when `values` has exactly one element.
    pub(crate) fn from_decrypted(mut values: Vec<f64>) -> Self {
        if values.len() == 1 {
            Self::Scalar(values.remove(0))
        } else {
            Self::Vector(values)
        }
    }

    /// Rejects empty input and non-finite components.
    pub(crate) fn validate(&self) -> HeResult<()> {
        if self.is_empty() {
            return Err(HeError::validation("plaintext vector is empty"));
        }
        if let Some(index) = self.as_slice().iter().position(|v| !v.is_finite()) {
            return Err(HeError::validation(format!(
                "value at index {index} is not a real number"
            )));
        }
        Ok(())
    }

    /// Scalars broadcast to every slot, vectors apply slot by slot.
    pub(crate) fn as_operand(&self) -> PlainOperand<'_> {
        match self {
            Self::Scalar(value) => PlainOperand::Scalar(*value),
            Self::Vector(values) => PlainOperand::Values(values),
        }
    }
}

impl From<f64> for PlainValue {
    fn from(value: f64) -> Self {
        Self::Scalar(value)
    }
}

impl From<i32> for PlainValue {
    fn from(value: i32) -> Self {
        Self::Scalar(f64::from(value))
    }
}

impl From<Vec<f64>> for PlainValue {
    fn from(values: Vec<f64>) -> Self {
        Self::Vector(values)
    }
}

impl From<&[f64]> for PlainValue {
    fn from(values: &[f64]) -> Self {
        Self::Vector(values.to_vec())
    }
}

impl<const N: usize> From<[f64; N]> for PlainValue {
    fn from(values: [f64; N]) -> Self {
        Self::Vector(values.to_vec())
    }
}

/// Right-hand side of an [`EncryptedVector`] operation.
#[derive(Debug, Clone)]
pub enum Operand<'a> {
    Encrypted(&'a EncryptedVector),
    Plain(PlainValue),
}

impl Operand<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encrypted(_) => "encrypted vector",
            Self::Plain(PlainValue::Scalar(_)) => "plaintext scalar",
            Self::Plain(PlainValue::Vector(_)) => "plaintext vector",
        }
    }
}

impl<'a> From<&'a EncryptedVector> for Operand<'a> {
    fn from(vector: &'a EncryptedVector) -> Self {
        Self::Encrypted(vector)
    }
}

impl From<PlainValue> for Operand<'_> {
    fn from(value: PlainValue) -> Self {
        Self::Plain(value)
    }
}

impl From<f64> for Operand<'_> {
    fn from(value: f64) -> Self {
        Self::Plain(PlainValue::Scalar(value))
    }
}

impl From<i32> for Operand<'_> {
    fn from(value: i32) -> Self {
        Self::Plain(PlainValue::from(value))
    }
}

impl From<Vec<f64>> for Operand<'_> {
    fn from(values: Vec<f64>) -> Self {
        Self::Plain(PlainValue::Vector(values))
    }
}

impl From<&[f64]> for Operand<'_> {
    fn from(values: &[f64]) -> Self {
        Self::Plain(PlainValue::from(values))
    }
}

impl<const N: usize> From<[f64; N]> for Operand<'_> {
    fn from(values: [f64; N]) -> Self {
        Self::Plain(PlainValue::from(values))
    }
}
