use super::{Operand, PlainValue};
use crate::{
    crypto::{
        AnyContext, BackendError, Ciphertext, PlainOperand, PublicContext, SerializeOptions,
        context_from,
    },
    errors::{HeError, HeResult},
};
use tracing::debug;

/// A ciphertext bound to the public context it was produced under, plus the
/// number of multiplications it has been through.
///
/// `add`, `subtract`, `reverse_subtract`, `multiply` and `divide` return new
/// vectors. Mutation is explicit through [`EncryptedVector::add_in_place`],
/// [`EncryptedVector::subtract_in_place`] and [`accumulate_into`].
#[derive(Debug, Clone)]
pub struct EncryptedVector {
    ciphertext: Ciphertext,
    context: PublicContext,
    depth: u32,
}

impl EncryptedVector {
    pub(crate) fn new(ciphertext: Ciphertext, context: PublicContext, depth: u32) -> Self {
        Self {
            ciphertext,
            context,
            depth,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.ciphertext.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ciphertext.is_empty()
    }

    pub fn ciphertext(&self) -> &Ciphertext {
        &self.ciphertext
    }

    pub fn context(&self) -> &PublicContext {
        &self.context
    }

    /// `self + rhs`. Depth is unchanged.
    pub fn add<'a>(&self, rhs: impl Into<Operand<'a>>) -> HeResult<Self> {
        let ciphertext = self.additive(rhs.into(), false)?;
        Ok(self.derive(ciphertext, self.depth))
    }

    /// `self - rhs`. Depth is unchanged.
    pub fn subtract<'a>(&self, rhs: impl Into<Operand<'a>>) -> HeResult<Self> {
        let ciphertext = self.additive(rhs.into(), true)?;
        Ok(self.derive(ciphertext, self.depth))
    }

    /// `lhs - self`. Depth is unchanged.
    pub fn reverse_subtract<'a>(&self, lhs: impl Into<Operand<'a>>) -> HeResult<Self> {
        let ciphertext = match lhs.into() {
            Operand::Encrypted(lhs) => lhs.masked_combine(&lhs.ciphertext, self, true)?,
            Operand::Plain(plain) => {
                plain.validate()?;
                self.context.plain_sub(plain.as_operand(), &self.ciphertext)?
            }
        };
        Ok(self.derive(ciphertext, self.depth))
    }

    /// `self * rhs` as a new vector at depth `self.depth() + 1`.
    ///
    /// Running out of modulus levels is reported as
    /// [`HeError::NoiseBudgetExhausted`]; every other backend fault surfaces
    /// unchanged.
    pub fn multiply<'a>(&self, rhs: impl Into<Operand<'a>>) -> HeResult<Self> {
        let depth = self.depth + 1;
        let result = match rhs.into() {
            Operand::Encrypted(rhs) => self.context.multiply(&self.ciphertext, &rhs.ciphertext),
            Operand::Plain(plain) => {
                plain.validate()?;
                self.context
                    .multiply_plain(&self.ciphertext, plain.as_operand())
            }
        };
        match result {
            Ok(ciphertext) => Ok(self.derive(ciphertext, depth)),
            Err(BackendError::LevelExhausted { level }) => {
                debug!(depth, level, "no modulus left to rescale");
                Err(HeError::NoiseBudgetExhausted { depth })
            }
            Err(BackendError::ScaleOutOfRange { scale }) => {
                debug!(depth, scale, "scale out of bounds");
                Err(HeError::NoiseBudgetExhausted { depth })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// `self / divisor` for a plaintext divisor, computed as a product with
    /// the reciprocal. Vectors divide slot by slot.
    ///
    /// A reciprocal that rounds to zero at the ciphertext's scale (about
    /// `1 / 2^scale_bits` or smaller) cannot be represented and is rejected
    /// as [`HeError::Validation`] rather than producing a zero product.
    pub fn divide<'a>(&self, divisor: impl Into<Operand<'a>>) -> HeResult<Self> {
        let divisor = match divisor.into() {
            Operand::Encrypted(_) => {
                return Err(HeError::UnsupportedOperation {
                    operation: "division by an encrypted vector",
                });
            }
            Operand::Plain(plain) => plain,
        };
        divisor.validate()?;
        if divisor.as_slice().contains(&0.0) {
            return Err(HeError::validation("division by zero"));
        }
        let reciprocal = match divisor {
            PlainValue::Scalar(value) => PlainValue::Scalar(value.recip()),
            PlainValue::Vector(values) => {
                PlainValue::Vector(values.iter().map(|v| v.recip()).collect())
            }
        };
        self.multiply(reciprocal)
    }

    /// In-place `self += rhs`.
    pub fn add_in_place<'a>(&mut self, rhs: impl Into<Operand<'a>>) -> HeResult<&mut Self> {
        self.ciphertext = self.additive(rhs.into(), false)?;
        Ok(self)
    }

    /// In-place `self -= rhs`.
    pub fn subtract_in_place<'a>(
        &mut self,
        rhs: impl Into<Operand<'a>>,
    ) -> HeResult<&mut Self> {
        self.ciphertext = self.additive(rhs.into(), true)?;
        Ok(self)
    }

    /// Encodes `(ciphertext, public context, depth)`. The context carries the
    /// public key and relinearization keys, never the secret key.
    pub fn to_bytes(&self) -> HeResult<Vec<u8>> {
        let ciphertext = self.ciphertext.serialize()?;
        let context = self.context.serialize(SerializeOptions::public())?;
        Ok(bincode::serialize(&(ciphertext, context, u64::from(self.depth)))?)
    }

    pub fn from_bytes(bytes: &[u8]) -> HeResult<Self> {
        let (ciphertext, context, depth): (Vec<u8>, Vec<u8>, u64) = bincode::deserialize(bytes)?;
        let context = match context_from(&context)? {
            AnyContext::Public(context) => context,
            other => {
                return Err(HeError::TypeMismatch {
                    expected: "public context",
                    found: other.kind(),
                });
            }
        };
        let ciphertext = context.ciphertext_from(&ciphertext)?;
        let depth = u32::try_from(depth)
            .map_err(|_| HeError::serialization(format!("depth {depth} out of range")))?;
        Ok(Self::new(ciphertext, context, depth))
    }

    fn derive(&self, ciphertext: Ciphertext, depth: u32) -> Self {
        Self::new(ciphertext, self.context.clone(), depth)
    }

    fn additive(&self, rhs: Operand<'_>, subtract: bool) -> HeResult<Ciphertext> {
        match rhs {
            Operand::Encrypted(rhs) => self.masked_combine(&self.ciphertext, rhs, subtract),
            Operand::Plain(plain) => {
                plain.validate()?;
                let operand: PlainOperand<'_> = plain.as_operand();
                let ciphertext = if subtract {
                    self.context.sub_plain(&self.ciphertext, operand)?
                } else {
                    self.context.add_plain(&self.ciphertext, operand)?
                };
                Ok(ciphertext)
            }
        }
    }

    /// `lhs ± rhs`, retried as `lhs ± (rhs + Enc(0))` when the direct result
    /// would be transparent. Other faults propagate unchanged.
    fn masked_combine(
        &self,
        lhs: &Ciphertext,
        rhs: &EncryptedVector,
        subtract: bool,
    ) -> HeResult<Ciphertext> {
        let apply = |other: &Ciphertext| {
            if subtract {
                self.context.sub(lhs, other)
            } else {
                self.context.add(lhs, other)
            }
        };
        match apply(&rhs.ciphertext) {
            Err(BackendError::TransparentCiphertext) => {
                debug!(subtract, "transparent ciphertext, masking operand with a fresh zero");
                let zero = rhs.context.encrypt_zero(
                    rhs.len(),
                    rhs.ciphertext.scale(),
                    &mut rand::rng(),
                )?;
                let masked = rhs.context.add(&rhs.ciphertext, &zero)?;
                Ok(apply(&masked)?)
            }
            result => Ok(result?),
        }
    }
}

/// Adds `other` into `target` in place.
pub fn accumulate_into<'a>(
    target: &mut EncryptedVector,
    other: impl Into<Operand<'a>>,
) -> HeResult<()> {
    target.add_in_place(other)?;
    Ok(())
}
