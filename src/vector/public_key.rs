use super::{EncryptedVector, PlainValue};
use crate::{
    crypto::{AnyContext, PublicContext, SerializeOptions, context_from},
    errors::{HeError, HeResult},
};
use rand::Rng;

/// Encrypting half of a key pair. Holds no secret material.
#[derive(Debug, Clone)]
pub struct PublicKey {
    context: PublicContext,
}

impl PublicKey {
    pub(crate) fn new(context: PublicContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &PublicContext {
        &self.context
    }

    /// Maximum number of values one vector can hold.
    pub fn slot_count(&self) -> usize {
        self.context.scheme().slot_count()
    }

    /// Encrypts a scalar or a vector into a depth-0 [`EncryptedVector`].
    pub fn encrypt(&self, value: impl Into<PlainValue>) -> HeResult<EncryptedVector> {
        self.encrypt_with_rng(value, &mut rand::rng())
    }

    pub fn encrypt_with_rng<R: Rng>(
        &self,
        value: impl Into<PlainValue>,
        rng: &mut R,
    ) -> HeResult<EncryptedVector> {
        let value = value.into();
        value.validate()?;
        if value.len() > self.slot_count() {
            return Err(HeError::validation(format!(
                "{} values exceed the {} available slots",
                value.len(),
                self.slot_count()
            )));
        }
        let ciphertext = self.context.encrypt(value.as_slice(), rng)?;
        Ok(EncryptedVector::new(ciphertext, self.context.clone(), 0))
    }

    /// Parameters, public key and relinearization keys.
    pub fn to_bytes(&self) -> HeResult<Vec<u8>> {
        Ok(self.context.serialize(SerializeOptions::public())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> HeResult<Self> {
        match context_from(bytes)? {
            AnyContext::Public(context) => Ok(Self::new(context)),
            other => Err(HeError::TypeMismatch {
                expected: "public context",
                found: other.kind(),
            }),
        }
    }
}
