use super::{EncryptedVector, Operand, PlainValue};
use crate::{
    crypto::{AnyContext, SecretContext, SerializeOptions, context_from},
    errors::{HeError, HeResult},
};
use std::fmt;

/// Decrypting half of a key pair.
#[derive(Clone)]
pub struct PrivateKey {
    context: SecretContext,
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKey")
            .field("key_id", &format_args!("{:#018x}", self.context.key_id()))
            .finish_non_exhaustive()
    }
}

impl PrivateKey {
    pub(crate) fn new(context: SecretContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &SecretContext {
        &self.context
    }

    /// Decrypts to a scalar when the vector has one element, otherwise to
    /// the full vector.
    ///
    /// A vector produced under an unrelated key pair fails with
    /// [`HeError::KeyMismatch`] instead of decoding to noise.
    pub fn decrypt(&self, vector: &EncryptedVector) -> HeResult<PlainValue> {
        let values = self.context.decrypt(vector.ciphertext())?;
        Ok(PlainValue::from_decrypted(values))
    }

    /// Like [`PrivateKey::decrypt`] for a caller holding an arbitrary
    /// operand; plaintexts are a [`HeError::TypeMismatch`].
    pub fn decrypt_operand(&self, operand: Operand<'_>) -> HeResult<PlainValue> {
        match operand {
            Operand::Encrypted(vector) => self.decrypt(vector),
            other => Err(HeError::TypeMismatch {
                expected: "encrypted vector",
                found: other.kind(),
            }),
        }
    }

    /// Parameters, secret key and relinearization keys.
    pub fn to_bytes(&self) -> HeResult<Vec<u8>> {
        Ok(self.context.serialize(SerializeOptions::secret())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> HeResult<Self> {
        match context_from(bytes)? {
            AnyContext::Secret(context) => Ok(Self::new(context)),
            other => Err(HeError::TypeMismatch {
                expected: "secret context",
                found: other.kind(),
            }),
        }
    }
}
