use crate::rings::RnsPoly;

/// CKKS ciphertext `(c0, c1)` with `c0 + c1*s ≈ scale*m` modulo
/// `q_0 … q_level`.
///
/// Both components are kept in coefficient domain. Fresh ciphertexts carry
/// the context's global scale; products carry whatever rescaling left.
#[derive(Debug, Clone)]
pub struct Ciphertext {
    pub(crate) c0: RnsPoly,
    pub(crate) c1: RnsPoly,
    pub(crate) level: usize,
    pub(crate) scale: f64,
    pub(crate) len: usize,
    pub(crate) key_id: u64,
}

impl Ciphertext {
    /// Index of the last live data prime.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Factor the encoded message is multiplied by.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Number of meaningful slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    /// A ciphertext with `c1 = 0` decrypts without the secret key.
    pub fn is_transparent(&self) -> bool {
        self.c1.is_zero()
    }
}

/// Plaintext right-hand side of a ciphertext operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlainOperand<'a> {
    /// Broadcast to every slot.
    Scalar(f64),
    /// One value per slot; must match the ciphertext length.
    Values(&'a [f64]),
}
