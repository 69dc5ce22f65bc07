use super::{DEFAULT_PRECISION_BITS, PaillierPublicKey};
use crate::errors::{HeError, HeResult};
use num_bigint::BigUint;

/// Paillier ciphertext of a fixed-point number with `scale_bits` fractional
/// bits.
#[derive(Debug, Clone)]
pub struct PaillierEncryptedNumber {
    public_key: PaillierPublicKey,
    ciphertext: BigUint,
    scale_bits: u32,
}

impl PaillierEncryptedNumber {
    pub(crate) fn new(public_key: PaillierPublicKey, ciphertext: BigUint, scale_bits: u32) -> Self {
        Self {
            public_key,
            ciphertext,
            scale_bits,
        }
    }

    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.public_key
    }

    pub fn ciphertext(&self) -> &BigUint {
        &self.ciphertext
    }

    pub fn scale_bits(&self) -> u32 {
        self.scale_bits
    }

    /// Encrypted sum. The operand with fewer fractional bits is shifted up
    /// first.
    pub fn add(&self, other: &Self) -> HeResult<Self> {
        if self.public_key != other.public_key {
            return Err(HeError::KeyMismatch {
                message: "Paillier numbers were encrypted under different keys".into(),
            });
        }
        let scale_bits = self.scale_bits.max(other.scale_bits);
        let lhs = self.raised_to(scale_bits);
        let rhs = other.raised_to(scale_bits);
        let ciphertext = (lhs * rhs) % self.public_key.n_squared();
        Ok(Self::new(self.public_key.clone(), ciphertext, scale_bits))
    }

    pub fn add_plain(&self, value: f64) -> HeResult<Self> {
        let encoded = self.public_key.encode(value, self.scale_bits)?;
        let plain = self.public_key.raw_encrypt_deterministic(&encoded);
        let ciphertext = (&self.ciphertext * plain) % self.public_key.n_squared();
        Ok(Self::new(self.public_key.clone(), ciphertext, self.scale_bits))
    }

    /// Encrypted product with a plaintext scalar; adds
    /// [`DEFAULT_PRECISION_BITS`] fractional bits.
    pub fn mul_scalar(&self, factor: f64) -> HeResult<Self> {
        let encoded = self.public_key.encode(factor, DEFAULT_PRECISION_BITS)?;
        let ciphertext = self
            .ciphertext
            .modpow(&encoded, self.public_key.n_squared());
        Ok(Self::new(
            self.public_key.clone(),
            ciphertext,
            self.scale_bits + DEFAULT_PRECISION_BITS,
        ))
    }

    /// Ciphertext of the same value with `scale_bits` fractional bits.
    fn raised_to(&self, scale_bits: u32) -> BigUint {
        let shift = scale_bits - self.scale_bits;
        if shift == 0 {
            return self.ciphertext.clone();
        }
        let factor = BigUint::from(1u32) << shift;
        self.ciphertext.modpow(&factor, self.public_key.n_squared())
    }
}
