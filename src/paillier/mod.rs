//! Additively homomorphic Paillier encryption over fixed-point reals.
//!
//! This is the alternative scheme behind the tensor dispatcher. Ciphertexts
//! support addition with each other and with plaintexts, and scaling by a
//! plaintext.

mod keys;
mod number;
mod primes;

pub use keys::{
    DEFAULT_KEY_BITS, MIN_KEY_BITS, PaillierKeypair, PaillierPrivateKey, PaillierPublicKey,
};
pub use number::PaillierEncryptedNumber;

/// Fractional bits used when encoding plaintexts.
pub const DEFAULT_PRECISION_BITS: u32 = 32;
