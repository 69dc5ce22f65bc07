use super::{DEFAULT_PRECISION_BITS, PaillierEncryptedNumber, primes};
use crate::errors::{HeError, HeResult};
use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::{FromPrimitive, One, Signed, ToPrimitive};
use rand::Rng;
use std::{fmt, sync::Arc};
use tracing::{info, instrument};

pub const MIN_KEY_BITS: u64 = 128;
pub const DEFAULT_KEY_BITS: u64 = 1024;

#[derive(Debug)]
struct Modulus {
    n: BigUint,
    n_squared: BigUint,
    /// Largest encodable magnitude, `n / 3`.
    max_int: BigUint,
}

/// Paillier public key with generator `g = n + 1`.
#[derive(Debug, Clone)]
pub struct PaillierPublicKey {
    modulus: Arc<Modulus>,
}

impl PartialEq for PaillierPublicKey {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.modulus, &other.modulus) || self.modulus.n == other.modulus.n
    }
}

impl Eq for PaillierPublicKey {}

impl PaillierPublicKey {
    fn new(n: BigUint) -> Self {
        let n_squared = &n * &n;
        let max_int = &n / 3u32;
        Self {
            modulus: Arc::new(Modulus {
                n,
                n_squared,
                max_int,
            }),
        }
    }

    pub fn n(&self) -> &BigUint {
        &self.modulus.n
    }

    pub fn bits(&self) -> u64 {
        self.modulus.n.bits()
    }

    pub(crate) fn n_squared(&self) -> &BigUint {
        &self.modulus.n_squared
    }

    pub fn encrypt(&self, value: f64) -> HeResult<PaillierEncryptedNumber> {
        self.encrypt_with_rng(value, &mut rand::rng())
    }

    pub fn encrypt_with_rng<R: Rng>(
        &self,
        value: f64,
        rng: &mut R,
    ) -> HeResult<PaillierEncryptedNumber> {
        let encoded = self.encode(value, DEFAULT_PRECISION_BITS)?;
        let ciphertext = self.raw_encrypt(&encoded, rng);
        Ok(PaillierEncryptedNumber::new(
            self.clone(),
            ciphertext,
            DEFAULT_PRECISION_BITS,
        ))
    }

    /// `g^m * r^n mod n^2` with `g^m = 1 + m*n`.
    fn raw_encrypt<R: Rng>(&self, plaintext: &BigUint, rng: &mut R) -> BigUint {
        let n = self.n();
        let n_squared = self.n_squared();
        let r = loop {
            let candidate = primes::random_below(n, rng);
            if candidate > BigUint::one() && candidate.gcd(n).is_one() {
                break candidate;
            }
        };
        let g_m = (plaintext * n + 1u32) % n_squared;
        (g_m * r.modpow(n, n_squared)) % n_squared
    }

    /// `g^m mod n^2` without randomness, for plaintext operands.
    pub(crate) fn raw_encrypt_deterministic(&self, plaintext: &BigUint) -> BigUint {
        (plaintext * self.n() + 1u32) % self.n_squared()
    }

    /// Fixed-point encoding of `value` with `scale_bits` fractional bits,
    /// negatives mapped to `n - |x|`.
    pub(crate) fn encode(&self, value: f64, scale_bits: u32) -> HeResult<BigUint> {
        if !value.is_finite() {
            return Err(HeError::validation(format!("{value} is not a real number")));
        }
        let scaled = (value * 2f64.powi(scale_bits as i32)).round();
        let integer = BigInt::from_f64(scaled)
            .ok_or_else(|| HeError::validation(format!("{value} cannot be encoded")))?;
        let magnitude = integer.magnitude();
        if magnitude > &self.modulus.max_int {
            return Err(HeError::validation(format!(
                "{value} overflows the {}-bit Paillier modulus",
                self.bits()
            )));
        }
        Ok(if integer.is_negative() {
            self.n() - magnitude
        } else {
            magnitude.clone()
        })
    }

    pub(crate) fn decode(&self, plaintext: &BigUint, scale_bits: u32) -> HeResult<f64> {
        let n = self.n();
        let max_int = &self.modulus.max_int;
        let signed = if plaintext <= max_int {
            BigInt::from(plaintext.clone())
        } else if plaintext >= &(n - max_int) {
            -BigInt::from(n - plaintext)
        } else {
            return Err(HeError::validation(
                "decrypted value overflowed the encodable range",
            ));
        };
        let value = signed
            .to_f64()
            .ok_or_else(|| HeError::validation("decrypted value does not fit an f64"))?;
        Ok(value / 2f64.powi(scale_bits as i32))
    }
}

pub struct PaillierPrivateKey {
    public_key: PaillierPublicKey,
    lambda: BigUint,
    mu: BigUint,
}

impl fmt::Debug for PaillierPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaillierPrivateKey")
            .field("bits", &self.public_key.bits())
            .finish_non_exhaustive()
    }
}

impl PaillierPrivateKey {
    pub fn public_key(&self) -> &PaillierPublicKey {
        &self.public_key
    }

    pub fn decrypt(&self, number: &PaillierEncryptedNumber) -> HeResult<f64> {
        if number.public_key() != &self.public_key {
            return Err(HeError::KeyMismatch {
                message: "Paillier number was encrypted under a different key".into(),
            });
        }
        let n = self.public_key.n();
        let n_squared = self.public_key.n_squared();
        // L(c^lambda mod n^2) * mu mod n, with L(x) = (x - 1) / n
        let u = number.ciphertext().modpow(&self.lambda, n_squared);
        let l = (u - 1u32) / n;
        let plaintext = (l * &self.mu) % n;
        self.public_key.decode(&plaintext, number.scale_bits())
    }
}

pub struct PaillierKeypair;

impl PaillierKeypair {
    /// Generates a key pair whose modulus has exactly `n_bits` bits.
    pub fn generate(n_bits: u64) -> HeResult<(PaillierPublicKey, PaillierPrivateKey)> {
        Self::generate_with_rng(n_bits, &mut rand::rng())
    }

    #[instrument(skip(rng))]
    pub fn generate_with_rng<R: Rng>(
        n_bits: u64,
        rng: &mut R,
    ) -> HeResult<(PaillierPublicKey, PaillierPrivateKey)> {
        if n_bits < MIN_KEY_BITS || n_bits % 2 != 0 {
            return Err(HeError::configuration(format!(
                "Paillier modulus must be an even bit count >= {MIN_KEY_BITS}, got {n_bits}"
            )));
        }
        let (p, q) = loop {
            let p = primes::random_prime(n_bits / 2, rng);
            let q = primes::random_prime(n_bits / 2, rng);
            if p != q {
                break (p, q);
            }
        };
        let n = &p * &q;
        let lambda = (&p - 1u32).lcm(&(&q - 1u32));
        let mu = lambda
            .modinv(&n)
            .ok_or_else(|| HeError::configuration("lambda is not invertible modulo n"))?;

        let public_key = PaillierPublicKey::new(n);
        info!(bits = public_key.bits(), "generated Paillier key pair");
        let private_key = PaillierPrivateKey {
            public_key: public_key.clone(),
            lambda,
            mu,
        };
        Ok((public_key, private_key))
    }
}
