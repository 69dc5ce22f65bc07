//! Probable-prime generation for Paillier moduli.

use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::{One, Zero};
use rand::Rng;

const SMALL_PRIMES: [u32; 24] = [
    3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89, 97,
];
const MILLER_RABIN_ROUNDS: usize = 24;

/// Uniform integer with at most `bits` bits.
pub(crate) fn random_bits<R: Rng>(bits: u64, rng: &mut R) -> BigUint {
    let byte_len = bits.div_ceil(8) as usize;
    let mut bytes = vec![0u8; byte_len];
    rng.fill(&mut bytes[..]);
    let excess = byte_len as u64 * 8 - bits;
    if let Some(top) = bytes.last_mut() {
        *top &= 0xff >> excess;
    }
    BigUint::from_bytes_le(&bytes)
}

/// Uniform integer in `[0, bound)`.
pub(crate) fn random_below<R: Rng>(bound: &BigUint, rng: &mut R) -> BigUint {
    debug_assert!(!bound.is_zero());
    let bits = bound.bits();
    loop {
        let candidate = random_bits(bits, rng);
        if &candidate < bound {
            return candidate;
        }
    }
}

pub(crate) fn is_probable_prime<R: Rng>(n: &BigUint, rng: &mut R) -> bool {
    let two = BigUint::from(2u32);
    if n < &two {
        return false;
    }
    if n == &two {
        return true;
    }
    for &p in &SMALL_PRIMES {
        let p = BigUint::from(p);
        if n == &p {
            return true;
        }
        if (n % &p).is_zero() {
            return false;
        }
    }
    if n.is_even() {
        return false;
    }

    let n_minus_one = n - 1u32;
    let r = n_minus_one.trailing_zeros().unwrap_or(0);
    let d = &n_minus_one >> r;
    let base_range = n - 3u32;

    'rounds: for _ in 0..MILLER_RABIN_ROUNDS {
        let a = random_below(&base_range, rng) + 2u32;
        let mut x = a.modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..r {
            x = x.modpow(&two, n);
            if x == n_minus_one {
                continue 'rounds;
            }
        }
        return false;
    }
    true
}

/// Random probable prime with exactly `bits` bits and the top two bits set,
/// so a product of two such primes has exactly `2 * bits` bits.
pub(crate) fn random_prime<R: Rng>(bits: u64, rng: &mut R) -> BigUint {
    debug_assert!(bits >= 8);
    loop {
        let mut candidate = random_bits(bits, rng);
        candidate.set_bit(bits - 1, true);
        candidate.set_bit(bits - 2, true);
        candidate.set_bit(0, true);
        if is_probable_prime(&candidate, rng) {
            return candidate;
        }
    }
}
