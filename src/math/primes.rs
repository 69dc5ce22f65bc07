//! Prime utilities for constructing NTT-friendly modulus chains.
//!
//! Primality is checked with Miller-Rabin over a fixed base set that is
//! deterministic for every `u64`. Chains are built the way SEAL-style
//! libraries do it: for each requested bit size take the largest unused prime
//! `p < 2^bits` with `p = 1 (mod 2n)`.
//! Reference:
//! https://en.wikipedia.org/wiki/Miller%E2%80%93Rabin_primality_test

use super::utils::{mod_pow, mul_mod};
use std::collections::HashMap;

// Deterministic for all n < 318,665,857,834,031,151,167,461.
// Source: https://miller-rabin.appspot.com/
const MILLER_RABIN_BASES: [u64; 12] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37];

/// Returns `(odd_part, power_of_two)` such that `n = odd_part * 2^power_of_two`.
fn decompose(n: u64) -> (u64, u32) {
    assert!(n > 0, "decompose: n must be positive");
    let r = n.trailing_zeros();
    (n >> r, r)
}

/// Returns `true` if `n` is prime using deterministic Miller-Rabin on `u64`.
pub fn is_prime(n: u64) -> bool {
    match n {
        0 | 1 => return false,
        2 | 3 => return true,
        _ if n & 1 == 0 => return false,
        _ => {}
    }

    let (d, r) = decompose(n - 1);
    'bases: for &a in MILLER_RABIN_BASES.iter() {
        if a >= n {
            continue;
        }
        let mut x = mod_pow(a, d, n);
        if x == 1 || x == n - 1 {
            continue;
        }
        for _ in 1..r {
            x = mul_mod(x, x, n);
            if x == n - 1 {
                continue 'bases;
            }
        }
        return false;
    }
    true
}

/// Returns `true` when `p` is prime and `p = 1 (mod 2n)`.
///
/// This guarantees a primitive `2n`-th root of unity in `Z_p`, which the
/// negacyclic NTT over `x^n + 1` needs.
#[inline]
pub fn is_ntt_friendly_prime(p: u64, n: u64) -> bool {
    match n.checked_mul(2) {
        Some(step) => is_prime(p) && p % step == 1,
        None => false,
    }
}

/// Returns the largest `x <= value` such that `x % modulus == 1`.
fn snap_down_to_congruence(value: u64, modulus: u64) -> Option<u64> {
    debug_assert!(modulus > 1);
    let remainder = value % modulus;
    let delta = (remainder + modulus - 1) % modulus;
    value.checked_sub(delta)
}

/// Returns the largest NTT-friendly prime `p < bound`, or `None` if the
/// search runs out of candidates.
pub fn get_first_prime_down(bound: u64, n: u64) -> Option<u64> {
    if bound <= 2 || n == 0 {
        return None;
    }
    let step = n.checked_mul(2)?;
    let mut candidate = snap_down_to_congruence(bound - 1, step)?;

    loop {
        if candidate <= 2 {
            return None;
        }
        if is_prime(candidate) {
            return Some(candidate);
        }
        candidate = candidate.checked_sub(step)?;
    }
}

/// Builds a chain of distinct NTT-friendly primes, one per entry of
/// `bit_sizes`, preserving the requested order.
///
/// Every prime has exactly the requested bit length. Returns `None` when the
/// range `[2^(bits-1), 2^bits)` does not hold enough suitable primes.
pub fn generate_modulus_chain(bit_sizes: &[u32], degree: usize) -> Option<Vec<u64>> {
    let mut next_bound: HashMap<u32, u64> = HashMap::new();
    let mut chain = Vec::with_capacity(bit_sizes.len());

    for &bits in bit_sizes {
        if !(2..=62).contains(&bits) {
            return None;
        }
        let bound = *next_bound.entry(bits).or_insert(1u64 << bits);
        let prime = get_first_prime_down(bound, degree as u64)?;
        if prime < (1u64 << (bits - 1)) {
            return None;
        }
        next_bound.insert(bits, prime);
        chain.push(prime);
    }
    Some(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN_SMALL_PRIMES: [u64; 8] = [2, 3, 5, 7, 11, 13, 17, 19];
    const KNOWN_SMALL_COMPOSITES: [u64; 10] = [0, 1, 4, 6, 8, 9, 10, 12, 15, 16];

    #[test]
    fn test_is_prime_basic() {
        for &prime in &KNOWN_SMALL_PRIMES {
            assert!(is_prime(prime));
        }
        for &composite in &KNOWN_SMALL_COMPOSITES {
            assert!(!is_prime(composite));
        }
    }

    #[test]
    fn test_is_prime_tricky_composites() {
        // Carmichael numbers and strong pseudoprimes for small base sets.
        let tricky = [561u64, 1_105, 1_729, 3_215_031_751];
        for &n in &tricky {
            assert!(!is_prime(n), "expected composite: {n}");
        }
    }

    #[test]
    fn test_is_prime_large() {
        assert!(is_prime(2_147_483_647));
        assert!(is_prime((1u64 << 61) - 1));
        assert!(!is_prime(2_147_483_648));
    }

    #[test]
    fn decompose_splits_power_of_two_factor() {
        assert_eq!(decompose(24), (3, 3));
        assert_eq!(decompose(40), (5, 3));
        assert_eq!(decompose(1), (1, 0));
    }

    #[test]
    fn snap_down_to_congruence_aligns_downward() {
        assert_eq!(snap_down_to_congruence(17, 8), Some(17));
        assert_eq!(snap_down_to_congruence(16, 8), Some(9));
        assert_eq!(snap_down_to_congruence(0, 8), None);
    }

    #[test]
    fn first_prime_down_is_ntt_friendly() {
        let p = get_first_prime_down(1 << 40, 8192).unwrap();
        assert!(p < 1 << 40);
        assert!(is_ntt_friendly_prime(p, 8192));
        assert_eq!(get_first_prime_down(2, 8), None);
    }

    #[test]
    fn default_chain_has_distinct_sized_primes() {
        let chain = generate_modulus_chain(&[60, 40, 40, 60], 8192).unwrap();
        assert_eq!(chain.len(), 4);
        for (&p, bits) in chain.iter().zip([60u32, 40, 40, 60]) {
            assert!(is_ntt_friendly_prime(p, 8192));
            assert_eq!(64 - p.leading_zeros(), bits);
        }
        assert_ne!(chain[0], chain[3]);
        assert_ne!(chain[1], chain[2]);
    }

    #[test]
    fn chain_generation_fails_when_range_is_exhausted() {
        // 2^5 holds no prime = 1 mod 2^14
        assert_eq!(generate_modulus_chain(&[5], 8192), None);
        assert_eq!(generate_modulus_chain(&[1], 8), None);
    }
}
