//! Word-sized modular arithmetic shared by the RNS layer.
//!
//! Every modulus handled here is below `2^61`, so sums of two reduced values
//! never overflow a `u64` and products are taken through `u128`.

#[inline]
pub fn add_mod(a: u64, b: u64, q: u64) -> u64 {
    let s = a + b;
    if s >= q { s - q } else { s }
}

#[inline]
pub fn sub_mod(a: u64, b: u64, q: u64) -> u64 {
    if a >= b { a - b } else { a + q - b }
}

#[inline]
pub fn mul_mod(a: u64, b: u64, q: u64) -> u64 {
    ((a as u128 * b as u128) % q as u128) as u64
}

/// Computes `base^exponent mod modulus` via binary exponentiation.
pub fn mod_pow(mut base: u64, mut exponent: u64, modulus: u64) -> u64 {
    if modulus == 1 {
        return 0;
    }
    let mut result = 1u64;
    base %= modulus;
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = mul_mod(result, base, modulus);
        }
        base = mul_mod(base, base, modulus);
        exponent >>= 1;
    }
    result
}

fn extended_gcd(a: i128, b: i128) -> (i128, i128, i128) {
    if a == 0 {
        (b, 0, 1)
    } else {
        let (gcd, x1, y1) = extended_gcd(b % a, a);
        (gcd, y1 - (b / a) * x1, x1)
    }
}

/// Multiplicative inverse of `value` modulo `modulus`, if it exists.
pub fn mod_inverse(value: u64, modulus: u64) -> Option<u64> {
    let (gcd, x, _) = extended_gcd((value % modulus) as i128, modulus as i128);
    if gcd != 1 {
        return None;
    }
    let m = modulus as i128;
    Some(((x % m + m) % m) as u64)
}

/// Maps a signed integer into `[0, q)`.
#[inline]
pub fn reduce_signed(value: i64, q: u64) -> u64 {
    (value as i128).rem_euclid(q as i128) as u64
}

/// Lifts a residue in `[0, q)` to its centered representative in `(-q/2, q/2]`.
#[inline]
pub fn center(value: u64, q: u64) -> i64 {
    if value > q / 2 {
        value as i64 - q as i64
    } else {
        value as i64
    }
}
