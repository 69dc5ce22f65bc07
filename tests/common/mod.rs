#![allow(dead_code)]

use approx::assert_abs_diff_eq;
use mpc_ckks::{
    CkksParams, EncryptedVector, KeyPairGenerator, PrivateKey, PublicKey, SecurityLevel,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::OnceLock;

pub const TOLERANCE: f64 = 1e-3;

/// Key pair over the default parameters, generated once per test binary.
pub fn default_pair() -> &'static (PublicKey, PrivateKey) {
    static PAIR: OnceLock<(PublicKey, PrivateKey)> = OnceLock::new();
    PAIR.get_or_init(|| {
        KeyPairGenerator::generate_with_rng(None, &mut ChaCha20Rng::seed_from_u64(2024)).unwrap()
    })
}

/// Insecure ring of degree 16, fast enough for property tests.
pub fn toy_params() -> CkksParams {
    CkksParams::builder()
        .poly_modulus_degree(16)
        .coeff_mod_bit_sizes([50, 30, 30, 50])
        .scale_bits(30)
        .security_level(SecurityLevel::None)
        .build()
        .unwrap()
}

pub fn toy_pair(seed: u64) -> (PublicKey, PrivateKey) {
    KeyPairGenerator::generate_with_rng(Some(toy_params()), &mut ChaCha20Rng::seed_from_u64(seed))
        .unwrap()
}

pub fn decrypt_vec(sk: &PrivateKey, vector: &EncryptedVector) -> Vec<f64> {
    sk.decrypt(vector).unwrap().into_vec()
}

pub fn assert_close(actual: &[f64], expected: &[f64]) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_abs_diff_eq!(a, e, epsilon = TOLERANCE);
    }
}
