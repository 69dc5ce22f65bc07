mod common;

use approx::assert_abs_diff_eq;
use common::{decrypt_vec, toy_pair};
use mpc_ckks::{PrivateKey, PublicKey};
use proptest::prelude::*;
use std::sync::OnceLock;

fn keys() -> &'static (PublicKey, PrivateKey) {
    static KEYS: OnceLock<(PublicKey, PrivateKey)> = OnceLock::new();
    KEYS.get_or_init(|| toy_pair(99))
}

fn values() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(-100.0f64..100.0, 1..=8)
}

fn paired_values() -> impl Strategy<Value = (Vec<f64>, Vec<f64>)> {
    (1usize..=8).prop_flat_map(|len| {
        (
            prop::collection::vec(-50.0f64..50.0, len),
            prop::collection::vec(-50.0f64..50.0, len),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn roundtrip(xs in values()) {
        let (pk, sk) = keys();
        let decrypted = decrypt_vec(sk, &pk.encrypt(xs.clone()).unwrap());
        for (x, d) in xs.iter().zip(&decrypted) {
            assert_abs_diff_eq!(x, d, epsilon = 1e-3);
        }
    }

    #[test]
    fn sum_and_difference((xs, ys) in paired_values()) {
        let (pk, sk) = keys();
        let a = pk.encrypt(xs.clone()).unwrap();
        let b = pk.encrypt(ys.clone()).unwrap();
        let sum = a.add(&b).unwrap();
        let diff = a.subtract(&b).unwrap();
        prop_assert_eq!(sum.depth(), 0);
        prop_assert_eq!(diff.depth(), 0);
        let sum = decrypt_vec(sk, &sum);
        let diff = decrypt_vec(sk, &diff);
        for i in 0..xs.len() {
            assert_abs_diff_eq!(sum[i], xs[i] + ys[i], epsilon = 1e-3);
            assert_abs_diff_eq!(diff[i], xs[i] - ys[i], epsilon = 1e-3);
        }
    }

    #[test]
    fn product_increments_depth((xs, ys) in paired_values()) {
        let (pk, sk) = keys();
        let a = pk.encrypt(xs.clone()).unwrap();
        let b = pk.encrypt(ys.clone()).unwrap();
        let product = a.multiply(&b).unwrap();
        prop_assert_eq!(product.depth(), a.depth() + 1);
        let product = decrypt_vec(sk, &product);
        for i in 0..xs.len() {
            assert_abs_diff_eq!(product[i], xs[i] * ys[i], epsilon = 1e-2);
        }
    }

    #[test]
    fn division_by_plain_scalar(xs in values(), k in prop_oneof![-20.0f64..-0.5, 0.5f64..20.0]) {
        let (pk, sk) = keys();
        let quotient = decrypt_vec(sk, &pk.encrypt(xs.clone()).unwrap().divide(k).unwrap());
        for (x, q) in xs.iter().zip(&quotient) {
            assert_abs_diff_eq!(x / k, *q, epsilon = 1e-3);
        }
    }
}
