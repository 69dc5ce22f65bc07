//! Encrypted vectors and the key pair that produces and consumes them.

mod encrypted;
mod keypair;
mod plain;
mod private_key;
mod public_key;

pub use encrypted::{EncryptedVector, accumulate_into};
pub use keypair::KeyPairGenerator;
pub use plain::{Operand, PlainValue};
pub use private_key::PrivateKey;
pub use public_key::PublicKey;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        crypto::{BackendError, CkksParams, SecurityLevel},
        errors::HeError,
    };
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn toy_pair(seed: u64) -> (PublicKey, PrivateKey) {
        let params = CkksParams {
            poly_modulus_degree: 16,
            coeff_mod_bit_sizes: vec![50, 30, 30, 50],
            global_scale: (1u64 << 30) as f64,
            security_level: SecurityLevel::None,
            error_std: 3.2,
            hamming_weight: 8,
        };
        KeyPairGenerator::generate_with_rng(Some(params), &mut ChaCha20Rng::seed_from_u64(seed))
            .unwrap()
    }

    fn decrypt_vec(sk: &PrivateKey, v: &EncryptedVector) -> Vec<f64> {
        sk.decrypt(v).unwrap().into_vec()
    }

    fn assert_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-3);
        }
    }

    #[test]
    fn scalar_roundtrip_returns_scalar() {
        let (pk, sk) = toy_pair(1);
        let v = pk.encrypt(3.5).unwrap();
        assert_eq!(v.depth(), 0);
        assert_eq!(v.len(), 1);
        let value = sk.decrypt(&v).unwrap().as_scalar().unwrap();
        assert_abs_diff_eq!(value, 3.5, epsilon = 1e-3);
    }

    #[test]
    fn encrypt_rejects_invalid_input() {
        let (pk, _) = toy_pair(2);
        for bad in [
            PlainValue::Vector(vec![]),
            PlainValue::Scalar(f64::NAN),
            PlainValue::Vector(vec![0.0; 9]),
        ] {
            assert!(matches!(pk.encrypt(bad), Err(HeError::Validation { .. })));
        }
    }

    #[test]
    fn pure_operations_leave_operands_untouched() {
        let (pk, sk) = toy_pair(3);
        let a = pk.encrypt([1.0, 2.0, 3.0]).unwrap();
        let b = pk.encrypt([4.0, 5.0, 6.0]).unwrap();

        let sum = a.add(&b).unwrap();
        let diff = a.subtract(&b).unwrap();
        let rdiff = a.reverse_subtract(&b).unwrap();
        assert_close(&decrypt_vec(&sk, &sum), &[5.0, 7.0, 9.0]);
        assert_close(&decrypt_vec(&sk, &diff), &[-3.0, -3.0, -3.0]);
        assert_close(&decrypt_vec(&sk, &rdiff), &[3.0, 3.0, 3.0]);
        assert_close(&decrypt_vec(&sk, &a), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn plaintext_operands_broadcast_or_apply_per_slot() {
        let (pk, sk) = toy_pair(4);
        let a = pk.encrypt([1.0, 2.0]).unwrap();
        assert_close(&decrypt_vec(&sk, &a.add(1.0).unwrap()), &[2.0, 3.0]);
        assert_close(&decrypt_vec(&sk, &a.subtract([0.5, 0.5]).unwrap()), &[0.5, 1.5]);
        assert_close(&decrypt_vec(&sk, &a.reverse_subtract(10.0).unwrap()), &[9.0, 8.0]);
        assert!(matches!(a.add([1.0, 2.0, 3.0]), Err(HeError::Validation { .. })));
    }

    #[test]
    fn depth_tracks_multiplications() {
        let (pk, sk) = toy_pair(5);
        let a = pk.encrypt(2.0).unwrap();
        let b = pk.encrypt(3.0).unwrap();

        let ab = a.multiply(&b).unwrap();
        assert_eq!(ab.depth(), 1);
        assert_eq!(ab.add(&ab).unwrap().depth(), 1);
        let abb = ab.multiply(4.0).unwrap();
        assert_eq!(abb.depth(), 2);
        assert_abs_diff_eq!(sk.decrypt(&abb).unwrap().as_scalar().unwrap(), 24.0, epsilon = 1e-3);

        assert!(matches!(
            abb.multiply(&a),
            Err(HeError::NoiseBudgetExhausted { depth: 3 })
        ));
    }

    #[test]
    fn divide_by_plaintext_only() {
        let (pk, sk) = toy_pair(6);
        let a = pk.encrypt([5.0, 9.0]).unwrap();
        assert_close(&decrypt_vec(&sk, &a.divide(2.0).unwrap()), &[2.5, 4.5]);
        assert_close(&decrypt_vec(&sk, &a.divide([5.0, 3.0]).unwrap()), &[1.0, 3.0]);
        assert!(matches!(a.divide(0.0), Err(HeError::Validation { .. })));
        assert!(matches!(
            a.divide(&a),
            Err(HeError::UnsupportedOperation { .. })
        ));
    }

    #[test]
    fn transparent_results_are_recovered_for_addition_paths() {
        let (pk, sk) = toy_pair(7);
        let a = pk.encrypt([1.5, -2.0]).unwrap();

        let zero = a.subtract(&a).unwrap();
        assert_close(&decrypt_vec(&sk, &zero), &[0.0, 0.0]);
        assert!(!zero.ciphertext().is_transparent());

        let negated = a.reverse_subtract(0.0).unwrap();
        let cancelled = a.add(&negated).unwrap();
        assert_close(&decrypt_vec(&sk, &cancelled), &[0.0, 0.0]);

        let reversed = a.reverse_subtract(&a).unwrap();
        assert_close(&decrypt_vec(&sk, &reversed), &[0.0, 0.0]);
    }

    #[test]
    fn transparent_products_surface_unchanged() {
        let (pk, _) = toy_pair(8);
        let a = pk.encrypt([1.0, 2.0]).unwrap();
        assert!(matches!(
            a.multiply(0.0),
            Err(HeError::Backend(BackendError::TransparentCiphertext))
        ));
    }

    #[test]
    fn in_place_accumulation() {
        let (pk, sk) = toy_pair(9);
        let mut total = pk.encrypt([0.0, 1.0]).unwrap();
        for i in 1..=3 {
            let term = pk.encrypt([f64::from(i), 1.0]).unwrap();
            accumulate_into(&mut total, &term).unwrap();
        }
        total.subtract_in_place(1.0).unwrap();
        let snapshot = total.clone();
        total.subtract_in_place(&snapshot).unwrap();
        assert_eq!(total.depth(), 0);
        assert_close(&decrypt_vec(&sk, &snapshot), &[5.0, 3.0]);
        assert_close(&decrypt_vec(&sk, &total), &[0.0, 0.0]);
    }

    #[test]
    fn foreign_vectors_fail_fast() {
        let (pk, sk) = toy_pair(10);
        let (other_pk, other_sk) = toy_pair(11);
        let a = pk.encrypt(1.0).unwrap();
        let b = other_pk.encrypt(1.0).unwrap();
        assert!(matches!(other_sk.decrypt(&a), Err(HeError::KeyMismatch { .. })));
        assert!(matches!(a.add(&b), Err(HeError::KeyMismatch { .. })));
        assert!(sk.decrypt(&a).is_ok());
    }

    #[test]
    fn decrypt_operand_requires_ciphertext() {
        let (pk, sk) = toy_pair(12);
        let a = pk.encrypt(1.0).unwrap();
        assert!(sk.decrypt_operand(Operand::from(&a)).is_ok());
        assert!(matches!(
            sk.decrypt_operand(Operand::from(1.0)),
            Err(HeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn private_key_debug_is_redacted() {
        let (_, sk) = toy_pair(13);
        let rendered = format!("{sk:?}");
        assert!(rendered.starts_with("PrivateKey"));
        assert!(!rendered.contains("poly"));
    }

    #[test]
    fn keys_and_vectors_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PublicKey>();
        assert_send_sync::<PrivateKey>();
        assert_send_sync::<EncryptedVector>();
    }
}
