mod common;

use approx::assert_abs_diff_eq;
use common::{TOLERANCE, assert_close, decrypt_vec, default_pair};
use mpc_ckks::{CkksParams, HeError, KeyPairGenerator, PlainValue};

#[test]
fn scalar_roundtrip_stays_scalar() {
    let (pk, sk) = default_pair();
    let x = pk.encrypt(3.5).unwrap();
    assert_eq!(x.depth(), 0);
    let value = sk.decrypt(&x).unwrap().as_scalar().unwrap();
    assert_abs_diff_eq!(value, 3.5, epsilon = TOLERANCE);
}

#[test]
fn vector_addition() {
    let (pk, sk) = default_pair();
    let a = pk.encrypt(vec![1.0, 2.0, 3.0]).unwrap();
    let b = pk.encrypt(vec![4.0, 5.0, 6.0]).unwrap();
    let sum = a.add(&b).unwrap();
    assert_eq!(sum.depth(), 0);
    assert_close(&decrypt_vec(sk, &sum), &[5.0, 7.0, 9.0]);
}

#[test]
fn encrypted_product_increments_depth() {
    let (pk, sk) = default_pair();
    let product = pk.encrypt(2.0).unwrap().multiply(&pk.encrypt(3.0).unwrap()).unwrap();
    assert_eq!(product.depth(), 1);
    assert_close(&decrypt_vec(sk, &product), &[6.0]);
}

#[test]
fn division_by_plain_scalar() {
    let (pk, sk) = default_pair();
    let quotient = pk.encrypt(5.0).unwrap().divide(2.0).unwrap();
    assert_eq!(quotient.depth(), 1);
    assert_close(&decrypt_vec(sk, &quotient), &[2.5]);
}

#[test]
fn foreign_private_key_is_rejected() {
    let (pk, _) = default_pair();
    let (_, other_sk) = KeyPairGenerator::generate(None).unwrap();
    let x = pk.encrypt(vec![1.0, 2.0]).unwrap();
    assert!(matches!(other_sk.decrypt(&x), Err(HeError::KeyMismatch { .. })));
}

#[test]
fn default_chain_allows_two_multiplications() {
    let (pk, sk) = default_pair();
    let x = pk.encrypt(vec![1.5, -2.0]).unwrap();
    let squared = x.multiply(&x).unwrap();
    let cubed = squared.multiply(&x).unwrap();
    assert_eq!(cubed.depth(), 2);
    assert_close(&decrypt_vec(sk, &cubed), &[3.375, -8.0]);
    assert!(matches!(
        cubed.multiply(&x),
        Err(HeError::NoiseBudgetExhausted { depth: 3 })
    ));
}

#[test]
fn mixed_depth_operands_align() {
    let (pk, sk) = default_pair();
    let x = pk.encrypt(vec![2.0, 3.0]).unwrap();
    let doubled = x.multiply(2.0).unwrap();
    let sum = x.add(&doubled).unwrap();
    assert_eq!(sum.depth(), 0);
    assert_close(&decrypt_vec(sk, &sum), &[6.0, 9.0]);
    let diff = doubled.reverse_subtract(&x).unwrap();
    assert_eq!(diff.depth(), 1);
    assert_close(&decrypt_vec(sk, &diff), &[-2.0, -3.0]);
}

#[test]
fn plaintext_operands() {
    let (pk, sk) = default_pair();
    let x = pk.encrypt(vec![1.0, 2.0, 3.0]).unwrap();
    assert_close(&decrypt_vec(sk, &x.add(10.0).unwrap()), &[11.0, 12.0, 13.0]);
    assert_close(
        &decrypt_vec(sk, &x.subtract(vec![1.0, 1.0, 1.0]).unwrap()),
        &[0.0, 1.0, 2.0],
    );
    assert_close(&decrypt_vec(sk, &x.reverse_subtract(1.0).unwrap()), &[0.0, -1.0, -2.0]);
    assert_close(
        &decrypt_vec(sk, &x.multiply([0.5, -1.0, 2.0]).unwrap()),
        &[0.5, -2.0, 6.0],
    );
}

#[test]
fn invalid_inputs_are_validation_errors() {
    let (pk, _) = default_pair();
    assert!(matches!(pk.encrypt(f64::NAN), Err(HeError::Validation { .. })));
    assert!(matches!(pk.encrypt(Vec::<f64>::new()), Err(HeError::Validation { .. })));
    let too_long = vec![0.0; pk.slot_count() + 1];
    assert!(matches!(pk.encrypt(too_long), Err(HeError::Validation { .. })));
}

#[test]
fn encrypted_division_is_unsupported() {
    let (pk, _) = default_pair();
    let x = pk.encrypt(1.0).unwrap();
    assert!(matches!(
        x.divide(&x),
        Err(HeError::UnsupportedOperation { .. })
    ));
    assert!(matches!(x.divide(0.0), Err(HeError::Validation { .. })));
}

#[test]
fn decrypting_a_plaintext_is_a_type_mismatch() {
    let (_, sk) = default_pair();
    let result = sk.decrypt_operand(PlainValue::Scalar(1.0).into());
    assert!(matches!(result, Err(HeError::TypeMismatch { .. })));
}

#[test]
fn rejected_parameters_are_configuration_errors() {
    let params = CkksParams {
        coeff_mod_bit_sizes: vec![60, 60, 60, 60, 60, 60, 60],
        poly_modulus_degree: 4096,
        ..CkksParams::default()
    };
    assert!(matches!(
        KeyPairGenerator::generate(Some(params)),
        Err(HeError::Configuration { .. })
    ));
}
