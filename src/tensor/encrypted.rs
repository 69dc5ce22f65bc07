use super::{SchemePrivateKey, SchemeTag, factory::split};
use crate::{
    errors::{HeError, HeResult},
    paillier::PaillierEncryptedNumber,
    vector::{EncryptedVector, PlainValue},
};

#[derive(Debug, Clone)]
pub(crate) enum Partitions {
    Ckks(Vec<Vec<EncryptedVector>>),
    Paillier(Vec<Vec<Vec<PaillierEncryptedNumber>>>),
}

/// Rows of encrypted reals split into contiguous partitions.
#[derive(Debug, Clone)]
pub struct EncryptedTensor {
    data: Partitions,
}

impl EncryptedTensor {
    pub(crate) fn new(data: Partitions) -> Self {
        Self { data }
    }

    pub fn scheme(&self) -> SchemeTag {
        match self.data {
            Partitions::Ckks(_) => SchemeTag::Ckks,
            Partitions::Paillier(_) => SchemeTag::Paillier,
        }
    }

    pub fn partition_count(&self) -> usize {
        self.layout().len()
    }

    /// Length of every row, in order.
    pub fn shape(&self) -> Vec<usize> {
        match &self.data {
            Partitions::Ckks(parts) => parts.iter().flatten().map(EncryptedVector::len).collect(),
            Partitions::Paillier(parts) => parts.iter().flatten().map(Vec::len).collect(),
        }
    }

    /// Element-wise sum with a tensor of the same scheme and shape. The
    /// result keeps this tensor's partitioning.
    pub fn add(&self, other: &Self) -> HeResult<Self> {
        self.check_shape(&other.shape())?;
        let layout = self.layout();
        let data = match (&self.data, &other.data) {
            (Partitions::Ckks(lhs), Partitions::Ckks(rhs)) => {
                let rows = lhs
                    .iter()
                    .flatten()
                    .zip(rhs.iter().flatten())
                    .map(|(a, b)| a.add(b))
                    .collect::<HeResult<Vec<_>>>()?;
                Partitions::Ckks(split(rows, &layout))
            }
            (Partitions::Paillier(lhs), Partitions::Paillier(rhs)) => {
                let rows = lhs
                    .iter()
                    .flatten()
                    .zip(rhs.iter().flatten())
                    .map(|(a, b)| {
                        a.iter()
                            .zip(b)
                            .map(|(x, y)| x.add(y))
                            .collect::<HeResult<Vec<_>>>()
                    })
                    .collect::<HeResult<Vec<_>>>()?;
                Partitions::Paillier(split(rows, &layout))
            }
            _ => {
                return Err(HeError::TypeMismatch {
                    expected: self.scheme().name(),
                    found: other.scheme().name(),
                });
            }
        };
        Ok(Self::new(data))
    }

    /// Adds one plaintext row to each encrypted row.
    pub fn add_plain(&self, rows: &[Vec<f64>]) -> HeResult<Self> {
        self.check_shape(&rows.iter().map(Vec::len).collect::<Vec<_>>())?;
        let layout = self.layout();
        let data = match &self.data {
            Partitions::Ckks(parts) => {
                let sums = parts
                    .iter()
                    .flatten()
                    .zip(rows)
                    .map(|(vector, row)| vector.add(row.as_slice()))
                    .collect::<HeResult<Vec<_>>>()?;
                Partitions::Ckks(split(sums, &layout))
            }
            Partitions::Paillier(parts) => {
                let sums = parts
                    .iter()
                    .flatten()
                    .zip(rows)
                    .map(|(numbers, row)| {
                        numbers
                            .iter()
                            .zip(row)
                            .map(|(number, &value)| number.add_plain(value))
                            .collect::<HeResult<Vec<_>>>()
                    })
                    .collect::<HeResult<Vec<_>>>()?;
                Partitions::Paillier(split(sums, &layout))
            }
        };
        Ok(Self::new(data))
    }

    /// Multiplies every element by `factor`.
    pub fn multiply_scalar(&self, factor: f64) -> HeResult<Self> {
        let data = match &self.data {
            Partitions::Ckks(parts) => Partitions::Ckks(
                parts
                    .iter()
                    .map(|part| {
                        part.iter()
                            .map(|v| v.multiply(factor))
                            .collect::<HeResult<Vec<_>>>()
                    })
                    .collect::<HeResult<_>>()?,
            ),
            Partitions::Paillier(parts) => Partitions::Paillier(
                parts
                    .iter()
                    .map(|part| {
                        part.iter()
                            .map(|row| {
                                row.iter()
                                    .map(|n| n.mul_scalar(factor))
                                    .collect::<HeResult<Vec<_>>>()
                            })
                            .collect::<HeResult<Vec<_>>>()
                    })
                    .collect::<HeResult<_>>()?,
            ),
        };
        Ok(Self::new(data))
    }

    pub fn decrypt(&self, key: &SchemePrivateKey) -> HeResult<Vec<Vec<f64>>> {
        match (&self.data, key) {
            (Partitions::Ckks(parts), SchemePrivateKey::Ckks(key)) => parts
                .iter()
                .flatten()
                .map(|vector| key.decrypt(vector).map(PlainValue::into_vec))
                .collect(),
            (Partitions::Paillier(parts), SchemePrivateKey::Paillier(key)) => parts
                .iter()
                .flatten()
                .map(|row| {
                    row.iter()
                        .map(|number| key.decrypt(number))
                        .collect::<HeResult<Vec<_>>>()
                })
                .collect(),
            _ => Err(HeError::TypeMismatch {
                expected: self.scheme().name(),
                found: key.scheme().name(),
            }),
        }
    }

    fn layout(&self) -> Vec<usize> {
        match &self.data {
            Partitions::Ckks(parts) => parts.iter().map(Vec::len).collect(),
            Partitions::Paillier(parts) => parts.iter().map(Vec::len).collect(),
        }
    }

    fn check_shape(&self, other: &[usize]) -> HeResult<()> {
        let shape = self.shape();
        if shape != other {
            return Err(HeError::validation(format!(
                "tensor shapes differ: {shape:?} vs {other:?}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        crypto::{CkksParams, SecurityLevel},
        errors::HeError,
        paillier::PaillierKeypair,
        tensor::{SchemePrivateKey, SchemePublicKey, select},
        vector::KeyPairGenerator,
    };
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn ckks_keys() -> (SchemePublicKey, SchemePrivateKey) {
        let params = CkksParams::builder()
            .poly_modulus_degree(16)
            .coeff_mod_bit_sizes([50, 30, 30, 50])
            .scale_bits(30)
            .security_level(SecurityLevel::None)
            .build()
            .unwrap();
        let (pk, sk) =
            KeyPairGenerator::generate_with_rng(Some(params), &mut ChaCha20Rng::seed_from_u64(11))
                .unwrap();
        (pk.into(), sk.into())
    }

    fn paillier_keys() -> (SchemePublicKey, SchemePrivateKey) {
        let (pk, sk) =
            PaillierKeypair::generate_with_rng(256, &mut ChaCha20Rng::seed_from_u64(12)).unwrap();
        (pk.into(), sk.into())
    }

    fn assert_rows_close(actual: &[Vec<f64>], expected: &[Vec<f64>], epsilon: f64) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert_eq!(a.len(), e.len());
            for (x, y) in a.iter().zip(e) {
                assert_abs_diff_eq!(x, y, epsilon = epsilon);
            }
        }
    }

    fn exercise(tag: &str, (pk, sk): (SchemePublicKey, SchemePrivateKey), epsilon: f64) {
        let rows = vec![vec![1.0, 2.0], vec![-0.5, 4.0], vec![3.0, 0.25]];
        let factory = select(tag, 2).unwrap();
        let tensor = factory.encrypt(&pk, &rows).unwrap();
        assert_eq!(tensor.partition_count(), 2);
        assert_eq!(tensor.shape(), vec![2, 2, 2]);
        assert_rows_close(&tensor.decrypt(&sk).unwrap(), &rows, epsilon);

        let other = select(tag, 1).unwrap().encrypt(&pk, &rows).unwrap();
        let sum = tensor.add(&other).unwrap();
        assert_eq!(sum.partition_count(), 2);
        let doubled: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| row.iter().map(|v| v * 2.0).collect())
            .collect();
        assert_rows_close(&sum.decrypt(&sk).unwrap(), &doubled, epsilon);

        let shifted = tensor.add_plain(&rows).unwrap();
        assert_rows_close(&shifted.decrypt(&sk).unwrap(), &doubled, epsilon);

        let scaled = tensor.multiply_scalar(2.0).unwrap();
        assert_rows_close(&scaled.decrypt(&sk).unwrap(), &doubled, epsilon);

        assert!(matches!(
            tensor.add_plain(&rows[..2]),
            Err(HeError::Validation { .. })
        ));
    }

    #[test]
    fn ckks_tensor_arithmetic() {
        exercise("ckks", ckks_keys(), 1e-3);
    }

    #[test]
    fn paillier_tensor_arithmetic() {
        exercise("paillier", paillier_keys(), 1e-9);
    }

    #[test]
    fn schemes_do_not_mix() {
        let (ckks_pk, ckks_sk) = ckks_keys();
        let (paillier_pk, paillier_sk) = paillier_keys();
        let rows = vec![vec![1.0]];

        assert!(matches!(
            select("ckks", 1).unwrap().encrypt(&paillier_pk, &rows),
            Err(HeError::TypeMismatch { expected: "ckks", found: "paillier" })
        ));

        let ckks = select("ckks", 1).unwrap().encrypt(&ckks_pk, &rows).unwrap();
        let paillier = select("paillier", 1).unwrap().encrypt(&paillier_pk, &rows).unwrap();
        assert!(matches!(ckks.add(&paillier), Err(HeError::TypeMismatch { .. })));
        assert!(matches!(ckks.decrypt(&paillier_sk), Err(HeError::TypeMismatch { .. })));
        assert!(matches!(paillier.decrypt(&ckks_sk), Err(HeError::TypeMismatch { .. })));
    }

    #[test]
    fn empty_tensors_are_rejected() {
        let (pk, _) = paillier_keys();
        assert!(matches!(
            select("paillier", 2).unwrap().encrypt(&pk, &[]),
            Err(HeError::Validation { .. })
        ));
    }
}
