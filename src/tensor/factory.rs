use super::{EncryptedTensor, SchemePublicKey, SchemeTag, encrypted::Partitions};
use crate::errors::{HeError, HeResult};
use tracing::instrument;

/// Builds [`EncryptedTensor`]s for one scheme with a fixed partition count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TensorFactory {
    scheme: SchemeTag,
    partitions: usize,
}

/// Looks up the factory for `tag`. Unknown tags and a zero partition count
/// are configuration errors.
pub fn select(tag: &str, partitions: usize) -> HeResult<TensorFactory> {
    TensorFactory::new(tag.parse()?, partitions)
}

impl TensorFactory {
    pub fn new(scheme: SchemeTag, partitions: usize) -> HeResult<Self> {
        if partitions == 0 {
            return Err(HeError::configuration("partition count must be positive"));
        }
        Ok(Self { scheme, partitions })
    }

    pub fn scheme(&self) -> SchemeTag {
        self.scheme
    }

    pub fn partitions(&self) -> usize {
        self.partitions
    }

    /// Encrypts `rows`, splitting them into at most `partitions` contiguous
    /// partitions. CKKS stores one vector per row, Paillier one number per
    /// element.
    #[instrument(skip_all, fields(scheme = %self.scheme, rows = rows.len()))]
    pub fn encrypt(&self, key: &SchemePublicKey, rows: &[Vec<f64>]) -> HeResult<EncryptedTensor> {
        if key.scheme() != self.scheme {
            return Err(HeError::TypeMismatch {
                expected: self.scheme.name(),
                found: key.scheme().name(),
            });
        }
        if rows.is_empty() {
            return Err(HeError::validation("tensor has no rows"));
        }
        let layout = partition_sizes(rows.len(), self.partitions);
        let data = match key {
            SchemePublicKey::Ckks(key) => {
                let encrypted = rows
                    .iter()
                    .map(|row| key.encrypt(row.as_slice()))
                    .collect::<HeResult<Vec<_>>>()?;
                Partitions::Ckks(split(encrypted, &layout))
            }
            SchemePublicKey::Paillier(key) => {
                let encrypted = rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|&value| key.encrypt(value))
                            .collect::<HeResult<Vec<_>>>()
                    })
                    .collect::<HeResult<Vec<_>>>()?;
                Partitions::Paillier(split(encrypted, &layout))
            }
        };
        Ok(EncryptedTensor::new(data))
    }
}

/// Sizes of `partitions` contiguous chunks covering `rows` rows, earlier
/// chunks taking the remainder. Empty chunks are dropped.
pub(crate) fn partition_sizes(rows: usize, partitions: usize) -> Vec<usize> {
    let base = rows / partitions;
    let extra = rows % partitions;
    (0..partitions)
        .map(|i| base + usize::from(i < extra))
        .filter(|&size| size > 0)
        .collect()
}

pub(crate) fn split<T>(items: Vec<T>, layout: &[usize]) -> Vec<Vec<T>> {
    let mut items = items.into_iter();
    layout
        .iter()
        .map(|&size| items.by_ref().take(size).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_rejects_bad_configuration() {
        assert!(matches!(select("rsa", 2), Err(HeError::Configuration { .. })));
        assert!(matches!(select("ckks", 0), Err(HeError::Configuration { .. })));
        let factory = select("Paillier", 3).unwrap();
        assert_eq!(factory.scheme(), SchemeTag::Paillier);
        assert_eq!(factory.partitions(), 3);
    }

    #[test]
    fn partitions_are_contiguous_and_balanced() {
        assert_eq!(partition_sizes(10, 3), vec![4, 3, 3]);
        assert_eq!(partition_sizes(2, 4), vec![1, 1]);
        assert_eq!(partition_sizes(6, 1), vec![6]);
        assert_eq!(split(vec![1, 2, 3, 4, 5], &[2, 2, 1]), vec![vec![1, 2], vec![3, 4], vec![5]]);
    }
}
