use super::errors::{RnsError, RnsResult};
use crate::math::{is_ntt_friendly_prime, mod_inverse, mod_pow};
use std::sync::Arc;

/// Twiddle factors for the negacyclic NTT modulo one prime.
///
/// `psi_powers[k] = psi^bitrev(k)` and `inv_psi_powers[k] = psi^-bitrev(k)`
/// where `psi` is a primitive `2N`-th root of unity.
#[derive(Debug, Clone)]
pub struct NttTable {
    pub psi_powers: Vec<u64>,
    pub inv_psi_powers: Vec<u64>,
    pub n_inv: u64,
    pub modulus: u64,
}

impl NttTable {
    pub fn new(degree: usize, modulus: u64) -> RnsResult<Self> {
        if !degree.is_power_of_two() || degree < 2 {
            return Err(RnsError::InvalidDegree { degree });
        }
        if !is_ntt_friendly_prime(modulus, degree as u64) {
            return Err(RnsError::NonNttFriendlyModulus { modulus, degree });
        }

        let psi = find_primitive_root(modulus, 2 * degree);
        let psi_inv = mod_inverse(psi, modulus)
            .ok_or(RnsError::NonNttFriendlyModulus { modulus, degree })?;
        let bit_count = degree.trailing_zeros() as usize;

        let mut psi_powers = vec![1u64; degree];
        let mut inv_psi_powers = vec![1u64; degree];
        for index in 1..degree {
            let exponent = reverse_bits(index, bit_count) as u64;
            psi_powers[index] = mod_pow(psi, exponent, modulus);
            inv_psi_powers[index] = mod_pow(psi_inv, exponent, modulus);
        }

        let n_inv = mod_inverse(degree as u64, modulus)
            .ok_or(RnsError::NonNttFriendlyModulus { modulus, degree })?;
        Ok(Self {
            psi_powers,
            inv_psi_powers,
            n_inv,
            modulus,
        })
    }
}

/// RNS basis: a set of NTT-friendly prime moduli with precomputed NTT tables.
///
/// Invariant: `moduli.len() == ntt_tables.len()` and
/// `ntt_tables[i].modulus == moduli[i]` for all `i`. Tables are shared
/// between a basis and every sub-basis carved out of it.
#[derive(Debug, Clone)]
pub struct RnsBasis {
    degree: usize,
    moduli: Vec<u64>,
    ntt_tables: Vec<Arc<NttTable>>,
}

impl RnsBasis {
    pub fn new(degree: usize, moduli: Vec<u64>) -> RnsResult<Self> {
        if moduli.is_empty() {
            return Err(RnsError::EmptyBasis);
        }
        let ntt_tables = moduli
            .iter()
            .map(|&modulus| NttTable::new(degree, modulus).map(Arc::new))
            .collect::<RnsResult<Vec<_>>>()?;
        Ok(Self {
            degree,
            moduli,
            ntt_tables,
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn ntt_table(&self, channel: usize) -> &NttTable {
        &self.ntt_tables[channel]
    }

    pub fn channel_count(&self) -> usize {
        self.moduli.len()
    }

    pub fn position(&self, modulus: u64) -> Option<usize> {
        self.moduli.iter().position(|&q| q == modulus)
    }

    /// Returns a new basis with the last `drop_count` channels removed.
    pub fn drop_last(&self, drop_count: usize) -> RnsResult<Self> {
        let channel_count = self.channel_count();
        if drop_count >= channel_count {
            return Err(RnsError::InvalidModDrop {
                drop_count,
                channel_count,
            });
        }
        let keep: Vec<usize> = (0..channel_count - drop_count).collect();
        Ok(self.select(&keep))
    }

    /// Returns the sub-basis made of the given channels, in the given order.
    ///
    /// # Panics
    /// Panics if a channel index is out of range.
    pub fn select(&self, channels: &[usize]) -> Self {
        Self {
            degree: self.degree,
            moduli: channels.iter().map(|&ch| self.moduli[ch]).collect(),
            ntt_tables: channels
                .iter()
                .map(|&ch| Arc::clone(&self.ntt_tables[ch]))
                .collect(),
        }
    }
}

/// Finds a primitive `order`-th root of unity in `Z_modulus` for a
/// power-of-two `order`.
///
/// # Panics
/// Cannot panic when `modulus` is an NTT-friendly prime for `order / 2`,
/// since such primes are guaranteed to have the required root.
fn find_primitive_root(modulus: u64, order: usize) -> u64 {
    let exponent = (modulus - 1) / order as u64;
    for candidate in 2..modulus {
        let root = mod_pow(candidate, exponent, modulus);
        // For a power-of-two order, primitivity reduces to root^(order/2) = -1.
        if mod_pow(root, (order / 2) as u64, modulus) == modulus - 1 {
            return root;
        }
    }
    panic!(
        "find_primitive_root: no root found for modulus {modulus}, order {order}"
    );
}

pub(super) fn reverse_bits(value: usize, bit_count: usize) -> usize {
    if bit_count == 0 {
        return 0;
    }
    value.reverse_bits() >> (usize::BITS as usize - bit_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_ntt_table_for_friendly_prime() {
        let table = NttTable::new(8, 17).unwrap();
        assert_eq!(table.modulus, 17);
        assert_eq!(table.psi_powers[0], 1);
        // psi^bitrev(1) = psi^4 must be a primitive 4th root: its square is -1.
        let psi4 = table.psi_powers[1];
        assert_eq!(psi4 * psi4 % 17, 16);
        assert_eq!(table.n_inv * 8 % 17, 1);
    }

    #[test]
    fn rejects_non_friendly_modulus() {
        assert!(matches!(
            NttTable::new(8, 19),
            Err(RnsError::NonNttFriendlyModulus {
                modulus: 19,
                degree: 8
            })
        ));
    }

    #[test]
    fn rejects_bad_degree_and_empty_basis() {
        assert!(matches!(
            NttTable::new(12, 97),
            Err(RnsError::InvalidDegree { degree: 12 })
        ));
        assert!(matches!(RnsBasis::new(8, vec![]), Err(RnsError::EmptyBasis)));
    }

    #[test]
    fn drop_last_reduces_channel_count() {
        let basis = RnsBasis::new(8, vec![17, 97, 113]).unwrap();
        let reduced = basis.drop_last(1).unwrap();
        assert_eq!(reduced.channel_count(), 2);
        assert_eq!(reduced.moduli(), &[17, 97]);
        assert!(matches!(
            basis.drop_last(3),
            Err(RnsError::InvalidModDrop { .. })
        ));
    }

    #[test]
    fn select_keeps_requested_order() {
        let basis = RnsBasis::new(8, vec![17, 97, 113]).unwrap();
        let picked = basis.select(&[0, 2]);
        assert_eq!(picked.moduli(), &[17, 113]);
        assert_eq!(picked.ntt_table(1).modulus, 113);
        assert_eq!(picked.position(113), Some(1));
        assert_eq!(picked.position(97), None);
    }

    #[test]
    fn reverse_bits_on_three_bits() {
        assert_eq!(reverse_bits(1, 3), 4);
        assert_eq!(reverse_bits(3, 3), 6);
        assert_eq!(reverse_bits(0, 0), 0);
    }
}
