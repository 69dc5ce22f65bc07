use super::{BackendError, BackendResult, builder::CkksParamsBuilder};
use serde::{Deserialize, Serialize};

pub const MIN_DEGREE: usize = 16;
pub const MAX_DEGREE: usize = 32768;
pub const MAX_MODULUS_BITS: u32 = 60;

/// Target security for the total coefficient-modulus size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SecurityLevel {
    #[default]
    Tc128,
    Tc192,
    Tc256,
    /// Skips the bound. Only meant for toy rings in tests.
    None,
}

impl SecurityLevel {
    /// Largest total modulus bit count allowed for `degree` by the
    /// HomomorphicEncryption.org standard (classical attacks, ternary secret).
    pub fn max_total_bits(self, degree: usize) -> Option<u32> {
        let column = match self {
            Self::Tc128 => 0,
            Self::Tc192 => 1,
            Self::Tc256 => 2,
            Self::None => return Some(u32::MAX),
        };
        let row: [u32; 3] = match degree {
            1024 => [27, 19, 14],
            2048 => [54, 37, 29],
            4096 => [109, 75, 58],
            8192 => [218, 152, 118],
            16384 => [438, 305, 237],
            32768 => [881, 611, 476],
            _ => return None,
        };
        Some(row[column])
    }
}

/// Scheme parameters for a CKKS context.
///
/// The last entry of `coeff_mod_bit_sizes` is the special key-switching
/// prime; the others form the data chain, so a chain of `k` sizes supports
/// `k - 2` multiplications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CkksParams {
    pub poly_modulus_degree: usize,
    pub coeff_mod_bit_sizes: Vec<u32>,
    pub global_scale: f64,
    pub security_level: SecurityLevel,
    pub error_std: f64,
    pub hamming_weight: usize,
}

impl Default for CkksParams {
    fn default() -> Self {
        Self {
            poly_modulus_degree: 8192,
            coeff_mod_bit_sizes: vec![60, 40, 40, 60],
            global_scale: (1u64 << 40) as f64,
            security_level: SecurityLevel::Tc128,
            error_std: 3.2,
            hamming_weight: 8192 / 2,
        }
    }
}

impl CkksParams {
    pub fn builder() -> CkksParamsBuilder {
        CkksParamsBuilder::new()
    }

    /// Number of data primes, i.e. the chain without the special prime.
    pub fn data_prime_count(&self) -> usize {
        self.coeff_mod_bit_sizes.len().saturating_sub(1)
    }

    pub fn slot_count(&self) -> usize {
        self.poly_modulus_degree / 2
    }

    /// Checks every constraint that does not need the prime search.
    pub fn validate(&self) -> BackendResult<()> {
        let degree = self.poly_modulus_degree;
        if !degree.is_power_of_two() || !(MIN_DEGREE..=MAX_DEGREE).contains(&degree) {
            return Err(BackendError::invalid(format!(
                "poly_modulus_degree must be a power of two in [{MIN_DEGREE}, {MAX_DEGREE}], got {degree}"
            )));
        }

        let sizes = &self.coeff_mod_bit_sizes;
        if sizes.len() < 2 {
            return Err(BackendError::invalid(
                "coeff_mod_bit_sizes needs at least one data prime and the special prime",
            ));
        }
        if let Some(&bits) = sizes.iter().find(|&&b| !(2..=MAX_MODULUS_BITS).contains(&b)) {
            return Err(BackendError::invalid(format!(
                "modulus bit size {bits} outside [2, {MAX_MODULUS_BITS}]"
            )));
        }

        let total: u32 = sizes.iter().sum();
        match self.security_level.max_total_bits(degree) {
            Some(max) if total <= max => {}
            Some(max) => {
                return Err(BackendError::invalid(format!(
                    "total modulus of {total} bits exceeds {max} for degree {degree} at {:?}",
                    self.security_level
                )));
            }
            None => {
                return Err(BackendError::invalid(format!(
                    "no {:?} security bound for degree {degree}",
                    self.security_level
                )));
            }
        }

        if !self.global_scale.is_finite() || self.global_scale < 1.0 {
            return Err(BackendError::invalid(format!(
                "global_scale must be finite and >= 1, got {}",
                self.global_scale
            )));
        }
        if !self.error_std.is_finite() || self.error_std <= 0.0 {
            return Err(BackendError::invalid(format!(
                "error_std must be finite and positive, got {}",
                self.error_std
            )));
        }
        if self.hamming_weight == 0 || self.hamming_weight > degree {
            return Err(BackendError::invalid(format!(
                "hamming_weight must be in [1, {degree}], got {}",
                self.hamming_weight
            )));
        }
        Ok(())
    }
}
