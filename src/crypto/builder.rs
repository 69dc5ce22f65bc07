use super::{BackendResult, CkksParams, SecurityLevel};

/// Fluent construction of [`CkksParams`]; unset fields fall back to the
/// defaults, and `hamming_weight` to half the chosen degree.
#[derive(Debug, Clone, Default)]
pub struct CkksParamsBuilder {
    poly_modulus_degree: Option<usize>,
    coeff_mod_bit_sizes: Option<Vec<u32>>,
    global_scale: Option<f64>,
    security_level: Option<SecurityLevel>,
    error_std: Option<f64>,
    hamming_weight: Option<usize>,
}

impl CkksParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poly_modulus_degree(mut self, degree: usize) -> Self {
        self.poly_modulus_degree = Some(degree);
        self
    }

    pub fn coeff_mod_bit_sizes(mut self, bit_sizes: impl Into<Vec<u32>>) -> Self {
        self.coeff_mod_bit_sizes = Some(bit_sizes.into());
        self
    }

    pub fn global_scale(mut self, scale: f64) -> Self {
        self.global_scale = Some(scale);
        self
    }

    /// Sets the scale to `2^bits`.
    pub fn scale_bits(self, bits: u32) -> Self {
        self.global_scale(2f64.powi(bits as i32))
    }

    pub fn security_level(mut self, level: SecurityLevel) -> Self {
        self.security_level = Some(level);
        self
    }

    pub fn error_std(mut self, std_dev: f64) -> Self {
        self.error_std = Some(std_dev);
        self
    }

    pub fn hamming_weight(mut self, weight: usize) -> Self {
        self.hamming_weight = Some(weight);
        self
    }

    pub fn build(self) -> BackendResult<CkksParams> {
        let defaults = CkksParams::default();
        let degree = self
            .poly_modulus_degree
            .unwrap_or(defaults.poly_modulus_degree);
        let params = CkksParams {
            poly_modulus_degree: degree,
            coeff_mod_bit_sizes: self
                .coeff_mod_bit_sizes
                .unwrap_or(defaults.coeff_mod_bit_sizes),
            global_scale: self.global_scale.unwrap_or(defaults.global_scale),
            security_level: self.security_level.unwrap_or(defaults.security_level),
            error_std: self.error_std.unwrap_or(defaults.error_std),
            hamming_weight: self.hamming_weight.unwrap_or(degree / 2),
        };
        params.validate()?;
        Ok(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_yields_defaults() {
        let params = CkksParamsBuilder::new().build().unwrap();
        assert_eq!(params, CkksParams::default());
    }

    #[test]
    fn hamming_weight_follows_degree() {
        let params = CkksParams::builder()
            .poly_modulus_degree(4096)
            .coeff_mod_bit_sizes([40, 20, 40])
            .scale_bits(20)
            .build()
            .unwrap();
        assert_eq!(params.hamming_weight, 2048);
        assert_eq!(params.global_scale, (1u64 << 20) as f64);
    }

    #[test]
    fn build_validates() {
        let result = CkksParams::builder()
            .poly_modulus_degree(1024)
            .build();
        assert!(result.is_err());
    }
}
