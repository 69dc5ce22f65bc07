//! Maps up to `N/2` real values onto a polynomial in `Z[X]/(X^N + 1)`.
//!
//! Slot `j` holds the evaluation of the polynomial at `zeta^(5^j)` where
//! `zeta = e^(i*pi/N)`. Evaluating at every odd power of `zeta` is a size-N
//! DFT of the twisted coefficients `c_i * zeta^i`, so both directions are a
//! single rustfft pass plus the twist.
use super::{EncodingError, EncodingResult};
use crate::rings::{RnsBasis, RnsPoly};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};
use std::{f64::consts::PI, fmt, sync::Arc};

pub struct CkksEncoder {
    degree: usize,
    /// FFT bin holding slot `j`.
    slot_bins: Vec<usize>,
    /// FFT bin holding the conjugate of slot `j`.
    conjugate_bins: Vec<usize>,
    /// `zeta^i` for `i in 0..N`.
    twist: Vec<Complex64>,
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for CkksEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CkksEncoder")
            .field("degree", &self.degree)
            .field("slots", &self.slot_count())
            .finish()
    }
}

impl CkksEncoder {
    pub fn new(degree: usize) -> EncodingResult<Self> {
        if !degree.is_power_of_two() || degree < 4 {
            return Err(EncodingError::InvalidRingDegree { degree });
        }
        let two_n = 2 * degree;
        let slots = degree / 2;

        let mut slot_bins = Vec::with_capacity(slots);
        let mut conjugate_bins = Vec::with_capacity(slots);
        let mut galois = 1usize;
        for _ in 0..slots {
            slot_bins.push((galois - 1) / 2);
            conjugate_bins.push((two_n - galois - 1) / 2);
            galois = galois * 5 % two_n;
        }

        let twist = (0..degree)
            .map(|i| Complex64::from_polar(1.0, PI * i as f64 / degree as f64))
            .collect();

        let mut planner = FftPlanner::new();
        Ok(Self {
            degree,
            slot_bins,
            conjugate_bins,
            twist,
            forward: planner.plan_fft_forward(degree),
            inverse: planner.plan_fft_inverse(degree),
        })
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Number of real slots, `N/2`.
    pub fn slot_count(&self) -> usize {
        self.degree / 2
    }

    /// Encodes `values` scaled by `scale` into integer coefficients.
    ///
    /// Slots past `values.len()` are zero. Fails when a coefficient would
    /// reach `bound` in magnitude.
    pub fn encode_coefficients(
        &self,
        values: &[f64],
        scale: f64,
        bound: f64,
    ) -> EncodingResult<Vec<i64>> {
        if values.len() > self.slot_count() {
            return Err(EncodingError::InputTooLong {
                got: values.len(),
                max: self.slot_count(),
            });
        }
        if let Some(index) = values.iter().position(|v| !v.is_finite()) {
            return Err(EncodingError::NonFiniteInput { index });
        }

        let mut spectrum = vec![Complex64::new(0.0, 0.0); self.degree];
        for (j, &value) in values.iter().enumerate() {
            let scaled = Complex64::new(value * scale, 0.0);
            spectrum[self.slot_bins[j]] = scaled;
            spectrum[self.conjugate_bins[j]] = scaled.conj();
        }
        self.forward.process(&mut spectrum);

        let norm = (self.degree as f64).recip();
        spectrum
            .iter()
            .zip(&self.twist)
            .map(|(&bin, &zeta)| {
                let coeff = (bin * zeta.conj()).re * norm;
                if !(coeff.abs() < bound) {
                    return Err(EncodingError::CoefficientOutOfRange {
                        value: coeff,
                        bound,
                    });
                }
                Ok(coeff.round() as i64)
            })
            .collect()
    }

    /// Encodes `values` into a plaintext polynomial over `basis`.
    ///
    /// The coefficient bound is half the first modulus, which is the only
    /// prime left after the last rescale.
    pub fn encode(
        &self,
        values: &[f64],
        scale: f64,
        basis: &Arc<RnsBasis>,
    ) -> EncodingResult<RnsPoly> {
        let bound = basis.moduli()[0] as f64 / 2.0;
        let coeffs = self.encode_coefficients(values, scale, bound)?;
        Ok(RnsPoly::from_coeffs(&coeffs, Arc::clone(basis)))
    }

    /// Encodes `value` into every slot as the constant polynomial
    /// `round(value * scale)`.
    pub fn encode_constant(
        &self,
        value: f64,
        scale: f64,
        basis: &Arc<RnsBasis>,
    ) -> EncodingResult<RnsPoly> {
        if !value.is_finite() {
            return Err(EncodingError::NonFiniteInput { index: 0 });
        }
        let bound = basis.moduli()[0] as f64 / 2.0;
        let scaled = value * scale;
        if !(scaled.abs() < bound) {
            return Err(EncodingError::CoefficientOutOfRange {
                value: scaled,
                bound,
            });
        }
        let mut coeffs = vec![0i64; self.degree];
        coeffs[0] = scaled.round() as i64;
        Ok(RnsPoly::from_coeffs(&coeffs, Arc::clone(basis)))
    }

    /// Decodes centered integer coefficients back to `N/2` real slots.
    pub fn decode(&self, coeffs: &[i64], scale: f64) -> Vec<f64> {
        let mut values: Vec<Complex64> = coeffs
            .iter()
            .take(self.degree)
            .zip(&self.twist)
            .map(|(&c, &zeta)| zeta * c as f64)
            .collect();
        values.resize(self.degree, Complex64::new(0.0, 0.0));
        self.inverse.process(&mut values);

        self.slot_bins
            .iter()
            .map(|&bin| values[bin].re / scale)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    const SCALE: f64 = (1u64 << 30) as f64;

    fn negacyclic_product(a: &[i64], b: &[i64]) -> Vec<i64> {
        let n = a.len();
        let mut out = vec![0i128; n];
        for i in 0..n {
            for j in 0..n {
                let prod = a[i] as i128 * b[j] as i128;
                if i + j < n {
                    out[i + j] += prod;
                } else {
                    out[i + j - n] -= prod;
                }
            }
        }
        out.into_iter().map(|c| c as i64).collect()
    }

    #[test]
    fn encode_decode_roundtrip() {
        let encoder = CkksEncoder::new(16).unwrap();
        let input = [1.5, -2.25, 3.0, 0.0, 42.125, -7.75, 0.001, 9.0];
        let coeffs = encoder.encode_coefficients(&input, SCALE, f64::MAX).unwrap();
        let decoded = encoder.decode(&coeffs, SCALE);
        for (a, b) in input.iter().zip(&decoded) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-6);
        }
    }

    #[test]
    fn short_input_pads_with_zero_slots() {
        let encoder = CkksEncoder::new(32).unwrap();
        let coeffs = encoder.encode_coefficients(&[4.0, 5.0], SCALE, f64::MAX).unwrap();
        let decoded = encoder.decode(&coeffs, SCALE);
        assert_eq!(decoded.len(), 16);
        assert_abs_diff_eq!(decoded[0], 4.0, epsilon = 1e-6);
        assert_abs_diff_eq!(decoded[1], 5.0, epsilon = 1e-6);
        for &v in &decoded[2..] {
            assert_abs_diff_eq!(v, 0.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn ring_product_is_slotwise_product() {
        const SMALL: f64 = (1u64 << 24) as f64;
        let encoder = CkksEncoder::new(16).unwrap();
        let a = [1.0, 2.0, -3.0, 0.5, 0.0, 1.25, -1.0, 2.0];
        let b = [2.0, -1.0, 0.5, 4.0, 3.0, 2.0, 2.0, -0.5];
        let ca = encoder.encode_coefficients(&a, SMALL, f64::MAX).unwrap();
        let cb = encoder.encode_coefficients(&b, SMALL, f64::MAX).unwrap();
        let product = negacyclic_product(&ca, &cb);
        let decoded = encoder.decode(&product, SMALL * SMALL);
        for ((x, y), z) in a.iter().zip(&b).zip(&decoded) {
            assert_abs_diff_eq!(x * y, *z, epsilon = 1e-4);
        }
    }

    #[test]
    fn constant_fills_every_slot() {
        let encoder = CkksEncoder::new(16).unwrap();
        let basis = Arc::new(RnsBasis::new(16, vec![97, 193]).unwrap());
        let poly = encoder.encode_constant(3.0, 4.0, &basis).unwrap();
        let decoded = encoder.decode(&poly.centered_coeffs(0), 4.0);
        assert!(decoded.iter().all(|&v| (v - 3.0).abs() < 1e-9));
    }

    #[test]
    fn rejects_too_many_values() {
        let encoder = CkksEncoder::new(8).unwrap();
        assert_eq!(
            encoder.encode_coefficients(&[0.0; 5], SCALE, f64::MAX),
            Err(EncodingError::InputTooLong { got: 5, max: 4 })
        );
    }

    #[test]
    fn rejects_non_finite_and_oversized_values() {
        let encoder = CkksEncoder::new(8).unwrap();
        assert_eq!(
            encoder.encode_coefficients(&[1.0, f64::NAN], SCALE, f64::MAX),
            Err(EncodingError::NonFiniteInput { index: 1 })
        );
        assert!(matches!(
            encoder.encode_coefficients(&[1e6], SCALE, 1e9),
            Err(EncodingError::CoefficientOutOfRange { .. })
        ));
        let basis = Arc::new(RnsBasis::new(8, vec![97]).unwrap());
        assert!(matches!(
            encoder.encode_constant(100.0, 1.0, &basis),
            Err(EncodingError::CoefficientOutOfRange { .. })
        ));
    }

    #[test]
    fn rejects_bad_degree() {
        assert!(matches!(
            CkksEncoder::new(12),
            Err(EncodingError::InvalidRingDegree { degree: 12 })
        ));
    }
}
