//! Key material over the RNS bases of a [`SchemeContext`].
//!
//! All polynomials are stored in NTT domain.

use super::{BackendResult, context::SchemeContext};
use crate::{
    math::{gaussian_coefficients, ternary_coefficients, uniform_coefficients},
    rings::{RnsBasis, RnsPoly},
};
use rand::Rng;
use std::{fmt, sync::Arc};

/// Ternary secret `s` over the key basis (data primes plus special prime).
#[derive(Clone)]
pub struct SecretKey {
    pub(crate) poly: RnsPoly,
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

impl SecretKey {
    pub(crate) fn generate<R: Rng>(scheme: &SchemeContext, rng: &mut R) -> Self {
        let params = scheme.params();
        let coeffs = ternary_coefficients(scheme.degree(), params.hamming_weight, rng);
        let poly = RnsPoly::from_coeffs(&coeffs, Arc::clone(scheme.key_basis()));
        Self {
            poly: poly.into_ntt_domain(),
        }
    }

    /// The secret restricted to `basis`.
    pub(crate) fn over(&self, basis: &Arc<RnsBasis>) -> BackendResult<RnsPoly> {
        Ok(self.poly.restrict(basis)?)
    }
}

/// An RLWE sample `(b, a)` with `b = -a*s + e + offset`.
#[derive(Debug, Clone)]
pub struct RlweSample {
    pub(crate) b: RnsPoly,
    pub(crate) a: RnsPoly,
}

impl RlweSample {
    fn generate<R: Rng>(
        basis: &Arc<RnsBasis>,
        secret: &RnsPoly,
        offset: Option<&RnsPoly>,
        error_std: f64,
        rng: &mut R,
    ) -> BackendResult<Self> {
        let a = sample_uniform(basis, rng)?.into_ntt_domain();
        let e = sample_gaussian(basis, error_std, rng);

        let mut a_s = a.clone();
        a_s *= secret;
        let mut b = -a_s;
        b += &e;
        if let Some(offset) = offset {
            b += offset;
        }
        Ok(Self { b, a })
    }

    pub(crate) fn restrict(&self, basis: &Arc<RnsBasis>) -> BackendResult<Self> {
        Ok(Self {
            b: self.b.restrict(basis)?,
            a: self.a.restrict(basis)?,
        })
    }
}

/// Public encryption key over the data primes.
#[derive(Debug, Clone)]
pub struct EncryptionKey {
    pub(crate) sample: RlweSample,
}

impl EncryptionKey {
    pub(crate) fn generate<R: Rng>(
        scheme: &SchemeContext,
        secret_key: &SecretKey,
        rng: &mut R,
    ) -> BackendResult<Self> {
        let basis = scheme.level_basis(scheme.top_level());
        let secret = secret_key.over(basis)?;
        let sample =
            RlweSample::generate(basis, &secret, None, scheme.params().error_std, rng)?;
        Ok(Self { sample })
    }
}

/// Hybrid key-switching key from `s^2` to `s`.
///
/// Sample `j` lives over the key basis and encrypts `P * s^2` on channel `q_j`
/// only, where `P` is the special prime. Summing `[d]_{q_j} * sample_j` over
/// the live channels yields an encryption of `P * d * s^2`, which a division
/// by `P` brings back to `d * s^2`.
#[derive(Debug, Clone)]
pub struct RelinearizationKey {
    pub(crate) samples: Vec<RlweSample>,
}

impl RelinearizationKey {
    pub(crate) fn generate<R: Rng>(
        scheme: &SchemeContext,
        secret_key: &SecretKey,
        rng: &mut R,
    ) -> BackendResult<Self> {
        let basis = scheme.key_basis();
        let secret = &secret_key.poly;
        let mut s_squared = secret.clone();
        s_squared *= secret;

        let special = basis.moduli()[basis.channel_count() - 1];
        let data_count = scheme.params().data_prime_count();
        let samples = (0..data_count)
            .map(|j| {
                let mut gadget = s_squared.clone();
                for (ch, &q) in basis.moduli().iter().enumerate() {
                    let factor = if ch == j { special % q } else { 0 };
                    gadget.scale_channel(ch, factor);
                }
                RlweSample::generate(
                    basis,
                    secret,
                    Some(&gadget),
                    scheme.params().error_std,
                    rng,
                )
            })
            .collect::<BackendResult<Vec<_>>>()?;
        Ok(Self { samples })
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub(crate) fn sample_uniform<R: Rng>(
    basis: &Arc<RnsBasis>,
    rng: &mut R,
) -> BackendResult<RnsPoly> {
    let channels = basis
        .moduli()
        .iter()
        .map(|&q| uniform_coefficients(basis.degree(), q, rng))
        .collect();
    Ok(RnsPoly::from_channels(channels, Arc::clone(basis), false)?)
}

pub(crate) fn sample_gaussian<R: Rng>(
    basis: &Arc<RnsBasis>,
    std_dev: f64,
    rng: &mut R,
) -> RnsPoly {
    let coeffs = gaussian_coefficients(basis.degree(), std_dev, rng);
    RnsPoly::from_coeffs(&coeffs, Arc::clone(basis))
}

pub(crate) fn sample_ternary<R: Rng>(
    basis: &Arc<RnsBasis>,
    hamming_weight: usize,
    rng: &mut R,
) -> RnsPoly {
    let coeffs = ternary_coefficients(basis.degree(), hamming_weight, rng);
    RnsPoly::from_coeffs(&coeffs, Arc::clone(basis))
}
