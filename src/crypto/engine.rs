//! Ciphertext primitives: encryption, decryption and leveled arithmetic.
//!
//! Binary operations first bring both operands to the lower of their two
//! levels by dropping primes. Multiplications relinearize and then rescale
//! by the last live prime `q_l`, so a product of scales `s_a` and `s_b`
//! lands at `s_a * s_b / q_l`. Plaintext multiplicands are encoded at `q_l`
//! itself, which leaves the ciphertext scale unchanged.
//!
//! Sums need matching scales. Scales within [`SCALE_TOLERANCE`] of each
//! other are treated as equal; otherwise the operand with the larger scale
//! is moved onto the smaller one by a constant product, which costs a level.
//! Any result whose `c1` vanishes is refused as transparent.

use super::{
    BackendError, BackendResult, Ciphertext, PlainOperand,
    context::{PublicContext, SecretContext},
    keys::{sample_gaussian, sample_ternary},
};
use crate::{encoding::EncodingError, rings::RnsPoly};
use rand::Rng;
use std::{borrow::Cow, sync::Arc};

/// Largest relative scale difference two summands may have.
pub const SCALE_TOLERANCE: f64 = 1.0 / (1u64 << 20) as f64;

/// Smallest scale a ciphertext may be rescaled to.
pub const MIN_SCALE: f64 = (1u64 << 10) as f64;

impl PublicContext {
    /// Encrypts up to `N/2` values at the top level.
    pub fn encrypt<R: Rng>(&self, values: &[f64], rng: &mut R) -> BackendResult<Ciphertext> {
        if values.is_empty() {
            return Err(EncodingError::EmptyInput.into());
        }
        let scheme = &self.scheme;
        let basis = scheme.level_basis(scheme.top_level());
        let message = scheme.encoder().encode(values, scheme.scale(), basis)?;
        self.encrypt_poly(&message, values.len(), scheme.scale(), rng)
    }

    /// Fresh encryption of zero with `len` slots, tagged with `scale` so it
    /// can be added to a ciphertext at that scale.
    pub fn encrypt_zero<R: Rng>(
        &self,
        len: usize,
        scale: f64,
        rng: &mut R,
    ) -> BackendResult<Ciphertext> {
        let basis = self.scheme.level_basis(self.scheme.top_level());
        self.encrypt_poly(&RnsPoly::zero(Arc::clone(basis)), len, scale, rng)
    }

    fn encrypt_poly<R: Rng>(
        &self,
        message: &RnsPoly,
        len: usize,
        scale: f64,
        rng: &mut R,
    ) -> BackendResult<Ciphertext> {
        let scheme = &self.scheme;
        let params = scheme.params();
        let basis = scheme.level_basis(scheme.top_level());
        let key = &self.public_key.sample;

        let u = sample_ternary(basis, params.hamming_weight, rng).into_ntt_domain();
        let e0 = sample_gaussian(basis, params.error_std, rng);
        let e1 = sample_gaussian(basis, params.error_std, rng);

        // c0 = b*u + e0 + m
        let mut c0 = key.b.clone();
        c0 *= &u;
        c0.to_coeff_domain();
        c0 += &e0;
        c0 += message;

        // c1 = a*u + e1
        let mut c1 = key.a.clone();
        c1 *= &u;
        c1.to_coeff_domain();
        c1 += &e1;

        Ok(Ciphertext {
            c0,
            c1,
            level: scheme.top_level(),
            scale,
            len,
            key_id: self.key_id,
        })
    }

    pub fn add(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> BackendResult<Ciphertext> {
        self.combine(lhs, rhs, |acc, other| *acc += other)
    }

    pub fn sub(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> BackendResult<Ciphertext> {
        self.combine(lhs, rhs, |acc, other| *acc -= other)
    }

    /// `lhs + plain`.
    pub fn add_plain(
        &self,
        lhs: &Ciphertext,
        plain: PlainOperand<'_>,
    ) -> BackendResult<Ciphertext> {
        self.check_key(lhs)?;
        let encoded = self.encode_plain(plain, lhs)?;
        let mut out = lhs.clone();
        out.c0 += &encoded;
        Ok(out)
    }

    /// `lhs - plain`.
    pub fn sub_plain(
        &self,
        lhs: &Ciphertext,
        plain: PlainOperand<'_>,
    ) -> BackendResult<Ciphertext> {
        self.check_key(lhs)?;
        let encoded = self.encode_plain(plain, lhs)?;
        let mut out = lhs.clone();
        out.c0 -= &encoded;
        Ok(out)
    }

    /// `plain - rhs`.
    pub fn plain_sub(
        &self,
        plain: PlainOperand<'_>,
        rhs: &Ciphertext,
    ) -> BackendResult<Ciphertext> {
        self.check_key(rhs)?;
        let mut c0 = self.encode_plain(plain, rhs)?;
        c0 -= &rhs.c0;
        Ok(Ciphertext {
            c0,
            c1: -rhs.c1.clone(),
            ..rhs.clone()
        })
    }

    /// Ciphertext product, relinearized and rescaled one level down.
    pub fn multiply(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> BackendResult<Ciphertext> {
        self.check_pair(lhs, rhs)?;
        let level = lhs.level.min(rhs.level);
        if level == 0 {
            return Err(BackendError::LevelExhausted { level });
        }
        let lhs = self.at_level(lhs, level)?;
        let rhs = self.at_level(rhs, level)?;

        let mut d0 = lhs.c0.clone();
        d0 *= &rhs.c0;

        let mut d1 = lhs.c0.clone();
        d1 *= &rhs.c1;
        let mut cross = lhs.c1.clone();
        cross *= &rhs.c0;
        d1 += &cross;

        let mut d2 = lhs.c1.clone();
        d2 *= &rhs.c1;
        d2.to_coeff_domain();

        let (r0, r1) = self.relinearize(&d2, level)?;
        d0 += &r0;
        d1 += &r1;

        self.rescale(d0, d1, &lhs, lhs.scale * rhs.scale)
    }

    /// Product with a plaintext, rescaled one level down.
    pub fn multiply_plain(
        &self,
        lhs: &Ciphertext,
        plain: PlainOperand<'_>,
    ) -> BackendResult<Ciphertext> {
        self.check_key(lhs)?;
        if lhs.level == 0 {
            return Err(BackendError::LevelExhausted { level: 0 });
        }
        let (encoded, plain_scale) = self.encode_multiplicand(plain, lhs)?;
        let encoded = encoded.into_ntt_domain();

        let mut c0 = lhs.c0.clone();
        c0 *= &encoded;
        let mut c1 = lhs.c1.clone();
        c1 *= &encoded;

        self.rescale(c0, c1, lhs, lhs.scale * plain_scale)
    }

    /// Folds `d2 * s^2` into the linear part through the relinearization
    /// keys. Returns `(r0, r1)` over `q_0 … q_level` with
    /// `r0 + r1*s ≈ d2*s^2`.
    fn relinearize(&self, d2: &RnsPoly, level: usize) -> BackendResult<(RnsPoly, RnsPoly)> {
        let relin_key = self
            .relin_key
            .as_ref()
            .ok_or(BackendError::MissingRelinearizationKey)?;
        let switch = self.scheme.switch_basis(level);
        let target = self.scheme.level_basis(level);

        let mut acc0 = RnsPoly::zero(Arc::clone(switch)).into_ntt_domain();
        let mut acc1 = acc0.clone();
        for (j, sample) in relin_key.samples.iter().take(level + 1).enumerate() {
            let digit = RnsPoly::from_coeffs(&d2.centered_coeffs(j), Arc::clone(switch))
                .into_ntt_domain();
            let sample = sample.restrict(switch)?;

            let mut term = sample.b;
            term *= &digit;
            acc0 += &term;

            let mut term = sample.a;
            term *= &digit;
            acc1 += &term;
        }

        Ok((
            acc0.div_round_by_last(target)?,
            acc1.div_round_by_last(target)?,
        ))
    }

    /// Divides `(c0, c1)`, a product at scale `scale` over the basis of
    /// `like.level`, by the last live prime.
    fn rescale(
        &self,
        c0: RnsPoly,
        c1: RnsPoly,
        like: &Ciphertext,
        scale: f64,
    ) -> BackendResult<Ciphertext> {
        let level = like.level;
        let scale = scale / self.last_prime(level);
        let ceiling = self.last_prime(0) / 2.0;
        if !(MIN_SCALE..ceiling).contains(&scale) {
            return Err(BackendError::ScaleOutOfRange { scale });
        }
        let target = self.scheme.level_basis(level - 1);
        let out = Ciphertext {
            c0: c0.div_round_by_last(target)?,
            c1: c1.div_round_by_last(target)?,
            level: level - 1,
            scale,
            len: like.len,
            key_id: like.key_id,
        };
        transparency_checked(out)
    }

    fn combine(
        &self,
        lhs: &Ciphertext,
        rhs: &Ciphertext,
        op: impl Fn(&mut RnsPoly, &RnsPoly),
    ) -> BackendResult<Ciphertext> {
        self.check_pair(lhs, rhs)?;
        let (lhs, rhs) = self.aligned(lhs, rhs)?;
        let mut out = lhs.into_owned();
        op(&mut out.c0, &rhs.c0);
        op(&mut out.c1, &rhs.c1);
        transparency_checked(out)
    }

    /// Both operands at a common level and, within [`SCALE_TOLERANCE`], a
    /// common scale.
    fn aligned<'a>(
        &self,
        lhs: &'a Ciphertext,
        rhs: &'a Ciphertext,
    ) -> BackendResult<(Cow<'a, Ciphertext>, Cow<'a, Ciphertext>)> {
        let level = lhs.level.min(rhs.level);
        let lhs = self.at_level(lhs, level)?;
        let rhs = self.at_level(rhs, level)?;
        if scales_match(lhs.scale, rhs.scale) {
            return Ok((lhs, rhs));
        }

        let lhs_is_higher = lhs.scale > rhs.scale;
        let (high, low) = if lhs_is_higher { (&lhs, &rhs) } else { (&rhs, &lhs) };
        let high = self.move_to_scale(high, low.scale).map_err(|err| match err {
            BackendError::ScaleOutOfRange { .. } | BackendError::LevelExhausted { .. } => {
                BackendError::ScaleMismatch {
                    lhs: lhs.scale,
                    rhs: rhs.scale,
                }
            }
            other => other,
        })?;
        let low = self.at_level(low, high.level)?.into_owned();
        Ok(if lhs_is_higher {
            (Cow::Owned(high), Cow::Owned(low))
        } else {
            (Cow::Owned(low), Cow::Owned(high))
        })
    }

    /// `ct` times the integer constant that, after rescaling, brings its
    /// scale to within [`SCALE_TOLERANCE`] of `target`. Needs `target` to be
    /// below `ct.scale`.
    fn move_to_scale(&self, ct: &Ciphertext, target: f64) -> BackendResult<Ciphertext> {
        if ct.level == 0 {
            return Err(BackendError::LevelExhausted { level: 0 });
        }
        let factor = (target * self.last_prime(ct.level) / ct.scale).round();
        if factor * SCALE_TOLERANCE < 1.0 {
            return Err(BackendError::ScaleOutOfRange { scale: target });
        }
        let mut coeffs = vec![0i64; self.scheme.degree()];
        coeffs[0] = factor as i64;
        let constant =
            RnsPoly::from_coeffs(&coeffs, Arc::clone(self.scheme.level_basis(ct.level)))
                .into_ntt_domain();

        let mut c0 = ct.c0.clone();
        c0 *= &constant;
        let mut c1 = ct.c1.clone();
        c1 *= &constant;
        self.rescale(c0, c1, ct, ct.scale * factor)
    }

    /// Addend encoded at the ciphertext's scale.
    fn encode_plain(&self, plain: PlainOperand<'_>, ct: &Ciphertext) -> BackendResult<RnsPoly> {
        self.encode_at(plain, ct, ct.scale)
    }

    /// Multiplicand encoded at `q_level`, so the rescaled product keeps the
    /// ciphertext's scale. Falls back to the global scale when the values
    /// are too large for that. Returns the scale used.
    fn encode_multiplicand(
        &self,
        plain: PlainOperand<'_>,
        ct: &Ciphertext,
    ) -> BackendResult<(RnsPoly, f64)> {
        let prime = self.last_prime(ct.level);
        let scale = match self.encode_at(plain, ct, prime) {
            Err(BackendError::Encoding {
                source: EncodingError::CoefficientOutOfRange { .. },
            }) => self.scheme.scale(),
            encoded => {
                check_underflow(plain, prime)?;
                return Ok((encoded?, prime));
            }
        };
        check_underflow(plain, scale)?;
        Ok((self.encode_at(plain, ct, scale)?, scale))
    }

    fn encode_at(
        &self,
        plain: PlainOperand<'_>,
        ct: &Ciphertext,
        scale: f64,
    ) -> BackendResult<RnsPoly> {
        let scheme = &self.scheme;
        let basis = scheme.level_basis(ct.level);
        let encoded = match plain {
            PlainOperand::Scalar(value) => {
                scheme.encoder().encode_constant(value, scale, basis)?
            }
            PlainOperand::Values(values) => {
                if values.len() != ct.len {
                    return Err(BackendError::LengthMismatch {
                        expected: ct.len,
                        actual: values.len(),
                    });
                }
                scheme.encoder().encode(values, scale, basis)?
            }
        };
        Ok(encoded)
    }

    /// `q_level` as a float.
    fn last_prime(&self, level: usize) -> f64 {
        self.scheme.level_basis(level).moduli()[level] as f64
    }

    /// `ct` with primes above `level` dropped.
    fn at_level<'a>(
        &self,
        ct: &'a Ciphertext,
        level: usize,
    ) -> BackendResult<Cow<'a, Ciphertext>> {
        if ct.level == level {
            return Ok(Cow::Borrowed(ct));
        }
        let drop = ct.level - level;
        Ok(Cow::Owned(Ciphertext {
            c0: ct.c0.mod_drop_last(drop)?,
            c1: ct.c1.mod_drop_last(drop)?,
            level,
            ..ct.clone()
        }))
    }

    fn check_key(&self, ct: &Ciphertext) -> BackendResult<()> {
        if ct.key_id != self.key_id {
            return Err(BackendError::KeyMismatch {
                expected: self.key_id,
                actual: ct.key_id,
            });
        }
        Ok(())
    }

    fn check_pair(&self, lhs: &Ciphertext, rhs: &Ciphertext) -> BackendResult<()> {
        self.check_key(lhs)?;
        self.check_key(rhs)?;
        if lhs.len != rhs.len {
            return Err(BackendError::LengthMismatch {
                expected: lhs.len,
                actual: rhs.len,
            });
        }
        Ok(())
    }
}

impl SecretContext {
    /// Decrypts to `ct.len()` values.
    ///
    /// Only the `q_0` residue is needed: after the last rescale that is all a
    /// ciphertext has left, and the message always fits below `q_0 / 2`.
    pub fn decrypt(&self, ct: &Ciphertext) -> BackendResult<Vec<f64>> {
        if ct.key_id != self.key_id {
            return Err(BackendError::KeyMismatch {
                expected: self.key_id,
                actual: ct.key_id,
            });
        }
        let scheme = &self.scheme;
        let base = scheme.level_basis(0);
        let secret = self.secret_key.over(base)?;

        let mut message = ct.c1.restrict(base)?;
        message *= &secret;
        message += &ct.c0.restrict(base)?;

        let coeffs = message.centered_coeffs(0);
        let mut values = scheme.encoder().decode(&coeffs, ct.scale);
        values.truncate(ct.len);
        Ok(values)
    }
}

fn scales_match(a: f64, b: f64) -> bool {
    (a / b - 1.0).abs() <= SCALE_TOLERANCE
}

/// A non-zero multiplicand that rounds to zero would silently zero the
/// product.
fn check_underflow(plain: PlainOperand<'_>, scale: f64) -> BackendResult<()> {
    let values = match plain {
        PlainOperand::Scalar(ref value) => std::slice::from_ref(value),
        PlainOperand::Values(values) => values,
    };
    match values.iter().find(|&&v| v != 0.0 && (v * scale).abs() < 0.5) {
        Some(&value) => Err(EncodingError::Underflow { value, scale }.into()),
        None => Ok(()),
    }
}

fn transparency_checked(ct: Ciphertext) -> BackendResult<Ciphertext> {
    if ct.is_transparent() {
        return Err(BackendError::TransparentCiphertext);
    }
    Ok(ct)
}
