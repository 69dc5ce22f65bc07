use super::{
    basis::{NttTable, RnsBasis},
    errors::{RnsError, RnsResult},
};
use crate::math::{add_mod, center, mod_inverse, mul_mod, reduce_signed, sub_mod};
use std::{
    borrow::Cow,
    ops::{AddAssign, MulAssign, Neg, SubAssign},
    sync::Arc,
};

/// A polynomial in `Z_{q_0} x … x Z_{q_{L-1}}[X] / (X^N + 1)`.
///
/// Stores one coefficient vector per RNS channel. The `in_ntt_domain` flag
/// tracks whether the vectors hold coefficient-domain or NTT-domain values.
///
/// # Invariants
/// - `channels.len() == basis.channel_count()`
/// - every channel has `basis.degree()` entries
/// - every `channels[i][j] < basis.moduli()[i]`
#[derive(Clone, Debug)]
pub struct RnsPoly {
    channels: Vec<Vec<u64>>,
    basis: Arc<RnsBasis>,
    in_ntt_domain: bool,
}

// ─── Constructors ─────────────────────────────────────────────────────────────

impl RnsPoly {
    /// Creates the zero polynomial in coefficient domain.
    pub fn zero(basis: Arc<RnsBasis>) -> Self {
        let channels = vec![vec![0u64; basis.degree()]; basis.channel_count()];
        Self {
            channels,
            basis,
            in_ntt_domain: false,
        }
    }

    /// Creates a polynomial from signed integer coefficients.
    ///
    /// Each coefficient is reduced into `[0, q_i)` per channel. Accepts slices
    /// of length ≥ N; only the first N elements are used.
    pub fn from_coeffs(coeffs: &[i64], basis: Arc<RnsBasis>) -> Self {
        let degree = basis.degree();
        assert!(
            coeffs.len() >= degree,
            "from_coeffs: need at least {degree} coefficients, got {}",
            coeffs.len()
        );
        let channels = basis
            .moduli()
            .iter()
            .map(|&q| {
                coeffs
                    .iter()
                    .take(degree)
                    .map(|&c| reduce_signed(c, q))
                    .collect()
            })
            .collect();
        Self {
            channels,
            basis,
            in_ntt_domain: false,
        }
    }

    /// Creates a polynomial from pre-built channel vectors.
    ///
    /// Returns an error if the channel count or length doesn't match the
    /// basis, or if any coefficient is not reduced.
    pub fn from_channels(
        channels: Vec<Vec<u64>>,
        basis: Arc<RnsBasis>,
        in_ntt_domain: bool,
    ) -> RnsResult<Self> {
        let expected = basis.channel_count();
        let actual = channels.len();
        if actual != expected {
            return Err(RnsError::ChannelCountMismatch { expected, actual });
        }
        for (channel, &q) in channels.iter().zip(basis.moduli()) {
            if channel.len() != basis.degree() {
                return Err(RnsError::DegreeMismatch {
                    expected: basis.degree(),
                    actual: channel.len(),
                });
            }
            if let Some(&c) = channel.iter().find(|&&c| c >= q) {
                return Err(RnsError::NonReducedCoefficient {
                    coefficient: c,
                    modulus: q,
                });
            }
        }
        Ok(Self {
            channels,
            basis,
            in_ntt_domain,
        })
    }
}

// ─── Accessors & domain conversion ───────────────────────────────────────────

impl RnsPoly {
    pub fn channels(&self) -> &[Vec<u64>] {
        &self.channels
    }

    pub fn channel(&self, index: usize) -> &[u64] {
        &self.channels[index]
    }

    pub fn basis(&self) -> &Arc<RnsBasis> {
        &self.basis
    }

    pub fn degree(&self) -> usize {
        self.basis.degree()
    }

    pub fn is_ntt_domain(&self) -> bool {
        self.in_ntt_domain
    }

    /// `true` when every residue is zero. Domain independent.
    pub fn is_zero(&self) -> bool {
        self.channels.iter().all(|ch| ch.iter().all(|&c| c == 0))
    }

    /// Converts to NTT domain in-place (no-op if already there).
    pub fn to_ntt_domain(&mut self) {
        if self.in_ntt_domain {
            return;
        }
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            forward_ntt(channel, self.basis.ntt_table(ch));
        }
        self.in_ntt_domain = true;
    }

    /// Converts to coefficient domain in-place (no-op if already there).
    pub fn to_coeff_domain(&mut self) {
        if !self.in_ntt_domain {
            return;
        }
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            inverse_ntt(channel, self.basis.ntt_table(ch));
        }
        self.in_ntt_domain = false;
    }

    pub fn into_ntt_domain(mut self) -> Self {
        self.to_ntt_domain();
        self
    }

    pub fn into_coeff_domain(mut self) -> Self {
        self.to_coeff_domain();
        self
    }

    /// Centered coefficients of one channel, in `(-q_i/2, q_i/2]`.
    pub fn centered_coeffs(&self, channel: usize) -> Vec<i64> {
        let q = self.basis.moduli()[channel];
        let coeff_form = self.in_domain(false);
        coeff_form.channels[channel]
            .iter()
            .map(|&c| center(c, q))
            .collect()
    }

    /// Returns a new polynomial with the last `drop_count` RNS channels removed.
    pub fn mod_drop_last(&self, drop_count: usize) -> RnsResult<Self> {
        let reduced_basis = Arc::new(self.basis.drop_last(drop_count)?);
        let keep = reduced_basis.channel_count();
        Ok(Self {
            channels: self.channels[..keep].to_vec(),
            basis: reduced_basis,
            in_ntt_domain: self.in_ntt_domain,
        })
    }

    /// Keeps only the channels whose moduli appear in `target`, reordered to
    /// match it. Valid in both domains since channels are independent.
    pub fn restrict(&self, target: &Arc<RnsBasis>) -> RnsResult<Self> {
        let channels = target
            .moduli()
            .iter()
            .map(|&q| {
                self.basis
                    .position(q)
                    .map(|ch| self.channels[ch].clone())
                    .ok_or(RnsError::MissingModulus { modulus: q })
            })
            .collect::<RnsResult<Vec<_>>>()?;
        Ok(Self {
            channels,
            basis: Arc::clone(target),
            in_ntt_domain: self.in_ntt_domain,
        })
    }

    /// Divides by the last modulus `q_last` with rounding and drops that
    /// channel: `round(x / q_last) mod (q_0 … q_{last-1})`.
    ///
    /// This is both the CKKS rescale and the special-prime mod-down of key
    /// switching. `target` must be this basis without its last modulus. The
    /// result is in coefficient domain.
    pub fn div_round_by_last(&self, target: &Arc<RnsBasis>) -> RnsResult<Self> {
        let last = self.basis.channel_count() - 1;
        if target.channel_count() != last {
            return Err(RnsError::ChannelCountMismatch {
                expected: last,
                actual: target.channel_count(),
            });
        }
        if let Some((&q, _)) = target
            .moduli()
            .iter()
            .zip(self.basis.moduli())
            .find(|(t, s)| t != s)
        {
            return Err(RnsError::MissingModulus { modulus: q });
        }

        let source = self.in_domain(false);
        let q_last = self.basis.moduli()[last];
        let tail: Vec<i64> = source.channels[last]
            .iter()
            .map(|&c| center(c, q_last))
            .collect();

        let mut channels = Vec::with_capacity(last);
        for (ch, &q) in target.moduli().iter().enumerate() {
            let inv = mod_inverse(q_last % q, q).ok_or(RnsError::MissingModulus {
                modulus: q_last,
            })?;
            let channel = source.channels[ch]
                .iter()
                .zip(&tail)
                .map(|(&c, &t)| mul_mod(sub_mod(c, reduce_signed(t, q), q), inv, q))
                .collect();
            channels.push(channel);
        }
        Ok(Self {
            channels,
            basis: Arc::clone(target),
            in_ntt_domain: false,
        })
    }

    /// Multiplies a single channel by a constant. Works in both domains.
    pub fn scale_channel(&mut self, channel: usize, factor: u64) {
        let q = self.basis.moduli()[channel];
        let factor = factor % q;
        for c in self.channels[channel].iter_mut() {
            *c = mul_mod(*c, factor, q);
        }
    }

    /// Borrow of `self` in the requested domain, converting a copy if needed.
    fn in_domain(&self, ntt: bool) -> Cow<'_, RnsPoly> {
        if self.in_ntt_domain == ntt {
            Cow::Borrowed(self)
        } else {
            let mut copy = self.clone();
            if ntt {
                copy.to_ntt_domain();
            } else {
                copy.to_coeff_domain();
            }
            Cow::Owned(copy)
        }
    }
}

// ─── Arithmetic ───────────────────────────────────────────────────────────────

impl AddAssign<&RnsPoly> for RnsPoly {
    /// Coefficient-wise addition modulo each `q_i`. `rhs` is brought into the
    /// domain of `self` first.
    fn add_assign(&mut self, rhs: &RnsPoly) {
        debug_assert_eq!(
            self.basis.moduli(),
            rhs.basis.moduli(),
            "add_assign: basis mismatch"
        );
        let rhs = rhs.in_domain(self.in_ntt_domain);
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            let q = self.basis.moduli()[ch];
            for (a, &b) in channel.iter_mut().zip(rhs.channels[ch].iter()) {
                *a = add_mod(*a, b, q);
            }
        }
    }
}

impl SubAssign<&RnsPoly> for RnsPoly {
    fn sub_assign(&mut self, rhs: &RnsPoly) {
        debug_assert_eq!(
            self.basis.moduli(),
            rhs.basis.moduli(),
            "sub_assign: basis mismatch"
        );
        let rhs = rhs.in_domain(self.in_ntt_domain);
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            let q = self.basis.moduli()[ch];
            for (a, &b) in channel.iter_mut().zip(rhs.channels[ch].iter()) {
                *a = sub_mod(*a, b, q);
            }
        }
    }
}

impl MulAssign<&RnsPoly> for RnsPoly {
    /// Polynomial multiplication in `Z[X]/(X^N + 1)` through pointwise NTT
    /// products. Leaves `self` in NTT domain.
    fn mul_assign(&mut self, rhs: &RnsPoly) {
        debug_assert_eq!(
            self.basis.moduli(),
            rhs.basis.moduli(),
            "mul_assign: basis mismatch"
        );
        self.to_ntt_domain();
        let rhs = rhs.in_domain(true);
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            let q = self.basis.moduli()[ch];
            for (a, &b) in channel.iter_mut().zip(rhs.channels[ch].iter()) {
                *a = mul_mod(*a, b, q);
            }
        }
    }
}

impl Neg for RnsPoly {
    type Output = Self;

    /// Coefficient-wise negation modulo each `q_i`. Works in both domains.
    fn neg(mut self) -> Self {
        for (ch, channel) in self.channels.iter_mut().enumerate() {
            let q = self.basis.moduli()[ch];
            for c in channel.iter_mut() {
                if *c != 0 {
                    *c = q - *c;
                }
            }
        }
        self
    }
}

// ─── NTT kernels (private) ────────────────────────────────────────────────────

// Cooley-Tukey with merged psi twist; output in bit-reversed order.
fn forward_ntt(values: &mut [u64], table: &NttTable) {
    let n = values.len();
    let q = table.modulus;
    let mut t = n;
    let mut m = 1;
    while m < n {
        t /= 2;
        for i in 0..m {
            let j1 = 2 * i * t;
            let s = table.psi_powers[m + i];
            for j in j1..j1 + t {
                let u = values[j];
                let v = mul_mod(values[j + t], s, q);
                values[j] = add_mod(u, v, q);
                values[j + t] = sub_mod(u, v, q);
            }
        }
        m *= 2;
    }
}

// Gentleman-Sande with merged inverse twist; input in bit-reversed order.
fn inverse_ntt(values: &mut [u64], table: &NttTable) {
    let n = values.len();
    let q = table.modulus;
    let mut t = 1;
    let mut m = n;
    while m > 1 {
        let h = m / 2;
        let mut j1 = 0;
        for i in 0..h {
            let s = table.inv_psi_powers[h + i];
            for j in j1..j1 + t {
                let u = values[j];
                let v = values[j + t];
                values[j] = add_mod(u, v, q);
                values[j + t] = mul_mod(sub_mod(u, v, q), s, q);
            }
            j1 += 2 * t;
        }
        t *= 2;
        m = h;
    }
    for v in values.iter_mut() {
        *v = mul_mod(*v, table.n_inv, q);
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
