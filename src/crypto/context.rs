//! Scheme contexts.
//!
//! [`SchemeContext`] is the key-free part shared by every context built from
//! the same parameters. Key material lives in one of three context types:
//! [`Context`] right after generation, then a [`SecretContext`] (decrypt
//! side) and a [`PublicContext`] (encrypt and evaluate side). The public type
//! has no field that could hold a secret key.

use super::{
    BackendError, BackendResult, CkksParams,
    keys::{EncryptionKey, RelinearizationKey, SecretKey},
};
use crate::{encoding::CkksEncoder, math::generate_modulus_chain, rings::RnsBasis};
use rand::Rng;
use std::{fmt, sync::Arc};
use tracing::{debug, instrument};

/// Parameters plus everything derived from them: the prime chain, the RNS
/// bases used at each level and the slot encoder.
pub struct SchemeContext {
    params: CkksParams,
    key_basis: Arc<RnsBasis>,
    level_bases: Vec<Arc<RnsBasis>>,
    switch_bases: Vec<Arc<RnsBasis>>,
    encoder: CkksEncoder,
}

impl fmt::Debug for SchemeContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemeContext")
            .field("params", &self.params)
            .field("moduli", &self.key_basis.moduli())
            .finish()
    }
}

impl SchemeContext {
    /// Validates `params` and derives the prime chain. The primes depend only
    /// on the parameters, so both ends of a wire rebuild the same chain.
    pub fn new(params: CkksParams) -> BackendResult<Arc<Self>> {
        params.validate()?;
        let degree = params.poly_modulus_degree;
        let chain = generate_modulus_chain(&params.coeff_mod_bit_sizes, degree).ok_or_else(
            || {
                BackendError::invalid(format!(
                    "not enough NTT-friendly primes for bit sizes {:?} at degree {degree}",
                    params.coeff_mod_bit_sizes
                ))
            },
        )?;
        let key_basis = RnsBasis::new(degree, chain)?;

        let data_count = params.data_prime_count();
        let level_bases = (0..data_count)
            .map(|level| {
                let channels: Vec<usize> = (0..=level).collect();
                Arc::new(key_basis.select(&channels))
            })
            .collect();
        let switch_bases = (0..data_count)
            .map(|level| {
                let channels: Vec<usize> = (0..=level).chain([data_count]).collect();
                Arc::new(key_basis.select(&channels))
            })
            .collect();
        let encoder = CkksEncoder::new(degree)?;

        debug!(moduli = ?key_basis.moduli(), "built modulus chain");
        Ok(Arc::new(Self {
            params,
            key_basis: Arc::new(key_basis),
            level_bases,
            switch_bases,
            encoder,
        }))
    }

    pub fn params(&self) -> &CkksParams {
        &self.params
    }

    pub fn degree(&self) -> usize {
        self.params.poly_modulus_degree
    }

    pub fn scale(&self) -> f64 {
        self.params.global_scale
    }

    pub fn slot_count(&self) -> usize {
        self.encoder.slot_count()
    }

    /// Level of a fresh ciphertext.
    pub fn top_level(&self) -> usize {
        self.level_bases.len() - 1
    }

    /// Data primes followed by the special prime.
    pub fn key_basis(&self) -> &Arc<RnsBasis> {
        &self.key_basis
    }

    /// `q_0 … q_level`.
    pub fn level_basis(&self, level: usize) -> &Arc<RnsBasis> {
        &self.level_bases[level]
    }

    /// `q_0 … q_level` followed by the special prime.
    pub fn switch_basis(&self, level: usize) -> &Arc<RnsBasis> {
        &self.switch_bases[level]
    }

    pub fn encoder(&self) -> &CkksEncoder {
        &self.encoder
    }
}

/// A freshly generated context holding every kind of key material.
///
/// Split it with [`Context::to_secret`] and [`Context::make_public`].
pub struct Context {
    scheme: Arc<SchemeContext>,
    key_id: u64,
    secret_key: Arc<SecretKey>,
    public_key: Arc<EncryptionKey>,
    relin_key: Arc<RelinearizationKey>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("scheme", &self.scheme)
            .field("key_id", &format_args!("{:#018x}", self.key_id))
            .finish_non_exhaustive()
    }
}

impl Context {
    /// Builds the scheme and samples a secret key, a public key and
    /// relinearization keys.
    #[instrument(skip_all, fields(degree = params.poly_modulus_degree))]
    pub fn generate<R: Rng>(params: CkksParams, rng: &mut R) -> BackendResult<Self> {
        let scheme = SchemeContext::new(params)?;
        let secret_key = SecretKey::generate(&scheme, rng);
        let public_key = EncryptionKey::generate(&scheme, &secret_key, rng)?;
        let relin_key = RelinearizationKey::generate(&scheme, &secret_key, rng)?;
        let key_id = rng.random::<u64>();
        debug!(key_id, "generated context keys");
        Ok(Self {
            scheme,
            key_id,
            secret_key: Arc::new(secret_key),
            public_key: Arc::new(public_key),
            relin_key: Arc::new(relin_key),
        })
    }

    pub fn scheme(&self) -> &Arc<SchemeContext> {
        &self.scheme
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    /// Copy of this context that keeps the secret key.
    pub fn to_secret(&self) -> SecretContext {
        SecretContext {
            scheme: Arc::clone(&self.scheme),
            key_id: self.key_id,
            secret_key: Arc::clone(&self.secret_key),
            relin_key: Some(Arc::clone(&self.relin_key)),
        }
    }

    /// Consumes the context and drops its secret key.
    pub fn make_public(self) -> PublicContext {
        PublicContext {
            scheme: self.scheme,
            key_id: self.key_id,
            public_key: self.public_key,
            relin_key: Some(self.relin_key),
        }
    }
}

/// Encrypt-and-evaluate context: public key plus optional relinearization
/// keys.
#[derive(Clone)]
pub struct PublicContext {
    pub(crate) scheme: Arc<SchemeContext>,
    pub(crate) key_id: u64,
    pub(crate) public_key: Arc<EncryptionKey>,
    pub(crate) relin_key: Option<Arc<RelinearizationKey>>,
}

impl fmt::Debug for PublicContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicContext")
            .field("scheme", &self.scheme)
            .field("key_id", &format_args!("{:#018x}", self.key_id))
            .field("relin_keys", &self.relin_key.is_some())
            .finish()
    }
}

impl PublicContext {
    pub fn scheme(&self) -> &Arc<SchemeContext> {
        &self.scheme
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    pub fn has_relin_keys(&self) -> bool {
        self.relin_key.is_some()
    }
}

/// Decrypt context: secret key plus optional relinearization keys.
#[derive(Clone)]
pub struct SecretContext {
    pub(crate) scheme: Arc<SchemeContext>,
    pub(crate) key_id: u64,
    pub(crate) secret_key: Arc<SecretKey>,
    pub(crate) relin_key: Option<Arc<RelinearizationKey>>,
}

impl fmt::Debug for SecretContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretContext")
            .field("scheme", &self.scheme)
            .field("key_id", &format_args!("{:#018x}", self.key_id))
            .field("relin_keys", &self.relin_key.is_some())
            .finish_non_exhaustive()
    }
}

impl SecretContext {
    pub fn scheme(&self) -> &Arc<SchemeContext> {
        &self.scheme
    }

    pub fn key_id(&self) -> u64 {
        self.key_id
    }

    pub fn has_relin_keys(&self) -> bool {
        self.relin_key.is_some()
    }
}

/// A context decoded from bytes, tagged with its flavor.
#[derive(Debug, Clone)]
pub enum AnyContext {
    Public(PublicContext),
    Secret(SecretContext),
}

impl AnyContext {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Public(_) => "public context",
            Self::Secret(_) => "secret context",
        }
    }
}
