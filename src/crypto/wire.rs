//! Byte encodings of contexts and ciphertexts (serde + bincode).
//!
//! Only parameters and key polynomials travel; the prime chain and NTT tables
//! are rebuilt from the parameters on import. Every imported polynomial is
//! checked against the basis it is supposed to live in.

use super::{
    BackendError, BackendResult, Ciphertext, CkksParams,
    context::{AnyContext, PublicContext, SchemeContext, SecretContext},
    keys::{EncryptionKey, RelinearizationKey, RlweSample, SecretKey},
};
use crate::rings::{RnsBasis, RnsPoly};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which key material a serialized context carries.
///
/// Rotation keys are never generated, so there is nothing to select for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SerializeOptions {
    pub public_key: bool,
    pub secret_key: bool,
    pub relin_keys: bool,
}

impl SerializeOptions {
    /// Public key and relinearization keys.
    pub fn public() -> Self {
        Self {
            public_key: true,
            secret_key: false,
            relin_keys: true,
        }
    }

    /// Secret key and relinearization keys.
    pub fn secret() -> Self {
        Self {
            public_key: false,
            secret_key: true,
            relin_keys: true,
        }
    }

    /// Public key only: enough to rebuild the context of a ciphertext.
    pub fn lightweight() -> Self {
        Self {
            public_key: true,
            secret_key: false,
            relin_keys: false,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct PolyWire {
    ntt: bool,
    channels: Vec<Vec<u64>>,
}

impl PolyWire {
    fn from_poly(poly: &RnsPoly) -> Self {
        Self {
            ntt: poly.is_ntt_domain(),
            channels: poly.channels().to_vec(),
        }
    }

    fn into_poly(self, basis: &Arc<RnsBasis>, what: &str) -> BackendResult<RnsPoly> {
        RnsPoly::from_channels(self.channels, Arc::clone(basis), self.ntt)
            .map_err(|e| BackendError::malformed(format!("{what}: {e}")))
    }
}

#[derive(Serialize, Deserialize)]
struct SampleWire {
    b: PolyWire,
    a: PolyWire,
}

impl SampleWire {
    fn from_sample(sample: &RlweSample) -> Self {
        Self {
            b: PolyWire::from_poly(&sample.b),
            a: PolyWire::from_poly(&sample.a),
        }
    }

    fn into_sample(self, basis: &Arc<RnsBasis>, what: &str) -> BackendResult<RlweSample> {
        Ok(RlweSample {
            b: self.b.into_poly(basis, what)?,
            a: self.a.into_poly(basis, what)?,
        })
    }
}

#[derive(Serialize, Deserialize)]
struct ContextWire {
    params: CkksParams,
    key_id: u64,
    public_key: Option<SampleWire>,
    secret_key: Option<PolyWire>,
    relin_keys: Option<Vec<SampleWire>>,
}

#[derive(Serialize, Deserialize)]
struct CiphertextWire {
    key_id: u64,
    level: usize,
    scale: f64,
    len: usize,
    c0: PolyWire,
    c1: PolyWire,
}

fn relin_wire(
    relin_key: Option<&Arc<RelinearizationKey>>,
    requested: bool,
) -> BackendResult<Option<Vec<SampleWire>>> {
    if !requested {
        return Ok(None);
    }
    let relin_key = relin_key.ok_or(BackendError::MissingKeyMaterial {
        what: "relinearization keys",
    })?;
    Ok(Some(
        relin_key.samples.iter().map(SampleWire::from_sample).collect(),
    ))
}

impl PublicContext {
    /// Serializes the parameters plus the selected key material.
    pub fn serialize(&self, options: SerializeOptions) -> BackendResult<Vec<u8>> {
        if options.secret_key {
            return Err(BackendError::MissingKeyMaterial { what: "secret key" });
        }
        let wire = ContextWire {
            params: self.scheme.params().clone(),
            key_id: self.key_id,
            public_key: options
                .public_key
                .then(|| SampleWire::from_sample(&self.public_key.sample)),
            secret_key: None,
            relin_keys: relin_wire(self.relin_key.as_ref(), options.relin_keys)?,
        };
        Ok(bincode::serialize(&wire)?)
    }

    /// Rebuilds a ciphertext produced under this context.
    pub fn ciphertext_from(&self, bytes: &[u8]) -> BackendResult<Ciphertext> {
        let wire: CiphertextWire = bincode::deserialize(bytes)?;
        if wire.key_id != self.key_id {
            return Err(BackendError::KeyMismatch {
                expected: self.key_id,
                actual: wire.key_id,
            });
        }
        if wire.level > self.scheme.top_level() {
            return Err(BackendError::malformed(format!(
                "ciphertext level {} above top level {}",
                wire.level,
                self.scheme.top_level()
            )));
        }
        if !wire.scale.is_finite() || wire.scale < 1.0 {
            return Err(BackendError::malformed(format!(
                "ciphertext scale {} is not a usable scale",
                wire.scale
            )));
        }
        if wire.len == 0 || wire.len > self.scheme.slot_count() {
            return Err(BackendError::malformed(format!(
                "ciphertext length {} outside [1, {}]",
                wire.len,
                self.scheme.slot_count()
            )));
        }
        let basis = self.scheme.level_basis(wire.level);
        Ok(Ciphertext {
            c0: wire.c0.into_poly(basis, "ciphertext c0")?,
            c1: wire.c1.into_poly(basis, "ciphertext c1")?,
            level: wire.level,
            scale: wire.scale,
            len: wire.len,
            key_id: wire.key_id,
        })
    }
}

impl SecretContext {
    /// Serializes the parameters plus the selected key material.
    pub fn serialize(&self, options: SerializeOptions) -> BackendResult<Vec<u8>> {
        if options.public_key {
            return Err(BackendError::MissingKeyMaterial { what: "public key" });
        }
        let wire = ContextWire {
            params: self.scheme.params().clone(),
            key_id: self.key_id,
            public_key: None,
            secret_key: options
                .secret_key
                .then(|| PolyWire::from_poly(&self.secret_key.poly)),
            relin_keys: relin_wire(self.relin_key.as_ref(), options.relin_keys)?,
        };
        Ok(bincode::serialize(&wire)?)
    }
}

impl Ciphertext {
    pub fn serialize(&self) -> BackendResult<Vec<u8>> {
        let wire = CiphertextWire {
            key_id: self.key_id,
            level: self.level,
            scale: self.scale,
            len: self.len,
            c0: PolyWire::from_poly(&self.c0),
            c1: PolyWire::from_poly(&self.c1),
        };
        Ok(bincode::serialize(&wire)?)
    }
}

/// Decodes a context. A payload with a secret key becomes
/// [`AnyContext::Secret`], one with only a public key [`AnyContext::Public`].
pub fn context_from(bytes: &[u8]) -> BackendResult<AnyContext> {
    let wire: ContextWire = bincode::deserialize(bytes)?;
    let scheme = SchemeContext::new(wire.params)?;

    let relin_key = wire
        .relin_keys
        .map(|samples| import_relin(&scheme, samples))
        .transpose()?
        .map(Arc::new);

    match (wire.secret_key, wire.public_key) {
        (Some(secret), _) => {
            let poly = secret.into_poly(scheme.key_basis(), "secret key")?;
            Ok(AnyContext::Secret(SecretContext {
                scheme,
                key_id: wire.key_id,
                secret_key: Arc::new(SecretKey { poly }),
                relin_key,
            }))
        }
        (None, Some(public)) => {
            let basis = scheme.level_basis(scheme.top_level());
            let sample = public.into_sample(basis, "public key")?;
            Ok(AnyContext::Public(PublicContext {
                scheme,
                key_id: wire.key_id,
                public_key: Arc::new(EncryptionKey { sample }),
                relin_key,
            }))
        }
        (None, None) => Err(BackendError::malformed(
            "context carries neither a public nor a secret key",
        )),
    }
}

fn import_relin(
    scheme: &SchemeContext,
    samples: Vec<SampleWire>,
) -> BackendResult<RelinearizationKey> {
    let expected = scheme.params().data_prime_count();
    if samples.len() != expected {
        return Err(BackendError::malformed(format!(
            "expected {expected} relinearization samples, got {}",
            samples.len()
        )));
    }
    let samples = samples
        .into_iter()
        .map(|s| s.into_sample(scheme.key_basis(), "relinearization key"))
        .collect::<BackendResult<Vec<_>>>()?;
    Ok(RelinearizationKey { samples })
}
