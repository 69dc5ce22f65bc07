//! Scheme-tag dispatch for partitioned encrypted tensors.
//!
//! A tensor is a list of rows of reals, split into contiguous partitions.
//! [`select`] maps a configuration tag to the [`TensorFactory`] for that
//! scheme; the factory encrypts rows under the matching key type.

mod encrypted;
mod factory;

pub use encrypted::EncryptedTensor;
pub use factory::{TensorFactory, select};

use crate::{
    errors::HeError,
    paillier::{PaillierPrivateKey, PaillierPublicKey},
    vector::{PrivateKey, PublicKey},
};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemeTag {
    Paillier,
    Ckks,
}

impl SchemeTag {
    pub fn name(self) -> &'static str {
        match self {
            Self::Paillier => "paillier",
            Self::Ckks => "ckks",
        }
    }
}

impl fmt::Display for SchemeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SchemeTag {
    type Err = HeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "paillier" => Ok(Self::Paillier),
            "ckks" => Ok(Self::Ckks),
            _ => Err(HeError::configuration(format!(
                "unknown encryption scheme {tag:?}"
            ))),
        }
    }
}

/// Encryption key of either scheme.
#[derive(Debug, Clone)]
pub enum SchemePublicKey {
    Paillier(PaillierPublicKey),
    Ckks(PublicKey),
}

impl SchemePublicKey {
    pub fn scheme(&self) -> SchemeTag {
        match self {
            Self::Paillier(_) => SchemeTag::Paillier,
            Self::Ckks(_) => SchemeTag::Ckks,
        }
    }
}

impl From<PaillierPublicKey> for SchemePublicKey {
    fn from(key: PaillierPublicKey) -> Self {
        Self::Paillier(key)
    }
}

impl From<PublicKey> for SchemePublicKey {
    fn from(key: PublicKey) -> Self {
        Self::Ckks(key)
    }
}

/// Decryption key of either scheme.
#[derive(Debug)]
pub enum SchemePrivateKey {
    Paillier(PaillierPrivateKey),
    Ckks(PrivateKey),
}

impl SchemePrivateKey {
    pub fn scheme(&self) -> SchemeTag {
        match self {
            Self::Paillier(_) => SchemeTag::Paillier,
            Self::Ckks(_) => SchemeTag::Ckks,
        }
    }
}

impl From<PaillierPrivateKey> for SchemePrivateKey {
    fn from(key: PaillierPrivateKey) -> Self {
        Self::Paillier(key)
    }
}

impl From<PrivateKey> for SchemePrivateKey {
    fn from(key: PrivateKey) -> Self {
        Self::Ckks(key)
    }
}
