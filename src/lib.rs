//! Encrypted vectors of reals for multi-party computation, built on a
//! leveled RNS-CKKS backend.
//!
//! [`KeyPairGenerator`] creates a [`PublicKey`] / [`PrivateKey`] pair. The
//! public half encrypts scalars and vectors into [`EncryptedVector`]s, which
//! support addition, subtraction, multiplication and division by plaintexts
//! while tracking multiplicative depth. Only the private half decrypts.
//!
//! ```no_run
//! use mpc_ckks::KeyPairGenerator;
//!
//! let (public_key, private_key) = KeyPairGenerator::generate(None)?;
//! let x = public_key.encrypt(vec![1.0, 2.0, 3.0])?;
//! let y = x.multiply(2.0)?.add(&x)?;
//! assert_eq!(y.depth(), 1);
//! let values = private_key.decrypt(&y)?.into_vec();
//! assert!((values[2] - 9.0).abs() < 1e-3);
//! # Ok::<(), mpc_ckks::HeError>(())
//! ```

pub mod crypto;
pub mod encoding;
pub mod errors;
pub mod math;
pub mod paillier;
pub mod rings;
pub mod tensor;
pub mod vector;

pub use crypto::{CkksParams, SecurityLevel};
pub use errors::{HeError, HeResult};
pub use tensor::{
    EncryptedTensor, SchemePrivateKey, SchemePublicKey, SchemeTag, TensorFactory, select,
};
pub use vector::{
    EncryptedVector, KeyPairGenerator, Operand, PlainValue, PrivateKey, PublicKey,
    accumulate_into,
};
