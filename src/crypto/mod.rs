//! Leveled RNS-CKKS backend.
//!
//! This module supplies everything the encrypted-vector layer consumes:
//! parameter validation, context creation and splitting, ciphertext
//! arithmetic with typed faults, and the byte encodings of contexts and
//! ciphertexts.

pub mod builder;
pub mod context;
pub mod engine;
pub mod errors;
pub mod keys;
pub mod params;
pub mod types;
pub mod wire;

pub use builder::CkksParamsBuilder;
pub use context::{AnyContext, Context, PublicContext, SchemeContext, SecretContext};
pub use errors::{BackendError, BackendResult};
pub use keys::{EncryptionKey, RelinearizationKey, SecretKey};
pub use params::{CkksParams, SecurityLevel};
pub use types::{Ciphertext, PlainOperand};
pub use wire::{SerializeOptions, context_from};
