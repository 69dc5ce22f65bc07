//! Residue-number-system polynomial arithmetic over `Z_Q[X]/(X^N + 1)`.
//!
//! A polynomial is stored as one residue vector per prime of its
//! [`RnsBasis`]. Multiplication goes through a negacyclic NTT, so every
//! prime must satisfy `q = 1 (mod 2N)`.

pub mod basis;
pub mod errors;
pub mod poly;

pub use basis::{NttTable, RnsBasis};
pub use errors::{RnsError, RnsResult};
pub use poly::RnsPoly;
