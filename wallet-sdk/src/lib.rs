#![deny(missing_docs)]

//! Wallet SDK - Complete SDK.
//!
//! Re-exports the shared builder contract, the cryptographic primitives and
//! every chain implementation for convenient single-crate usage.

pub use wallet_core as core;
pub use wallet_cspr as cspr;
pub use wallet_primitives as primitives;
