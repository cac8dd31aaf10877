//! Key material, digests and byte codecs shared by every coin crate.
//!
//! Nothing here knows about a particular chain. Coin crates build their
//! wire formats on [`util::ByteWriter`] and [`hash`], and sign with
//! [`ec::PrivateKey`].

pub mod base58;
pub mod bip32;
pub mod ec;
pub mod hash;
pub mod util;

mod error;
pub use error::PrimitivesError;
