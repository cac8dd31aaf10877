/// Wallet SDK - Chain-agnostic transaction builder contracts.
///
/// Every chain family implements the same lifecycle: configure a builder,
/// queue signers, `build()` a transaction, serialize it for broadcast, and
/// rehydrate a builder from the serialized form to continue a multi-party
/// signing ceremony. This crate holds the pieces of that lifecycle that do
/// not depend on the chain:
/// - the error taxonomy shared by every builder
/// - the `TransactionBuilder` and `BaseTransaction` capability traits
/// - the signature accumulator (idempotent, ordered, capped)
/// - address-with-memo parsing and amount validation
/// - coin configuration and explain-transaction types
/// - collaborator traits for account lookup and broadcast

pub mod address;
pub mod amount;
pub mod builder;
pub mod network;
pub mod services;
pub mod signatures;
pub mod transaction;

mod error;
pub use error::BuilderError;
pub use address::{AddressCodec, AddressDetails};
pub use builder::TransactionBuilder;
pub use network::{CoinConfig, NetworkKind};
pub use signatures::{Accumulated, SignatureAccumulator, SignerEntry};
pub use transaction::{BaseTransaction, ExplainedOutput, ExplainedTransaction, StakingOperation, TransactionType};
