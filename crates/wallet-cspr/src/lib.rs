/// Wallet SDK - Casper (CSPR) transaction builders.
///
/// Builds, signs, serializes and rehydrates Casper deploys for transfers,
/// multisig wallet initialization, delegation, undelegation, reward
/// withdrawal and arbitrary contract calls.
///
/// A deploy's hash covers only its header, and the header commits to the
/// body through `body_hash`, so approvals can be layered on without changing
/// the hash. Multi-party signing therefore works by serializing a deploy,
/// passing the JSON to the next signer, and rebuilding a builder from it with
/// `TransactionBuilderFactory::from`.

pub mod builder;
pub mod bytesrepr;
pub mod clvalue;
pub mod deploy;
pub mod factory;
pub mod keys;
pub mod network;
pub mod session;
pub mod transaction;
pub mod utils;

pub use builder::{
    ContractCallBuilder, DelegateBuilder, DeployBuilder, TransferBuilder, UndelegateBuilder,
    WalletInitializationBuilder, WithdrawRewardsBuilder,
};
pub use clvalue::{CLType, CLValue};
pub use deploy::{Approval, Deploy, ExecutableDeployItem, RuntimeArgs};
pub use factory::{AnyBuilder, TransactionBuilderFactory};
pub use keys::{CsprPublicKey, KeyPair};
pub use network::CsprNetwork;
pub use session::DeployType;
pub use transaction::{Fee, Transaction, TxData};
pub use utils::CsprAddressCodec;
