//! Entry point for creating builders, fresh or from a serialized deploy.

use tracing::debug;
use wallet_core::{BuilderError, TransactionBuilder, TransactionType};

use crate::builder::{
    ContractCallBuilder, DelegateBuilder, DeployBuilder, SessionKind, TransferBuilder,
    UndelegateBuilder, WalletInitializationBuilder, WithdrawRewardsBuilder,
};
use crate::keys::KeyPair;
use crate::network::CsprNetwork;
use crate::session::DeployType;
use crate::transaction::Transaction;
use crate::utils::CsprAddressCodec;

/// Hands out builders configured for one network.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilderFactory {
    network: CsprNetwork,
}

/// A builder of whichever type a serialized deploy turned out to be.
#[derive(Debug, Clone)]
pub enum AnyBuilder {
    Transfer(TransferBuilder),
    WalletInitialization(WalletInitializationBuilder),
    Delegate(DelegateBuilder),
    Undelegate(UndelegateBuilder),
    WithdrawRewards(WithdrawRewardsBuilder),
    ContractCall(ContractCallBuilder),
}

macro_rules! dispatch {
    ($value:expr, $builder:ident => $body:expr) => {
        match $value {
            AnyBuilder::Transfer($builder) => $body,
            AnyBuilder::WalletInitialization($builder) => $body,
            AnyBuilder::Delegate($builder) => $body,
            AnyBuilder::Undelegate($builder) => $body,
            AnyBuilder::WithdrawRewards($builder) => $body,
            AnyBuilder::ContractCall($builder) => $body,
        }
    };
}

impl TransactionBuilderFactory {
    /// A factory whose builders target `network`.
    pub fn new(network: CsprNetwork) -> Self {
        TransactionBuilderFactory { network }
    }

    /// Network every builder is bound to.
    pub fn network(&self) -> &CsprNetwork {
        &self.network
    }

    /// Address codec for this network.
    pub fn codec(&self) -> CsprAddressCodec {
        CsprAddressCodec::new(&self.network)
    }

    /// Empty native transfer builder.
    pub fn transfer_builder(&self) -> TransferBuilder {
        DeployBuilder::new(self.network.clone())
    }

    /// Empty builder for the multisig wallet setup deploy.
    pub fn wallet_initialization_builder(&self) -> WalletInitializationBuilder {
        DeployBuilder::new(self.network.clone())
    }

    /// Empty auction `delegate` builder.
    pub fn delegate_builder(&self) -> DelegateBuilder {
        DeployBuilder::new(self.network.clone())
    }

    /// Same as [`delegate_builder`](Self::delegate_builder).
    pub fn staking_activate_builder(&self) -> DelegateBuilder {
        self.delegate_builder()
    }

    /// Empty auction `undelegate` builder.
    pub fn undelegate_builder(&self) -> UndelegateBuilder {
        DeployBuilder::new(self.network.clone())
    }

    /// Same as [`undelegate_builder`](Self::undelegate_builder).
    pub fn staking_deactivate_builder(&self) -> UndelegateBuilder {
        self.undelegate_builder()
    }

    /// Empty reward withdrawal builder.
    pub fn withdraw_rewards_builder(&self) -> WithdrawRewardsBuilder {
        DeployBuilder::new(self.network.clone())
    }

    /// Empty stored-contract call builder.
    pub fn contract_call_builder(&self) -> ContractCallBuilder {
        DeployBuilder::new(self.network.clone())
    }

    /// Parse a serialized deploy and return a builder of the matching type
    /// holding its fields and approvals.
    ///
    /// # Returns
    /// The populated builder, or `Parse` for empty, malformed or unsupported
    /// input.
    pub fn from(&self, raw: &str) -> Result<AnyBuilder, BuilderError> {
        let tx = Transaction::from_raw(raw, self.network.max_signers())?;
        debug!(id = %tx.deploy().hash_hex(), deploy_type = %tx.deploy_type(), "classified raw deploy");
        Ok(match tx.deploy_type() {
            DeployType::Send => AnyBuilder::Transfer(self.loaded(&tx)?),
            DeployType::WalletInitialization => AnyBuilder::WalletInitialization(self.loaded(&tx)?),
            DeployType::Delegate => AnyBuilder::Delegate(self.loaded(&tx)?),
            DeployType::Undelegate => AnyBuilder::Undelegate(self.loaded(&tx)?),
            DeployType::WithdrawRewards => AnyBuilder::WithdrawRewards(self.loaded(&tx)?),
            DeployType::ContractCall => AnyBuilder::ContractCall(self.loaded(&tx)?),
        })
    }

    fn loaded<K: SessionKind>(&self, tx: &Transaction) -> Result<DeployBuilder<K>, BuilderError> {
        let mut builder = DeployBuilder::new(self.network.clone());
        builder.load(tx)?;
        Ok(builder)
    }
}

impl AnyBuilder {
    /// Deploy type of the wrapped builder.
    pub fn deploy_type(&self) -> DeployType {
        dispatch!(self, b => b.deploy_type())
    }

    /// Chain-agnostic type of the wrapped builder.
    pub fn transaction_type(&self) -> TransactionType {
        self.deploy_type().transaction_type()
    }

    /// Queue a local signer. See [`TransactionBuilder::sign`].
    pub fn sign(&mut self, key: &KeyPair) -> Result<&mut Self, BuilderError> {
        dispatch!(&mut *self, b => { b.sign(key)?; });
        Ok(self)
    }

    /// Queue an external signature. See [`TransactionBuilder::signature`].
    pub fn signature(&mut self, signature: &str, key: &KeyPair) -> Result<&mut Self, BuilderError> {
        dispatch!(&mut *self, b => { b.signature(signature, key)?; });
        Ok(self)
    }

    /// First missing mandatory field, as a `BuildTransaction` error.
    pub fn validate_mandatory_fields(&self) -> Result<(), BuilderError> {
        dispatch!(self, b => b.validate_mandatory_fields())
    }

    /// Build the deploy with every queued signer applied.
    pub fn build(&mut self) -> Result<Transaction, BuilderError> {
        dispatch!(self, b => b.build())
    }

    /// The transfer builder, if that is what this holds.
    pub fn as_transfer_mut(&mut self) -> Option<&mut TransferBuilder> {
        match self {
            AnyBuilder::Transfer(b) => Some(b),
            _ => None,
        }
    }

    /// The wallet initialization builder, if that is what this holds.
    pub fn as_wallet_initialization_mut(&mut self) -> Option<&mut WalletInitializationBuilder> {
        match self {
            AnyBuilder::WalletInitialization(b) => Some(b),
            _ => None,
        }
    }

    /// The delegate builder, if that is what this holds.
    pub fn as_delegate_mut(&mut self) -> Option<&mut DelegateBuilder> {
        match self {
            AnyBuilder::Delegate(b) => Some(b),
            _ => None,
        }
    }

    /// The undelegate builder, if that is what this holds.
    pub fn as_undelegate_mut(&mut self) -> Option<&mut UndelegateBuilder> {
        match self {
            AnyBuilder::Undelegate(b) => Some(b),
            _ => None,
        }
    }

    /// The reward withdrawal builder, if that is what this holds.
    pub fn as_withdraw_rewards_mut(&mut self) -> Option<&mut WithdrawRewardsBuilder> {
        match self {
            AnyBuilder::WithdrawRewards(b) => Some(b),
            _ => None,
        }
    }

    /// The contract call builder, if that is what this holds.
    pub fn as_contract_call_mut(&mut self) -> Option<&mut ContractCallBuilder> {
        match self {
            AnyBuilder::ContractCall(b) => Some(b),
            _ => None,
        }
    }
}
