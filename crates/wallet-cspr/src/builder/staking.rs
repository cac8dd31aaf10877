use std::fmt;
use std::marker::PhantomData;

use num_bigint::BigUint;
use wallet_core::amount::parse_amount;
use wallet_core::BuilderError;

use super::{missing, DeployBuilder, SessionKind};
use crate::deploy::ExecutableDeployItem;
use crate::keys::CsprPublicKey;
use crate::network::CsprNetwork;
use crate::session::{staking_session, DeployType, SessionFields};

/// Which auction operation a staking builder performs.
pub trait StakingOp: Clone + Default + fmt::Debug {
    const DEPLOY_TYPE: DeployType;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DelegateOp;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UndelegateOp;

/// Withdraws accrued rewards by undelegating the reward amount.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WithdrawRewardsOp;

impl StakingOp for DelegateOp {
    const DEPLOY_TYPE: DeployType = DeployType::Delegate;
}

impl StakingOp for UndelegateOp {
    const DEPLOY_TYPE: DeployType = DeployType::Undelegate;
}

impl StakingOp for WithdrawRewardsOp {
    const DEPLOY_TYPE: DeployType = DeployType::WithdrawRewards;
}

/// A call into the auction contract on behalf of the source account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StakingKind<S> {
    validator: Option<CsprPublicKey>,
    amount: Option<BigUint>,
    op: PhantomData<S>,
}

/// Session layout of a delegation.
pub type DelegateKind = StakingKind<DelegateOp>;
/// Session layout of an undelegation.
pub type UndelegateKind = StakingKind<UndelegateOp>;
/// Session layout of a reward withdrawal.
pub type WithdrawRewardsKind = StakingKind<WithdrawRewardsOp>;

impl<S: StakingOp> SessionKind for StakingKind<S> {
    const DEPLOY_TYPE: DeployType = S::DEPLOY_TYPE;

    fn validate_fields(&self) -> Result<(), BuilderError> {
        if self.validator.is_none() {
            return Err(missing("validator"));
        }
        if self.amount.is_none() {
            return Err(missing("amount"));
        }
        Ok(())
    }

    fn session(
        &self,
        source: &CsprPublicKey,
        network: &CsprNetwork,
    ) -> Result<ExecutableDeployItem, BuilderError> {
        let validator = self.validator.as_ref().ok_or_else(|| missing("validator"))?;
        let amount = self.amount.as_ref().ok_or_else(|| missing("amount"))?;
        staking_session(
            S::DEPLOY_TYPE,
            network.auction_contract()?,
            source,
            validator,
            amount,
        )
    }

    fn load(
        &mut self,
        fields: SessionFields,
        source: &CsprPublicKey,
        network: &CsprNetwork,
    ) -> Result<(), BuilderError> {
        if fields.contract_hash != Some(network.auction_contract()?) {
            return Err(BuilderError::Parse(
                "Invalid transaction: session: contract is not the auction contract".to_string(),
            ));
        }
        if fields.delegator.as_ref() != Some(source) {
            return Err(BuilderError::Parse(
                "Invalid transaction: delegator does not match the deploy account".to_string(),
            ));
        }
        self.validator = fields.validator;
        self.amount = fields.amount;
        Ok(())
    }
}

impl<S: StakingOp> DeployBuilder<StakingKind<S>> {
    /// Set the validator (a tagged public key, no memo).
    pub fn validator(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        let key = CsprPublicKey::from_hex(address).map_err(|e| {
            BuilderError::InvalidParameterValue(format!("Invalid validator address: {}", e))
        })?;
        self.kind_mut().validator = Some(key);
        Ok(self)
    }

    /// Set the staked (or withdrawn) amount in motes.
    pub fn amount(&mut self, amount: &str) -> Result<&mut Self, BuilderError> {
        let value = parse_amount(amount, None)?;
        if value.bits() > 512 {
            return Err(BuilderError::InvalidParameterValue(format!(
                "Invalid amount: {} exceeds U512",
                amount
            )));
        }
        self.kind_mut().amount = Some(value);
        Ok(self)
    }

    pub fn get_validator(&self) -> Option<&CsprPublicKey> {
        self.kind().validator.as_ref()
    }

    pub fn get_amount(&self) -> Option<&BigUint> {
        self.kind().amount.as_ref()
    }
}
