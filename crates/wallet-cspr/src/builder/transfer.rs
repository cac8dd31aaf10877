use num_bigint::BigUint;
use wallet_core::amount::parse_amount;
use wallet_core::{AddressCodec, BuilderError};

use super::{missing, DeployBuilder, SessionKind};
use crate::deploy::ExecutableDeployItem;
use crate::keys::CsprPublicKey;
use crate::network::CsprNetwork;
use crate::session::{transfer_session, DeployType, SessionFields};
use crate::utils::CsprAddressCodec;

/// Native transfer of motes to another account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferKind {
    to: Option<CsprPublicKey>,
    amount: Option<BigUint>,
    transfer_id: Option<u64>,
}

impl SessionKind for TransferKind {
    const DEPLOY_TYPE: DeployType = DeployType::Send;

    fn validate_fields(&self) -> Result<(), BuilderError> {
        if self.to.is_none() {
            return Err(missing("to address"));
        }
        if self.amount.is_none() {
            return Err(missing("amount"));
        }
        Ok(())
    }

    fn session(
        &self,
        _source: &CsprPublicKey,
        _network: &CsprNetwork,
    ) -> Result<ExecutableDeployItem, BuilderError> {
        let to = self.to.as_ref().ok_or_else(|| missing("to address"))?;
        let amount = self.amount.as_ref().ok_or_else(|| missing("amount"))?;
        transfer_session(amount, to, self.transfer_id)
    }

    fn load(
        &mut self,
        fields: SessionFields,
        _source: &CsprPublicKey,
        _network: &CsprNetwork,
    ) -> Result<(), BuilderError> {
        self.to = fields.to_address;
        self.amount = fields.amount;
        self.transfer_id = fields.transfer_id;
        Ok(())
    }
}

impl DeployBuilder<TransferKind> {
    /// Set the destination.
    ///
    /// The transfer id follows the address: a `?transferId=<n>` suffix sets
    /// it and a bare address clears any earlier one. Call `transfer_id`
    /// afterwards to attach an id to a bare address.
    pub fn to(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        let details = CsprAddressCodec::new(self.network()).address_details(address)?;
        let key = CsprPublicKey::from_hex(&details.address)?;
        let transfer_id = details
            .memo_id
            .map(|memo| {
                memo.parse::<u64>().map_err(|_| {
                    BuilderError::InvalidParameterValue(format!("Invalid transfer id: {}", memo))
                })
            })
            .transpose()?;
        let kind = self.kind_mut();
        kind.to = Some(key);
        kind.transfer_id = transfer_id;
        Ok(self)
    }

    /// Set the amount in motes; must meet the network minimum.
    pub fn amount(&mut self, amount: &str) -> Result<&mut Self, BuilderError> {
        let minimum = self.network().coin.min_amount()?;
        let value = parse_amount(amount, Some(&minimum))?;
        if value.bits() > 512 {
            return Err(BuilderError::InvalidParameterValue(format!(
                "Invalid amount: {} exceeds U512",
                amount
            )));
        }
        self.kind_mut().amount = Some(value);
        Ok(self)
    }

    /// Set the transfer id (memo).
    pub fn transfer_id(&mut self, id: u64) -> &mut Self {
        self.kind_mut().transfer_id = Some(id);
        self
    }

    /// Destination key, if set.
    pub fn get_to(&self) -> Option<&CsprPublicKey> {
        self.kind().to.as_ref()
    }

    /// Amount in motes, if set.
    pub fn get_amount(&self) -> Option<&BigUint> {
        self.kind().amount.as_ref()
    }

    /// Transfer id, if set.
    pub fn get_transfer_id(&self) -> Option<u64> {
        self.kind().transfer_id
    }
}
