use wallet_core::BuilderError;

use super::{DeployBuilder, SessionKind};
use crate::deploy::ExecutableDeployItem;
use crate::keys::CsprPublicKey;
use crate::network::{CsprNetwork, WALLET_OWNERS};
use crate::session::{wallet_init_session, DeployType, SessionFields};

/// Installation of the multisig wallet contract for a fixed owner set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WalletInitializationKind {
    owners: Vec<CsprPublicKey>,
}

impl WalletInitializationKind {
    fn add_owner(&mut self, owner: CsprPublicKey, raw: &str) -> Result<(), BuilderError> {
        if self.owners.len() >= WALLET_OWNERS {
            return Err(BuilderError::BuildTransaction(format!(
                "A maximum of {} owners can be set for a multisig wallet",
                WALLET_OWNERS
            )));
        }
        if self.owners.contains(&owner) {
            return Err(BuilderError::BuildTransaction(format!(
                "Repeated owner address: {}",
                raw
            )));
        }
        self.owners.push(owner);
        Ok(())
    }
}

impl SessionKind for WalletInitializationKind {
    const DEPLOY_TYPE: DeployType = DeployType::WalletInitialization;

    fn validate_fields(&self) -> Result<(), BuilderError> {
        if self.owners.len() != WALLET_OWNERS {
            return Err(BuilderError::BuildTransaction(format!(
                "wrong number of owners -- required: {}, found: {}",
                WALLET_OWNERS,
                self.owners.len()
            )));
        }
        Ok(())
    }

    fn session(
        &self,
        _source: &CsprPublicKey,
        network: &CsprNetwork,
    ) -> Result<ExecutableDeployItem, BuilderError> {
        wallet_init_session(network.wallet_init_contract_bytes()?, &self.owners)
    }

    fn load(
        &mut self,
        fields: SessionFields,
        _source: &CsprPublicKey,
        network: &CsprNetwork,
    ) -> Result<(), BuilderError> {
        if fields.module_bytes.as_deref() != Some(network.wallet_init_contract_bytes()?.as_slice()) {
            return Err(BuilderError::Parse(
                "Invalid transaction: session: wallet contract does not match the configured one"
                    .to_string(),
            ));
        }
        self.owners.clear();
        for owner in fields.owners {
            let raw = owner.to_hex();
            self.add_owner(owner, &raw)
                .map_err(|e| BuilderError::Parse(format!("Invalid transaction: {}", e)))?;
        }
        Ok(())
    }
}

impl DeployBuilder<WalletInitializationKind> {
    /// Append a wallet owner.
    ///
    /// # Returns
    /// `BuildTransaction` once three owners are set or for a repeated
    /// owner, `InvalidParameterValue` for a malformed address.
    pub fn owner(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        if self.kind().owners.len() >= WALLET_OWNERS {
            return Err(BuilderError::BuildTransaction(format!(
                "A maximum of {} owners can be set for a multisig wallet",
                WALLET_OWNERS
            )));
        }
        let key = CsprPublicKey::from_hex(address)?;
        self.kind_mut().add_owner(key, address)?;
        Ok(self)
    }

    pub fn get_owners(&self) -> &[CsprPublicKey] {
        &self.kind().owners
    }
}
