use wallet_core::BuilderError;

use super::{missing, DeployBuilder, SessionKind};
use crate::clvalue::CLValue;
use crate::deploy::{ExecutableDeployItem, RuntimeArgs};
use crate::keys::CsprPublicKey;
use crate::network::CsprNetwork;
use crate::session::{contract_call_session, DeployType, SessionFields, ARG_DEPLOY_TYPE};

/// Call of an entry point on a stored contract.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractCallKind {
    contract_hash: Option<[u8; 32]>,
    entry_point: Option<String>,
    args: RuntimeArgs,
}

impl SessionKind for ContractCallKind {
    const DEPLOY_TYPE: DeployType = DeployType::ContractCall;

    fn validate_fields(&self) -> Result<(), BuilderError> {
        if self.contract_hash.is_none() {
            return Err(missing("contract hash"));
        }
        if self.entry_point.is_none() {
            return Err(missing("entry point"));
        }
        Ok(())
    }

    fn session(
        &self,
        _source: &CsprPublicKey,
        _network: &CsprNetwork,
    ) -> Result<ExecutableDeployItem, BuilderError> {
        let hash = self.contract_hash.ok_or_else(|| missing("contract hash"))?;
        let entry_point = self.entry_point.as_deref().ok_or_else(|| missing("entry point"))?;
        contract_call_session(hash, entry_point, &self.args)
    }

    fn load(
        &mut self,
        fields: SessionFields,
        _source: &CsprPublicKey,
        _network: &CsprNetwork,
    ) -> Result<(), BuilderError> {
        self.contract_hash = fields.contract_hash;
        self.entry_point = fields.entry_point;
        self.args = fields.contract_args.unwrap_or_default();
        Ok(())
    }
}

impl DeployBuilder<ContractCallKind> {
    /// Set the contract hash (64 hex characters).
    pub fn contract_hash(&mut self, hash: &str) -> Result<&mut Self, BuilderError> {
        let invalid = || BuilderError::InvalidParameterValue(format!("Invalid contract hash: {}", hash));
        let bytes = hex::decode(hash).map_err(|_| invalid())?;
        let hash: [u8; 32] = bytes.as_slice().try_into().map_err(|_| invalid())?;
        self.kind_mut().contract_hash = Some(hash);
        Ok(self)
    }

    pub fn entry_point(&mut self, entry_point: &str) -> Result<&mut Self, BuilderError> {
        if entry_point.is_empty() {
            return Err(BuilderError::InvalidParameterValue(
                "Invalid entry point: empty".to_string(),
            ));
        }
        self.kind_mut().entry_point = Some(entry_point.to_string());
        Ok(self)
    }

    /// Append a runtime argument. `deploy_type` is reserved.
    pub fn arg(&mut self, name: &str, value: CLValue) -> Result<&mut Self, BuilderError> {
        if name.is_empty() || name == ARG_DEPLOY_TYPE {
            return Err(BuilderError::InvalidParameterValue(format!(
                "Invalid argument name: {}",
                name
            )));
        }
        self.kind_mut().args.insert(name, value)?;
        Ok(self)
    }

    pub fn get_args(&self) -> &RuntimeArgs {
        &self.kind().args
    }
}
