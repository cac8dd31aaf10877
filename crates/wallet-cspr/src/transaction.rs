//! A built Casper deploy with its approvals.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wallet_core::amount::parse_amount;
use wallet_core::{
    Accumulated, BaseTransaction, BuilderError, ExplainedOutput, ExplainedTransaction,
    SignatureAccumulator, SignerEntry, StakingOperation, TransactionType,
};

use crate::deploy::{format_timestamp, Approval, Deploy, ARG_AMOUNT};
use crate::keys::{CsprPublicKey, KeyPair};
use crate::session::{deploy_type_of, read_session, DeployType};

/// Gas settings of a deploy.
///
/// `gas_limit` becomes the standard payment amount; `gas_price` falls back to
/// the network default when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fee {
    /// Payment amount in motes, decimal.
    pub gas_limit: String,
    /// Gas price multiplier, decimal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_price: Option<String>,
}

impl Fee {
    /// A fee with the network default gas price.
    pub fn new(gas_limit: impl Into<String>) -> Self {
        Fee {
            gas_limit: gas_limit.into(),
            gas_price: None,
        }
    }

    /// Set an explicit gas price.
    pub fn with_gas_price(mut self, gas_price: impl Into<String>) -> Self {
        self.gas_price = Some(gas_price.into());
        self
    }

    /// The gas limit as an integer; must be positive.
    pub fn gas_limit_value(&self) -> Result<BigUint, BuilderError> {
        parse_amount(&self.gas_limit, None).map_err(|_| {
            BuilderError::InvalidParameterValue(format!("Invalid fee: gas limit {}", self.gas_limit))
        })
    }

    /// The gas price, or `default` when unset; must be a positive `u64`.
    pub fn gas_price_value(&self, default: u64) -> Result<u64, BuilderError> {
        let Some(price) = &self.gas_price else {
            return Ok(default);
        };
        match price.parse::<u64>() {
            Ok(value) if value > 0 && wallet_core::amount::is_decimal_digits(price) => Ok(value),
            _ => Err(BuilderError::InvalidParameterValue(format!(
                "Invalid fee: gas price {}",
                price
            ))),
        }
    }
}

/// Flat JSON view of a deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxData {
    /// Deploy hash, hex.
    pub hash: String,
    pub fee: Fee,
    /// Source account address.
    pub from: String,
    /// Header timestamp, RFC 3339 with milliseconds.
    pub start_time: String,
    /// TTL in milliseconds.
    pub expiration: u64,
    /// Name of the [`DeployType`].
    pub deploy_type: String,
    /// Transfer recipient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Transferred or staked motes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Transfer id (memo).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<u64>,
    /// Validator of a staking deploy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validator: Option<String>,
    /// Owners set by a wallet initialization, in order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owners: Option<Vec<String>>,
    /// Called contract, hex.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_hash: Option<String>,
    /// Called entry point.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,
    /// Approvals in signing order.
    pub approvals: Vec<Approval>,
}

/// Reject a key whose bytes already approved the deploy under another tag.
pub(crate) fn check_signer_encoding<'a, I>(approvals: I, key: &CsprPublicKey) -> Result<(), BuilderError>
where
    I: IntoIterator<Item = &'a Approval>,
{
    let id = key.raw_bytes();
    let tagged = key.to_hex();
    for approval in approvals {
        if approval.signer_id() == id && approval.signer.to_lowercase() != tagged {
            return Err(BuilderError::UnexpectedAddress(
                "already signed with invalid key".to_string(),
            ));
        }
    }
    Ok(())
}

/// A deploy plus the signer policy of its network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    deploy: Deploy,
    deploy_type: DeployType,
    max_signers: usize,
}

impl Transaction {
    /// Wrap a deploy, classifying it by its session.
    pub fn new(deploy: Deploy, max_signers: usize) -> Result<Self, BuilderError> {
        let deploy_type = deploy_type_of(&deploy)?;
        let approvals = deploy.approvals();
        if approvals.len() > max_signers {
            return Err(BuilderError::Parse(format!(
                "Invalid transaction: approvals: {} exceeds the maximum of {}",
                approvals.len(),
                max_signers
            )));
        }
        for (i, approval) in approvals.iter().enumerate() {
            let id = approval.signer_id();
            if approvals[..i].iter().any(|earlier| earlier.signer_id() == id) {
                return Err(BuilderError::Parse(format!(
                    "Invalid transaction: approvals: duplicate signer {}",
                    approval.signer
                )));
            }
        }
        Ok(Transaction {
            deploy,
            deploy_type,
            max_signers,
        })
    }

    /// Parse the broadcast JSON.
    pub fn from_raw(raw: &str, max_signers: usize) -> Result<Self, BuilderError> {
        Self::new(Deploy::from_json(raw)?, max_signers)
    }

    /// The wrapped deploy.
    pub fn deploy(&self) -> &Deploy {
        &self.deploy
    }

    /// Type read from the session.
    pub fn deploy_type(&self) -> DeployType {
        self.deploy_type
    }

    /// Approvals in signing order.
    pub fn approvals(&self) -> &[Approval] {
        self.deploy.approvals()
    }

    fn push_approval(&mut self, approval: Approval) -> Result<Accumulated, BuilderError> {
        let mut acc =
            SignatureAccumulator::with_entries(self.max_signers, self.deploy.approvals().to_vec())?;
        let outcome = acc.push(approval)?;
        self.deploy.set_approvals(acc.into_entries());
        Ok(outcome)
    }

    /// Approve with a local key.
    ///
    /// # Returns
    /// `Duplicate` if the key already approved, `UnexpectedAddress` if its
    /// bytes approved under another tag, `Signing` past the signer cap.
    pub fn sign(&mut self, key: &KeyPair) -> Result<Accumulated, BuilderError> {
        let public_key = key.cspr_public_key();
        check_signer_encoding(self.deploy.approvals(), &public_key)?;
        let acc =
            SignatureAccumulator::with_entries(self.max_signers, self.deploy.approvals().to_vec())?;
        if acc.check(&public_key.raw_bytes())? == Accumulated::Duplicate {
            return Ok(Accumulated::Duplicate);
        }
        let signature = key.sign(self.deploy.hash())?;
        debug!(deploy = %self.deploy.hash_hex(), signer = %public_key, "signed deploy");
        self.push_approval(Approval::new(&public_key, &signature))
    }

    /// Attach a signature produced elsewhere, verifying it first.
    pub fn add_signature(
        &mut self,
        public_key: &CsprPublicKey,
        tagged_signature: &[u8],
    ) -> Result<Accumulated, BuilderError> {
        check_signer_encoding(self.deploy.approvals(), public_key)?;
        if !public_key.verify(self.deploy.hash(), tagged_signature) {
            return Err(BuilderError::Signing(format!(
                "Invalid signature for signer {}",
                public_key
            )));
        }
        self.push_approval(Approval::new(public_key, tagged_signature))
    }

    /// Attach an approval carried over from a serialized deploy, unverified.
    pub(crate) fn add_approval(&mut self, approval: Approval) -> Result<Accumulated, BuilderError> {
        self.push_approval(approval)
    }

    /// Check every approval against the deploy hash.
    pub fn verify_signatures(&self) -> Result<(), BuilderError> {
        for approval in self.deploy.approvals() {
            if !approval.verify(self.deploy.hash()) {
                return Err(BuilderError::Signing(format!(
                    "Invalid signature for signer {}",
                    approval.signer
                )));
            }
        }
        Ok(())
    }

    /// Gas settings recovered from the payment and header.
    pub fn fee(&self) -> Result<Fee, BuilderError> {
        let gas_limit = self
            .deploy
            .payment()
            .args()
            .require(ARG_AMOUNT)
            .and_then(|value| value.as_u512())
            .map_err(|e| BuilderError::Parse(format!("Invalid transaction: payment: {}", e)))?;
        Ok(Fee::new(gas_limit.to_string()).with_gas_price(self.deploy.header().gas_price.to_string()))
    }

    /// Flat JSON view.
    pub fn to_json(&self) -> Result<TxData, BuilderError> {
        let header = self.deploy.header();
        let fields = read_session(&self.deploy)?;
        let owners = match self.deploy_type {
            DeployType::WalletInitialization => {
                Some(fields.owners.iter().map(|o| o.to_hex()).collect())
            }
            _ => None,
        };
        Ok(TxData {
            hash: self.deploy.hash_hex(),
            fee: self.fee()?,
            from: header.account.to_hex(),
            start_time: format_timestamp(header.timestamp)?,
            expiration: header.ttl,
            deploy_type: self.deploy_type.to_string(),
            to: fields.to_address.map(|k| k.to_hex()),
            amount: fields.amount.map(|a| a.to_string()),
            transfer_id: fields.transfer_id,
            validator: fields.validator.map(|k| k.to_hex()),
            owners,
            contract_hash: match self.deploy_type {
                DeployType::ContractCall => fields.contract_hash.map(hex::encode),
                _ => None,
            },
            entry_point: match self.deploy_type {
                DeployType::ContractCall => fields.entry_point,
                _ => None,
            },
            approvals: self.deploy.approvals().to_vec(),
        })
    }
}

impl BaseTransaction for Transaction {
    type Fee = Fee;

    fn id(&self) -> String {
        self.deploy.hash_hex()
    }

    fn transaction_type(&self) -> TransactionType {
        self.deploy_type.transaction_type()
    }

    fn signers(&self) -> Vec<String> {
        self.deploy
            .approvals()
            .iter()
            .map(|a| a.signer.clone())
            .collect()
    }

    fn to_broadcast_format(&self) -> Result<String, BuilderError> {
        self.deploy.to_json()
    }

    fn explain(&self) -> Result<ExplainedTransaction<Fee>, BuilderError> {
        let data = self.to_json()?;
        let amount = data.amount.clone().unwrap_or_else(|| "0".to_string());
        let mut outputs = Vec::new();
        let mut operations = Vec::new();
        let mut output_amount = "0".to_string();
        match self.deploy_type {
            DeployType::Send => {
                outputs.push(ExplainedOutput {
                    address: data.to.clone().unwrap_or_default(),
                    amount: amount.clone(),
                    memo: data.transfer_id.map(|id| id.to_string()),
                });
                output_amount = amount;
            }
            DeployType::Delegate | DeployType::Undelegate | DeployType::WithdrawRewards => {
                let validator = data.validator.clone().unwrap_or_default();
                outputs.push(ExplainedOutput {
                    address: validator.clone(),
                    amount: amount.clone(),
                    memo: None,
                });
                operations.push(StakingOperation {
                    operation_type: self.transaction_type(),
                    validator,
                    amount: amount.clone(),
                });
                output_amount = amount;
            }
            DeployType::WalletInitialization | DeployType::ContractCall => {}
        }
        Ok(ExplainedTransaction {
            id: data.hash,
            outputs,
            output_amount,
            change_outputs: Vec::new(),
            change_amount: "0".to_string(),
            fee: data.fee,
            transaction_type: self.transaction_type(),
            operations,
        })
    }
}
