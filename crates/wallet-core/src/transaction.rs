//! Chain-agnostic view of a built transaction.
//!
//! `ExplainedTransaction` is the display contract consumed by balance and
//! history tooling: normalized outputs, total output, fee and a type
//! discriminant. Each chain's transaction type implements `BaseTransaction`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::BuilderError;

/// Kind of operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Value transfer to another account.
    Send,
    /// Creation of a multisig wallet.
    WalletInitialization,
    /// Delegation of stake to a validator.
    StakingLock,
    /// Removal of delegated stake.
    StakingUnlock,
    /// Withdrawal of staking rewards.
    StakingWithdraw,
    /// Invocation of a deployed contract.
    ContractCall,
}

impl TransactionType {
    /// Whether this type operates on a validator's stake.
    pub fn is_staking(&self) -> bool {
        matches!(
            self,
            TransactionType::StakingLock | TransactionType::StakingUnlock | TransactionType::StakingWithdraw
        )
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransactionType::Send => "Send",
            TransactionType::WalletInitialization => "WalletInitialization",
            TransactionType::StakingLock => "StakingLock",
            TransactionType::StakingUnlock => "StakingUnlock",
            TransactionType::StakingWithdraw => "StakingWithdraw",
            TransactionType::ContractCall => "ContractCall",
        };
        write!(f, "{}", name)
    }
}

/// One normalized output of an explained transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplainedOutput {
    /// Destination address.
    pub address: String,
    /// Amount in base units.
    pub amount: String,
    /// Memo or transfer id attached to the output.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,
}

/// A staking action carried by the transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingOperation {
    /// Staking transaction type.
    #[serde(rename = "type")]
    pub operation_type: TransactionType,
    /// Validator the stake moves to or from.
    pub validator: String,
    /// Amount in base units.
    pub amount: String,
}

/// The explain-transaction view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplainedTransaction<F> {
    /// Transaction id/hash.
    pub id: String,
    /// Value-carrying outputs.
    pub outputs: Vec<ExplainedOutput>,
    /// Sum of output amounts.
    pub output_amount: String,
    /// Change outputs (account-model chains have none).
    pub change_outputs: Vec<ExplainedOutput>,
    /// Sum of change amounts.
    pub change_amount: String,
    /// Chain-specific fee description.
    pub fee: F,
    /// Transaction type discriminant.
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Staking actions, empty for non-staking transactions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub operations: Vec<StakingOperation>,
}

/// Behaviour shared by every built transaction.
pub trait BaseTransaction {
    /// Chain-specific fee description used in explain output.
    type Fee: Serialize + Clone;

    /// Transaction id (content hash, hex).
    fn id(&self) -> String;

    /// Transaction type discriminant.
    fn transaction_type(&self) -> TransactionType;

    /// Addresses of the keys that have approved this transaction, in order.
    fn signers(&self) -> Vec<String>;

    /// Chain-native serialization handed to the broadcast service.
    fn to_broadcast_format(&self) -> Result<String, BuilderError>;

    /// Display-oriented summary of the transaction.
    fn explain(&self) -> Result<ExplainedTransaction<Self::Fee>, BuilderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explained_transaction_json_shape() {
        let explained = ExplainedTransaction {
            id: "ab".to_string(),
            outputs: vec![ExplainedOutput {
                address: "dest".to_string(),
                amount: "10".to_string(),
                memo: Some("7".to_string()),
            }],
            output_amount: "10".to_string(),
            change_outputs: vec![],
            change_amount: "0".to_string(),
            fee: "1".to_string(),
            transaction_type: TransactionType::Send,
            operations: vec![],
        };
        let json = serde_json::to_value(&explained).unwrap();
        assert_eq!(json["outputAmount"], "10");
        assert_eq!(json["changeAmount"], "0");
        assert_eq!(json["type"], "Send");
        assert_eq!(json["outputs"][0]["memo"], "7");
        assert!(json.get("operations").is_none());
    }

    #[test]
    fn test_staking_types() {
        assert!(TransactionType::StakingLock.is_staking());
        assert!(TransactionType::StakingWithdraw.is_staking());
        assert!(!TransactionType::Send.is_staking());
        assert_eq!(TransactionType::WalletInitialization.to_string(), "WalletInitialization");
    }
}
