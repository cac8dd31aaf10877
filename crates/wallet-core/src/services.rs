//! Interfaces to the external services the builders rely on.
//!
//! Account lookup supplies header material (public key, sequence, balance)
//! and the broadcaster submits the serialized transaction. Both live outside
//! this crate; these traits are the seam.

use async_trait::async_trait;
use tracing::debug;

use crate::transaction::BaseTransaction;
use crate::BuilderError;

/// Account state returned by the lookup service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Address that was looked up.
    pub address: String,
    /// Public key material, hex-encoded in the chain's key format.
    pub public_key: String,
    /// Sequence number, for chains that use one.
    pub sequence: Option<u64>,
    /// Account number, for chains that use one.
    pub account_number: Option<u64>,
    /// Spendable balance in base units.
    pub balance: String,
}

/// Result of a successful broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastSuccess {
    /// The transaction id returned by the network.
    pub txid: String,
    /// Human-readable status message from the broadcaster.
    pub message: String,
}

/// Result of a failed broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BroadcastFailure {
    /// Machine-readable error code from the broadcaster.
    pub code: String,
    /// Human-readable description of the failure.
    pub description: String,
}

impl std::fmt::Display for BroadcastFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.description)
    }
}

impl std::error::Error for BroadcastFailure {}

impl From<BroadcastFailure> for BuilderError {
    fn from(failure: BroadcastFailure) -> Self {
        BuilderError::Service(failure.to_string())
    }
}

/// Looks up account state by address.
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Fetch account state for `address`.
    async fn account_info(&self, address: &str) -> Result<AccountInfo, BuilderError>;
}

/// Submits serialized transactions to the network.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Broadcast a transaction in its chain-native serialized form.
    ///
    /// # Returns
    /// `Ok(BroadcastSuccess)` on success, or `Err` containing the failure.
    async fn broadcast(&self, payload: &str) -> Result<BroadcastSuccess, BroadcastFailure>;
}

/// Serialize a signed transaction and hand it to the broadcaster.
///
/// # Arguments
/// * `tx` - A built transaction carrying at least one approval.
/// * `broadcaster` - The submission service.
///
/// # Returns
/// The broadcaster's success record, `BuildTransaction` for an unsigned
/// transaction, or `Service` when the broadcaster rejects it.
pub async fn submit_transaction<T, B>(tx: &T, broadcaster: &B) -> Result<BroadcastSuccess, BuilderError>
where
    T: BaseTransaction + Sync,
    B: Broadcaster + ?Sized,
{
    if tx.signers().is_empty() {
        return Err(BuilderError::BuildTransaction(
            "Invalid transaction: no approvals to broadcast".to_string(),
        ));
    }
    let payload = tx.to_broadcast_format()?;
    debug!(id = %tx.id(), bytes = payload.len(), "broadcasting transaction");
    let success = broadcaster.broadcast(&payload).await?;
    debug!(txid = %success.txid, "broadcast accepted");
    Ok(success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{ExplainedTransaction, TransactionType};
    use std::sync::Mutex;

    struct FakeTx {
        signers: Vec<String>,
    }

    impl BaseTransaction for FakeTx {
        type Fee = String;

        fn id(&self) -> String {
            "feed".to_string()
        }

        fn transaction_type(&self) -> TransactionType {
            TransactionType::Send
        }

        fn signers(&self) -> Vec<String> {
            self.signers.clone()
        }

        fn to_broadcast_format(&self) -> Result<String, BuilderError> {
            Ok("{\"tx\":\"feed\"}".to_string())
        }

        fn explain(&self) -> Result<ExplainedTransaction<String>, BuilderError> {
            Err(BuilderError::Parse("not needed".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingBroadcaster {
        payloads: Mutex<Vec<String>>,
        reject: bool,
    }

    #[async_trait]
    impl Broadcaster for RecordingBroadcaster {
        async fn broadcast(&self, payload: &str) -> Result<BroadcastSuccess, BroadcastFailure> {
            self.payloads.lock().unwrap().push(payload.to_string());
            if self.reject {
                return Err(BroadcastFailure {
                    code: "400".to_string(),
                    description: "invalid deploy".to_string(),
                });
            }
            Ok(BroadcastSuccess {
                txid: "feed".to_string(),
                message: "accepted".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_submit_hands_broadcast_format_to_broadcaster() {
        let tx = FakeTx { signers: vec!["signer".to_string()] };
        let broadcaster = RecordingBroadcaster::default();
        let success = submit_transaction(&tx, &broadcaster).await.unwrap();
        assert_eq!(success.txid, "feed");
        assert_eq!(broadcaster.payloads.lock().unwrap().as_slice(), ["{\"tx\":\"feed\"}"]);
    }

    #[tokio::test]
    async fn test_submit_rejects_unsigned_transaction() {
        let tx = FakeTx { signers: vec![] };
        let broadcaster = RecordingBroadcaster::default();
        let err = submit_transaction(&tx, &broadcaster).await.unwrap_err();
        assert!(matches!(err, BuilderError::BuildTransaction(_)));
        assert!(broadcaster.payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_submit_surfaces_broadcast_failure() {
        let tx = FakeTx { signers: vec!["signer".to_string()] };
        let broadcaster = RecordingBroadcaster { reject: true, ..Default::default() };
        let err = submit_transaction(&tx, &broadcaster).await.unwrap_err();
        assert_eq!(err.to_string(), "service error: 400: invalid deploy");
    }
}
