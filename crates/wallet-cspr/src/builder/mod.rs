//! Deploy builders.
//!
//! Every builder shares one state machine, `DeployBuilder<K>`, parameterized
//! by a `SessionKind` that owns the fields and session layout of one deploy
//! type. Common setters (fee, source, expiration, signers) and the
//! `TransactionBuilder` contract live here; kind-specific setters are
//! inherent methods on the concrete aliases.

mod contract_call;
mod staking;
mod transfer;
mod wallet_initialization;

use std::fmt;

use tracing::{debug, warn};
use wallet_core::services::AccountLookup;
use wallet_core::{Accumulated, BuilderError, SignatureAccumulator, SignerEntry, TransactionBuilder};

use crate::deploy::{now_millis, Approval, Deploy, DeployParams, ExecutableDeployItem};
use crate::keys::{CsprPublicKey, KeyPair, SECP256K1_TAG, SIGNATURE_LEN};
use crate::network::CsprNetwork;
use crate::session::{read_session, DeployType, SessionFields};
use crate::transaction::{check_signer_encoding, Fee, Transaction};

pub use contract_call::ContractCallKind;
pub use staking::{
    DelegateKind, DelegateOp, StakingKind, StakingOp, UndelegateKind, UndelegateOp,
    WithdrawRewardsKind, WithdrawRewardsOp,
};
pub use transfer::TransferKind;
pub use wallet_initialization::WalletInitializationKind;

/// Builds native transfers.
pub type TransferBuilder = DeployBuilder<TransferKind>;
/// Builds the multisig wallet setup deploy.
pub type WalletInitializationBuilder = DeployBuilder<WalletInitializationKind>;
/// Builds auction `delegate` calls.
pub type DelegateBuilder = DeployBuilder<DelegateKind>;
/// Builds auction `undelegate` calls.
pub type UndelegateBuilder = DeployBuilder<UndelegateKind>;
/// Builds reward withdrawals.
pub type WithdrawRewardsBuilder = DeployBuilder<WithdrawRewardsKind>;
/// Builds calls to a stored contract.
pub type ContractCallBuilder = DeployBuilder<ContractCallKind>;

/// Fields and session layout of one deploy type.
pub trait SessionKind: Clone + Default + fmt::Debug {
    /// Deploy type this kind builds.
    const DEPLOY_TYPE: DeployType;

    /// Check kind-specific mandatory fields, in priority order.
    fn validate_fields(&self) -> Result<(), BuilderError>;

    /// Assemble the session item.
    fn session(
        &self,
        source: &CsprPublicKey,
        network: &CsprNetwork,
    ) -> Result<ExecutableDeployItem, BuilderError>;

    /// Restore fields from a decoded session.
    fn load(
        &mut self,
        fields: SessionFields,
        source: &CsprPublicKey,
        network: &CsprNetwork,
    ) -> Result<(), BuilderError>;
}

/// A signer queued on a builder, applied at `build()`.
#[derive(Clone, Debug)]
pub enum PendingSignature {
    /// Carried over from a serialized deploy.
    Approved(Approval),
    /// Signs with a local key at build time.
    Local(KeyPair),
    /// Signature produced elsewhere. Checked on arrival once the deploy hash
    /// is settled, otherwise at build time, where a failure removes it.
    External {
        /// Key the signature claims to come from.
        public_key: CsprPublicKey,
        /// Tagged signature bytes.
        signature: Vec<u8>,
    },
}

impl SignerEntry for PendingSignature {
    fn signer_id(&self) -> Vec<u8> {
        match self {
            PendingSignature::Approved(approval) => approval.signer_id(),
            PendingSignature::Local(key) => key.cspr_public_key().raw_bytes(),
            PendingSignature::External { public_key, .. } => public_key.raw_bytes(),
        }
    }
}

fn missing(field: &str) -> BuilderError {
    BuilderError::BuildTransaction(format!("Invalid transaction: missing {}", field))
}

/// Builder state shared by every deploy type.
#[derive(Clone, Debug)]
pub struct DeployBuilder<K: SessionKind> {
    network: CsprNetwork,
    fee: Option<Fee>,
    source: Option<CsprPublicKey>,
    chain_name: String,
    ttl: u64,
    timestamp: Option<u64>,
    signers: SignatureAccumulator<PendingSignature>,
    loaded_hash: Option<[u8; 32]>,
    kind: K,
}

impl<K: SessionKind> DeployBuilder<K> {
    /// An empty builder for `network`.
    pub fn new(network: CsprNetwork) -> Self {
        DeployBuilder {
            chain_name: network.chain_name().to_string(),
            ttl: network.default_ttl_ms,
            signers: SignatureAccumulator::new(network.max_signers()),
            network,
            fee: None,
            source: None,
            timestamp: None,
            loaded_hash: None,
            kind: K::default(),
        }
    }

    /// Network presets this builder was created with.
    pub fn network(&self) -> &CsprNetwork {
        &self.network
    }

    /// The deploy type this builder produces.
    pub fn deploy_type(&self) -> DeployType {
        K::DEPLOY_TYPE
    }

    pub(crate) fn kind(&self) -> &K {
        &self.kind
    }

    pub(crate) fn kind_mut(&mut self) -> &mut K {
        &mut self.kind
    }

    /// Set the deploy TTL in milliseconds.
    ///
    /// # Returns
    /// `InvalidParameterValue` unless `1 <= ttl_ms <= max_ttl_ms`.
    pub fn expiration(&mut self, ttl_ms: u64) -> Result<&mut Self, BuilderError> {
        if ttl_ms == 0 || ttl_ms > self.network.max_ttl_ms {
            return Err(BuilderError::InvalidParameterValue(format!(
                "Invalid expiration: {} must be between 1 and {} ms",
                ttl_ms, self.network.max_ttl_ms
            )));
        }
        self.ttl = ttl_ms;
        Ok(self)
    }

    /// Fix the header timestamp (milliseconds since the epoch).
    ///
    /// Without it the first `build()` stamps the current time and keeps it.
    pub fn timestamp(&mut self, millis: u64) -> &mut Self {
        self.timestamp = Some(millis);
        self
    }

    /// Override the chain name written to the header.
    pub fn node_chain_name(&mut self, chain_name: &str) -> Result<&mut Self, BuilderError> {
        if chain_name.is_empty() {
            return Err(BuilderError::InvalidParameterValue(
                "Invalid chain name: empty".to_string(),
            ));
        }
        self.chain_name = chain_name.to_string();
        Ok(self)
    }

    /// Set the source from the account lookup service.
    pub async fn source_from_account<L>(
        &mut self,
        lookup: &L,
        address: &str,
    ) -> Result<&mut Self, BuilderError>
    where
        L: AccountLookup + ?Sized,
    {
        let info = lookup.account_info(address).await?;
        let key = CsprPublicKey::from_hex(&info.public_key).map_err(|e| {
            BuilderError::Service(format!("account {} has an invalid public key: {}", address, e))
        })?;
        debug!(address, public_key = %key, "resolved source account");
        self.source = Some(key);
        Ok(self)
    }

    fn approved(&self) -> impl Iterator<Item = &Approval> {
        self.signers.entries().iter().filter_map(|p| match p {
            PendingSignature::Approved(approval) => Some(approval),
            _ => None,
        })
    }

    fn queue(&mut self, pending: PendingSignature) -> Result<&mut Self, BuilderError> {
        if let Accumulated::Duplicate = self.signers.push(pending)? {
            debug!("signer already queued");
        }
        Ok(self)
    }

    fn assemble(&self, timestamp: u64) -> Result<Deploy, BuilderError> {
        let fee = self.fee.as_ref().ok_or_else(|| missing("fee"))?;
        let source = self.source.as_ref().ok_or_else(|| missing("source"))?;
        let session = self.kind.session(source, &self.network)?;
        let payment = ExecutableDeployItem::standard_payment(&fee.gas_limit_value()?)?;
        Deploy::new(
            DeployParams {
                account: source.clone(),
                timestamp,
                ttl: self.ttl,
                gas_price: fee.gas_price_value(self.network.default_gas_price)?,
                chain_name: self.chain_name.clone(),
            },
            payment,
            session,
        )
    }

    /// Hash of the deploy `build()` would produce now, if already decided:
    /// the timestamp is pinned and every mandatory field is set.
    fn pinned_hash(&self) -> Option<[u8; 32]> {
        let timestamp = self.timestamp?;
        self.validate_mandatory_fields().ok()?;
        self.assemble(timestamp).ok().map(|deploy| *deploy.hash())
    }

    fn parse(&self, raw: &str) -> Result<Transaction, BuilderError> {
        let tx = Transaction::from_raw(raw, self.network.max_signers())?;
        if tx.deploy_type() != K::DEPLOY_TYPE {
            return Err(BuilderError::Parse(format!(
                "Invalid transaction: expected a {} deploy, found {}",
                K::DEPLOY_TYPE,
                tx.deploy_type()
            )));
        }
        Ok(tx)
    }

    /// Replace all state with the contents of a parsed transaction.
    ///
    /// The deploy is rebuilt from the loaded fields and must hash to the
    /// same value, so anything this builder would not reproduce is rejected.
    pub(crate) fn load(&mut self, tx: &Transaction) -> Result<(), BuilderError> {
        let deploy = tx.deploy();
        let header = deploy.header();
        if !header.dependencies.is_empty() {
            return Err(BuilderError::Parse(
                "Invalid transaction: header.dependencies: not supported".to_string(),
            ));
        }

        let mut loaded = Self::new(self.network.clone());
        loaded.fee(tx.fee()?)?;
        loaded.source = Some(header.account.clone());
        loaded
            .expiration(header.ttl)
            .map_err(|e| BuilderError::Parse(format!("Invalid transaction: header.ttl: {}", e)))?;
        loaded
            .node_chain_name(&header.chain_name)
            .map_err(|e| BuilderError::Parse(format!("Invalid transaction: header.chain_name: {}", e)))?;
        loaded.timestamp = Some(header.timestamp);
        loaded
            .kind
            .load(read_session(deploy)?, &header.account, &self.network)?;
        loaded.signers = SignatureAccumulator::with_entries(
            self.network.max_signers(),
            deploy
                .approvals()
                .iter()
                .cloned()
                .map(PendingSignature::Approved),
        )?;
        loaded.loaded_hash = Some(*deploy.hash());

        let rebuilt = loaded.assemble(header.timestamp)?;
        if rebuilt.hash() != deploy.hash() {
            return Err(BuilderError::Parse(
                "Invalid transaction: deploy layout is not supported by this builder".to_string(),
            ));
        }
        *self = loaded;
        Ok(())
    }
}

impl<K: SessionKind> TransactionBuilder for DeployBuilder<K> {
    type Fee = Fee;
    type KeyPair = KeyPair;
    type Transaction = Transaction;

    fn fee(&mut self, fee: Fee) -> Result<&mut Self, BuilderError> {
        fee.gas_limit_value()?;
        fee.gas_price_value(self.network.default_gas_price)?;
        self.fee = Some(fee);
        Ok(self)
    }

    fn source(&mut self, address: &str) -> Result<&mut Self, BuilderError> {
        let key = CsprPublicKey::from_hex(address).map_err(|e| {
            BuilderError::InvalidParameterValue(format!("Invalid source address: {}", e))
        })?;
        self.source = Some(key);
        Ok(self)
    }

    fn sign(&mut self, key: &KeyPair) -> Result<&mut Self, BuilderError> {
        if !key.has_private_key() {
            return Err(BuilderError::Signing("Missing private key".to_string()));
        }
        check_signer_encoding(self.approved(), &key.cspr_public_key())?;
        self.queue(PendingSignature::Local(key.clone()))
    }

    fn signature(&mut self, signature: &str, key: &KeyPair) -> Result<&mut Self, BuilderError> {
        let bytes = hex::decode(signature).map_err(|_| {
            BuilderError::InvalidParameterValue(format!("Invalid signature: {}", signature))
        })?;
        let tagged = match bytes.len() {
            SIGNATURE_LEN => [vec![SECP256K1_TAG], bytes].concat(),
            len if len == SIGNATURE_LEN + 1 && bytes[0] == SECP256K1_TAG => bytes,
            _ => {
                return Err(BuilderError::InvalidParameterValue(format!(
                    "Invalid signature: {}",
                    signature
                )));
            }
        };
        let public_key = key.cspr_public_key();
        check_signer_encoding(self.approved(), &public_key)?;
        if let Some(hash) = self.pinned_hash() {
            if !public_key.verify(&hash, &tagged) {
                return Err(BuilderError::Signing(format!(
                    "Invalid signature for signer {}",
                    public_key
                )));
            }
        }
        self.queue(PendingSignature::External {
            public_key,
            signature: tagged,
        })
    }

    fn validate_mandatory_fields(&self) -> Result<(), BuilderError> {
        if self.fee.is_none() {
            return Err(missing("fee"));
        }
        if self.source.is_none() {
            return Err(missing("source"));
        }
        self.kind.validate_fields()
    }

    fn validate_raw_transaction(&self, raw: &str) -> Result<(), BuilderError> {
        self.parse(raw).map(|_| ())
    }

    fn build(&mut self) -> Result<Transaction, BuilderError> {
        self.validate_mandatory_fields()?;
        let timestamp = *self.timestamp.get_or_insert_with(now_millis);
        let deploy = self.assemble(timestamp)?;

        if let Some(loaded) = self.loaded_hash {
            if loaded != *deploy.hash() {
                warn!(
                    previous = %hex::encode(loaded),
                    current = %deploy.hash_hex(),
                    "deploy changed after loading, dropping carried-over approvals"
                );
                self.signers
                    .retain(|p| !matches!(p, PendingSignature::Approved(_)));
                self.loaded_hash = None;
            }
        }

        let mut tx = Transaction::new(deploy, self.network.max_signers())?;
        let mut rejected = None;
        for pending in self.signers.entries() {
            match pending {
                PendingSignature::Approved(approval) => tx.add_approval(approval.clone())?,
                PendingSignature::Local(key) => tx.sign(key)?,
                PendingSignature::External {
                    public_key,
                    signature,
                } => match tx.add_signature(public_key, signature) {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        rejected = Some((pending.signer_id(), e));
                        break;
                    }
                },
            };
        }
        // A signature that does not verify leaves the queue, freeing its slot
        // for a corrected one.
        if let Some((signer_id, e)) = rejected {
            warn!(signer = %hex::encode(&signer_id), "dropping external signature: {}", e);
            self.signers.retain(|p| p.signer_id() != signer_id);
            return Err(e);
        }
        debug!(
            deploy_type = %K::DEPLOY_TYPE,
            hash = %tx.deploy().hash_hex(),
            approvals = tx.approvals().len(),
            "built deploy"
        );
        Ok(tx)
    }

    fn from_raw(&mut self, raw: &str) -> Result<&mut Self, BuilderError> {
        let tx = self.parse(raw)?;
        self.load(&tx)?;
        Ok(self)
    }
}
