//! Session layouts for each supported deploy type.
//!
//! Every session carries a `deploy_type` string argument naming the
//! operation, so a serialized deploy can be classified without guessing from
//! its shape. The builders assemble sessions here and `read_session` takes
//! them apart again for rehydration and display.

use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;
use wallet_core::{BuilderError, TransactionType};

use crate::clvalue::CLValue;
use crate::deploy::{Deploy, ExecutableDeployItem, RuntimeArgs, ARG_AMOUNT};
use crate::keys::CsprPublicKey;

/// Session argument naming the [`DeployType`].
pub const ARG_DEPLOY_TYPE: &str = "deploy_type";
/// Transfer recipient argument.
pub const ARG_TARGET: &str = "target";
/// Transfer id argument.
pub const ARG_ID: &str = "id";
/// Recipient address as a string, written alongside `target`.
pub const ARG_TO_ADDRESS: &str = "to_address";
/// Auction delegator argument.
pub const ARG_DELEGATOR: &str = "delegator";
/// Auction validator argument.
pub const ARG_VALIDATOR: &str = "validator";
/// Prefix of the numbered owner arguments (`owner_0`, ...).
pub const ARG_OWNER_PREFIX: &str = "owner_";

/// Auction entry point of a delegation.
pub const ENTRY_DELEGATE: &str = "delegate";
/// Auction entry point of undelegations and reward withdrawals.
pub const ENTRY_UNDELEGATE: &str = "undelegate";

fn invalid(reason: impl fmt::Display) -> BuilderError {
    BuilderError::Parse(format!("Invalid transaction: {}", reason))
}

/// Operation tag stored in the `deploy_type` session argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeployType {
    /// Native transfer.
    Send,
    /// Installs the multisig wallet contract.
    WalletInitialization,
    /// Auction `delegate`.
    Delegate,
    /// Auction `undelegate`.
    Undelegate,
    /// Auction `undelegate` used to pull rewards.
    WithdrawRewards,
    /// Any other stored-contract call.
    ContractCall,
}

impl DeployType {
    /// Name written to the `deploy_type` argument.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployType::Send => "Send",
            DeployType::WalletInitialization => "WalletInitialization",
            DeployType::Delegate => "Delegate",
            DeployType::Undelegate => "Undelegate",
            DeployType::WithdrawRewards => "WithdrawRewards",
            DeployType::ContractCall => "ContractCall",
        }
    }

    /// The chain-agnostic type this deploy type reports.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            DeployType::Send => TransactionType::Send,
            DeployType::WalletInitialization => TransactionType::WalletInitialization,
            DeployType::Delegate => TransactionType::StakingLock,
            DeployType::Undelegate => TransactionType::StakingUnlock,
            DeployType::WithdrawRewards => TransactionType::StakingWithdraw,
            DeployType::ContractCall => TransactionType::ContractCall,
        }
    }

    /// Auction entry point used by staking deploy types.
    pub fn auction_entry_point(&self) -> Option<&'static str> {
        match self {
            DeployType::Delegate => Some(ENTRY_DELEGATE),
            DeployType::Undelegate | DeployType::WithdrawRewards => Some(ENTRY_UNDELEGATE),
            _ => None,
        }
    }
}

impl FromStr for DeployType {
    type Err = BuilderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Send" => Ok(DeployType::Send),
            "WalletInitialization" => Ok(DeployType::WalletInitialization),
            "Delegate" => Ok(DeployType::Delegate),
            "Undelegate" => Ok(DeployType::Undelegate),
            "WithdrawRewards" => Ok(DeployType::WithdrawRewards),
            "ContractCall" => Ok(DeployType::ContractCall),
            other => Err(invalid(format!("unknown deploy type {}", other))),
        }
    }
}

impl fmt::Display for DeployType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn deploy_type_arg(deploy_type: DeployType) -> Result<CLValue, BuilderError> {
    CLValue::string(deploy_type.as_str())
}

// ---------------------------------------------------------------------------
// Session assembly
// ---------------------------------------------------------------------------

/// Native transfer session.
pub fn transfer_session(
    amount: &BigUint,
    target: &CsprPublicKey,
    transfer_id: Option<u64>,
) -> Result<ExecutableDeployItem, BuilderError> {
    let mut args = RuntimeArgs::new();
    args.insert(ARG_AMOUNT, CLValue::u512(amount)?)?;
    args.insert(ARG_TARGET, CLValue::public_key(target))?;
    args.insert(ARG_ID, CLValue::option_u64(transfer_id))?;
    args.insert(ARG_TO_ADDRESS, CLValue::string(&target.to_hex())?)?;
    args.insert(ARG_DEPLOY_TYPE, deploy_type_arg(DeployType::Send)?)?;
    Ok(ExecutableDeployItem::Transfer { args })
}

/// Wallet initialization session: the configured wasm plus one argument per
/// owner, in order.
pub fn wallet_init_session(
    contract: Vec<u8>,
    owners: &[CsprPublicKey],
) -> Result<ExecutableDeployItem, BuilderError> {
    let mut args = RuntimeArgs::new();
    for (i, owner) in owners.iter().enumerate() {
        args.insert(&format!("{}{}", ARG_OWNER_PREFIX, i), CLValue::public_key(owner))?;
    }
    args.insert(
        ARG_DEPLOY_TYPE,
        deploy_type_arg(DeployType::WalletInitialization)?,
    )?;
    Ok(ExecutableDeployItem::ModuleBytes {
        module_bytes: contract,
        args,
    })
}

/// Auction call for delegate, undelegate and reward withdrawal.
pub fn staking_session(
    deploy_type: DeployType,
    auction: [u8; 32],
    delegator: &CsprPublicKey,
    validator: &CsprPublicKey,
    amount: &BigUint,
) -> Result<ExecutableDeployItem, BuilderError> {
    let entry_point = deploy_type.auction_entry_point().ok_or_else(|| {
        BuilderError::BuildTransaction(format!("{} is not a staking deploy type", deploy_type))
    })?;
    let mut args = RuntimeArgs::new();
    args.insert(ARG_DELEGATOR, CLValue::public_key(delegator))?;
    args.insert(ARG_VALIDATOR, CLValue::public_key(validator))?;
    args.insert(ARG_AMOUNT, CLValue::u512(amount)?)?;
    args.insert(ARG_DEPLOY_TYPE, deploy_type_arg(deploy_type)?)?;
    Ok(ExecutableDeployItem::StoredContractByHash {
        hash: auction,
        entry_point: entry_point.to_string(),
        args,
    })
}

/// Call of an arbitrary stored contract. `deploy_type` is appended to the
/// caller's arguments.
pub fn contract_call_session(
    hash: [u8; 32],
    entry_point: &str,
    user_args: &RuntimeArgs,
) -> Result<ExecutableDeployItem, BuilderError> {
    let mut args = user_args.clone();
    args.insert(ARG_DEPLOY_TYPE, deploy_type_arg(DeployType::ContractCall)?)
        .map_err(|_| {
            BuilderError::InvalidParameterValue(format!(
                "{} is a reserved argument name",
                ARG_DEPLOY_TYPE
            ))
        })?;
    Ok(ExecutableDeployItem::StoredContractByHash {
        hash,
        entry_point: entry_point.to_string(),
        args,
    })
}

// ---------------------------------------------------------------------------
// Session decoding
// ---------------------------------------------------------------------------

/// Fields recovered from a deploy's session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionFields {
    pub deploy_type: DeployType,
    /// Transfer recipient.
    pub to_address: Option<CsprPublicKey>,
    /// Transfer or stake amount in motes.
    pub amount: Option<BigUint>,
    pub transfer_id: Option<u64>,
    /// Auction delegator.
    pub delegator: Option<CsprPublicKey>,
    pub validator: Option<CsprPublicKey>,
    /// Wallet initialization owners, in argument order.
    pub owners: Vec<CsprPublicKey>,
    /// Stored contract of a contract call or staking deploy.
    pub contract_hash: Option<[u8; 32]>,
    pub entry_point: Option<String>,
    /// Caller arguments of a contract call, without `deploy_type`.
    pub contract_args: Option<RuntimeArgs>,
    /// Wasm of a wallet initialization.
    pub module_bytes: Option<Vec<u8>>,
}

impl SessionFields {
    fn empty(deploy_type: DeployType) -> Self {
        SessionFields {
            deploy_type,
            to_address: None,
            amount: None,
            transfer_id: None,
            delegator: None,
            validator: None,
            owners: Vec::new(),
            contract_hash: None,
            entry_point: None,
            contract_args: None,
            module_bytes: None,
        }
    }
}

fn arg<'a>(args: &'a RuntimeArgs, name: &str) -> Result<&'a CLValue, BuilderError> {
    args.require(name).map_err(|e| invalid(format!("session: {}", e)))
}

fn arg_error(name: &str) -> impl Fn(BuilderError) -> BuilderError + '_ {
    move |e| invalid(format!("{}: {}", name, e))
}

/// Classify a deploy by its `deploy_type` argument.
pub fn deploy_type_of(deploy: &Deploy) -> Result<DeployType, BuilderError> {
    let session = deploy.session();
    let deploy_type: DeployType = arg(session.args(), ARG_DEPLOY_TYPE)?
        .as_string()
        .map_err(arg_error(ARG_DEPLOY_TYPE))?
        .parse()?;
    let expected_kind = match deploy_type {
        DeployType::Send => "Transfer",
        DeployType::WalletInitialization => "ModuleBytes",
        _ => "StoredContractByHash",
    };
    if session.kind() != expected_kind {
        return Err(invalid(format!(
            "{} deploy must use a {} session, found {}",
            deploy_type,
            expected_kind,
            session.kind()
        )));
    }
    Ok(deploy_type)
}

/// Decode the session of `deploy` according to its deploy type.
pub fn read_session(deploy: &Deploy) -> Result<SessionFields, BuilderError> {
    let deploy_type = deploy_type_of(deploy)?;
    let mut fields = SessionFields::empty(deploy_type);
    match deploy.session() {
        ExecutableDeployItem::Transfer { args } => {
            fields.amount = Some(arg(args, ARG_AMOUNT)?.as_u512().map_err(arg_error(ARG_AMOUNT))?);
            let target = arg(args, ARG_TARGET)?
                .as_public_key()
                .map_err(arg_error(ARG_TARGET))?;
            fields.transfer_id = arg(args, ARG_ID)?
                .as_option_u64()
                .map_err(arg_error(ARG_ID))?;
            let to_address = arg(args, ARG_TO_ADDRESS)?
                .as_string()
                .map_err(arg_error(ARG_TO_ADDRESS))?;
            if to_address.is_empty() {
                return Err(invalid("to_address is empty"));
            }
            let to_key = CsprPublicKey::from_hex(&to_address).map_err(arg_error(ARG_TO_ADDRESS))?;
            if to_key != target {
                return Err(invalid("to_address does not match target"));
            }
            fields.to_address = Some(to_key);
        }
        ExecutableDeployItem::ModuleBytes { module_bytes, args } => {
            for (i, (name, value)) in args.iter().filter(|(n, _)| *n != ARG_DEPLOY_TYPE).enumerate() {
                let expected = format!("{}{}", ARG_OWNER_PREFIX, i);
                if name != expected {
                    return Err(invalid(format!(
                        "session: unexpected argument {}, expected {}",
                        name, expected
                    )));
                }
                fields.owners.push(value.as_public_key().map_err(arg_error(name))?);
            }
            fields.module_bytes = Some(module_bytes.clone());
        }
        ExecutableDeployItem::StoredContractByHash {
            hash,
            entry_point,
            args,
        } => {
            fields.contract_hash = Some(*hash);
            fields.entry_point = Some(entry_point.clone());
            if let Some(expected) = deploy_type.auction_entry_point() {
                if entry_point != expected {
                    return Err(invalid(format!(
                        "{} deploy must call {}, found {}",
                        deploy_type, expected, entry_point
                    )));
                }
                fields.delegator = Some(
                    arg(args, ARG_DELEGATOR)?
                        .as_public_key()
                        .map_err(arg_error(ARG_DELEGATOR))?,
                );
                fields.validator = Some(
                    arg(args, ARG_VALIDATOR)?
                        .as_public_key()
                        .map_err(arg_error(ARG_VALIDATOR))?,
                );
                fields.amount = Some(arg(args, ARG_AMOUNT)?.as_u512().map_err(arg_error(ARG_AMOUNT))?);
            } else {
                let mut user_args = RuntimeArgs::new();
                for (name, value) in args.iter().filter(|(n, _)| *n != ARG_DEPLOY_TYPE) {
                    user_args.insert(name, value.clone())?;
                }
                fields.contract_args = Some(user_args);
            }
        }
    }
    Ok(fields)
}
