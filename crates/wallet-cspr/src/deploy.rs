//! The Casper deploy: header, payment and session items, approvals.
//!
//! Hashing uses the bytesrepr encoding: `body_hash` is
//! `blake2b256(payment || session)` and the deploy hash is
//! `blake2b256(header)`. Approvals are outside both hashes. The broadcast
//! format is the node's JSON rendering, wrapped as `{"deploy": {...}}`.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use num_bigint::BigUint;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use wallet_core::{BuilderError, SignerEntry};
use wallet_primitives::hash::blake2b256;
use wallet_primitives::util::ByteWriter;

use crate::bytesrepr::{length_u32, write_prefixed_bytes, write_string};
use crate::clvalue::{CLValue, JsonCLValue};
use crate::keys::CsprPublicKey;

/// Name of the payment amount argument.
pub const ARG_AMOUNT: &str = "amount";

const TAG_MODULE_BYTES: u8 = 0;
const TAG_STORED_CONTRACT_BY_HASH: u8 = 1;
const TAG_TRANSFER: u8 = 5;

fn invalid(field: &str, reason: impl fmt::Display) -> BuilderError {
    BuilderError::Parse(format!("Invalid transaction: {}: {}", field, reason))
}

// ---------------------------------------------------------------------------
// Runtime arguments
// ---------------------------------------------------------------------------

/// Ordered named arguments. Order is part of the hash.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeArgs(Vec<(String, CLValue)>);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct JsonNamedArg(String, JsonCLValue);

impl RuntimeArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    ///
    /// # Returns
    /// `InvalidParameterValue` if the name is already present.
    pub fn insert(&mut self, name: &str, value: CLValue) -> Result<(), BuilderError> {
        if self.get(name).is_some() {
            return Err(BuilderError::InvalidParameterValue(format!(
                "duplicate argument {}",
                name
            )));
        }
        self.0.push((name.to_string(), value));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CLValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// The named argument, or `Parse` if absent.
    pub fn require(&self, name: &str) -> Result<&CLValue, BuilderError> {
        self.get(name)
            .ok_or_else(|| BuilderError::Parse(format!("missing argument {}", name)))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CLValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), BuilderError> {
        writer.write_u32_le(length_u32(self.0.len())?);
        for (name, value) in &self.0 {
            write_string(writer, name)?;
            value.write_bytes(writer)?;
        }
        Ok(())
    }

    fn to_json(&self) -> Result<Vec<JsonNamedArg>, BuilderError> {
        self.0
            .iter()
            .map(|(name, value)| Ok(JsonNamedArg(name.clone(), value.to_json()?)))
            .collect()
    }

    fn from_json(args: &[JsonNamedArg]) -> Result<Self, BuilderError> {
        let mut out = RuntimeArgs::new();
        for JsonNamedArg(name, value) in args {
            let value = CLValue::from_json(value)
                .map_err(|e| BuilderError::Parse(format!("argument {}: {}", name, e)))?;
            out.insert(name, value)
                .map_err(|e| BuilderError::Parse(e.to_string()))?;
        }
        Ok(out)
    }
}

// ---------------------------------------------------------------------------
// Executable items
// ---------------------------------------------------------------------------

/// Payment or session code of a deploy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutableDeployItem {
    /// Wasm shipped inline. An empty module selects standard payment.
    ModuleBytes {
        module_bytes: Vec<u8>,
        args: RuntimeArgs,
    },
    /// Entry point of a contract installed on chain.
    StoredContractByHash {
        hash: [u8; 32],
        entry_point: String,
        args: RuntimeArgs,
    },
    /// Native transfer.
    Transfer { args: RuntimeArgs },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
enum JsonExecutableDeployItem {
    ModuleBytes {
        module_bytes: String,
        args: Vec<JsonNamedArg>,
    },
    StoredContractByHash {
        hash: String,
        entry_point: String,
        args: Vec<JsonNamedArg>,
    },
    Transfer {
        args: Vec<JsonNamedArg>,
    },
}

impl ExecutableDeployItem {
    /// Standard payment: empty module with `amount` set to the gas limit.
    pub fn standard_payment(gas_limit: &BigUint) -> Result<Self, BuilderError> {
        let mut args = RuntimeArgs::new();
        args.insert(ARG_AMOUNT, CLValue::u512(gas_limit)?)?;
        Ok(ExecutableDeployItem::ModuleBytes {
            module_bytes: Vec::new(),
            args,
        })
    }

    pub fn args(&self) -> &RuntimeArgs {
        match self {
            ExecutableDeployItem::ModuleBytes { args, .. }
            | ExecutableDeployItem::StoredContractByHash { args, .. }
            | ExecutableDeployItem::Transfer { args } => args,
        }
    }

    /// Variant name as it appears in JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            ExecutableDeployItem::ModuleBytes { .. } => "ModuleBytes",
            ExecutableDeployItem::StoredContractByHash { .. } => "StoredContractByHash",
            ExecutableDeployItem::Transfer { .. } => "Transfer",
        }
    }

    pub fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), BuilderError> {
        match self {
            ExecutableDeployItem::ModuleBytes { module_bytes, args } => {
                writer.write_u8(TAG_MODULE_BYTES);
                write_prefixed_bytes(writer, module_bytes)?;
                args.write_bytes(writer)
            }
            ExecutableDeployItem::StoredContractByHash {
                hash,
                entry_point,
                args,
            } => {
                writer.write_u8(TAG_STORED_CONTRACT_BY_HASH);
                writer.write_bytes(hash);
                write_string(writer, entry_point)?;
                args.write_bytes(writer)
            }
            ExecutableDeployItem::Transfer { args } => {
                writer.write_u8(TAG_TRANSFER);
                args.write_bytes(writer)
            }
        }
    }

    fn to_json(&self) -> Result<JsonExecutableDeployItem, BuilderError> {
        Ok(match self {
            ExecutableDeployItem::ModuleBytes { module_bytes, args } => {
                JsonExecutableDeployItem::ModuleBytes {
                    module_bytes: hex::encode(module_bytes),
                    args: args.to_json()?,
                }
            }
            ExecutableDeployItem::StoredContractByHash {
                hash,
                entry_point,
                args,
            } => JsonExecutableDeployItem::StoredContractByHash {
                hash: hex::encode(hash),
                entry_point: entry_point.clone(),
                args: args.to_json()?,
            },
            ExecutableDeployItem::Transfer { args } => JsonExecutableDeployItem::Transfer {
                args: args.to_json()?,
            },
        })
    }

    fn from_json(field: &str, json: &JsonExecutableDeployItem) -> Result<Self, BuilderError> {
        let args_of = |args: &[JsonNamedArg]| {
            RuntimeArgs::from_json(args).map_err(|e| invalid(field, e))
        };
        Ok(match json {
            JsonExecutableDeployItem::ModuleBytes { module_bytes, args } => {
                ExecutableDeployItem::ModuleBytes {
                    module_bytes: hex::decode(module_bytes)
                        .map_err(|e| invalid(field, format!("module_bytes: {}", e)))?,
                    args: args_of(args)?,
                }
            }
            JsonExecutableDeployItem::StoredContractByHash {
                hash,
                entry_point,
                args,
            } => ExecutableDeployItem::StoredContractByHash {
                hash: decode_hash(&format!("{}.hash", field), hash)?,
                entry_point: entry_point.clone(),
                args: args_of(args)?,
            },
            JsonExecutableDeployItem::Transfer { args } => ExecutableDeployItem::Transfer {
                args: args_of(args)?,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

/// Deploy header; its encoding is what the deploy hash covers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployHeader {
    /// Paying account.
    pub account: CsprPublicKey,
    /// Creation time, milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Time-to-live in milliseconds.
    pub ttl: u64,
    pub gas_price: u64,
    pub body_hash: [u8; 32],
    pub dependencies: Vec<[u8; 32]>,
    pub chain_name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct JsonDeployHeader {
    account: String,
    timestamp: String,
    ttl: String,
    gas_price: u64,
    body_hash: String,
    dependencies: Vec<String>,
    chain_name: String,
}

impl DeployHeader {
    pub fn write_bytes(&self, writer: &mut ByteWriter) -> Result<(), BuilderError> {
        writer.write_bytes(&self.account.to_tagged_bytes());
        writer.write_u64_le(self.timestamp);
        writer.write_u64_le(self.ttl);
        writer.write_u64_le(self.gas_price);
        writer.write_bytes(&self.body_hash);
        writer.write_u32_le(length_u32(self.dependencies.len())?);
        for dependency in &self.dependencies {
            writer.write_bytes(dependency);
        }
        write_string(writer, &self.chain_name)
    }

    /// `blake2b256` of the encoded header.
    pub fn hash(&self) -> Result<[u8; 32], BuilderError> {
        let mut writer = ByteWriter::new();
        self.write_bytes(&mut writer)?;
        Ok(blake2b256(writer.as_bytes()))
    }

    /// Expiry time in milliseconds since the Unix epoch.
    pub fn expires_at(&self) -> u64 {
        self.timestamp.saturating_add(self.ttl)
    }

    fn to_json(&self) -> Result<JsonDeployHeader, BuilderError> {
        Ok(JsonDeployHeader {
            account: self.account.to_hex(),
            timestamp: format_timestamp(self.timestamp)?,
            ttl: format_ttl(self.ttl),
            gas_price: self.gas_price,
            body_hash: hex::encode(self.body_hash),
            dependencies: self.dependencies.iter().map(hex::encode).collect(),
            chain_name: self.chain_name.clone(),
        })
    }

    fn from_json(json: &JsonDeployHeader) -> Result<Self, BuilderError> {
        let account = CsprPublicKey::from_hex(&json.account)
            .map_err(|e| invalid("header.account", e))?;
        let dependencies = json
            .dependencies
            .iter()
            .map(|dep| decode_hash("header.dependencies", dep))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DeployHeader {
            account,
            timestamp: parse_timestamp(&json.timestamp)
                .map_err(|e| invalid("header.timestamp", e))?,
            ttl: parse_ttl(&json.ttl).map_err(|e| invalid("header.ttl", e))?,
            gas_price: json.gas_price,
            body_hash: decode_hash("header.body_hash", &json.body_hash)?,
            dependencies,
            chain_name: json.chain_name.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Approvals
// ---------------------------------------------------------------------------

/// A signer's approval of a deploy hash.
///
/// Both fields are tagged hex, kept as given so a deploy re-serializes
/// byte-for-byte even when an approval uses an unexpected tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub signer: String,
    pub signature: String,
}

impl Approval {
    /// Build an approval from a key and a tagged signature.
    pub fn new(signer: &CsprPublicKey, tagged_signature: &[u8]) -> Self {
        Approval {
            signer: signer.to_hex(),
            signature: hex::encode(tagged_signature),
        }
    }

    /// The signer as a parsed key.
    pub fn signer_key(&self) -> Result<CsprPublicKey, BuilderError> {
        CsprPublicKey::from_hex(&self.signer)
    }

    /// Whether the signature verifies against `deploy_hash`.
    pub fn verify(&self, deploy_hash: &[u8]) -> bool {
        match (self.signer_key(), hex::decode(&self.signature)) {
            (Ok(key), Ok(signature)) => key.verify(deploy_hash, &signature),
            _ => false,
        }
    }

    fn check_encoding(&self) -> Result<(), BuilderError> {
        let signer = hex::decode(&self.signer).map_err(|e| invalid("approvals.signer", e))?;
        if signer.len() < 2 {
            return Err(invalid("approvals.signer", "signer is too short"));
        }
        hex::decode(&self.signature).map_err(|e| invalid("approvals.signature", e))?;
        Ok(())
    }
}

impl SignerEntry for Approval {
    /// Key bytes after the algorithm tag.
    fn signer_id(&self) -> Vec<u8> {
        match hex::decode(&self.signer) {
            Ok(bytes) if !bytes.is_empty() => bytes[1..].to_vec(),
            _ => self.signer.to_lowercase().into_bytes(),
        }
    }
}

// ---------------------------------------------------------------------------
// Deploy
// ---------------------------------------------------------------------------

/// Header fields chosen by the caller; hashes are derived.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeployParams {
    pub account: CsprPublicKey,
    pub timestamp: u64,
    pub ttl: u64,
    pub gas_price: u64,
    pub chain_name: String,
}

/// A complete deploy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deploy {
    hash: [u8; 32],
    header: DeployHeader,
    payment: ExecutableDeployItem,
    session: ExecutableDeployItem,
    approvals: Vec<Approval>,
}

#[derive(Serialize, Deserialize)]
struct JsonDeployEnvelope {
    deploy: JsonDeploy,
}

#[derive(Serialize, Deserialize)]
struct JsonDeploy {
    hash: String,
    header: JsonDeployHeader,
    payment: JsonExecutableDeployItem,
    session: JsonExecutableDeployItem,
    approvals: Vec<Approval>,
}

impl Deploy {
    /// Assemble an unsigned deploy, computing its body hash and hash.
    pub fn new(
        params: DeployParams,
        payment: ExecutableDeployItem,
        session: ExecutableDeployItem,
    ) -> Result<Self, BuilderError> {
        let header = DeployHeader {
            account: params.account,
            timestamp: params.timestamp,
            ttl: params.ttl,
            gas_price: params.gas_price,
            body_hash: Self::body_hash(&payment, &session)?,
            dependencies: Vec::new(),
            chain_name: params.chain_name,
        };
        let hash = header.hash()?;
        Ok(Deploy {
            hash,
            header,
            payment,
            session,
            approvals: Vec::new(),
        })
    }

    /// `blake2b256(payment || session)`.
    pub fn body_hash(
        payment: &ExecutableDeployItem,
        session: &ExecutableDeployItem,
    ) -> Result<[u8; 32], BuilderError> {
        let mut writer = ByteWriter::new();
        payment.write_bytes(&mut writer)?;
        session.write_bytes(&mut writer)?;
        Ok(blake2b256(writer.as_bytes()))
    }

    pub fn hash(&self) -> &[u8; 32] {
        &self.hash
    }

    pub fn hash_hex(&self) -> String {
        hex::encode(self.hash)
    }

    pub fn header(&self) -> &DeployHeader {
        &self.header
    }

    pub fn payment(&self) -> &ExecutableDeployItem {
        &self.payment
    }

    pub fn session(&self) -> &ExecutableDeployItem {
        &self.session
    }

    pub fn approvals(&self) -> &[Approval] {
        &self.approvals
    }

    pub(crate) fn set_approvals(&mut self, approvals: Vec<Approval>) {
        self.approvals = approvals;
    }

    /// Serialize to the broadcast JSON.
    pub fn to_json(&self) -> Result<String, BuilderError> {
        let envelope = JsonDeployEnvelope {
            deploy: JsonDeploy {
                hash: self.hash_hex(),
                header: self.header.to_json()?,
                payment: self.payment.to_json()?,
                session: self.session.to_json()?,
                approvals: self.approvals.clone(),
            },
        };
        serde_json::to_string(&envelope)
            .map_err(|e| BuilderError::BuildTransaction(format!("failed to serialize deploy: {}", e)))
    }

    /// Parse the broadcast JSON.
    ///
    /// Each field is decoded separately so the error names the field at
    /// fault. Both hashes are recomputed and must match.
    pub fn from_json(raw: &str) -> Result<Self, BuilderError> {
        if raw.trim().is_empty() {
            return Err(BuilderError::Parse("Raw transaction is empty".to_string()));
        }
        let root: Value = serde_json::from_str(raw)
            .map_err(|e| BuilderError::Parse(format!("Invalid raw transaction: {}", e)))?;
        let deploy = root
            .get("deploy")
            .ok_or_else(|| invalid("deploy", "missing field"))?;

        let hash: String = field(deploy, "hash")?;
        let header: JsonDeployHeader = field(deploy, "header")?;
        let payment: JsonExecutableDeployItem = field(deploy, "payment")?;
        let session: JsonExecutableDeployItem = field(deploy, "session")?;
        let approvals: Vec<Approval> = field(deploy, "approvals")?;

        let hash = decode_hash("hash", &hash)?;
        let header = DeployHeader::from_json(&header)?;
        let payment = ExecutableDeployItem::from_json("payment", &payment)?;
        let session = ExecutableDeployItem::from_json("session", &session)?;
        for approval in &approvals {
            approval.check_encoding()?;
        }

        if Self::body_hash(&payment, &session)? != header.body_hash {
            return Err(invalid("header.body_hash", "does not match payment and session"));
        }
        if header.hash()? != hash {
            return Err(invalid("hash", "does not match header"));
        }

        Ok(Deploy {
            hash,
            header,
            payment,
            session,
            approvals,
        })
    }
}

fn field<T: DeserializeOwned>(object: &Value, name: &str) -> Result<T, BuilderError> {
    let value = object
        .get(name)
        .ok_or_else(|| invalid(name, "missing field"))?;
    T::deserialize(value).map_err(|e| invalid(name, e))
}

fn decode_hash(field: &str, value: &str) -> Result<[u8; 32], BuilderError> {
    let bytes = hex::decode(value).map_err(|e| invalid(field, e))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| invalid(field, format!("expected 32 bytes, got {}", bytes.len())))
}

// ---------------------------------------------------------------------------
// Time formats
// ---------------------------------------------------------------------------

/// Render milliseconds since the epoch as RFC 3339 with millisecond precision.
pub fn format_timestamp(millis: u64) -> Result<String, BuilderError> {
    let millis = i64::try_from(millis)
        .map_err(|_| BuilderError::InvalidParameterValue(format!("timestamp {} out of range", millis)))?;
    let time: DateTime<Utc> = Utc
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| BuilderError::InvalidParameterValue(format!("timestamp {} out of range", millis)))?;
    Ok(time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Parse an RFC 3339 timestamp into milliseconds since the epoch.
pub fn parse_timestamp(value: &str) -> Result<u64, BuilderError> {
    let time = DateTime::parse_from_rfc3339(value)
        .map_err(|e| BuilderError::Parse(format!("invalid timestamp {}: {}", value, e)))?;
    u64::try_from(time.timestamp_millis())
        .map_err(|_| BuilderError::Parse(format!("timestamp {} precedes the epoch", value)))
}

/// Render a TTL in milliseconds as a human-readable duration (`1day`).
pub fn format_ttl(millis: u64) -> String {
    humantime::format_duration(Duration::from_millis(millis)).to_string()
}

/// Parse a human-readable duration into milliseconds.
pub fn parse_ttl(value: &str) -> Result<u64, BuilderError> {
    let duration = humantime::parse_duration(value)
        .map_err(|e| BuilderError::Parse(format!("invalid ttl {}: {}", value, e)))?;
    u64::try_from(duration.as_millis())
        .map_err(|_| BuilderError::Parse(format!("ttl {} out of range", value)))
}

/// Current time in milliseconds since the epoch.
pub fn now_millis() -> u64 {
    u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCOUNT: &str = "0202a1d59c993d7dcb91febde94fd3327f874c995a154dca4f7244e04724fb4c30c3";
    const TARGET: &str = "0115c9b40c06ff99b0cbadf1140b061b5dbf92103e66a6330fbcc7768f5219c1ce";

    fn sample_deploy() -> Deploy {
        let account = CsprPublicKey::from_hex(ACCOUNT).unwrap();
        let target = CsprPublicKey::from_hex(TARGET).unwrap();
        let mut args = RuntimeArgs::new();
        args.insert("amount", CLValue::u512(&BigUint::from(2_500_000_000u64)).unwrap())
            .unwrap();
        args.insert("target", CLValue::public_key(&target)).unwrap();
        args.insert("id", CLValue::option_u64(Some(255))).unwrap();
        Deploy::new(
            DeployParams {
                account,
                timestamp: 1_623_177_561_052,
                ttl: 86_400_000,
                gas_price: 1,
                chain_name: "casper-test".to_string(),
            },
            ExecutableDeployItem::standard_payment(&BigUint::from(10_000u32)).unwrap(),
            ExecutableDeployItem::Transfer { args },
        )
        .unwrap()
    }

    #[test]
    fn test_json_shape() {
        let deploy = sample_deploy();
        let json: Value = serde_json::from_str(&deploy.to_json().unwrap()).unwrap();
        let header = &json["deploy"]["header"];
        assert_eq!(header["account"], ACCOUNT);
        assert_eq!(header["timestamp"], "2021-06-08T18:39:21.052Z");
        assert_eq!(header["ttl"], "1day");
        assert_eq!(header["chain_name"], "casper-test");
        assert_eq!(json["deploy"]["hash"], deploy.hash_hex());
        assert_eq!(json["deploy"]["payment"]["ModuleBytes"]["module_bytes"], "");
        assert_eq!(
            json["deploy"]["payment"]["ModuleBytes"]["args"][0][0],
            "amount"
        );
        assert_eq!(json["deploy"]["session"]["Transfer"]["args"][2][1]["parsed"], 255);
        assert_eq!(json["deploy"]["approvals"], serde_json::json!([]));
    }

    #[test]
    fn test_json_roundtrip_is_exact() {
        let mut deploy = sample_deploy();
        deploy.set_approvals(vec![Approval {
            signer: "01".to_string() + &ACCOUNT[2..],
            signature: "02".to_string() + &"ab".repeat(64),
        }]);
        let json = deploy.to_json().unwrap();
        let parsed = Deploy::from_json(&json).unwrap();
        assert_eq!(parsed, deploy);
        assert_eq!(parsed.to_json().unwrap(), json);
    }

    #[test]
    fn test_hash_depends_on_body() {
        let deploy = sample_deploy();
        let mut header = deploy.header().clone();
        header.body_hash[0] ^= 1;
        assert_ne!(header.hash().unwrap(), *deploy.hash());
    }

    #[test]
    fn test_from_json_rejects_tampered_body() {
        let json = sample_deploy().to_json().unwrap();
        let tampered = json.replace("\"parsed\":255", "\"parsed\":256").replace(
            "01ff00000000000000",
            "010001000000000000",
        );
        let err = Deploy::from_json(&tampered).unwrap_err();
        assert!(err.to_string().contains("body_hash"), "{}", err);
    }

    #[test]
    fn test_from_json_rejects_tampered_hash() {
        let deploy = sample_deploy();
        let json = deploy.to_json().unwrap();
        let tampered = json.replacen(&deploy.hash_hex(), &"00".repeat(32), 1);
        let err = Deploy::from_json(&tampered).unwrap_err();
        assert_eq!(err.to_string(), "Invalid transaction: hash: does not match header");
    }

    #[test]
    fn test_from_json_errors_name_the_field() {
        assert_eq!(
            Deploy::from_json("").unwrap_err().to_string(),
            "Raw transaction is empty"
        );
        assert!(Deploy::from_json("{not json")
            .unwrap_err()
            .to_string()
            .starts_with("Invalid raw transaction"));

        let mut json: Value = serde_json::from_str(&sample_deploy().to_json().unwrap()).unwrap();
        json["deploy"]["session"] = serde_json::json!({"OtherType": ""});
        let err = Deploy::from_json(&json.to_string()).unwrap_err().to_string();
        assert!(err.starts_with("Invalid transaction: session:"), "{}", err);

        json["deploy"]
            .as_object_mut()
            .unwrap()
            .remove("approvals");
        let err = Deploy::from_json(&json.to_string()).unwrap_err().to_string();
        assert!(err.starts_with("Invalid transaction:"), "{}", err);
    }

    #[test]
    fn test_ttl_and_timestamp_formats() {
        assert_eq!(format_ttl(86_400_000), "1day");
        assert_eq!(format_ttl(3_600_000), "1h");
        assert_eq!(parse_ttl("1day").unwrap(), 86_400_000);
        assert_eq!(parse_ttl("30m").unwrap(), 1_800_000);
        assert!(parse_ttl("soon").is_err());
        assert_eq!(parse_timestamp("2021-06-08T18:39:21.052Z").unwrap(), 1_623_177_561_052);
        assert!(parse_timestamp("1969-12-31T23:59:59.000Z").is_err());
    }

    #[test]
    fn test_approval_signer_id_strips_tag() {
        let approval = Approval {
            signer: "02ABCD".to_string(),
            signature: "00".to_string(),
        };
        assert_eq!(approval.signer_id(), vec![0xab, 0xcd]);
    }

    #[test]
    fn test_runtime_args_reject_duplicates() {
        let mut args = RuntimeArgs::new();
        args.insert("id", CLValue::u64(1)).unwrap();
        assert!(args.insert("id", CLValue::u64(2)).is_err());
        assert_eq!(args.len(), 1);
        assert!(args.require("missing").is_err());
    }
}
