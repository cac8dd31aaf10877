//! Address and key validation for Casper.

use wallet_core::address::parse_address_details;
use wallet_core::{AddressCodec, AddressDetails, BuilderError};
use wallet_primitives::hash::blake2b256;
use wallet_primitives::util::ByteWriter;

use crate::bytesrepr::length_u32;
use crate::keys::{CsprPublicKey, KeyPair, SIGNATURE_LEN};
use crate::network::CsprNetwork;

/// Prefix of a formatted account hash.
pub const ACCOUNT_HASH_PREFIX: &str = "account-hash-";

const MULTISIG_DOMAIN: &[u8] = b"multisig";

/// `AddressCodec` for Casper tagged-hex addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsprAddressCodec {
    memo_parameter: String,
    max_signers: usize,
}

impl CsprAddressCodec {
    pub fn new(network: &CsprNetwork) -> Self {
        CsprAddressCodec {
            memo_parameter: network.coin.memo_parameter.clone(),
            max_signers: network.max_signers(),
        }
    }

    /// Parse a public key given as a tagged address or any form
    /// `KeyPair::from_public` accepts.
    pub fn parse_public_key(&self, candidate: &str) -> Result<CsprPublicKey, BuilderError> {
        CsprPublicKey::from_hex(candidate)
            .or_else(|_| KeyPair::from_public(candidate).map(|kp| kp.cspr_public_key()))
    }

    /// Whether `candidate` is a valid transfer id (a `u64`).
    pub fn is_valid_transfer_id(&self, candidate: &str) -> bool {
        wallet_core::amount::is_decimal_digits(candidate) && candidate.parse::<u64>().is_ok()
    }

    /// Whether `signature` (hex, bare `r || s` or `02`-tagged) is a valid
    /// message signature by `public_key` over `message`.
    ///
    /// `public_key` takes any form `parse_public_key` accepts.
    pub fn is_valid_message_signature(
        &self,
        signature: &str,
        message: &[u8],
        public_key: &str,
    ) -> bool {
        let Ok(key) = self.parse_public_key(public_key) else {
            return false;
        };
        let Ok(bytes) = hex::decode(signature) else {
            return false;
        };
        let tagged = if bytes.len() == SIGNATURE_LEN {
            [vec![key.tag()], bytes].concat()
        } else {
            bytes
        };
        key.verify(message, &tagged)
    }

    /// Whether `address` belongs to the wallet whose root address is `root`.
    ///
    /// Only the keys are compared, so transfer ids on either side are
    /// ignored.
    ///
    /// # Returns
    /// `InvalidParameterValue` when either address is malformed.
    pub fn is_wallet_address(&self, address: &str, root: &str) -> Result<bool, BuilderError> {
        let address = self.address_details(address)?;
        let root = self.address_details(root)?;
        Ok(address.address == root.address)
    }

    /// Account hash of an address, formatted `account-hash-<hex>`.
    pub fn account_hash(&self, address: &str) -> Result<String, BuilderError> {
        let key = CsprPublicKey::from_hex(address)?;
        Ok(format!("{}{}", ACCOUNT_HASH_PREFIX, hex::encode(key.account_hash())))
    }
}

impl Default for CsprAddressCodec {
    fn default() -> Self {
        Self::new(&CsprNetwork::default())
    }
}

impl AddressCodec for CsprAddressCodec {
    fn is_valid_address(&self, candidate: &str) -> bool {
        self.address_details(candidate).is_ok()
    }

    fn is_valid_validator_address(&self, candidate: &str) -> bool {
        CsprPublicKey::from_hex(candidate).is_ok()
    }

    fn is_valid_public_key(&self, candidate: &str) -> bool {
        self.parse_public_key(candidate).is_ok()
    }

    fn is_valid_private_key(&self, candidate: &str) -> bool {
        KeyPair::from_private(candidate).is_ok()
    }

    fn address_details(&self, candidate: &str) -> Result<AddressDetails, BuilderError> {
        let details = parse_address_details(candidate, &self.memo_parameter)?;
        CsprPublicKey::from_hex(&details.address).map_err(|e| {
            BuilderError::InvalidParameterValue(format!("invalid address {}: {}", candidate, e))
        })?;
        if let Some(memo) = &details.memo_id {
            if !self.is_valid_transfer_id(memo) {
                return Err(BuilderError::InvalidParameterValue(format!(
                    "invalid address {}: {} is invalid",
                    candidate, self.memo_parameter
                )));
            }
        }
        Ok(AddressDetails {
            address: details.address.to_lowercase(),
            memo_id: details.memo_id,
        })
    }

    /// `account-hash-` + `blake2b256("multisig" || 0x00 || threshold ||
    /// u32 count || tagged keys)`.
    fn derive_multisig_address(
        &self,
        pubkeys: &[&str],
        threshold: usize,
    ) -> Result<String, BuilderError> {
        let invalid = |reason: String| {
            BuilderError::InvalidParameterValue(format!("Invalid multisig parameters: {}", reason))
        };
        if pubkeys.is_empty() || pubkeys.len() > self.max_signers {
            return Err(invalid(format!(
                "expected between 1 and {} keys, got {}",
                self.max_signers,
                pubkeys.len()
            )));
        }
        if threshold == 0 || threshold > pubkeys.len() {
            return Err(invalid(format!(
                "threshold {} outside 1..={}",
                threshold,
                pubkeys.len()
            )));
        }
        let threshold = u8::try_from(threshold).map_err(|_| invalid("threshold too large".into()))?;

        let mut keys: Vec<CsprPublicKey> = Vec::with_capacity(pubkeys.len());
        for candidate in pubkeys {
            let key = self.parse_public_key(candidate)?;
            if keys.contains(&key) {
                return Err(invalid(format!("duplicate key {}", candidate)));
            }
            keys.push(key);
        }

        let mut writer = ByteWriter::new();
        writer.write_bytes(MULTISIG_DOMAIN);
        writer.write_u8(0);
        writer.write_u8(threshold);
        writer.write_u32_le(length_u32(keys.len())?);
        for key in &keys {
            writer.write_bytes(&key.to_tagged_bytes());
        }
        Ok(format!(
            "{}{}",
            ACCOUNT_HASH_PREFIX,
            hex::encode(blake2b256(writer.as_bytes()))
        ))
    }
}
