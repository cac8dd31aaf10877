//! Casper network configuration.
//!
//! Mirrors the preset-plus-overrides shape of a client config: `mainnet()`
//! and `testnet()` give working defaults, every field stays public so a
//! caller can point at a private network or a different wallet contract.

use serde::{Deserialize, Serialize};
use wallet_core::{BuilderError, CoinConfig, NetworkKind};

/// Smallest transfer the network accepts, in motes.
pub const MIN_MOTES_AMOUNT: &str = "2000000000";

/// Maximum number of associated keys approving a deploy.
pub const MAX_SIGNERS: usize = 3;

/// Number of owners a multisig wallet is initialized with.
pub const WALLET_OWNERS: usize = 3;

/// Default and maximum deploy time-to-live (one day).
pub const DEFAULT_TTL_MS: u64 = 86_400_000;

/// Default gas price.
pub const DEFAULT_GAS_PRICE: u64 = 1;

/// Motes per CSPR.
pub const DECIMAL_PLACES: u32 = 9;

/// Auction system contract hash on mainnet.
pub const MAINNET_AUCTION_CONTRACT: &str =
    "ccb576d6ce6dec84a551e48f0d0b7af89ddba44c7390b690036257a04a3ae9ea";

/// Auction system contract hash on testnet.
pub const TESTNET_AUCTION_CONTRACT: &str =
    "93d923e336b20a4c4ca14d592b60e5bd3fe330775618290104f9beb326db7ae2";

/// Session wasm installed by wallet initialization when none is configured:
/// an empty module (magic + version).
pub const DEFAULT_WALLET_INIT_CONTRACT: &str = "0061736d01000000";

/// Configuration for one Casper network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsprNetwork {
    /// Generic coin settings (name, chain name, minimum amount, signer cap).
    pub coin: CoinConfig,
    /// Auction contract hash, hex.
    pub auction_contract_hash: String,
    /// Session wasm used by wallet initialization, hex.
    pub wallet_init_contract: String,
    /// TTL applied when a builder does not set an expiration.
    pub default_ttl_ms: u64,
    /// Largest accepted TTL.
    pub max_ttl_ms: u64,
    /// Gas price applied when a fee omits one.
    pub default_gas_price: u64,
}

impl CsprNetwork {
    /// Casper mainnet (`cspr`, chain `casper`).
    pub fn mainnet() -> Self {
        Self::preset(
            "cspr",
            "Casper",
            NetworkKind::Mainnet,
            "casper",
            MAINNET_AUCTION_CONTRACT,
        )
    }

    /// Casper testnet (`tcspr`, chain `casper-test`).
    pub fn testnet() -> Self {
        Self::preset(
            "tcspr",
            "Testnet Casper",
            NetworkKind::Testnet,
            "casper-test",
            TESTNET_AUCTION_CONTRACT,
        )
    }

    fn preset(
        name: &str,
        full_name: &str,
        network: NetworkKind,
        chain_name: &str,
        auction: &str,
    ) -> Self {
        CsprNetwork {
            coin: CoinConfig {
                name: name.to_string(),
                full_name: full_name.to_string(),
                network,
                chain_name: chain_name.to_string(),
                decimal_places: DECIMAL_PLACES,
                min_amount: MIN_MOTES_AMOUNT.to_string(),
                max_signers: MAX_SIGNERS,
                memo_parameter: "transferId".to_string(),
            },
            auction_contract_hash: auction.to_string(),
            wallet_init_contract: DEFAULT_WALLET_INIT_CONTRACT.to_string(),
            default_ttl_ms: DEFAULT_TTL_MS,
            max_ttl_ms: DEFAULT_TTL_MS,
            default_gas_price: DEFAULT_GAS_PRICE,
        }
    }

    /// Load and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self, BuilderError> {
        let network: CsprNetwork = serde_json::from_str(json)
            .map_err(|e| BuilderError::Parse(format!("Invalid network configuration: {}", e)))?;
        network.validate()?;
        Ok(network)
    }

    /// Check that every field is usable.
    pub fn validate(&self) -> Result<(), BuilderError> {
        self.coin.validate()?;
        self.auction_contract()?;
        self.wallet_init_contract_bytes()?;
        if self.default_ttl_ms == 0 || self.default_ttl_ms > self.max_ttl_ms {
            return Err(BuilderError::InvalidParameterValue(format!(
                "Invalid network configuration: default ttl {} outside 1..={}",
                self.default_ttl_ms, self.max_ttl_ms
            )));
        }
        if self.default_gas_price == 0 {
            return Err(BuilderError::InvalidParameterValue(
                "Invalid network configuration: default gas price must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Replace the wallet initialization wasm.
    pub fn with_wallet_init_contract(mut self, wasm: &[u8]) -> Self {
        self.wallet_init_contract = hex::encode(wasm);
        self
    }

    /// Chain name embedded in deploy headers.
    pub fn chain_name(&self) -> &str {
        &self.coin.chain_name
    }

    /// Signer cap.
    pub fn max_signers(&self) -> usize {
        self.coin.max_signers
    }

    /// Auction contract hash as bytes.
    pub fn auction_contract(&self) -> Result<[u8; 32], BuilderError> {
        let bytes = hex::decode(&self.auction_contract_hash).map_err(|e| {
            BuilderError::InvalidParameterValue(format!("Invalid auction contract hash: {}", e))
        })?;
        bytes.as_slice().try_into().map_err(|_| {
            BuilderError::InvalidParameterValue(format!(
                "Invalid auction contract hash: expected 32 bytes, got {}",
                bytes.len()
            ))
        })
    }

    /// Wallet initialization wasm as bytes.
    pub fn wallet_init_contract_bytes(&self) -> Result<Vec<u8>, BuilderError> {
        hex::decode(&self.wallet_init_contract).map_err(|e| {
            BuilderError::InvalidParameterValue(format!("Invalid wallet initialization contract: {}", e))
        })
    }
}

impl Default for CsprNetwork {
    fn default() -> Self {
        Self::mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        let main = CsprNetwork::mainnet();
        assert_eq!(main.chain_name(), "casper");
        assert_eq!(main.coin.name, "cspr");
        assert!(main.coin.is_mainnet());
        let test = CsprNetwork::testnet();
        assert_eq!(test.chain_name(), "casper-test");
        assert_eq!(test.coin.name, "tcspr");
        assert_eq!(test.max_signers(), 3);
        assert_eq!(CsprNetwork::default(), main);
        main.validate().unwrap();
        test.validate().unwrap();
    }

    #[test]
    fn test_json_roundtrip() {
        let net = CsprNetwork::testnet().with_wallet_init_contract(&[0, 1, 2]);
        let json = serde_json::to_string(&net).unwrap();
        let parsed = CsprNetwork::from_json(&json).unwrap();
        assert_eq!(parsed, net);
        assert_eq!(parsed.wallet_init_contract_bytes().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_validate_rejects_bad_auction_hash() {
        let mut net = CsprNetwork::testnet();
        net.auction_contract_hash = "abcd".to_string();
        assert!(net.validate().is_err());
        net.auction_contract_hash = "zz".to_string();
        assert!(net.auction_contract().is_err());
    }

    #[test]
    fn test_validate_rejects_ttl_above_max() {
        let mut net = CsprNetwork::mainnet();
        net.default_ttl_ms = net.max_ttl_ms + 1;
        assert!(net.validate().is_err());
    }
}
