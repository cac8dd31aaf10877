//! Coin network configuration.
//!
//! One `CoinConfig` describes one coin on one network. It is handed to a
//! builder factory at construction and shared read-only by every builder the
//! factory creates.

use num_bigint::BigUint;
use serde::{Deserialize, Serialize};

use crate::amount::parse_amount;
use crate::BuilderError;

/// Network type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NetworkKind {
    /// Production network.
    Mainnet,
    /// Test network.
    Testnet,
}

impl std::fmt::Display for NetworkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkKind::Mainnet => write!(f, "mainnet"),
            NetworkKind::Testnet => write!(f, "testnet"),
        }
    }
}

/// Static description of a coin on a given network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinConfig {
    /// Short coin name (e.g. `cspr`, `tcspr`).
    pub name: String,
    /// Human readable name.
    pub full_name: String,
    /// Network type.
    pub network: NetworkKind,
    /// Chain identifier embedded in transactions.
    pub chain_name: String,
    /// Number of decimal places between the display unit and the base unit.
    pub decimal_places: u32,
    /// Minimum transfer amount in base units, as a decimal string.
    pub min_amount: String,
    /// Maximum number of distinct signers a transaction may carry.
    pub max_signers: usize,
    /// Query parameter carrying a memo on destination addresses.
    pub memo_parameter: String,
}

impl CoinConfig {
    /// Load a configuration from JSON.
    ///
    /// # Returns
    /// The parsed configuration, or `Parse` naming the offending field.
    pub fn from_json(json: &str) -> Result<Self, BuilderError> {
        let config: CoinConfig = serde_json::from_str(json)
            .map_err(|e| BuilderError::Parse(format!("Invalid coin configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.chain_name.is_empty() {
            return Err(BuilderError::InvalidParameterValue(
                "Invalid coin configuration: chain name is empty".to_string(),
            ));
        }
        if self.max_signers == 0 {
            return Err(BuilderError::InvalidParameterValue(
                "Invalid coin configuration: max signers must be positive".to_string(),
            ));
        }
        if self.memo_parameter.is_empty() {
            return Err(BuilderError::InvalidParameterValue(
                "Invalid coin configuration: memo parameter is empty".to_string(),
            ));
        }
        self.min_amount()?;
        Ok(())
    }

    /// The minimum transfer amount as an integer.
    pub fn min_amount(&self) -> Result<BigUint, BuilderError> {
        parse_amount(&self.min_amount, None)
    }

    /// Whether this configuration targets a production network.
    pub fn is_mainnet(&self) -> bool {
        self.network == NetworkKind::Mainnet
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_JSON: &str = r#"{
        "name": "tcspr",
        "fullName": "Testnet Casper",
        "network": "testnet",
        "chainName": "casper-test",
        "decimalPlaces": 9,
        "minAmount": "2000000000",
        "maxSigners": 3,
        "memoParameter": "transferId"
    }"#;

    #[test]
    fn test_from_json() {
        let config = CoinConfig::from_json(CONFIG_JSON).unwrap();
        assert_eq!(config.network, NetworkKind::Testnet);
        assert!(!config.is_mainnet());
        assert_eq!(config.min_amount().unwrap(), BigUint::from(2_000_000_000u64));
        assert_eq!(config.max_signers, 3);
    }

    #[test]
    fn test_from_json_rejects_missing_field() {
        let err = CoinConfig::from_json(r#"{"name":"cspr"}"#).unwrap_err();
        assert!(err.to_string().contains("Invalid coin configuration"));
    }

    #[test]
    fn test_validate_rejects_zero_signers() {
        let mut config = CoinConfig::from_json(CONFIG_JSON).unwrap();
        config.max_signers = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_network_display() {
        assert_eq!(NetworkKind::Mainnet.to_string(), "mainnet");
        assert_eq!(NetworkKind::Testnet.to_string(), "testnet");
    }
}
