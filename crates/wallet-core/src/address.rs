//! Address validation contract and address-with-memo parsing.
//!
//! Destinations on memo-bearing chains may carry a single numeric memo as a
//! query parameter, e.g. `addr?memoId=2`. The parameter name is supplied by
//! the coin configuration.

use std::fmt;

use crate::amount::is_decimal_digits;
use crate::BuilderError;

/// A root address split from its optional memo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressDetails {
    /// The address without any query string.
    pub address: String,
    /// The memo value, if one was attached.
    pub memo_id: Option<String>,
}

impl AddressDetails {
    /// Render back to `address?<param>=<memo>` form.
    ///
    /// # Arguments
    /// * `memo_parameter` - Query parameter name used by the chain.
    pub fn to_address_string(&self, memo_parameter: &str) -> String {
        match &self.memo_id {
            Some(memo) => format!("{}?{}={}", self.address, memo_parameter, memo),
            None => self.address.clone(),
        }
    }
}

impl fmt::Display for AddressDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.memo_id {
            Some(memo) => write!(f, "{} (memo {})", self.address, memo),
            None => write!(f, "{}", self.address),
        }
    }
}

/// Per-chain address and key validation.
///
/// The `is_valid_*` predicates never fail; malformed input yields `false`.
pub trait AddressCodec {
    /// Validate an account address (a memo suffix is allowed).
    fn is_valid_address(&self, candidate: &str) -> bool;

    /// Validate a staking-validator identifier.
    fn is_valid_validator_address(&self, candidate: &str) -> bool;

    /// Validate a public key in any accepted encoding.
    fn is_valid_public_key(&self, candidate: &str) -> bool;

    /// Validate a private key in any accepted encoding.
    fn is_valid_private_key(&self, candidate: &str) -> bool;

    /// Split an address into root address and memo, validating both.
    fn address_details(&self, candidate: &str) -> Result<AddressDetails, BuilderError>;

    /// Derive the address of a `threshold`-of-`pubkeys.len()` multisig wallet.
    ///
    /// The result depends on the order of `pubkeys`.
    fn derive_multisig_address(
        &self,
        pubkeys: &[&str],
        threshold: usize,
    ) -> Result<String, BuilderError>;
}

/// Split `raw` into root address and memo.
///
/// The root address is returned unvalidated; chain codecs validate it.
///
/// # Arguments
/// * `raw` - Address, optionally followed by `?<memo_parameter>=<digits>`.
/// * `memo_parameter` - Accepted query parameter name.
///
/// # Returns
/// The split details, or `InvalidParameterValue` when the query string holds
/// an unknown parameter, repeats the memo parameter, or carries a memo that is
/// not a non-negative integer.
pub fn parse_address_details(raw: &str, memo_parameter: &str) -> Result<AddressDetails, BuilderError> {
    let invalid = |reason: String| {
        BuilderError::InvalidParameterValue(format!("invalid address {}: {}", raw, reason))
    };

    let (address, query) = match raw.split_once('?') {
        None => {
            if raw.is_empty() {
                return Err(invalid("address is empty".to_string()));
            }
            return Ok(AddressDetails {
                address: raw.to_string(),
                memo_id: None,
            });
        }
        Some(parts) => parts,
    };

    if address.is_empty() {
        return Err(invalid("address is empty".to_string()));
    }
    if query.is_empty() || query.contains('?') {
        return Err(invalid("malformed query string".to_string()));
    }

    let mut memos = Vec::new();
    for pair in query.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != memo_parameter {
            return Err(invalid(format!("unknown query parameter '{}'", key)));
        }
        memos.push(value);
    }

    if memos.len() > 1 {
        return Err(invalid(format!(
            "{} may only be given at most once, but found {} instances",
            memo_parameter,
            memos.len()
        )));
    }

    let memo = memos[0];
    if !is_decimal_digits(memo) {
        return Err(invalid(format!("{} is invalid", memo_parameter)));
    }

    Ok(AddressDetails {
        address: address.to_string(),
        memo_id: Some(memo.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "cosmos1hr3fwm3t4wvqn5ahjm9vxgtddeuhfk2pdg0cjy";

    #[test]
    fn test_plain_address_has_no_memo() {
        let details = parse_address_details(ADDR, "memoId").unwrap();
        assert_eq!(details.address, ADDR);
        assert_eq!(details.memo_id, None);
    }

    #[test]
    fn test_single_memo_is_split() {
        let details = parse_address_details(&format!("{}?memoId=2", ADDR), "memoId").unwrap();
        assert_eq!(
            details,
            AddressDetails {
                address: ADDR.to_string(),
                memo_id: Some("2".to_string()),
            }
        );
        assert_eq!(details.to_address_string("memoId"), format!("{}?memoId=2", ADDR));
    }

    #[test]
    fn test_repeated_memo_is_rejected() {
        let err = parse_address_details(&format!("{}?memoId=3&memoId=12", ADDR), "memoId").unwrap_err();
        assert!(err.to_string().contains("at most once, but found 2 instances"));
    }

    #[test]
    fn test_non_numeric_memo_is_rejected() {
        for bad in ["xyz", "-1", "", "1.5"] {
            let raw = format!("{}?memoId={}", ADDR, bad);
            assert!(parse_address_details(&raw, "memoId").is_err(), "{}", raw);
        }
    }

    #[test]
    fn test_malformed_queries_are_rejected() {
        for raw in [
            String::new(),
            format!("{}?", ADDR),
            format!("{}?memoId=1?memoId=2", ADDR),
            format!("{}?other=1", ADDR),
            "?memoId=1".to_string(),
        ] {
            assert!(parse_address_details(&raw, "memoId").is_err(), "{}", raw);
        }
    }

    #[test]
    fn test_memo_parameter_is_configurable() {
        let details = parse_address_details(&format!("{}?transferId=255", ADDR), "transferId").unwrap();
        assert_eq!(details.memo_id.as_deref(), Some("255"));
        assert!(parse_address_details(&format!("{}?memoId=255", ADDR), "transferId").is_err());
    }
}
