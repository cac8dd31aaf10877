//! Base-unit amount validation.
//!
//! Amounts travel as decimal strings so values beyond 2^53 survive JSON
//! intact. Only plain ASCII digits are accepted: no sign, no exponent, no
//! fractional part, no surrounding whitespace.

use num_bigint::BigUint;
use num_traits::Zero;

use crate::BuilderError;

/// Parse a positive base-unit amount, optionally enforcing a minimum.
///
/// # Arguments
/// * `value` - Decimal string in base units.
/// * `minimum` - Inclusive lower bound, if the chain imposes one.
///
/// # Returns
/// The amount, or `InvalidParameterValue` for non-numeric, zero, negative or
/// below-minimum values.
pub fn parse_amount(value: &str, minimum: Option<&BigUint>) -> Result<BigUint, BuilderError> {
    if !is_decimal_digits(value) {
        return Err(BuilderError::InvalidParameterValue(format!(
            "Invalid amount: {}",
            value
        )));
    }
    let amount = BigUint::parse_bytes(value.as_bytes(), 10).ok_or_else(|| {
        BuilderError::InvalidParameterValue(format!("Invalid amount: {}", value))
    })?;
    if amount.is_zero() {
        return Err(BuilderError::InvalidParameterValue(format!(
            "Invalid amount: {} must be greater than zero",
            value
        )));
    }
    if let Some(min) = minimum {
        if &amount < min {
            return Err(BuilderError::InvalidParameterValue(format!(
                "Invalid amount: {} is below the minimum of {}",
                value, min
            )));
        }
    }
    Ok(amount)
}

/// Whether `value` is a non-empty run of ASCII decimal digits.
pub fn is_decimal_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_malformed_values() {
        for bad in ["", "0", "-1", "abc", "1.5", "1e9", " 10", "+10", "0x10"] {
            let err = parse_amount(bad, None).unwrap_err();
            assert!(
                matches!(err, BuilderError::InvalidParameterValue(_)),
                "{:?} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_minimum_is_inclusive() {
        let min = BigUint::from(2_000_000_000u64);
        assert!(parse_amount("1999999999", Some(&min)).is_err());
        assert_eq!(parse_amount("2000000000", Some(&min)).unwrap(), min);
    }

    #[test]
    fn test_large_amounts_keep_precision() {
        let amount = parse_amount("10000000000000000", None).unwrap();
        assert_eq!(amount.to_string(), "10000000000000000");
        let huge = "123456789012345678901234567890123456789";
        assert_eq!(parse_amount(huge, None).unwrap().to_string(), huge);
    }

    #[test]
    fn test_leading_zeros_are_accepted() {
        assert_eq!(parse_amount("007", None).unwrap(), BigUint::from(7u8));
    }
}
