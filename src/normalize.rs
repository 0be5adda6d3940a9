//! Field normalization for billing extracts.
//!
//! Currency cells become exact [`Currency`] values and stop dates become
//! opaque comparison tokens. Neither function decides what to do with bad
//! input; callers pick between coercing and rejecting.

use crate::currency::Currency;
use crate::error::MalformedValue;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a raw currency cell.
///
/// Missing or blank cells are zero. A leading `$` (optionally preceded by a
/// minus sign) and the whitespace around it are dropped, and thousands
/// separators are stripped, so `"$ 1,200.50"` and `"1200.50"` are equal.
pub fn normalize_currency(raw: Option<&str>) -> Result<Currency, MalformedValue> {
    let trimmed = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(Currency::ZERO),
    };

    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) if rest.trim_start().starts_with('$') => (true, rest.trim_start()),
        _ => (false, trimmed),
    };
    let body = rest.strip_prefix('$').map(str::trim).unwrap_or(rest);
    if negative && body.starts_with('-') {
        return Err(MalformedValue(trimmed.to_string()));
    }
    let digits: String = body.chars().filter(|&ch| ch != ',').collect();

    let value = Decimal::from_str(&digits).map_err(|_| MalformedValue(trimmed.to_string()))?;
    Ok(Currency::new(if negative { -value } else { value }))
}

/// Normalizes a stop date cell.
///
/// Six-character values are taken to be `MMDDYY` already; anything else is
/// passed through trimmed. No calendar parsing is attempted.
pub fn normalize_date(raw: &str) -> String {
    raw.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(s: &str) -> Currency {
        normalize_currency(Some(s)).unwrap()
    }

    #[test]
    fn test_blank_and_missing_are_zero() {
        assert_eq!(normalize_currency(None).unwrap(), Currency::ZERO);
        assert_eq!(amount(""), Currency::ZERO);
        assert_eq!(amount("   "), Currency::ZERO);
    }

    #[test]
    fn test_strips_symbol_and_whitespace() {
        assert_eq!(amount(" $ 12.50 "), amount("12.50"));
        assert_eq!(amount("$12.00"), amount("12"));
    }

    #[test]
    fn test_strips_thousands_separator() {
        assert_eq!(amount("$ 1,200.50"), amount("1200.50"));
        assert_eq!(amount("1,000,000"), amount("1000000"));
    }

    #[test]
    fn test_negative_amounts() {
        assert_eq!(amount("-$5.00"), amount("-5"));
        assert_eq!(amount("$-5.00"), amount("-5"));
        assert_eq!(amount("- $ 5.00"), amount("-5"));
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!(
            normalize_currency(Some(" abc ")),
            Err(MalformedValue("abc".to_string()))
        );
        assert!(normalize_currency(Some("$")).is_err());
        assert!(normalize_currency(Some("12.50 USD")).is_err());
        assert_eq!(
            normalize_currency(Some("-$-5")),
            Err(MalformedValue("-$-5".to_string()))
        );
        assert!(normalize_currency(Some("- $ -5.00")).is_err());
    }

    #[test]
    fn test_date_six_chars_unchanged() {
        assert_eq!(normalize_date("010125"), "010125");
        assert_eq!(normalize_date(" 010125 "), "010125");
    }

    #[test]
    fn test_date_other_forms_passed_through() {
        assert_eq!(normalize_date("1/1/25"), "1/1/25");
        assert_eq!(normalize_date("2025-01-01"), "2025-01-01");
        assert_eq!(normalize_date(""), "");
    }
}
