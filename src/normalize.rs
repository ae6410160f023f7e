//! # Normalization Helpers
//!
//! Small, idempotent free functions used by the reference-data loaders, the query
//! layer, and the label builder. No hidden state; every function is a pure
//! transform of its input.

use crate::errors::{WmsError, WmsResult};

/// Trims leading/trailing whitespace; never returns `None`, an empty slice becomes `""`.
pub fn trim(value: &str) -> &str {
    value.trim()
}

/// Locale-independent uppercase (ASCII-aware `to_uppercase`, which is what the
/// corpus's own codepaths rely on for carrier/SKU codes).
pub fn safe_uppercase(value: &str) -> String {
    value.trim().to_uppercase()
}

/// `true` if trimming the value leaves nothing.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Parses an integer, returning `default` on blank or unparsable input.
pub fn parse_i64_or(value: &str, default: i64) -> i64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return default;
    }
    trimmed.parse::<i64>().unwrap_or(default)
}

/// Parses a float, returning `default` on blank or unparsable input.
pub fn parse_f64_or(value: &str, default: f64) -> f64 {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return default;
    }
    trimmed.parse::<f64>().unwrap_or(default)
}

/// Requires a non-blank value, trimmed. Fails with `ValidationError` naming `field`.
pub fn require_non_empty(value: &str, field: &str) -> WmsResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(WmsError::validation(format!("{field} is required and must not be blank")));
    }
    Ok(trimmed.to_string())
}

/// Uppercases and requires non-blank (used for SKUs, carrier codes, staging locations).
pub fn normalize_required_upper(value: &str, field: &str) -> WmsResult<String> {
    let upper = safe_uppercase(value);
    if upper.is_empty() {
        return Err(WmsError::validation(format!("{field} is required and must not be blank")));
    }
    Ok(upper)
}

/// SKU normalizer: uppercase + required.
pub fn normalize_sku(value: &str) -> WmsResult<String> {
    normalize_required_upper(value, "sku")
}

/// Staging-location normalizer: uppercase + required.
pub fn normalize_staging_location(value: &str) -> WmsResult<String> {
    normalize_required_upper(value, "stagingLocation")
}

/// Optional staging-location: `None` on blank, else uppercased.
pub fn normalize_staging_location_opt(value: Option<&str>) -> Option<String> {
    value.map(safe_uppercase).filter(|v| !v.is_empty())
}

/// Barcode normalizer: trim + required (SSCC, GTIN, UPC, etc).
pub fn normalize_barcode(value: &str, field: &str) -> WmsResult<String> {
    require_non_empty(value, field)
}

/// Carrier-code normalizer: uppercase + required.
pub fn normalize_carrier_code(value: &str) -> WmsResult<String> {
    normalize_required_upper(value, "carrierCode")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_and_blank_checks() {
        assert_eq!(trim("  hi  "), "hi");
        assert!(is_blank("   "));
        assert!(!is_blank(" x "));
    }

    #[test]
    fn safe_uppercase_is_idempotent() {
        let once = safe_uppercase("  mdle ");
        let twice = safe_uppercase(&once);
        assert_eq!(once, "MDLE");
        assert_eq!(once, twice);
    }

    #[test]
    fn parse_i64_or_falls_back_on_blank_and_invalid() {
        assert_eq!(parse_i64_or("42", 0), 42);
        assert_eq!(parse_i64_or("  ", 7), 7);
        assert_eq!(parse_i64_or("abc", 7), 7);
    }

    #[test]
    fn require_non_empty_rejects_blank() {
        assert!(require_non_empty("", "field").is_err());
        assert!(require_non_empty("   ", "field").is_err());
        assert_eq!(require_non_empty(" ok ", "field").unwrap(), "ok");
    }

    #[test]
    fn normalize_sku_upcases_and_requires() {
        assert_eq!(normalize_sku(" abc123 ").unwrap(), "ABC123");
        assert!(normalize_sku("   ").is_err());
    }

    #[test]
    fn normalize_staging_location_opt_is_none_on_blank() {
        assert_eq!(normalize_staging_location_opt(Some("  ")), None);
        assert_eq!(normalize_staging_location_opt(Some(" rossi ")), Some("ROSSI".to_string()));
        assert_eq!(normalize_staging_location_opt(None), None);
    }
}
