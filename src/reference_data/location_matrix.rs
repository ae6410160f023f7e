//! Sold-to name/number to DC location matrix loader.

use std::collections::HashMap;

use tracing::warn;

use crate::errors::WmsResult;
use crate::normalize::trim;

/// Canonical key for the sold-to column: uppercase, drop a leading `C`, keep
/// digits only, strip leading zeros (collapsing to `"0"` if all-zero).
pub fn canonical_sold_to_key(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    let upper = upper.strip_prefix('C').unwrap_or(&upper);
    let digits: String = upper.chars().filter(|c| c.is_ascii_digit()).collect();
    let stripped = digits.trim_start_matches('0');
    if stripped.is_empty() {
        "0".to_string()
    } else {
        stripped.to_string()
    }
}

/// Sold-to -> DC location code matrix.
#[derive(Debug, Clone, Default)]
pub struct LocationMatrix {
    by_sold_to: HashMap<String, String>,
}

impl LocationMatrix {
    /// Parses the CSV text with header `Sold-To Name, Location #, Sold-To #`.
    pub fn parse(csv_text: &str) -> WmsResult<Self> {
        let mut matrix = LocationMatrix::default();
        for (line_no, line) in csv_text.lines().enumerate() {
            if trim(line).is_empty() {
                continue;
            }
            if line_no == 0 && line.to_uppercase().contains("SOLD-TO NAME") {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(trim).collect();
            let non_empty = fields.iter().filter(|f| !f.is_empty()).count();
            if non_empty < 2 {
                warn!("location matrix: skipping malformed row {}: {:?}", line_no + 1, line);
                continue;
            }
            let location = fields.get(1).copied().unwrap_or("").to_string();
            let sold_to = fields.get(2).copied().unwrap_or("").to_string();
            if location.is_empty() || sold_to.is_empty() {
                warn!("location matrix: skipping row {} missing a required column", line_no + 1);
                continue;
            }
            matrix.by_sold_to.insert(canonical_sold_to_key(&sold_to), location);
        }
        Ok(matrix)
    }

    /// Returns the mapped DC code for the canonicalized sold-to key, else the
    /// trimmed input.
    pub fn resolve_dc_location(&self, value: &str) -> String {
        let key = canonical_sold_to_key(value);
        self.by_sold_to.get(&key).cloned().unwrap_or_else(|| trim(value).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "Sold-To Name, Location #, Sold-To #\n\
CJR WHOLESALE, 0042, C0001234\n\
ACME CORP, 0099, 0005678\n";

    #[test]
    fn canonical_key_drops_leading_c_and_zeros() {
        assert_eq!(canonical_sold_to_key("C0001234"), "1234");
        assert_eq!(canonical_sold_to_key("0005678"), "5678");
        assert_eq!(canonical_sold_to_key("c000"), "0");
        assert_eq!(canonical_sold_to_key(""), "0");
    }

    #[test]
    fn resolves_mapped_location() {
        let m = LocationMatrix::parse(CSV).unwrap();
        assert_eq!(m.resolve_dc_location("C0001234"), "0042");
        assert_eq!(m.resolve_dc_location("5678"), "0099");
    }

    #[test]
    fn falls_back_to_trimmed_input_when_unmapped() {
        let m = LocationMatrix::parse(CSV).unwrap();
        assert_eq!(m.resolve_dc_location("  UNKNOWN99  "), "UNKNOWN99");
    }
}
