//! SKU matrix loader: TBG short SKU <-> Walmart item number, with a sliding-window
//! lookup for internal SKUs that embed the short key.

use std::collections::HashMap;

use tracing::warn;

use crate::errors::WmsResult;
use crate::models::WalmartSkuMapping;
use crate::normalize::trim;

/// Smallest window length `findByPrtnum` will try before giving up.
const MIN_WINDOW_LEN: usize = 5;

/// O(1)-lookup SKU matrix, indexed both by TBG SKU and by Walmart item number.
#[derive(Debug, Clone, Default)]
pub struct SkuMatrix {
    by_tbg_sku: HashMap<String, WalmartSkuMapping>,
    by_walmart_item: HashMap<String, WalmartSkuMapping>,
}

fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

fn strip_leading_zeros(value: &str) -> &str {
    let stripped = value.trim_start_matches('0');
    if stripped.is_empty() {
        value
    } else {
        stripped
    }
}

impl SkuMatrix {
    /// Parses the CSV text. Header row (`TBG SKU#, WALMART ITEM#, Item
    /// Description, check`) and blank lines are skipped; rows with fewer than
    /// two non-empty fields are skipped with a warning.
    pub fn parse(csv_text: &str) -> WmsResult<Self> {
        let mut matrix = SkuMatrix::default();
        for (line_no, line) in csv_text.lines().enumerate() {
            if trim(line).is_empty() {
                continue;
            }
            if line_no == 0 && line.to_uppercase().contains("TBG SKU") {
                continue;
            }
            let fields: Vec<&str> = line.split(',').map(trim).collect();
            let non_empty = fields.iter().filter(|f| !f.is_empty()).count();
            if non_empty < 2 {
                warn!("sku matrix: skipping malformed row {}: {:?}", line_no + 1, line);
                continue;
            }
            let tbg_sku = fields.first().copied().unwrap_or("").to_string();
            let walmart_item = fields.get(1).copied().unwrap_or("").to_string();
            let description = fields.get(2).copied().unwrap_or("").to_string();
            if tbg_sku.is_empty() || walmart_item.is_empty() {
                warn!("sku matrix: skipping row {} missing a required column", line_no + 1);
                continue;
            }
            let mapping = WalmartSkuMapping { tbg_sku: tbg_sku.clone(), walmart_item_number: walmart_item.clone(), description };
            matrix.by_tbg_sku.insert(tbg_sku, mapping.clone());
            matrix.by_walmart_item.insert(walmart_item, mapping);
        }
        Ok(matrix)
    }

    /// Looks up by TBG SKU; normalizes by trimming. Empty input returns `None`.
    pub fn find_by_tbg_sku(&self, tbg_sku: &str) -> Option<&WalmartSkuMapping> {
        let key = trim(tbg_sku);
        if key.is_empty() {
            return None;
        }
        self.by_tbg_sku.get(key)
    }

    /// Looks up by Walmart item number; normalizes by trimming. Empty input
    /// returns `None`.
    pub fn find_by_walmart_item(&self, walmart_item: &str) -> Option<&WalmartSkuMapping> {
        let key = trim(walmart_item);
        if key.is_empty() {
            return None;
        }
        self.by_walmart_item.get(key)
    }

    /// Direct match first; then for each window length `L` from
    /// `len(digits(prtnum))` down to 5, slide a window over the digit-only
    /// projection, trying the substring and the substring with leading zeros
    /// stripped. First hit wins (longest window, earliest start).
    pub fn find_by_prtnum(&self, prtnum: &str) -> Option<&WalmartSkuMapping> {
        let trimmed = trim(prtnum);
        if trimmed.is_empty() {
            return None;
        }
        if let Some(hit) = self.by_tbg_sku.get(trimmed) {
            return Some(hit);
        }

        let digits = digits_only(trimmed);
        if digits.len() < MIN_WINDOW_LEN {
            tracing::debug!("sku matrix: no window match possible for {:?} (too short)", prtnum);
            return None;
        }

        for window_len in (MIN_WINDOW_LEN..=digits.len()).rev() {
            let last_start = digits.len() - window_len;
            for start in 0..=last_start {
                let window = &digits[start..start + window_len];
                if let Some(hit) = self.by_tbg_sku.get(window) {
                    return Some(hit);
                }
                let unpadded = strip_leading_zeros(window);
                if unpadded != window {
                    if let Some(hit) = self.by_tbg_sku.get(unpadded) {
                        return Some(hit);
                    }
                }
            }
        }

        tracing::debug!("sku matrix: no sliding-window match found for {:?}", prtnum);
        None
    }
}
