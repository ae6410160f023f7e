//! Pallet (LPN) and its lot-tracking metadata.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::{WmsError, WmsResult};
use crate::models::line_item::LineItem;

/// The prefix synthesized for virtual pallets.
pub const VIRTUAL_LPN_PREFIX: &str = "NO_LPN_";

/// Lot tracking metadata carried by a pallet.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LotTracking {
    pub warehouse_lot: Option<String>,
    pub supplier_lot: Option<String>,
    pub manufacture_date: Option<NaiveDate>,
    pub best_by_date: Option<NaiveDate>,
}

/// One physical or virtual pallet (LPN).
///
/// Invariant: `lpn_id` and `sscc` non-empty. A virtual pallet's `lpn_id` begins
/// with [`VIRTUAL_LPN_PREFIX`]; a physical pallet's does not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pallet {
    pub lpn_id: String,
    pub sscc: String,
    pub case_count: Option<i64>,
    pub unit_count: Option<i64>,
    pub weight: Option<f64>,
    pub staging_location: Option<String>,
    pub lot: LotTracking,
    pub line_items: Vec<LineItem>,
}

impl Pallet {
    pub fn new(lpn_id: impl Into<String>, sscc: impl Into<String>) -> WmsResult<Self> {
        let lpn_id = lpn_id.into();
        let sscc = sscc.into();
        if lpn_id.trim().is_empty() {
            return Err(WmsError::validation("pallet LPN id must not be blank"));
        }
        if sscc.trim().is_empty() {
            return Err(WmsError::validation("pallet SSCC must not be blank"));
        }
        Ok(Self {
            lpn_id,
            sscc,
            case_count: None,
            unit_count: None,
            weight: None,
            staging_location: None,
            lot: LotTracking::default(),
            line_items: Vec::new(),
        })
    }

    pub fn is_virtual(&self) -> bool {
        self.lpn_id.starts_with(VIRTUAL_LPN_PREFIX)
    }

    /// Picks the representative line item for label rendering:
    /// the first line item whose SKU resolves via the SKU matrix, else the first
    /// line item.
    pub fn representative_line_item<F>(&self, resolves: F) -> Option<&LineItem>
    where
        F: Fn(&str) -> bool,
    {
        self.line_items
            .iter()
            .find(|li| resolves(&li.sku))
            .or_else(|| self.line_items.first())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_identity() {
        assert!(Pallet::new("", "123").is_err());
        assert!(Pallet::new("LPN001", "").is_err());
    }

    #[test]
    fn virtual_prefix_detection() {
        let p = Pallet::new("NO_LPN_000001", "000000000000000001").unwrap();
        assert!(p.is_virtual());
        let q = Pallet::new("LPN001", "123456789012345678").unwrap();
        assert!(!q.is_virtual());
    }

    #[test]
    fn representative_line_item_prefers_resolvable_sku() {
        let mut p = Pallet::new("LPN001", "123456789012345678").unwrap();
        p.line_items.push(LineItem::new("1", "UNKNOWN", 1).unwrap());
        p.line_items.push(LineItem::new("2", "KNOWN", 1).unwrap());
        let chosen = p.representative_line_item(|sku| sku == "KNOWN").unwrap();
        assert_eq!(chosen.line_id, "2");
    }

    #[test]
    fn representative_line_item_falls_back_to_first() {
        let mut p = Pallet::new("LPN001", "123456789012345678").unwrap();
        p.line_items.push(LineItem::new("1", "A", 1).unwrap());
        p.line_items.push(LineItem::new("2", "B", 1).unwrap());
        let chosen = p.representative_line_item(|_| false).unwrap();
        assert_eq!(chosen.line_id, "1");
    }
}
