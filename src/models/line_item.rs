//! Line item attached to a pallet.

use serde::{Deserialize, Serialize};

use crate::errors::{WmsError, WmsResult};

/// One order line (or sub-line) loaded onto a pallet.
///
/// Invariant: `sku` non-empty; `quantity >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_id: String,
    pub sub_line_id: Option<String>,
    pub sku: String,
    pub description: Option<String>,
    pub customer_part_number: Option<String>,
    pub order_number: Option<String>,
    pub consolidation_batch: Option<String>,
    pub sales_order: Option<String>,
    pub quantity: i64,
    pub units_per_case: Option<i64>,
    pub unit_of_measure: Option<String>,
    pub weight: Option<f64>,
    pub gtin: Option<String>,
    pub upc: Option<String>,
    pub short_code: Option<String>,
    pub walmart_item_number: Option<String>,
}

impl LineItem {
    pub fn new(line_id: impl Into<String>, sku: impl Into<String>, quantity: i64) -> WmsResult<Self> {
        let sku = sku.into();
        if sku.trim().is_empty() {
            return Err(WmsError::validation("line item SKU must not be blank"));
        }
        if quantity < 0 {
            return Err(WmsError::validation("line item quantity must be >= 0"));
        }
        Ok(Self {
            line_id: line_id.into(),
            sub_line_id: None,
            sku,
            description: None,
            customer_part_number: None,
            order_number: None,
            consolidation_batch: None,
            sales_order: None,
            quantity,
            units_per_case: None,
            unit_of_measure: None,
            weight: None,
            gtin: None,
            upc: None,
            short_code: None,
            walmart_item_number: None,
        })
    }
}
