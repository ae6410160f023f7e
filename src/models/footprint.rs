//! Per-SKU packaging footprint used by the Planning component.

use serde::{Deserialize, Serialize};
use sqlx_oldapi::FromRow;

use crate::errors::{WmsError, WmsResult};

/// Aggregated per-SKU units and optional packaging metadata for one shipment.
///
/// Invariant: `sku` non-empty; `total_units >= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ShipmentSkuFootprint {
    pub sku: String,
    pub item_description: Option<String>,
    pub total_units: i64,
    pub units_per_case: Option<i64>,
    pub units_per_pallet: Option<i64>,
    pub pallet_length: Option<f64>,
    pub pallet_width: Option<f64>,
    pub pallet_height: Option<f64>,
}

impl ShipmentSkuFootprint {
    pub fn new(sku: impl Into<String>, total_units: i64) -> WmsResult<Self> {
        let sku = sku.into();
        if sku.trim().is_empty() {
            return Err(WmsError::validation("footprint SKU must not be blank"));
        }
        if total_units < 0 {
            return Err(WmsError::validation("footprint total units must be >= 0"));
        }
        Ok(Self {
            sku,
            item_description: None,
            total_units,
            units_per_case: None,
            units_per_pallet: None,
            pallet_length: None,
            pallet_width: None,
            pallet_height: None,
        })
    }

    /// `units_per_pallet` as a usable (>0) value, else `None`.
    pub fn usable_units_per_pallet(&self) -> Option<i64> {
        self.units_per_pallet.filter(|&upp| upp > 0)
    }
}
