//! Walmart SKU mapping row (TBG short SKU <-> Walmart item number).

use serde::{Deserialize, Serialize};

/// One row of the SKU matrix: short TBG SKU, Walmart item number, description.
/// All three fields are required when a row is loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalmartSkuMapping {
    pub tbg_sku: String,
    pub walmart_item_number: String,
    pub description: String,
}
