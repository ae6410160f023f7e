//! # Reference Data Loaders (component A)
//!
//! Loads the SKU matrix and sold-to -> DC location matrix from small text tables
//! and provides O(1) lookups with longest-match fallback strategies.

pub mod location_matrix;
pub mod sku_matrix;

pub use location_matrix::LocationMatrix;
pub use sku_matrix::SkuMatrix;
