//! Query Layer (component E): shipment graph + SKU footprint +
//! carrier-move/stop retrieval over the relational store, exposed as a trait so
//! Job Preparation (component H) is generic over the live database or an
//! in-memory fake, mirroring the teacher's `Repository<T>` trait in
//! `repositories/repository_trait.rs`.

pub mod fake;
pub mod sql;

use async_trait::async_trait;

use crate::errors::WmsResult;
use crate::models::{CarrierMoveStopRef, Shipment, ShipmentSkuFootprint};
use crate::normalize::require_non_empty;

pub use fake::FakeQueryLayer;
pub use sql::SqlQueryLayer;

/// The five read operations the labeling pipeline needs from the shipment
/// store. All failures wrap into [`crate::errors::WmsError::DbConnectivity`]
///; inputs are validated non-blank before any query runs.
#[async_trait]
pub trait QueryLayer: Send + Sync {
    async fn shipment_exists(&self, shipment_id: &str) -> WmsResult<bool>;

    async fn find_shipment_with_lpns_and_line_items(&self, shipment_id: &str) -> WmsResult<Shipment>;

    async fn find_shipment_sku_footprints(&self, shipment_id: &str) -> WmsResult<Vec<ShipmentSkuFootprint>>;

    async fn get_staging_location(&self, shipment_id: &str) -> WmsResult<Option<String>>;

    async fn find_carrier_move_stops(&self, carrier_move_id: &str) -> WmsResult<Vec<CarrierMoveStopRef>>;
}

/// Shared input validation for every `QueryLayer` entry point: non-null,
/// non-blank ids, validated before any query executes.
pub(crate) fn require_id(id: &str, field: &str) -> WmsResult<String> {
    require_non_empty(id, field)
}
