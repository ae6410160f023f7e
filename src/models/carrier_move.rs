//! Carrier-move to stop to shipment index row (component E).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx_oldapi::FromRow;

/// One shipment's entry in a carrier-move's stop index.
///
/// The primary stop sequence is authoritative; the TMS-provided sequence is
/// secondary and known unreliable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CarrierMoveStopRef {
    pub carrier_move_id: String,
    pub stop_id: String,
    pub primary_stop_sequence: Option<i32>,
    pub tms_stop_sequence: Option<i32>,
    pub shipment_id: String,
    pub shipment_status: Option<String>,
    pub shipment_created_at: Option<NaiveDateTime>,
}
