//! In-memory `QueryLayer` fake used by component/black-box tests
//! so the pipeline is testable without a live database.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::errors::{WmsError, WmsResult};
use crate::models::{CarrierMoveStopRef, Shipment, ShipmentSkuFootprint};

use super::{require_id, QueryLayer};

/// A hand-built shipment graph plus footprint rows, keyed by shipment id, with
/// a separate carrier-move -> stop index.
#[derive(Debug, Default)]
pub struct FakeQueryLayer {
    shipments: Mutex<HashMap<String, Shipment>>,
    footprints: Mutex<HashMap<String, Vec<ShipmentSkuFootprint>>>,
    carrier_moves: Mutex<HashMap<String, Vec<CarrierMoveStopRef>>>,
}

impl FakeQueryLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_shipment(self, shipment: Shipment) -> Self {
        self.shipments.lock().unwrap().insert(shipment.shipment_id.clone(), shipment);
        self
    }

    pub fn with_footprints(self, shipment_id: impl Into<String>, footprints: Vec<ShipmentSkuFootprint>) -> Self {
        self.footprints.lock().unwrap().insert(shipment_id.into(), footprints);
        self
    }

    pub fn with_carrier_move_stops(self, carrier_move_id: impl Into<String>, stops: Vec<CarrierMoveStopRef>) -> Self {
        self.carrier_moves.lock().unwrap().insert(carrier_move_id.into(), stops);
        self
    }
}

#[async_trait]
impl QueryLayer for FakeQueryLayer {
    async fn shipment_exists(&self, shipment_id: &str) -> WmsResult<bool> {
        let id = require_id(shipment_id, "shipmentId")?;
        Ok(self.shipments.lock().unwrap().contains_key(&id))
    }

    async fn find_shipment_with_lpns_and_line_items(&self, shipment_id: &str) -> WmsResult<Shipment> {
        let id = require_id(shipment_id, "shipmentId")?;
        self.shipments
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| WmsError::validation(format!("shipment {id} has no lines")))
    }

    async fn find_shipment_sku_footprints(&self, shipment_id: &str) -> WmsResult<Vec<ShipmentSkuFootprint>> {
        let id = require_id(shipment_id, "shipmentId")?;
        Ok(self.footprints.lock().unwrap().get(&id).cloned().unwrap_or_default())
    }

    async fn get_staging_location(&self, shipment_id: &str) -> WmsResult<Option<String>> {
        let id = require_id(shipment_id, "shipmentId")?;
        Ok(self
            .shipments
            .lock()
            .unwrap()
            .get(&id)
            .and_then(|s| s.destination_location_code.clone())
            .map(|s| s.to_uppercase())
            .filter(|s| !s.is_empty()))
    }

    async fn find_carrier_move_stops(&self, carrier_move_id: &str) -> WmsResult<Vec<CarrierMoveStopRef>> {
        let id = require_id(carrier_move_id, "carrierMoveId")?;
        let mut rows = self.carrier_moves.lock().unwrap().get(&id).cloned().unwrap_or_default();
        rows.sort_by(|a, b| {
            a.primary_stop_sequence
                .cmp(&b.primary_stop_sequence)
                .then_with(|| a.shipment_id.cmp(&b.shipment_id))
        });
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShipToAddress;

    fn shipment(id: &str) -> Shipment {
        Shipment::new(
            id,
            ShipToAddress { name: "X".into(), ..Default::default() },
            Some("MDLE".into()),
            vec![],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn shipment_exists_reflects_seeded_data() {
        let fake = FakeQueryLayer::new().with_shipment(shipment("8000141715"));
        assert!(fake.shipment_exists("8000141715").await.unwrap());
        assert!(!fake.shipment_exists("9999999999").await.unwrap());
    }

    #[tokio::test]
    async fn rejects_blank_id() {
        let fake = FakeQueryLayer::new();
        assert!(fake.shipment_exists("   ").await.is_err());
    }

    #[tokio::test]
    async fn carrier_move_stops_sort_by_primary_sequence_then_shipment_id() {
        let fake = FakeQueryLayer::new().with_carrier_move_stops(
            "205109",
            vec![
                CarrierMoveStopRef {
                    carrier_move_id: "205109".into(),
                    stop_id: "S2".into(),
                    primary_stop_sequence: Some(2),
                    tms_stop_sequence: None,
                    shipment_id: "8000473512".into(),
                    shipment_status: None,
                    shipment_created_at: None,
                },
                CarrierMoveStopRef {
                    carrier_move_id: "205109".into(),
                    stop_id: "S1".into(),
                    primary_stop_sequence: Some(1),
                    tms_stop_sequence: None,
                    shipment_id: "8000473513".into(),
                    shipment_status: None,
                    shipment_created_at: None,
                },
            ],
        );
        let stops = fake.find_carrier_move_stops("205109").await.unwrap();
        assert_eq!(stops[0].shipment_id, "8000473513");
        assert_eq!(stops[1].shipment_id, "8000473512");
    }
}
