//! Shipment header and ship-to address.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{WmsError, WmsResult};
use crate::models::pallet::Pallet;

/// Ship-to address fields for a shipment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ShipToAddress {
    pub name: String,
    pub address_line_1: String,
    pub address_line_2: Option<String>,
    pub address_line_3: Option<String>,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: Option<String>,
    pub phone: Option<String>,
}

/// Shipment header: identifier, order/carrier references, ship-to address, and the
/// pallets attached to it.
///
/// Invariant: the identifier and at least one of
/// {ship-to name, address line 1, city, state, postal, carrier code} must be
/// non-empty. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: String,
    pub external_order_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub status_code: Option<String>,
    pub destination_location_code: Option<String>,
    pub ship_to: ShipToAddress,
    pub carrier_scac: Option<String>,
    pub service_level: Option<String>,
    pub document_number: Option<String>,
    pub tracking_number: Option<String>,
    pub stop_id: Option<String>,
    pub stop_sequence: Option<i32>,
    pub carrier_move_id: Option<String>,
    pub carrier_pro: Option<String>,
    pub customer_po: Option<String>,
    pub dc_location_number: Option<String>,
    pub department_number: Option<String>,
    pub ship_date: Option<NaiveDateTime>,
    pub delivery_date: Option<NaiveDateTime>,
    pub created_at: Option<NaiveDateTime>,
    pub pallets: Vec<Pallet>,
}

impl Shipment {
    /// Constructs a shipment, enforcing the shipment-id non-blank invariant.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        shipment_id: impl Into<String>,
        ship_to: ShipToAddress,
        carrier_scac: Option<String>,
        pallets: Vec<Pallet>,
    ) -> WmsResult<Self> {
        let shipment_id = shipment_id.into();
        if shipment_id.trim().is_empty() {
            return Err(WmsError::validation("shipment identifier must not be blank"));
        }
        let has_identity = !ship_to.name.trim().is_empty()
            || !ship_to.address_line_1.trim().is_empty()
            || !ship_to.city.trim().is_empty()
            || !ship_to.state.trim().is_empty()
            || !ship_to.postal_code.trim().is_empty()
            || carrier_scac.as_deref().map(|c| !c.trim().is_empty()).unwrap_or(false);
        if !has_identity {
            return Err(WmsError::validation(
                "shipment requires at least one of ship-to name/address/city/state/postal/carrier",
            ));
        }
        Ok(Self {
            shipment_id,
            external_order_id: None,
            warehouse_id: None,
            status_code: None,
            destination_location_code: None,
            ship_to,
            carrier_scac,
            service_level: None,
            document_number: None,
            tracking_number: None,
            stop_id: None,
            stop_sequence: None,
            carrier_move_id: None,
            carrier_pro: None,
            customer_po: None,
            dc_location_number: None,
            department_number: None,
            ship_date: None,
            delivery_date: None,
            created_at: None,
            pallets,
        })
    }

    pub fn lpn_count(&self) -> usize {
        self.pallets.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr() -> ShipToAddress {
        ShipToAddress {
            name: "CJR WHOLESALE GROCERS LTD".into(),
            address_line_1: "5876 COOPERS AVE".into(),
            address_line_2: None,
            address_line_3: None,
            city: "MISSISSAUGA".into(),
            state: "ON".into(),
            postal_code: "L4Z 2B9".into(),
            country: Some("CAN".into()),
            phone: None,
        }
    }

    #[test]
    fn rejects_blank_id() {
        assert!(Shipment::new("  ", addr(), Some("MDLE".into()), vec![]).is_err());
    }

    #[test]
    fn rejects_fully_blank_identity() {
        let blank = ShipToAddress::default();
        assert!(Shipment::new("8000141715", blank, None, vec![]).is_err());
    }

    #[test]
    fn accepts_populated_shipment() {
        let s = Shipment::new("8000141715", addr(), Some("MDLE".into()), vec![]).unwrap();
        assert_eq!(s.shipment_id, "8000141715");
        assert_eq!(s.lpn_count(), 0);
    }
}
