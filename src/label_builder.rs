//! Label Data Builder (component G): maps a shipment + pallet +
//! pallet-index (+ optional stop-sequence override) into an unmodifiable,
//! order-preserving field map ready for the Template Engine.
//!
//! Required fields fail the build with [`WmsError::Validation`] when the source
//! value is null or blank after trim; optional fields never come back null or
//! empty — they fall back to the single-space sentinel `" "` so the renderer
//! never rejects them.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

use crate::config::SiteShipFrom;
use crate::errors::{WmsError, WmsResult};
use crate::models::{Pallet, Shipment, ShipmentSkuFootprint};
use crate::reference_data::{LocationMatrix, SkuMatrix};

const SPACE: &str = " ";
const DEFAULT_UOM: &str = "EA";

/// `MM.dd.yyyy`, the date format every formatted label field uses.
const DATE_FMT: &str = "%m.%d.%Y";

/// The built, immutable field map for one pallet label. Order-preserving
/// (`IndexMap`) so downstream diagnostics see fields in the order they were
/// assembled, though lookups for rendering are keyed by name regardless.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelFields(IndexMap<String, String>);

impl LabelFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> indexmap::map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Converts to the flat map the Template Engine renders against.
    pub fn to_template_map(&self) -> BTreeMap<String, String> {
        self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

struct FieldSink {
    fields: IndexMap<String, String>,
}

impl FieldSink {
    fn new() -> Self {
        Self { fields: IndexMap::new() }
    }

    fn required(&mut self, name: &str, value: Option<&str>) -> WmsResult<()> {
        let trimmed = value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| {
            WmsError::validation(format!("label field {name:?} is required and must not be blank"))
        })?;
        self.fields.insert(name.to_string(), trimmed.to_string());
        Ok(())
    }

    fn optional(&mut self, name: &str, value: Option<&str>) {
        let value = value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| SPACE.to_string());
        self.fields.insert(name.to_string(), value);
    }

    fn optional_or(&mut self, name: &str, value: Option<&str>, default: &str) {
        let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or(default);
        self.fields.insert(name.to_string(), value.to_string());
    }

    fn computed(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }
}

fn format_date(value: Option<NaiveDate>) -> Option<String> {
    value.map(|d| d.format(DATE_FMT).to_string())
}

fn format_datetime(value: Option<NaiveDateTime>) -> Option<String> {
    value.map(|d| d.format(DATE_FMT).to_string())
}

/// Builds the field map for one pallet label.
///
/// `pallet_index` is 0-based; `pallet_total` is
/// `max(shipment.lpnCount(), labels actually generated)`
/// (callers in job preparation / task building compute this once for the whole job).
/// `stop_sequence_override` is `Some(seq)` when this job is part of a
/// carrier-move stop group; `None` for a standalone shipment.
#[allow(clippy::too_many_arguments)]
pub fn build_pallet_label_fields(
    shipment: &Shipment,
    pallet: &Pallet,
    pallet_index: usize,
    pallet_total: usize,
    ship_from: &SiteShipFrom,
    sku_matrix: &SkuMatrix,
    footprints_by_sku: &HashMap<String, ShipmentSkuFootprint>,
    location_matrix: Option<&LocationMatrix>,
    stop_sequence_override: Option<i32>,
) -> WmsResult<LabelFields> {
    let mut sink = FieldSink::new();

    sink.required("shipFromName", Some(&ship_from.name))?;
    sink.required("shipFromAddress", Some(&ship_from.address))?;
    sink.required("shipFromCityStateZip", Some(&ship_from.city_state_zip))?;

    let ship_to = &shipment.ship_to;
    sink.required("shipToName", Some(&ship_to.name))?;
    sink.required("shipToAddress1", Some(&ship_to.address_line_1))?;
    sink.required("shipToCity", Some(&ship_to.city))?;
    sink.required("shipToState", Some(&ship_to.state))?;
    sink.required("shipToZip", Some(&ship_to.postal_code))?;

    sink.optional("shipToAddress2", ship_to.address_line_2.as_deref());
    sink.optional("shipToAddress3", ship_to.address_line_3.as_deref());
    sink.optional("shipToCountry", ship_to.country.as_deref());
    sink.optional("shipToPhone", ship_to.phone.as_deref());

    sink.required("carrierCode", shipment.carrier_scac.as_deref())?;
    sink.optional("carrierMoveId", shipment.carrier_move_id.as_deref());
    sink.optional("serviceLevel", shipment.service_level.as_deref());
    sink.optional("documentNumber", shipment.document_number.as_deref());
    sink.optional("trackingNumber", shipment.tracking_number.as_deref());

    sink.optional("customerPo", shipment.customer_po.as_deref());
    let location_number = match (&shipment.dc_location_number, location_matrix) {
        (Some(raw), Some(matrix)) => Some(matrix.resolve_dc_location(raw)),
        (Some(raw), None) => Some(raw.trim().to_string()),
        (None, _) => None,
    };
    sink.optional("locationNumber", location_number.as_deref());
    sink.optional("departmentNumber", shipment.department_number.as_deref());
    sink.optional("proNumber", shipment.carrier_pro.as_deref());
    sink.optional("bolNumber", shipment.document_number.as_deref());

    let stop_sequence = stop_sequence_override.or(shipment.stop_sequence).map(|s| s.to_string());
    sink.optional("stopSequence", stop_sequence.as_deref());

    sink.optional("shipDate", format_datetime(shipment.ship_date).as_deref());
    sink.optional("deliveryDate", format_datetime(shipment.delivery_date).as_deref());

    sink.required("lpnId", Some(&pallet.lpn_id))?;
    sink.required("ssccBarcode", Some(&pallet.sscc))?;

    sink.computed("palletSeq", (pallet_index + 1).to_string());
    sink.computed("palletTotal", pallet_total.to_string());

    let weight = pallet.weight.map(|w| format!("{w}"));
    sink.optional("weight", weight.as_deref());

    sink.optional("warehouseLot", pallet.lot.warehouse_lot.as_deref());
    sink.optional("customerLot", pallet.lot.supplier_lot.as_deref());
    sink.optional("manufactureDate", format_date(pallet.lot.manufacture_date).as_deref());
    sink.optional("bestByDate", format_date(pallet.lot.best_by_date).as_deref());

    let chosen = pallet.representative_line_item(|sku| sku_matrix.find_by_prtnum(sku).is_some());
    if let Some(item) = chosen {
        sink.required("tbgSku", Some(&item.sku))?;
        sink.computed("quantity", item.quantity.to_string());
        sink.optional_or("unitOfMeasure", item.unit_of_measure.as_deref(), DEFAULT_UOM);

        let matched = sku_matrix.find_by_prtnum(&item.sku);
        let walmart_item_number =
            matched.map(|m| m.walmart_item_number.clone()).or_else(|| item.walmart_item_number.clone());
        let item_description = matched.map(|m| m.description.clone()).or_else(|| item.description.clone());
        sink.optional("walmartItemNumber", walmart_item_number.as_deref());
        sink.optional("itemDescription", item_description.as_deref());

        sink.optional("gtinBarcode", item.gtin.as_deref());
        sink.optional("upcCode", item.upc.as_deref());

        let footprint = footprints_by_sku.get(&item.sku);
        let units_per_case =
            item.units_per_case.or_else(|| footprint.and_then(|f| f.units_per_case)).map(|v| v.to_string());
        sink.optional("unitsPerCase", units_per_case.as_deref());

        let units_per_pallet = footprint.and_then(|f| f.usable_units_per_pallet()).map(|v| v.to_string());
        sink.optional("unitsPerPallet", units_per_pallet.as_deref());

        let pallet_length = footprint.and_then(|f| f.pallet_length).map(|v| format!("{v}"));
        let pallet_width = footprint.and_then(|f| f.pallet_width).map(|v| format!("{v}"));
        let pallet_height = footprint.and_then(|f| f.pallet_height).map(|v| format!("{v}"));
        sink.optional("palletLength", pallet_length.as_deref());
        sink.optional("palletWidth", pallet_width.as_deref());
        sink.optional("palletHeight", pallet_height.as_deref());
    }

    sink.optional("stagingLocation", pallet.staging_location.as_deref());

    Ok(LabelFields(sink.fields))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LineItem, ShipToAddress};

    fn ship_from() -> SiteShipFrom {
        SiteShipFrom {
            name: "TBG WAREHOUSE".into(),
            address: "100 DEPOT RD".into(),
            city_state_zip: "TORONTO ON M1M 1M1".into(),
        }
    }

    fn shipment() -> Shipment {
        let addr = ShipToAddress {
            name: "CJR WHOLESALE GROCERS LTD".into(),
            address_line_1: "5876 COOPERS AVE".into(),
            address_line_2: None,
            address_line_3: None,
            city: "MISSISSAUGA".into(),
            state: "ON".into(),
            postal_code: "L4Z 2B9".into(),
            country: Some("CAN".into()),
            phone: None,
        };
        let mut s = Shipment::new("8000141715", addr, Some("MDLE".into()), vec![]).unwrap();
        s.document_number = Some("30021144717".into());
        s.tracking_number = Some("8000141715".into());
        s
    }

    fn pallet_with_line(sku: &str) -> Pallet {
        let mut p = Pallet::new("LPN001", "123456789012345678").unwrap();
        p.weight = Some(42.5);
        p.line_items.push(LineItem::new("1", sku, 10).unwrap());
        p
    }

    fn sku_matrix() -> SkuMatrix {
        SkuMatrix::parse(
            "TBG SKU#, WALMART ITEM#, Item Description, check\n205641,30081705,1.36L PL 1/6 NJ STRW BAN,\n",
        )
        .unwrap()
    }

    #[test]
    fn single_pallet_label_fields_include_enriched_sku_data() {
        let s = shipment();
        let pallet = pallet_with_line("10048500205641000");
        let matrix = sku_matrix();
        let fields = build_pallet_label_fields(
            &s,
            &pallet,
            0,
            1,
            &ship_from(),
            &matrix,
            &HashMap::new(),
            None,
            None,
        )
        .unwrap();

        assert_eq!(fields.get("shipToName"), Some("CJR WHOLESALE GROCERS LTD"));
        assert_eq!(fields.get("carrierCode"), Some("MDLE"));
        assert_eq!(fields.get("documentNumber"), Some("30021144717"));
        assert_eq!(fields.get("walmartItemNumber"), Some("30081705"));
        assert_eq!(fields.get("itemDescription"), Some("1.36L PL 1/6 NJ STRW BAN"));
        assert_eq!(fields.get("palletSeq"), Some("1"));
        assert_eq!(fields.get("palletTotal"), Some("1"));
    }

    #[test]
    fn required_field_missing_is_validation_error() {
        let mut s = shipment();
        s.ship_to.city = String::new();
        let pallet = pallet_with_line("10048500205641000");
        let err = build_pallet_label_fields(
            &s,
            &pallet,
            0,
            1,
            &ship_from(),
            &sku_matrix(),
            &HashMap::new(),
            None,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, WmsError::Validation(_)));
    }

    #[test]
    fn optional_fields_never_empty() {
        let s = shipment();
        let pallet = pallet_with_line("10048500205641000");
        let fields = build_pallet_label_fields(
            &s,
            &pallet,
            0,
            1,
            &ship_from(),
            &sku_matrix(),
            &HashMap::new(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(fields.get("shipToAddress2"), Some(" "));
        assert_eq!(fields.get("stagingLocation"), Some(" "));
    }

    #[test]
    fn missing_sku_match_defaults_walmart_fields_to_space_not_failure() {
        let s = shipment();
        let pallet = pallet_with_line("UNMAPPABLE_SKU_000");
        let fields = build_pallet_label_fields(
            &s,
            &pallet,
            0,
            1,
            &ship_from(),
            &sku_matrix(),
            &HashMap::new(),
            None,
            None,
        )
        .unwrap();
        assert_eq!(fields.get("walmartItemNumber"), Some(" "));
        assert_eq!(fields.get("itemDescription"), Some(" "));
        assert_eq!(fields.get("tbgSku"), Some("UNMAPPABLE_SKU_000"));
    }

    #[test]
    fn stop_sequence_override_wins_over_shipment_value() {
        let mut s = shipment();
        s.stop_sequence = Some(9);
        let pallet = pallet_with_line("10048500205641000");
        let fields = build_pallet_label_fields(
            &s,
            &pallet,
            0,
            1,
            &ship_from(),
            &sku_matrix(),
            &HashMap::new(),
            None,
            Some(1),
        )
        .unwrap();
        assert_eq!(fields.get("stopSequence"), Some("1"));
    }
}
