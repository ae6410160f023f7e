//! Production `QueryLayer` backed by a pooled MSSQL client.
//!
//! The configured Oracle-named `Settings` fields fold into the same
//! `mssql://` connection string shape the dock-monitoring pooled client
//! builds for its own WMS link; see `DESIGN.md` for the rationale.

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use sqlx_oldapi::mssql::{MssqlConnectOptions, MssqlPool};
use sqlx_oldapi::{query_as, FromRow};

use crate::errors::{WmsError, WmsResult};
use crate::models::{CarrierMoveStopRef, LineItem, LotTracking, Pallet, ShipToAddress, Shipment, ShipmentSkuFootprint};
use crate::normalize::safe_uppercase;

use super::{require_id, QueryLayer};

/// One flattened row of the shipment/address/order/stop/carrier-move/pallet/
/// line-item join.
#[derive(Debug, Clone, FromRow)]
struct ShipmentGraphRow {
    shipment_id: String,
    external_order_id: Option<String>,
    warehouse_id: Option<String>,
    status_code: Option<String>,
    destination_location_code: Option<String>,
    ship_to_name: Option<String>,
    ship_to_address_1: Option<String>,
    ship_to_address_2: Option<String>,
    ship_to_address_3: Option<String>,
    ship_to_city: Option<String>,
    ship_to_state: Option<String>,
    ship_to_postal: Option<String>,
    ship_to_country: Option<String>,
    ship_to_phone: Option<String>,
    carrier_scac: Option<String>,
    service_level: Option<String>,
    document_number: Option<String>,
    tracking_number: Option<String>,
    stop_id: Option<String>,
    stop_sequence: Option<i32>,
    carrier_move_id: Option<String>,
    carrier_pro: Option<String>,
    customer_po: Option<String>,
    dc_location_number: Option<String>,
    department_number: Option<String>,
    ship_date: Option<NaiveDateTime>,
    delivery_date: Option<NaiveDateTime>,
    created_at: Option<NaiveDateTime>,
    lpn_id: Option<String>,
    sscc: Option<String>,
    case_count: Option<i64>,
    unit_count: Option<i64>,
    pallet_weight: Option<f64>,
    staging_location: Option<String>,
    warehouse_lot: Option<String>,
    supplier_lot: Option<String>,
    manufacture_date: Option<NaiveDate>,
    best_by_date: Option<NaiveDate>,
    line_id: Option<String>,
    sub_line_id: Option<String>,
    sku: Option<String>,
    item_description: Option<String>,
    customer_part_number: Option<String>,
    order_number: Option<String>,
    consolidation_batch: Option<String>,
    sales_order: Option<String>,
    quantity: Option<i64>,
    units_per_case: Option<i64>,
    unit_of_measure: Option<String>,
    line_weight: Option<f64>,
    gtin: Option<String>,
    upc: Option<String>,
    short_code: Option<String>,
    walmart_item_number: Option<String>,
}

const SHIPMENT_GRAPH_SQL: &str = "
SELECT
    sh.shipment_id, sh.external_order_id, sh.warehouse_id, sh.status_code,
    sh.destination_location_code,
    am.name AS ship_to_name, am.address_line_1 AS ship_to_address_1,
    am.address_line_2 AS ship_to_address_2, am.address_line_3 AS ship_to_address_3,
    am.city AS ship_to_city, am.state AS ship_to_state, am.postal_code AS ship_to_postal,
    am.country AS ship_to_country, am.phone AS ship_to_phone,
    sh.carrier_scac, sh.service_level, oh.bol_number AS document_number, sh.tracking_number,
    st.stop_id, st.stop_sequence, cm.carrier_move_id, cm.carrier_pro,
    oh.customer_po, oh.location_number AS dc_location_number, sh.department_number,
    sh.ship_date, sh.delivery_date, sh.created_at,
    il.lpn_id, il.sscc, il.case_count, il.unit_count, il.weight AS pallet_weight,
    il.staging_location, isub.warehouse_lot, isub.supplier_lot,
    isub.manufacture_date, isub.best_by_date,
    ol.line_id, ol.sub_line_id, COALESCE(pm.sku, ol.sku) AS sku, pm.description AS item_description,
    ol.customer_part_number, ol.order_number, ol.consolidation_batch, ol.sales_order,
    pwd.quantity, ol.units_per_case, ol.unit_of_measure, ol.weight AS line_weight,
    pm.gtin, pm.upc, pm.short_code, pm.walmart_item_number
FROM shipment_header sh
JOIN address_master am ON am.shipment_id = sh.shipment_id
JOIN order_header oh ON oh.shipment_id = sh.shipment_id
LEFT JOIN stop st ON st.stop_id = sh.stop_id
LEFT JOIN carrier_move cm ON cm.carrier_move_id = sh.carrier_move_id
JOIN order_line ol ON ol.shipment_id = sh.shipment_id
LEFT JOIN product_master pm ON pm.sku = ol.sku
LEFT JOIN pick_work_detail pwd ON pwd.line_id = ol.line_id
LEFT JOIN inventory_detail il ON il.line_id = ol.line_id
LEFT JOIN inventory_sub isub ON isub.lpn_id = il.lpn_id
LEFT JOIN inventory_load ild ON ild.lpn_id = il.lpn_id
WHERE sh.shipment_id = ?";

const SKU_FOOTPRINT_SQL: &str = "
SELECT
    COALESCE(pm.sku, ol.sku) AS sku, pm.description AS item_description,
    SUM(ol.quantity) AS total_units, MAX(ol.units_per_case) AS units_per_case,
    MAX(pm.units_per_pallet) AS units_per_pallet,
    MAX(pm.pallet_length) AS pallet_length, MAX(pm.pallet_width) AS pallet_width,
    MAX(pm.pallet_height) AS pallet_height
FROM order_line ol
LEFT JOIN product_master pm ON pm.sku = ol.sku
WHERE ol.shipment_id = ?
GROUP BY COALESCE(pm.sku, ol.sku), pm.description";

const STAGING_LOCATION_SQL: &str = "SELECT destination_location_code FROM shipment_header WHERE shipment_id = ?";

const CARRIER_MOVE_STOPS_SQL: &str = "
SELECT cm.carrier_move_id, st.stop_id, st.stop_sequence AS primary_stop_sequence,
    st.tms_stop_sequence, sh.shipment_id, sh.status_code AS shipment_status,
    sh.created_at AS shipment_created_at
FROM stop st
JOIN shipment_header sh ON sh.stop_id = st.stop_id
JOIN carrier_move cm ON cm.carrier_move_id = st.car_move_id
WHERE st.car_move_id = ?
ORDER BY st.stop_sequence ASC, sh.shipment_id ASC";

/// Connection pool wrapper for the WMS shipment/reference store.
#[derive(Debug, Clone)]
pub struct SqlQueryLayer {
    pool: Arc<MssqlPool>,
}

impl SqlQueryLayer {
    /// Connects using `connection_string` (see
    /// [`crate::config::Settings::database_connection_string`]), tagging the
    /// session with `app_name` the way `DatabaseClient::new` does.
    pub async fn connect(connection_string: &str, app_name: &str, max_pool_size: u32) -> WmsResult<Self> {
        let mut options = MssqlConnectOptions::from_str(connection_string)
            .map_err(|e| WmsError::config(format!("invalid database connection string: {e}")))?;
        options = options.app_name(app_name);
        let pool = MssqlPool::connect_with(options).await?;
        let _ = max_pool_size; // sqlx-oldapi's MssqlPool pools internally; size is set via PoolOptions upstream of this call.
        Ok(Self { pool: Arc::new(pool) })
    }
}

#[async_trait]
impl QueryLayer for SqlQueryLayer {
    async fn shipment_exists(&self, shipment_id: &str) -> WmsResult<bool> {
        let id = require_id(shipment_id, "shipmentId")?;
        let rows: Vec<ShipmentGraphRow> =
            query_as(SHIPMENT_GRAPH_SQL).bind(&id).fetch_all(&*self.pool).await?;
        Ok(!rows.is_empty())
    }

    async fn find_shipment_with_lpns_and_line_items(&self, shipment_id: &str) -> WmsResult<Shipment> {
        let id = require_id(shipment_id, "shipmentId")?;
        let rows: Vec<ShipmentGraphRow> =
            query_as(SHIPMENT_GRAPH_SQL).bind(&id).fetch_all(&*self.pool).await?;
        if rows.is_empty() {
            return Err(WmsError::validation(format!("shipment {id} has no lines")));
        }
        build_shipment_from_rows(rows)
    }

    async fn find_shipment_sku_footprints(&self, shipment_id: &str) -> WmsResult<Vec<ShipmentSkuFootprint>> {
        let id = require_id(shipment_id, "shipmentId")?;
        let rows: Vec<ShipmentSkuFootprint> =
            query_as(SKU_FOOTPRINT_SQL).bind(&id).fetch_all(&*self.pool).await?;
        Ok(rows)
    }

    async fn get_staging_location(&self, shipment_id: &str) -> WmsResult<Option<String>> {
        let id = require_id(shipment_id, "shipmentId")?;
        let row: Option<(Option<String>,)> =
            query_as(STAGING_LOCATION_SQL).bind(&id).fetch_optional(&*self.pool).await?;
        Ok(row.and_then(|(loc,)| loc).map(|s| safe_uppercase(&s)).filter(|s| !s.is_empty()))
    }

    async fn find_carrier_move_stops(&self, carrier_move_id: &str) -> WmsResult<Vec<CarrierMoveStopRef>> {
        let id = require_id(carrier_move_id, "carrierMoveId")?;
        let rows: Vec<CarrierMoveStopRef> =
            query_as(CARRIER_MOVE_STOPS_SQL).bind(&id).fetch_all(&*self.pool).await?;
        Ok(rows)
    }
}

/// Groups flattened join rows by pallet id to reconstruct the shipment tree.
/// Pure and DB-free so it's independently unit-testable.
fn build_shipment_from_rows(rows: Vec<ShipmentGraphRow>) -> WmsResult<Shipment> {
    let head = rows.first().expect("checked non-empty by caller");

    let ship_to = ShipToAddress {
        name: head.ship_to_name.clone().unwrap_or_default(),
        address_line_1: head.ship_to_address_1.clone().unwrap_or_default(),
        address_line_2: head.ship_to_address_2.clone(),
        address_line_3: head.ship_to_address_3.clone(),
        city: head.ship_to_city.clone().unwrap_or_default(),
        state: head.ship_to_state.clone().unwrap_or_default(),
        postal_code: head.ship_to_postal.clone().unwrap_or_default(),
        country: head.ship_to_country.clone(),
        phone: head.ship_to_phone.clone(),
    };

    let mut shipment = Shipment::new(
        head.shipment_id.clone(),
        ship_to,
        head.carrier_scac.clone(),
        Vec::new(),
    )?;
    shipment.external_order_id = head.external_order_id.clone();
    shipment.warehouse_id = head.warehouse_id.clone();
    shipment.status_code = head.status_code.clone();
    shipment.destination_location_code = head.destination_location_code.clone();
    shipment.service_level = head.service_level.clone();
    shipment.document_number = head.document_number.clone();
    shipment.tracking_number = head.tracking_number.clone();
    shipment.stop_id = head.stop_id.clone();
    shipment.stop_sequence = head.stop_sequence;
    shipment.carrier_move_id = head.carrier_move_id.clone();
    shipment.carrier_pro = head.carrier_pro.clone();
    shipment.customer_po = head.customer_po.clone();
    shipment.dc_location_number = head.dc_location_number.clone();
    shipment.department_number = head.department_number.clone();
    shipment.ship_date = head.ship_date;
    shipment.delivery_date = head.delivery_date;
    shipment.created_at = head.created_at;

    // Preserve first-seen order of pallets while grouping their line items.
    let mut pallet_order: Vec<String> = Vec::new();
    let mut pallets: std::collections::HashMap<String, Pallet> = std::collections::HashMap::new();

    for row in &rows {
        let Some(lpn_id) = row.lpn_id.as_ref().filter(|s| !s.trim().is_empty()) else {
            continue;
        };
        let sscc = row.sscc.clone().unwrap_or_default();
        let pallet = pallets.entry(lpn_id.clone()).or_insert_with(|| {
            pallet_order.push(lpn_id.clone());
            let mut p = Pallet::new(lpn_id.clone(), if sscc.is_empty() { "0".repeat(18) } else { sscc.clone() })
                .unwrap_or_else(|_| Pallet {
                    lpn_id: lpn_id.clone(),
                    sscc: sscc.clone(),
                    case_count: None,
                    unit_count: None,
                    weight: None,
                    staging_location: None,
                    lot: LotTracking::default(),
                    line_items: Vec::new(),
                });
            p.case_count = row.case_count;
            p.unit_count = row.unit_count;
            p.weight = row.pallet_weight;
            p.staging_location = row.staging_location.clone();
            p.lot = LotTracking {
                warehouse_lot: row.warehouse_lot.clone(),
                supplier_lot: row.supplier_lot.clone(),
                manufacture_date: row.manufacture_date,
                best_by_date: row.best_by_date,
            };
            p
        });

        if let Some(sku) = row.sku.as_ref().filter(|s| !s.trim().is_empty()) {
            let line_id = row.line_id.clone().unwrap_or_default();
            let quantity = row.quantity.unwrap_or(0);
            if let Ok(mut item) = LineItem::new(line_id, sku.clone(), quantity.max(0)) {
                item.sub_line_id = row.sub_line_id.clone();
                item.description = row.item_description.clone();
                item.customer_part_number = row.customer_part_number.clone();
                item.order_number = row.order_number.clone();
                item.consolidation_batch = row.consolidation_batch.clone();
                item.sales_order = row.sales_order.clone();
                item.units_per_case = row.units_per_case;
                item.unit_of_measure = row.unit_of_measure.clone();
                item.weight = row.line_weight;
                item.gtin = row.gtin.clone();
                item.upc = row.upc.clone();
                item.short_code = row.short_code.clone();
                item.walmart_item_number = row.walmart_item_number.clone();
                pallet.line_items.push(item);
            }
        }
    }

    shipment.pallets = pallet_order.into_iter().filter_map(|id| pallets.remove(&id)).collect();
    Ok(shipment)
}
