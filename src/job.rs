//! Job Preparation (component H): builds immutable
//! `PreparedJob` / `PreparedCarrierMoveJob` / `PreparedQueue` values by
//! composing the Query Layer (E), Reference Data Loaders (A), and Planning
//! (F). Job Preparation is generic over `Q: QueryLayer` so it runs unmodified
//! against either `SqlQueryLayer` or `FakeQueryLayer`.

use std::collections::HashMap;

use crate::config::SiteShipFrom;
use crate::errors::{WmsError, WmsResult};
use crate::models::{CarrierMoveStopRef, LabelTemplate, Pallet, PrinterConfig, Shipment, ShipmentSkuFootprint};
use crate::planning::{self, PlanResult, SkuPlan};
use crate::printing::PrinterRegistry;
use crate::query::QueryLayer;
use crate::reference_data::{LocationMatrix, SkuMatrix};

/// The immutable, job-independent collaborators every `PreparedJob` shares:
/// the active site's ship-from address, the SKU/location reference data, the
/// printer registry, and the parsed label template. Built once per run.
pub struct PipelineContext {
    pub ship_from: SiteShipFrom,
    pub sku_matrix: SkuMatrix,
    pub location_matrix: Option<LocationMatrix>,
    pub printer_registry: PrinterRegistry,
    pub label_template: LabelTemplate,
}

/// Monotonic counter feeding the synthetic virtual-LPN sequence
///, threaded through job preparation so pallet ids stay
/// unique across every shipment in one run.
#[derive(Debug, Default)]
pub struct VirtualLpnSequence(u64);

impl VirtualLpnSequence {
    pub fn new(start: u64) -> Self {
        Self(start)
    }

    fn take(&mut self, count: u64) -> u64 {
        let start = self.0.max(1);
        self.0 = start + count;
        start
    }
}

/// A fully assembled, ready-to-task shipment job.
pub struct PreparedJob {
    pub shipment_id: String,
    pub shipment: Shipment,
    pub footprints_by_sku: HashMap<String, ShipmentSkuFootprint>,
    pub plan: PlanResult,
    pub sku_plans: Vec<SkuPlan>,
    pub pallets: Vec<Pallet>,
    pub is_virtual: bool,
    pub staging_location: Option<String>,
}

impl PreparedJob {
    /// `palletTotal`: `max(shipment.lpnCount, labels actually generated)`.
    pub fn pallet_total(&self) -> usize {
        self.shipment.lpn_count().max(self.pallets.len())
    }
}

/// Builds a `PreparedJob` for one shipment id: resolves the shipment graph and
/// SKU footprints, plans pallets, and synthesizes virtual pallets if the
/// shipment graph carries none yet.
pub async fn prepare_shipment_job<Q: QueryLayer + ?Sized>(
    query: &Q,
    shipment_id: &str,
    virtual_seq: &mut VirtualLpnSequence,
) -> WmsResult<PreparedJob> {
    let shipment_id = crate::normalize::require_non_empty(shipment_id, "shipmentId")?;
    let shipment = query.find_shipment_with_lpns_and_line_items(&shipment_id).await?;
    let footprint_rows = query.find_shipment_sku_footprints(&shipment_id).await?;
    let staging_location = query.get_staging_location(&shipment_id).await?;

    let plan = planning::plan(&footprint_rows);
    let sku_plans = planning::sku_plans(&footprint_rows);

    let (pallets, is_virtual) = if shipment.pallets.is_empty() {
        let seq_start = virtual_seq.take(plan.estimated_pallets.max(0) as u64);
        (planning::synthesize_virtual_pallets(&footprint_rows, seq_start), true)
    } else {
        (shipment.pallets.clone(), false)
    };

    let footprints_by_sku =
        footprint_rows.into_iter().map(|f| (f.sku.clone(), f)).collect::<HashMap<_, _>>();

    Ok(PreparedJob { shipment_id, shipment, footprints_by_sku, plan, sku_plans, pallets, is_virtual, staging_location })
}

/// One stop within a carrier-move, carrying the prepared jobs for every
/// shipment at that stop.
pub struct PreparedStopGroup {
    pub stop_id: String,
    pub stop_position: usize,
    pub primary_stop_sequence: Option<i32>,
    pub jobs: Vec<PreparedJob>,
}

/// An ordered fan-out over a carrier-move's stops.
pub struct PreparedCarrierMoveJob {
    pub carrier_move_id: String,
    pub groups: Vec<PreparedStopGroup>,
}

impl PreparedCarrierMoveJob {
    pub fn all_shipment_ids(&self) -> Vec<&str> {
        self.groups.iter().flat_map(|g| g.jobs.iter().map(|j| j.shipment_id.as_str())).collect()
    }
}

/// Groups carrier-move stop rows into stop groups, preserving first-seen
/// (query) order for the stable tie-break below.
fn group_stops(rows: Vec<CarrierMoveStopRef>) -> Vec<(String, Option<i32>, Vec<String>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, (Option<i32>, Vec<String>)> = HashMap::new();

    for row in rows {
        let entry = groups.entry(row.stop_id.clone()).or_insert_with(|| {
            order.push(row.stop_id.clone());
            (row.primary_stop_sequence, Vec::new())
        });
        entry.1.push(row.shipment_id);
    }

    let mut grouped: Vec<(String, Option<i32>, Vec<String>)> =
        order.into_iter().map(|stop_id| {
            let (seq, shipment_ids) = groups.remove(&stop_id).expect("grouped above");
            (stop_id, seq, shipment_ids)
        }).collect();

    // Stable sort: primary stop sequence ascending, absent sequences sort last,
    // ties broken by original (group-creation) order.
    grouped.sort_by_key(|(_, seq, _)| match seq {
        Some(s) => (0, *s),
        None => (1, i32::MAX),
    });
    grouped
}

/// Builds a `PreparedCarrierMoveJob`: fans out to every shipment referenced by
/// the carrier-move's stops, grouped and ordered by stop position.
pub async fn prepare_carrier_move_job<Q: QueryLayer + ?Sized>(
    query: &Q,
    carrier_move_id: &str,
    virtual_seq: &mut VirtualLpnSequence,
) -> WmsResult<PreparedCarrierMoveJob> {
    let carrier_move_id = crate::normalize::require_non_empty(carrier_move_id, "carrierMoveId")?;
    let stops = query.find_carrier_move_stops(&carrier_move_id).await?;
    if stops.is_empty() {
        return Err(WmsError::validation(format!(
            "carrier-move {carrier_move_id} has no stops"
        )));
    }

    let grouped = group_stops(stops);
    let mut groups = Vec::with_capacity(grouped.len());
    let mut stop_position = 0usize;

    for (stop_id, primary_stop_sequence, shipment_ids) in grouped {
        // De-duplicate preserving stop-query order, then sort ascending.
        let mut seen = std::collections::HashSet::new();
        let mut deduped: Vec<String> =
            shipment_ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
        deduped.sort();
        if deduped.is_empty() {
            continue;
        }

        let mut jobs = Vec::with_capacity(deduped.len());
        for shipment_id in deduped {
            jobs.push(prepare_shipment_job(query, &shipment_id, virtual_seq).await?);
        }

        stop_position += 1;
        groups.push(PreparedStopGroup { stop_id, stop_position, primary_stop_sequence, jobs });
    }

    Ok(PreparedCarrierMoveJob { carrier_move_id, groups })
}

/// One input into a `PreparedQueue`: either a shipment id or a carrier-move id.
pub enum QueueInput {
    Shipment(String),
    CarrierMove(String),
}

/// A prepared queue item, tagged with the kind and source id it was built from.
pub enum PreparedQueueItem {
    Shipment { source_id: String, job: PreparedJob },
    CarrierMove { source_id: String, job: PreparedCarrierMoveJob },
}

impl PreparedQueueItem {
    pub fn source_id(&self) -> &str {
        match self {
            PreparedQueueItem::Shipment { source_id, .. } => source_id,
            PreparedQueueItem::CarrierMove { source_id, .. } => source_id,
        }
    }
}

/// An ordered list of queue items. Empty input is rejected.
pub struct PreparedQueue {
    pub items: Vec<PreparedQueueItem>,
}

/// Builds a `PreparedQueue` from an ordered list of inputs. Fails with
/// `ValidationError` if `inputs` is empty.
pub async fn prepare_queue<Q: QueryLayer + ?Sized>(
    query: &Q,
    inputs: Vec<QueueInput>,
    virtual_seq: &mut VirtualLpnSequence,
) -> WmsResult<PreparedQueue> {
    if inputs.is_empty() {
        return Err(WmsError::validation("queue input must not be empty"));
    }
    let mut items = Vec::with_capacity(inputs.len());
    for input in inputs {
        match input {
            QueueInput::Shipment(id) => {
                let job = prepare_shipment_job(query, &id, virtual_seq).await?;
                items.push(PreparedQueueItem::Shipment { source_id: id, job });
            }
            QueueInput::CarrierMove(id) => {
                let job = prepare_carrier_move_job(query, &id, virtual_seq).await?;
                items.push(PreparedQueueItem::CarrierMove { source_id: id, job });
            }
        }
    }
    Ok(PreparedQueue { items })
}

/// Resolves the printer for a job from its context's registry and a caller
/// context map, honoring an explicit force-override id first (`PRINTER_FORCE_ID`).
pub fn resolve_printer<'a>(
    ctx: &'a PipelineContext,
    force_printer_id: Option<&str>,
    selection_context: &HashMap<String, String>,
) -> WmsResult<&'a PrinterConfig> {
    if let Some(id) = force_printer_id {
        return ctx.printer_registry.find_printer(id).ok_or_else(|| {
            WmsError::config(format!("forced printer id {id:?} is unknown or disabled"))
        });
    }
    ctx.printer_registry.select_printer(selection_context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ShipToAddress;
    use crate::query::FakeQueryLayer;

    fn shipment(id: &str) -> Shipment {
        Shipment::new(
            id,
            ShipToAddress { name: "X".into(), ..Default::default() },
            Some("MDLE".into()),
            vec![],
        )
        .unwrap()
    }

    fn stop_ref(stop_id: &str, seq: Option<i32>, shipment_id: &str) -> CarrierMoveStopRef {
        CarrierMoveStopRef {
            carrier_move_id: "205109".into(),
            stop_id: stop_id.into(),
            primary_stop_sequence: seq,
            tms_stop_sequence: None,
            shipment_id: shipment_id.into(),
            shipment_status: None,
            shipment_created_at: None,
        }
    }

    #[tokio::test]
    async fn missing_footprint_prepares_one_virtual_pallet() {
        let fake = FakeQueryLayer::new()
            .with_shipment(shipment("8000141715"))
            .with_footprints("8000141715", vec![crate::models::ShipmentSkuFootprint::new("Y", 40).unwrap()]);
        let mut seq = VirtualLpnSequence::new(1);
        let job = prepare_shipment_job(&fake, "8000141715", &mut seq).await.unwrap();
        assert!(job.is_virtual);
        assert_eq!(job.pallets.len(), 1);
        assert_eq!(job.plan.skus_missing_footprint, vec!["Y".to_string()]);
    }

    #[tokio::test]
    async fn carrier_move_stop_ordering_follows_primary_sequence() {
        let fake = FakeQueryLayer::new()
            .with_shipment(shipment("8000473513"))
            .with_shipment(shipment("8000473512"))
            .with_carrier_move_stops(
                "205109",
                vec![
                    stop_ref("S2", Some(2), "8000473512"),
                    stop_ref("S1", Some(1), "8000473513"),
                ],
            );
        let mut seq = VirtualLpnSequence::new(1);
        let job = prepare_carrier_move_job(&fake, "205109", &mut seq).await.unwrap();
        assert_eq!(job.groups.len(), 2);
        assert_eq!(job.groups[0].stop_position, 1);
        assert_eq!(job.groups[0].jobs[0].shipment_id, "8000473513");
        assert_eq!(job.groups[1].stop_position, 2);
        assert_eq!(job.groups[1].jobs[0].shipment_id, "8000473512");
    }

    #[tokio::test]
    async fn absent_primary_sequence_sorts_last() {
        let fake = FakeQueryLayer::new()
            .with_shipment(shipment("A"))
            .with_shipment(shipment("B"))
            .with_carrier_move_stops(
                "CM1",
                vec![stop_ref("S_NONE", None, "A"), stop_ref("S1", Some(1), "B")],
            );
        let mut seq = VirtualLpnSequence::new(1);
        let job = prepare_carrier_move_job(&fake, "CM1", &mut seq).await.unwrap();
        assert_eq!(job.groups[0].jobs[0].shipment_id, "B");
        assert_eq!(job.groups[1].jobs[0].shipment_id, "A");
    }

    #[tokio::test]
    async fn empty_queue_input_is_validation_error() {
        let fake = FakeQueryLayer::new();
        let mut seq = VirtualLpnSequence::new(1);
        assert!(prepare_queue(&fake, vec![], &mut seq).await.is_err());
    }

    #[tokio::test]
    async fn carrier_move_with_no_stops_is_validation_error() {
        let fake = FakeQueryLayer::new();
        let mut seq = VirtualLpnSequence::new(1);
        assert!(prepare_carrier_move_job(&fake, "GHOST", &mut seq).await.is_err());
    }
}
