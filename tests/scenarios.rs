//! Black-box behavioral tests: drive the public pipeline surface — prepare a
//! job against a `FakeQueryLayer`, build its tasks, execute them through the
//! checkpointed executor — end to end, without touching any component's
//! internals directly.

use std::collections::HashMap;

use wms_label_pipeline::config::SiteShipFrom;
use wms_label_pipeline::executor;
use wms_label_pipeline::job::{
    self, PipelineContext, PreparedQueueItem, QueueInput, VirtualLpnSequence,
};
use wms_label_pipeline::label_builder;
use wms_label_pipeline::models::{
    now_naive, CarrierMoveStopRef, InputMode, JobCheckpoint, LabelTemplate, LineItem, Pallet,
    ShipToAddress, Shipment, ShipmentSkuFootprint, TaskKind,
};
use wms_label_pipeline::printing::{PrinterRegistry, WireTransport};
use wms_label_pipeline::query::FakeQueryLayer;
use wms_label_pipeline::reference_data::SkuMatrix;
use wms_label_pipeline::task_builder;

const INVENTORY_YAML: &str = "printers:\n\
  - id: DISPATCH\n\
    name: Dispatch Dock\n\
    ip: 10.0.0.5\n\
  - id: OFFICE\n\
    name: Office\n\
    ip: 10.0.0.6\n\
    port: 9101\n";

const ROUTING_YAML: &str = "defaultPrinterId: OFFICE\n\
rules:\n\
  - id: r1\n\
    when:\n\
      all:\n\
        - field: stagingLocation\n\
          op: EQUALS\n\
          value: ROSSI\n\
    then:\n\
      printerId: DISPATCH\n";

fn ship_from() -> SiteShipFrom {
    SiteShipFrom {
        name: "TBG WAREHOUSE".into(),
        address: "100 DEPOT RD".into(),
        city_state_zip: "TORONTO ON M1M 1M1".into(),
    }
}

fn sku_matrix() -> SkuMatrix {
    SkuMatrix::parse(
        "TBG SKU#, WALMART ITEM#, Item Description, check\n\
205641,30081705,1.36L PL 1/6 NJ STRW BAN,\n",
    )
    .unwrap()
}

fn pipeline_context() -> PipelineContext {
    PipelineContext {
        ship_from: ship_from(),
        sku_matrix: sku_matrix(),
        location_matrix: None,
        printer_registry: PrinterRegistry::load(INVENTORY_YAML, ROUTING_YAML).unwrap(),
        label_template: LabelTemplate::parse(
            "pallet",
            "^XA^FD{shipToName}^FS^FD{carrierCode}^FS^FD{walmartItemNumber}^FS^FD{itemDescription}^FS^XZ",
        )
        .unwrap(),
    }
}

fn walmart_canada_addr() -> ShipToAddress {
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

/// A shipment with one physical pallet renders one pallet label plus a stop
/// info tag, with SKU-matrix enrichment flowing through to the payload.
#[tokio::test]
async fn single_physical_pallet_renders_label_and_stop_tag() {
    let mut pallet = Pallet::new("LPN001", "123456789012345678").unwrap();
    pallet.weight = Some(42.5);
    pallet.line_items.push(LineItem::new("1", "10048500205641000", 10).unwrap());

    let mut shipment = Shipment::new(
        "8000141715",
        walmart_canada_addr(),
        Some("MDLE".into()),
        vec![pallet],
    )
    .unwrap();
    shipment.document_number = Some("30021144717".into());
    shipment.tracking_number = Some("8000141715".into());

    let fake = FakeQueryLayer::new().with_shipment(shipment);
    let mut seq = VirtualLpnSequence::new(1);
    let job = job::prepare_shipment_job(&fake, "8000141715", &mut seq).await.unwrap();

    let ctx = pipeline_context();
    let tasks = task_builder::build_shipment_job_tasks(&job, &ctx).unwrap();

    assert_eq!(tasks.len(), 2);
    let pallet_task = &tasks[0];
    assert_eq!(pallet_task.kind, TaskKind::PalletLabel);
    assert_eq!(pallet_task.file_name, "8000141715_LPN001_1_of_1.zpl");
    assert!(pallet_task.payload.contains("CJR WHOLESALE GROCERS LTD"));
    assert!(pallet_task.payload.contains("MDLE"));
    assert!(pallet_task.payload.contains("30081705"));
    assert!(pallet_task.payload.contains("1.36L PL 1/6 NJ STRW BAN"));
    assert_eq!(tasks[1].kind, TaskKind::StopInfoTag);
}

/// A shipment with no physical pallets and a fully-specified footprint
/// synthesizes virtual pallets sized to the units-per-pallet split, and every
/// synthesized pallet (weight-less, since it never touched a scale) still
/// builds a valid label with `palletSeq`/`palletTotal` numbered across the set.
#[tokio::test]
async fn virtual_pallets_from_full_footprint_build_numbered_labels() {
    let shipment = Shipment::new(
        "8000200000",
        ShipToAddress { name: "ACME DC".into(), city: "TORONTO".into(), state: "ON".into(), ..Default::default() },
        Some("MDLE".into()),
        vec![],
    )
    .unwrap();

    let footprints = vec![{
        let mut f = ShipmentSkuFootprint::new("X", 250).unwrap();
        f.units_per_pallet = Some(100);
        f
    }];

    let fake = FakeQueryLayer::new().with_shipment(shipment).with_footprints("8000200000", footprints);
    let mut seq = VirtualLpnSequence::new(1);
    let job = job::prepare_shipment_job(&fake, "8000200000", &mut seq).await.unwrap();

    assert!(job.is_virtual);
    assert_eq!(job.plan.full_pallets, 2);
    assert_eq!(job.plan.partial_pallets, 1);
    assert!(job.plan.skus_missing_footprint.is_empty());
    assert_eq!(job.pallets.len(), 3);
    assert!(job.pallets.iter().all(|p| p.weight.is_none()));

    let units: Vec<i64> = job.pallets.iter().filter_map(|p| p.unit_count).collect();
    assert_eq!(units, vec![100, 100, 50]);

    let ctx = pipeline_context();
    let tasks = task_builder::build_shipment_job_tasks(&job, &ctx).unwrap();
    let pallet_tasks: Vec<_> = tasks.iter().filter(|t| t.kind == TaskKind::PalletLabel).collect();
    assert_eq!(pallet_tasks.len(), 3);

    let total = job.pallet_total();
    for (index, pallet) in job.pallets.iter().enumerate() {
        let fields = label_builder::build_pallet_label_fields(
            &job.shipment,
            pallet,
            index,
            total,
            &ctx.ship_from,
            &ctx.sku_matrix,
            &job.footprints_by_sku,
            None,
            None,
        )
        .unwrap();
        assert_eq!(fields.get("palletSeq"), Some((index + 1).to_string().as_str()));
        assert_eq!(fields.get("palletTotal"), Some("3"));
        assert_eq!(fields.get("weight"), Some(" "));
    }
}

/// A footprint row with no usable units-per-pallet still synthesizes one
/// virtual pallet carrying every unit, and is flagged in `skusMissingFootprint`
/// rather than failing the job.
#[tokio::test]
async fn footprint_missing_units_per_pallet_synthesizes_one_virtual_pallet() {
    let shipment = Shipment::new(
        "8000200001",
        ShipToAddress { name: "ACME DC".into(), city: "TORONTO".into(), state: "ON".into(), ..Default::default() },
        Some("MDLE".into()),
        vec![],
    )
    .unwrap();

    let footprints = vec![ShipmentSkuFootprint::new("Y", 40).unwrap()];
    let fake = FakeQueryLayer::new().with_shipment(shipment).with_footprints("8000200001", footprints);
    let mut seq = VirtualLpnSequence::new(1);
    let job = job::prepare_shipment_job(&fake, "8000200001", &mut seq).await.unwrap();

    assert!(job.is_virtual);
    assert_eq!(job.plan.partial_pallets, 1);
    assert_eq!(job.plan.skus_missing_footprint, vec!["Y".to_string()]);
    assert_eq!(job.pallets.len(), 1);
    assert_eq!(job.pallets[0].unit_count, Some(40));

    let ctx = pipeline_context();
    let tasks = task_builder::build_shipment_job_tasks(&job, &ctx).unwrap();
    assert_eq!(tasks.iter().filter(|t| t.kind == TaskKind::PalletLabel).count(), 1);
}

/// Routing rules resolve by staging location, falling back to the default
/// printer, with a force-override bypassing selection entirely.
#[tokio::test]
async fn routing_resolution_falls_back_to_default_and_honors_force_override() {
    let ctx = pipeline_context();

    let mut rossi = HashMap::new();
    rossi.insert("stagingLocation".to_string(), "rossi".to_string());
    assert_eq!(job::resolve_printer(&ctx, None, &rossi).unwrap().id, "DISPATCH");

    let mut unknown = HashMap::new();
    unknown.insert("stagingLocation".to_string(), "UNKNOWN".to_string());
    assert_eq!(job::resolve_printer(&ctx, None, &unknown).unwrap().id, "OFFICE");

    assert_eq!(job::resolve_printer(&ctx, None, &HashMap::new()).unwrap().id, "OFFICE");
    assert_eq!(job::resolve_printer(&ctx, Some("DISPATCH"), &HashMap::new()).unwrap().id, "DISPATCH");
    assert!(job::resolve_printer(&ctx, Some("GHOST"), &HashMap::new()).is_err());
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

fn carrier_move_shipment(id: &str) -> Shipment {
    let mut pallet = Pallet::new(format!("LPN-{id}"), "000000000000000001").unwrap();
    pallet.weight = Some(10.0);
    pallet.line_items.push(LineItem::new("1", "205641", 1).unwrap());
    Shipment::new(id, walmart_canada_addr(), Some("MDLE".into()), vec![pallet]).unwrap()
}

/// A carrier-move's two stops are ordered by primary stop sequence, each
/// followed by its own stop info tag, with one final info tag closing the move.
#[tokio::test]
async fn carrier_move_orders_stops_and_closes_with_final_tag() {
    let fake = FakeQueryLayer::new()
        .with_shipment(carrier_move_shipment("8000473513"))
        .with_shipment(carrier_move_shipment("8000473512"))
        .with_carrier_move_stops(
            "205109",
            vec![stop_ref("S2", Some(2), "8000473512"), stop_ref("S1", Some(1), "8000473513")],
        );

    let mut seq = VirtualLpnSequence::new(1);
    let move_job = job::prepare_carrier_move_job(&fake, "205109", &mut seq).await.unwrap();
    assert_eq!(move_job.groups.len(), 2);
    assert_eq!(move_job.groups[0].stop_position, 1);
    assert_eq!(move_job.groups[1].stop_position, 2);

    let ctx = pipeline_context();
    let tasks = task_builder::build_carrier_move_tasks(&move_job, &ctx).unwrap();

    let kinds: Vec<TaskKind> = tasks.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TaskKind::PalletLabel,
            TaskKind::StopInfoTag,
            TaskKind::PalletLabel,
            TaskKind::StopInfoTag,
            TaskKind::FinalInfoTag,
        ]
    );
    assert!(tasks[0].payload_id.contains("8000473513"));
    assert!(tasks[1].payload_id.contains("stop 1"));
    assert!(tasks[2].payload_id.contains("8000473512"));
    assert!(tasks[3].payload_id.contains("stop 2"));
    assert_eq!(tasks.last().unwrap().kind, TaskKind::FinalInfoTag);
}

/// A three-task job fails mid-run after one task succeeds; resuming replays
/// the most recently completed task and finishes the job.
#[tokio::test]
async fn resume_after_transport_failure_replays_last_task_and_completes() {
    let shipment = carrier_move_shipment("8000141715");
    let fake = FakeQueryLayer::new().with_shipment(shipment);
    let mut seq = VirtualLpnSequence::new(1);
    let job = job::prepare_shipment_job(&fake, "8000141715", &mut seq).await.unwrap();
    let ctx = pipeline_context();
    let tasks = task_builder::build_shipment_job_tasks(&job, &ctx).unwrap();
    assert_eq!(tasks.len(), 2);

    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join("out");
    let checkpoint_dir = tmp.path().join("checkpoints");

    let mut checkpoint = JobCheckpoint::new(
        "job-resume",
        InputMode::Shipment,
        "8000141715",
        output_dir.to_string_lossy().to_string(),
        "FILE",
        format!("file://{}", output_dir.display()),
        tasks,
        now_naive(),
    );
    // Simulate task 0 having already succeeded, then a transport failure on task 1.
    checkpoint.record_success(0, now_naive());
    checkpoint.record_failure("transport exhausted", now_naive());
    executor::create_checkpoint(&checkpoint_dir, &checkpoint).unwrap();

    assert_eq!(checkpoint.next_task_index, 1);
    assert!(!checkpoint.completed);
    assert!(checkpoint.last_error.is_some());

    let resumed = executor::resume(checkpoint).unwrap();
    assert_eq!(resumed.next_task_index, 0);

    let transport = WireTransport::default();
    let result = executor::execute(&checkpoint_dir, resumed, &transport, None).await.unwrap();

    assert!(result.completed);
    assert_eq!(result.next_task_index, 2);
    assert!(output_dir.join(&result.tasks[0].file_name).is_file());
    assert!(output_dir.join(&result.tasks[1].file_name).is_file());

    let on_disk = executor::load_checkpoint(&checkpoint_dir, "job-resume").unwrap();
    assert!(on_disk.completed);
}

/// `prepare_queue` over a single shipment input drives through to a completed,
/// on-disk checkpoint with every task file written.
#[tokio::test]
async fn end_to_end_queue_to_completed_checkpoint() {
    let shipment = carrier_move_shipment("8000999999");
    let fake = FakeQueryLayer::new().with_shipment(shipment);
    let mut seq = VirtualLpnSequence::new(1);
    let mut queue =
        job::prepare_queue(&fake, vec![QueueInput::Shipment("8000999999".into())], &mut seq)
            .await
            .unwrap();
    let item = queue.items.pop().unwrap();

    let ctx = pipeline_context();
    let (source_id, tasks) = match item {
        PreparedQueueItem::Shipment { source_id, job } => {
            (source_id, task_builder::build_shipment_job_tasks(&job, &ctx).unwrap())
        }
        PreparedQueueItem::CarrierMove { .. } => panic!("expected a shipment item"),
    };

    let tmp = tempfile::tempdir().unwrap();
    let output_dir = tmp.path().join(&source_id);
    let checkpoint_dir = tmp.path().join("checkpoints");

    let checkpoint = JobCheckpoint::new(
        format!("job-{source_id}"),
        InputMode::Shipment,
        source_id,
        output_dir.to_string_lossy().to_string(),
        "FILE",
        format!("file://{}", output_dir.display()),
        tasks,
        now_naive(),
    );
    executor::create_checkpoint(&checkpoint_dir, &checkpoint).unwrap();

    let transport = WireTransport::default();
    let result = executor::execute(&checkpoint_dir, checkpoint, &transport, None).await.unwrap();

    assert!(result.completed);
    for task in &result.tasks {
        assert!(output_dir.join(&task.file_name).is_file());
    }
}
