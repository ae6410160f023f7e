//! Task Builder (component I): expands a prepared job into an
//! ordered sequence of `PrintTask`s. Every payload is rendered eagerly here;
//! the executor (component J) never re-renders.

use crate::errors::WmsResult;
use crate::job::{PipelineContext, PreparedCarrierMoveJob, PreparedJob, PreparedStopGroup};
use crate::label_builder;
use crate::models::{PrintTask, TaskKind};
use crate::template_engine;

fn slugify(id: &str) -> String {
    id.chars().map(|c| if c.is_ascii_alphanumeric() { c } else { '-' }).collect()
}

/// Builds one `PALLET_LABEL` task per pallet in `job`. When the job is part of
/// a carrier-move, `stop_sequence_override`/`stop_position` carry the group's
/// primary stop sequence into the rendered field and the log-payload id
///.
fn build_pallet_tasks(
    job: &PreparedJob,
    ctx: &PipelineContext,
    stop_sequence_override: Option<i32>,
    stop_position: Option<usize>,
) -> WmsResult<Vec<PrintTask>> {
    let total = job.pallet_total();
    let mut tasks = Vec::with_capacity(job.pallets.len());

    for (index, pallet) in job.pallets.iter().enumerate() {
        let fields = label_builder::build_pallet_label_fields(
            &job.shipment,
            pallet,
            index,
            total,
            &ctx.ship_from,
            &ctx.sku_matrix,
            &job.footprints_by_sku,
            ctx.location_matrix.as_ref(),
            stop_sequence_override,
        )?;
        let rendered = template_engine::render(&ctx.label_template, &fields.to_template_map())?;
        let seq = index + 1;
        let file_name = format!("{}_{}_{}_of_{}.zpl", job.shipment_id, pallet.lpn_id, seq, total);
        let payload_id = match stop_position {
            Some(pos) => format!("shipment {} pallet {seq}/{total} (stop {pos})", job.shipment_id),
            None => format!("shipment {} pallet {seq}/{total}", job.shipment_id),
        };
        tasks.push(PrintTask::new(TaskKind::PalletLabel, file_name, rendered, payload_id));
    }
    Ok(tasks)
}

/// Builds a `STOP_INFO_TAG` task summarizing a carrier-move stop group: every
/// shipment id at the stop plus the stop's primary destination and address
///.
fn build_group_stop_info_tag(
    carrier_move_id: &str,
    group: &PreparedStopGroup,
    total_groups: usize,
) -> PrintTask {
    let shipment_ids: Vec<&str> = group.jobs.iter().map(|j| j.shipment_id.as_str()).collect();
    let destination = group
        .jobs
        .first()
        .map(|j| {
            format!(
                "{}, {}, {}, {}",
                j.shipment.ship_to.name, j.shipment.ship_to.address_line_1, j.shipment.ship_to.city, j.shipment.ship_to.state
            )
        })
        .unwrap_or_default();

    let payload = format!(
        "^XA^FO0,0^A0N,30,30^FDSTOP {} OF {}^FS^FO0,40^A0N,20,20^FDCARRIER MOVE {carrier_move_id}^FS^FO0,70^A0N,20,20^FDDEST {destination}^FS^FO0,100^A0N,20,20^FDSHIPMENTS {}^FS^XZ",
        group.stop_position,
        total_groups,
        shipment_ids.join(","),
    );

    let file_name = format!("info-stop-{:02}-of-{:02}.zpl", group.stop_position, total_groups);
    let payload_id = format!("carrier-move {carrier_move_id} stop {}/{total_groups} info tag", group.stop_position);
    PrintTask::new(TaskKind::StopInfoTag, file_name, payload, payload_id)
}

/// Builds the single `STOP_INFO_TAG` task for a standalone shipment job.
fn build_shipment_info_tag(job: &PreparedJob) -> PrintTask {
    let ship_to = &job.shipment.ship_to;
    let payload = format!(
        "^XA^FO0,0^A0N,30,30^FDSHIPMENT {}^FS^FO0,40^A0N,20,20^FDDEST {}, {}, {}, {}^FS^FO0,70^A0N,20,20^FDPALLETS {}^FS^XZ",
        job.shipment_id, ship_to.name, ship_to.address_line_1, ship_to.city, ship_to.state, job.pallets.len()
    );
    let file_name = format!("info-stop-{}.zpl", job.shipment_id);
    let payload_id = format!("shipment {} info tag", job.shipment_id);
    PrintTask::new(TaskKind::StopInfoTag, file_name, payload, payload_id)
}

/// Builds the single `FINAL_INFO_TAG` task for a carrier-move job, summarizing
/// every stop and every shipment id across the whole move.
fn build_final_info_tag(move_job: &PreparedCarrierMoveJob) -> PrintTask {
    let stop_summary: Vec<String> = move_job
        .groups
        .iter()
        .map(|g| {
            format!(
                "stop {}: {}",
                g.stop_position,
                g.jobs.iter().map(|j| j.shipment_id.as_str()).collect::<Vec<_>>().join(",")
            )
        })
        .collect();

    let payload = format!(
        "^XA^FO0,0^A0N,30,30^FDCARRIER MOVE {} COMPLETE^FS^FO0,40^A0N,20,20^FDSTOPS {}^FS^FO0,70^A0N,20,20^FDSHIPMENTS {}^FS^XZ",
        move_job.carrier_move_id,
        stop_summary.join(" | "),
        move_job.all_shipment_ids().join(","),
    );

    let file_name = format!("info-final-cmid-{}.zpl", slugify(&move_job.carrier_move_id));
    let payload_id = format!("carrier-move {} final info tag", move_job.carrier_move_id);
    PrintTask::new(TaskKind::FinalInfoTag, file_name, payload, payload_id)
}

/// Builds the full task list for a standalone shipment job: pallet tasks
/// followed by one `STOP_INFO_TAG`-kind task.
pub fn build_shipment_job_tasks(job: &PreparedJob, ctx: &PipelineContext) -> WmsResult<Vec<PrintTask>> {
    let mut tasks = build_pallet_tasks(job, ctx, None, None)?;
    tasks.push(build_shipment_info_tag(job));
    Ok(tasks)
}

/// Builds the full task list for a carrier-move job: for each stop group (in
/// ascending stop-position order), its pallet tasks followed by exactly one
/// stop info tag; after all groups, exactly one final info tag
///.
pub fn build_carrier_move_tasks(
    move_job: &PreparedCarrierMoveJob,
    ctx: &PipelineContext,
) -> WmsResult<Vec<PrintTask>> {
    let total_groups = move_job.groups.len();
    let mut tasks = Vec::new();

    for group in &move_job.groups {
        for job in &group.jobs {
            tasks.extend(build_pallet_tasks(job, ctx, group.primary_stop_sequence, Some(group.stop_position))?);
        }
        tasks.push(build_group_stop_info_tag(&move_job.carrier_move_id, group, total_groups));
    }
    tasks.push(build_final_info_tag(move_job));
    Ok(tasks)
}
