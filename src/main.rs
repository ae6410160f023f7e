use std::collections::HashMap;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use tracing::info;

use wms_label_pipeline::cli::{Cli, Command, RunArgs};
use wms_label_pipeline::config::Settings;
use wms_label_pipeline::errors::WmsError;
use wms_label_pipeline::job::{self, PreparedQueueItem, QueueInput, VirtualLpnSequence};
use wms_label_pipeline::models::{now_naive, InputMode, JobCheckpoint, FILE_TARGET_SENTINEL};
use wms_label_pipeline::printing::WireTransport;
use wms_label_pipeline::query::QueryLayer;
use wms_label_pipeline::{executor, init, task_builder, utils};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_dir = std::env::var("WMS_LOG_DIR").ok().map(PathBuf::from);
    let _guard = match utils::logging::init_logger(log_dir) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("failed to initialize logging: {e}");
            std::process::exit(WmsError::internal(e.to_string()).exit_code());
        }
    };

    if let Err(err) = run(cli).await {
        eprintln!("error: {err}");
        eprintln!("hint: {}", err.remediation_hint());
        std::process::exit(err.exit_code());
    }
}

async fn run(cli: Cli) -> Result<(), WmsError> {
    let settings = Settings::load()?;

    match cli.command {
        Command::Config => {
            println!("{}", settings.redacted_summary());
            Ok(())
        }
        Command::DbTest => {
            let query = init::connect_query_layer(&settings).await?;
            query.shipment_exists("CONNECTIVITY_PROBE").await?;
            info!("database connectivity check succeeded");
            println!("OK");
            Ok(())
        }
        Command::Run(args) => run_job(&settings, args).await,
    }
}

fn input_mode_tag(mode: InputMode) -> &'static str {
    match mode {
        InputMode::Shipment => "SHIPMENT",
        InputMode::CarrierMove => "CARRIER_MOVE",
    }
}

async fn run_job(settings: &Settings, args: RunArgs) -> Result<(), WmsError> {
    let ctx = init::build_pipeline_context(settings)?;
    let query = init::connect_query_layer(settings).await?;

    let input = match (&args.shipment_id, &args.carrier_move_id) {
        (Some(id), None) => QueueInput::Shipment(id.clone()),
        (None, Some(id)) => QueueInput::CarrierMove(id.clone()),
        _ => {
            return Err(WmsError::validation(
                "exactly one of --shipment-id or --carrier-move-id is required",
            ))
        }
    };

    let mut seq = VirtualLpnSequence::new(1);
    let mut queue = job::prepare_queue(&query, vec![input], &mut seq).await?;
    let item = queue.items.pop().expect("prepare_queue rejects empty input");

    let (input_mode, source_id, tasks, staging_location) = match item {
        PreparedQueueItem::Shipment { source_id, job } => {
            let tasks = task_builder::build_shipment_job_tasks(&job, &ctx)?;
            let staging_location = job.staging_location.clone();
            (InputMode::Shipment, source_id, tasks, staging_location)
        }
        PreparedQueueItem::CarrierMove { source_id, job } => {
            let tasks = task_builder::build_carrier_move_tasks(&job, &ctx)?;
            let staging_location =
                job.groups.first().and_then(|g| g.jobs.first()).and_then(|j| j.staging_location.clone());
            (InputMode::CarrierMove, source_id, tasks, staging_location)
        }
    };

    let mut selection_context = HashMap::new();
    if let Some(location) = staging_location {
        selection_context.insert("stagingLocation".to_string(), location);
    }

    let printer = if args.dry_run {
        None
    } else {
        let forced = args.printer.as_deref().or(settings.printer_force_id.as_deref());
        Some(job::resolve_printer(&ctx, forced, &selection_context)?.clone())
    };

    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| settings.checkpoint_dir.join(&source_id));

    let printer_id = printer.as_ref().map(|p| p.id.clone()).unwrap_or_else(|| FILE_TARGET_SENTINEL.to_string());
    let target_endpoint = printer
        .as_ref()
        .map(|p| format!("{}:{}", p.ip, p.port))
        .unwrap_or_else(|| format!("file://{}", output_dir.display()));

    let job_id = format!(
        "{}-{}-{}",
        input_mode_tag(input_mode),
        source_id,
        Local::now().format("%Y%m%dT%H%M%S")
    );

    let checkpoint = JobCheckpoint::new(
        job_id,
        input_mode,
        source_id,
        output_dir.to_string_lossy().to_string(),
        printer_id,
        target_endpoint,
        tasks,
        now_naive(),
    );
    executor::create_checkpoint(&settings.checkpoint_dir, &checkpoint)?;

    let transport = WireTransport::default();
    let result = executor::execute(&settings.checkpoint_dir, checkpoint, &transport, printer.as_ref()).await?;

    info!(job_id = %result.id, tasks = result.tasks.len(), output_dir = %result.output_dir, "job complete");
    println!("job {} complete ({} tasks) -> {}", result.id, result.tasks.len(), result.output_dir);
    Ok(())
}
