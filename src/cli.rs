//! CLI / Entry Point (component O): the three subcommands the
//! pipeline is driven by, over `clap`'s derive API the way the corpus's own
//! CLI-fronted tools (e.g. `ob-poc`) are shaped.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "wms-label", version, about = "Deterministic WMS pallet label pipeline")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective configuration, with credentials redacted.
    Config,
    /// Probe connectivity to the WMS shipment/reference store.
    DbTest,
    /// Prepare and execute one shipment or carrier-move job.
    Run(RunArgs),
}

/// Arguments for `run`. Exactly one of `shipment_id`/`carrier_move_id` is
/// required.
#[derive(Args, Debug)]
#[command(group(clap::ArgGroup::new("target").required(true).args(["shipment_id", "carrier_move_id"])))]
pub struct RunArgs {
    /// Shipment id to print labels for.
    #[arg(long)]
    pub shipment_id: Option<String>,

    /// Carrier-move id to print labels for (fans out to every stop's shipments).
    #[arg(long)]
    pub carrier_move_id: Option<String>,

    /// Render and write label files without transmitting to a printer.
    #[arg(long)]
    pub dry_run: bool,

    /// Force a specific printer id, bypassing routing-rule selection.
    #[arg(long)]
    pub printer: Option<String>,

    /// Directory to write rendered label files into (defaults under the
    /// configured checkpoint directory).
    #[arg(long)]
    pub output_dir: Option<PathBuf>,
}
