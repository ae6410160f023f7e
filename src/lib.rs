//! Deterministic label-production pipeline for Walmart Canada pallet shipping
//! labels: shipment/carrier-move resolution, SKU/destination enrichment, virtual
//! pallet planning, label-field assembly, ZPL rendering, printer routing and
//! transmission, and durable per-job checkpointing.

pub mod cli;
pub mod config;
pub mod errors;
pub mod executor;
pub mod init;
pub mod job;
pub mod label_builder;
pub mod models;
pub mod normalize;
pub mod planning;
pub mod printing;
pub mod query;
pub mod reference_data;
pub mod task_builder;
pub mod template_engine;
pub mod utils;
