//! Application bootstrap (component O): loads the shared,
//! read-only [`PipelineContext`] and connects the production [`SqlQueryLayer`],
//! mirroring the shape of the teacher's `init::initialize` but without an
//! `AppContext` god-object — the pipeline's collaborators are few enough to
//! pass around directly.

use std::path::{Path, PathBuf};

use secrecy::ExposeSecret;

use crate::config::Settings;
use crate::errors::{WmsError, WmsResult};
use crate::job::PipelineContext;
use crate::models::LabelTemplate;
use crate::printing::PrinterRegistry;
use crate::query::SqlQueryLayer;
use crate::reference_data::{LocationMatrix, SkuMatrix};

const SKU_MATRIX_FILE_ENV: &str = "SKU_MATRIX_FILE";
const LOCATION_MATRIX_FILE_ENV: &str = "LOCATION_MATRIX_FILE";
const DEFAULT_SKU_MATRIX_FILE: &str = "config/reference/sku-matrix.csv";
const DEFAULT_LOCATION_MATRIX_FILE: &str = "config/reference/location-matrix.csv";

fn read_required(path: &Path, what: &str) -> WmsResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| WmsError::config(format!("cannot read {what} at {}: {e}", path.display())))
}

fn env_path_or(var: &str, default: &str) -> PathBuf {
    std::env::var(var).map(PathBuf::from).unwrap_or_else(|_| PathBuf::from(default))
}

/// Loads the SKU matrix, location matrix (optional), printer registry, and
/// label template named by `settings`/environment into one shared
/// [`PipelineContext`].
pub fn build_pipeline_context(settings: &Settings) -> WmsResult<PipelineContext> {
    let sku_matrix_path = env_path_or(SKU_MATRIX_FILE_ENV, DEFAULT_SKU_MATRIX_FILE);
    let sku_matrix = SkuMatrix::parse(&read_required(&sku_matrix_path, "SKU matrix file")?)?;

    let location_matrix_path = env_path_or(LOCATION_MATRIX_FILE_ENV, DEFAULT_LOCATION_MATRIX_FILE);
    let location_matrix = if location_matrix_path.is_file() {
        Some(LocationMatrix::parse(&read_required(&location_matrix_path, "location matrix file")?)?)
    } else {
        None
    };

    let inventory_yaml = read_required(&settings.printer_inventory_file, "printer inventory file")?;
    let routing_yaml = read_required(&settings.printer_routing_file, "printer routing file")?;
    let printer_registry = PrinterRegistry::load(&inventory_yaml, &routing_yaml)?;

    let template_raw = read_required(&settings.label_template_file, "label template file")?;
    let template_name = settings
        .label_template_file
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("label")
        .to_string();
    let label_template = LabelTemplate::parse(template_name, template_raw)?;

    Ok(PipelineContext {
        ship_from: settings.ship_from.clone(),
        sku_matrix,
        location_matrix,
        printer_registry,
        label_template,
    })
}

/// Connects the production [`SqlQueryLayer`] using `settings`'s connection
/// string, tagged with the binary's own name.
pub async fn connect_query_layer(settings: &Settings) -> WmsResult<SqlQueryLayer> {
    let connection_string = settings.database_connection_string();
    SqlQueryLayer::connect(connection_string.expose_secret(), "wms-label-pipeline", settings.db_pool_max_size).await
}
