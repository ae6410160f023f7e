//! # Configuration (component M)
//!
//! Resolves the effective [`Settings`] for one run from three layered sources,
//! highest precedence first: the process environment, an
//! external config file, then built-in defaults. The external file is
//! discovered the way the corpus discovers its own YAML config (`config.rs`'s
//! `File::with_name` chain), except the file format here is a flat
//! `KEY=VALUE` table (`wms-tags.env`) because the key set includes
//! dynamically site-scoped names (`SITE_<CODE>_HOST`) that don't fit a single
//! fixed `Deserialize` shape the way the teacher's plant-list YAML does.

use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};

use secrecy::Secret;

use crate::errors::{WmsError, WmsResult};

fn default_table() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("active_env", "PROD"),
        ("wms_env", "PROD"),
        ("oracle_port", "1521"),
        ("oracle_service", "WMSP"),
        ("db_pool_max_size", "5"),
        ("db_pool_conn_timeout_ms", "3000"),
        ("db_pool_validation_timeout_ms", "2000"),
        ("printer_routing_file", "config/printer-routing.yaml"),
        ("printer_inventory_file", "config/printer-inventory.yaml"),
        ("checkpoint_dir", "out/gui-jobs"),
        ("label_template_file", "config/templates/walmart-ca.zpl"),
    ])
}

/// A site's ship-from address lines, printed on every label:
/// `shipFromName`/`shipFromAddress`/`shipFromCityStateZip`.
#[derive(Debug, Clone)]
pub struct SiteShipFrom {
    pub name: String,
    pub address: String,
    pub city_state_zip: String,
}

/// The effective configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub active_site: String,
    pub active_env: String,

    pub oracle_username: String,
    pub oracle_password: Secret<String>,
    pub oracle_port: u16,
    pub oracle_service: String,
    pub oracle_dsn: Option<String>,
    pub oracle_jdbc_url: Option<String>,

    pub site_host: String,
    pub site_name: Option<String>,
    pub ship_from: SiteShipFrom,

    pub db_pool_max_size: u32,
    pub db_pool_conn_timeout_ms: u64,
    pub db_pool_validation_timeout_ms: u64,

    pub printer_routing_file: PathBuf,
    pub printer_inventory_file: PathBuf,
    pub printer_default_id: Option<String>,
    pub printer_force_id: Option<String>,

    pub checkpoint_dir: PathBuf,
    pub label_template_file: PathBuf,
}

impl Settings {
    /// Loads settings following the documented discovery/precedence rules.
    pub fn load() -> WmsResult<Self> {
        let file_table = load_external_file_table()?;
        let env_table = snapshot_process_env();
        Self::from_tables(&env_table, &file_table)
    }

    fn from_tables(
        env_table: &HashMap<String, String>,
        file_table: &HashMap<String, String>,
    ) -> WmsResult<Self> {
        let defaults = default_table();
        let lookup = |key: &str| -> Option<String> {
            env_table
                .get(key)
                .or_else(|| file_table.get(key))
                .cloned()
                .or_else(|| defaults.get(key).map(|v| v.to_string()))
        };
        let required = |key: &str| -> WmsResult<String> {
            lookup(key).filter(|v| !v.trim().is_empty()).ok_or_else(|| {
                WmsError::config(format!("missing required configuration key {key}"))
            })
        };

        let active_site = required("active_site")?.to_uppercase();
        let active_env = lookup("active_env")
            .or_else(|| lookup("wms_env"))
            .unwrap_or_else(|| "PROD".to_string())
            .to_uppercase();

        let oracle_username = required("oracle_username")?;
        let oracle_password = Secret::new(required("oracle_password")?);
        let oracle_port = lookup("oracle_port")
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(1521);
        let oracle_service = lookup("oracle_service").unwrap_or_else(|| "WMSP".to_string());
        let oracle_dsn = lookup("oracle_dsn");
        let oracle_jdbc_url = lookup("oracle_jdbc_url");

        let site_host = site_scoped_lookup(env_table, file_table, &active_site, &active_env, "HOST")
            .ok_or_else(|| {
                WmsError::config(format!(
                    "missing required configuration key SITE_{active_site}_HOST (or SITE_{active_site}_{active_env}_HOST)"
                ))
            })?;
        let site_name = site_scoped_lookup(env_table, file_table, &active_site, &active_env, "NAME");
        let ship_from = SiteShipFrom {
            name: site_scoped_required(env_table, file_table, &active_site, &active_env, "SHIP_FROM_NAME")?,
            address: site_scoped_required(env_table, file_table, &active_site, &active_env, "SHIP_FROM_ADDRESS")?,
            city_state_zip: site_scoped_required(
                env_table,
                file_table,
                &active_site,
                &active_env,
                "SHIP_FROM_CITY_STATE_ZIP",
            )?,
        };

        let db_pool_max_size = lookup("db_pool_max_size").and_then(|v| v.parse().ok()).unwrap_or(5);
        let db_pool_conn_timeout_ms =
            lookup("db_pool_conn_timeout_ms").and_then(|v| v.parse().ok()).unwrap_or(3000);
        let db_pool_validation_timeout_ms =
            lookup("db_pool_validation_timeout_ms").and_then(|v| v.parse().ok()).unwrap_or(2000);

        let printer_routing_file =
            PathBuf::from(lookup("printer_routing_file").unwrap_or_else(|| "config/printer-routing.yaml".into()));
        let printer_inventory_file = PathBuf::from(
            lookup("printer_inventory_file").unwrap_or_else(|| "config/printer-inventory.yaml".into()),
        );
        let printer_default_id = lookup("printer_default_id");
        let printer_force_id = lookup("printer_force_id");

        let checkpoint_dir = PathBuf::from(lookup("checkpoint_dir").unwrap_or_else(|| "out/gui-jobs".into()));
        let label_template_file = PathBuf::from(
            lookup("label_template_file").unwrap_or_else(|| "config/templates/walmart-ca.zpl".into()),
        );

        Ok(Settings {
            active_site,
            active_env,
            oracle_username,
            oracle_password,
            oracle_port,
            oracle_service,
            oracle_dsn,
            oracle_jdbc_url,
            site_host,
            site_name,
            ship_from,
            db_pool_max_size,
            db_pool_conn_timeout_ms,
            db_pool_validation_timeout_ms,
            printer_routing_file,
            printer_inventory_file,
            printer_default_id,
            printer_force_id,
            checkpoint_dir,
            label_template_file,
        })
    }

    /// Builds the `mssql://` connection string the way the teacher's
    /// `DatabaseSettings::connection_string` does, using an explicit DSN/JDBC
    /// override when present, else the Oracle-named fields folded onto the
    /// site host.
    pub fn database_connection_string(&self) -> Secret<String> {
        use secrecy::ExposeSecret;
        if let Some(dsn) = self.oracle_dsn.as_ref().or(self.oracle_jdbc_url.as_ref()) {
            return Secret::new(dsn.clone());
        }
        Secret::new(format!(
            "mssql://{}:{}@{}:{}/{}",
            self.oracle_username,
            self.oracle_password.expose_secret(),
            self.site_host,
            self.oracle_port,
            self.oracle_service
        ))
    }

    /// A redacted rendering suitable for the `config` CLI subcommand: secrets
    /// replaced with a fixed placeholder, everything else verbatim.
    pub fn redacted_summary(&self) -> String {
        format!(
            "active_site={}\nactive_env={}\noracle_username={}\noracle_password=***REDACTED***\noracle_port={}\noracle_service={}\noracle_dsn={}\nsite_host={}\nsite_name={}\nship_from_name={}\ndb_pool_max_size={}\ndb_pool_conn_timeout_ms={}\ndb_pool_validation_timeout_ms={}\nprinter_routing_file={}\nprinter_inventory_file={}\nprinter_default_id={}\nprinter_force_id={}\ncheckpoint_dir={}\nlabel_template_file={}",
            self.active_site,
            self.active_env,
            self.oracle_username,
            self.oracle_port,
            self.oracle_service,
            self.oracle_dsn.as_deref().unwrap_or(""),
            self.site_host,
            self.site_name.as_deref().unwrap_or(""),
            self.ship_from.name,
            self.db_pool_max_size,
            self.db_pool_conn_timeout_ms,
            self.db_pool_validation_timeout_ms,
            self.printer_routing_file.display(),
            self.printer_inventory_file.display(),
            self.printer_default_id.as_deref().unwrap_or(""),
            self.printer_force_id.as_deref().unwrap_or(""),
            self.checkpoint_dir.display(),
            self.label_template_file.display(),
        )
    }
}

/// Builds the set of candidate keys for a site-scoped setting, most specific
/// (env-scoped) first: `SITE_<CODE>_[<ENV>_]HOST`.
fn site_scoped_keys(site: &str, env_tag: &str, suffix: &str) -> [String; 2] {
    [format!("SITE_{site}_{env_tag}_{suffix}"), format!("SITE_{site}_{suffix}")]
}

fn site_scoped_lookup(
    env_table: &HashMap<String, String>,
    file_table: &HashMap<String, String>,
    site: &str,
    env_tag: &str,
    suffix: &str,
) -> Option<String> {
    let keys = site_scoped_keys(site, env_tag, suffix);
    for key in &keys {
        if let Some(v) = env_table.get(key.as_str()) {
            return Some(v.clone());
        }
    }
    for key in &keys {
        if let Some(v) = file_table.get(key.as_str()) {
            return Some(v.clone());
        }
    }
    None
}

fn site_scoped_required(
    env_table: &HashMap<String, String>,
    file_table: &HashMap<String, String>,
    site: &str,
    env_tag: &str,
    suffix: &str,
) -> WmsResult<String> {
    site_scoped_lookup(env_table, file_table, site, env_tag, suffix).ok_or_else(|| {
        WmsError::config(format!(
            "missing required configuration key SITE_{site}_{suffix} (or SITE_{site}_{env_tag}_{suffix})"
        ))
    })
}

/// Snapshots the process environment into a lower_snake_case-keyed table so it
/// can be merged with the file table uniformly; site-scoped keys
/// (`SITE_<CODE>_...`) are kept upper-case and untouched since they're looked
/// up by exact name via [`site_scoped_lookup`].
fn snapshot_process_env() -> HashMap<String, String> {
    let mut out = HashMap::new();
    for (k, v) in env::vars() {
        if k.starts_with("SITE_") {
            out.insert(k, v);
        } else {
            out.insert(k.to_lowercase(), v);
        }
    }
    out
}

/// Discovers and parses the external config file: explicit
/// `WMS_CONFIG_FILE` env var, else the fixed discovery order relative to the
/// current directory and the running executable's directory.
fn load_external_file_table() -> WmsResult<HashMap<String, String>> {
    if let Ok(explicit) = env::var("WMS_CONFIG_FILE") {
        let path = PathBuf::from(explicit);
        return parse_env_file(&path);
    }

    let mut candidates = vec![
        PathBuf::from("./wms-tags.env"),
        PathBuf::from("./.env"),
        PathBuf::from("./config/wms-tags.env"),
    ];
    if let Ok(exe) = env::current_exe() {
        if let Some(dir) = exe.parent() {
            candidates.push(dir.join("wms-tags.env"));
            candidates.push(dir.join(".env"));
            candidates.push(dir.join("config").join("wms-tags.env"));
        }
    }

    for candidate in candidates {
        if candidate.is_file() {
            return parse_env_file(&candidate);
        }
    }
    Ok(HashMap::new())
}

/// Parses a flat `KEY=VALUE` table: blank lines and `#`-prefixed comments are
/// skipped; keys starting with `SITE_` keep their case, everything else is
/// lower-cased so it matches [`snapshot_process_env`]'s keying.
fn parse_env_file(path: &Path) -> WmsResult<HashMap<String, String>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| WmsError::config(format!("cannot read config file {}: {e}", path.display())))?;
    let mut out = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').to_string();
        if key.starts_with("SITE_") {
            out.insert(key.to_string(), value);
        } else {
            out.insert(key.to_lowercase(), value);
        }
    }
    Ok(out)
}
