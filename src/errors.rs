//! # Error Taxonomy
//!
//! All failures in the labeling pipeline are expressed as a single tagged enum,
//! `WmsError`, rather than as a hierarchy of exception types. Every variant maps to
//! a stable process exit code and carries an operator-facing remediation hint, so
//! the CLI entry point can report a failure without re-deriving what it means.

use thiserror::Error;

/// The full set of failure kinds the pipeline can produce.
#[derive(Error, Debug)]
pub enum WmsError {
    /// Missing required configuration key, malformed YAML/CSV, or a routing rule
    /// that targets an unknown or disabled printer.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O or SQLSTATE failure communicating with the shipment/reference store.
    #[error("database connectivity error: {0}")]
    DbConnectivity(String),

    /// Invalid caller input: a blank id, an unknown routing operator, a missing
    /// required label field, and similar caller-side mistakes.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport failure after retry exhaustion, or an interrupted retry sleep.
    #[error("print transport error: {0}")]
    Print(String),

    /// Anything that should never happen given the invariants above.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WmsError {
    pub fn config(msg: impl Into<String>) -> Self {
        WmsError::Config(msg.into())
    }

    pub fn db(msg: impl Into<String>) -> Self {
        WmsError::DbConnectivity(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        WmsError::Validation(msg.into())
    }

    pub fn print(msg: impl Into<String>) -> Self {
        WmsError::Print(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        WmsError::Internal(msg.into())
    }

    /// The process exit code an operator-facing CLI should surface for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            WmsError::Config(_) => 2,
            WmsError::DbConnectivity(_) => 3,
            WmsError::Validation(_) => 4,
            WmsError::Print(_) => 5,
            WmsError::Internal(_) => 10,
        }
    }

    /// A short, operator-facing remediation hint.
    pub fn remediation_hint(&self) -> &'static str {
        match self {
            WmsError::Config(_) => {
                "check the configuration file and environment variables for the named key"
            }
            WmsError::DbConnectivity(_) => {
                "verify the WMS database is reachable and credentials are current"
            }
            WmsError::Validation(_) => {
                "check the caller-supplied id or reference data for the named field"
            }
            WmsError::Print(_) => "check printer network connectivity and retry the job",
            WmsError::Internal(_) => "this is a defect; capture logs and file a report",
        }
    }
}

impl From<sqlx_oldapi::Error> for WmsError {
    fn from(err: sqlx_oldapi::Error) -> Self {
        WmsError::DbConnectivity(err.to_string())
    }
}

impl From<std::io::Error> for WmsError {
    fn from(err: std::io::Error) -> Self {
        WmsError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for WmsError {
    fn from(err: serde_json::Error) -> Self {
        WmsError::Internal(err.to_string())
    }
}

impl From<serde_yaml::Error> for WmsError {
    fn from(err: serde_yaml::Error) -> Self {
        WmsError::Config(err.to_string())
    }
}

pub type WmsResult<T> = Result<T, WmsError>;
