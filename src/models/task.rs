//! `PrintTask`: one unit of rendered, ready-to-transmit label output.

use serde::{Deserialize, Serialize};

/// The kind of a print task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    PalletLabel,
    StopInfoTag,
    FinalInfoTag,
}

/// A single pre-rendered print task. Payloads are rendered eagerly at build time
/// (component I) and never re-rendered during execution (component J).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrintTask {
    pub kind: TaskKind,
    pub file_name: String,
    pub payload: String,
    pub payload_id: String,
}

impl PrintTask {
    pub fn new(
        kind: TaskKind,
        file_name: impl Into<String>,
        payload: impl Into<String>,
        payload_id: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            file_name: file_name.into(),
            payload: payload.into(),
            payload_id: payload_id.into(),
        }
    }
}
