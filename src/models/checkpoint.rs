//! `JobCheckpoint`: the durable record of one job's task list and progress.

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::task::PrintTask;

/// Whether a job was started from a shipment id or a carrier-move id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InputMode {
    Shipment,
    CarrierMove,
}

/// Sentinel target-printer id used when a job is running in file-only (dry-run)
/// mode.
pub const FILE_TARGET_SENTINEL: &str = "FILE";

/// The persisted record of one job's task list and progress.
///
/// Invariants:
/// - `0 <= next_task_index <= tasks.len()`
/// - `completed <=> (next_task_index == tasks.len() && last_error.is_none())`
/// - `tasks` is never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCheckpoint {
    pub id: String,
    pub input_mode: InputMode,
    pub source_id: String,
    pub output_dir: String,
    pub target_printer_id: String,
    pub target_endpoint: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub completed: bool,
    pub next_task_index: usize,
    pub tasks: Vec<PrintTask>,
    pub last_error: Option<String>,
}

impl JobCheckpoint {
    pub fn new(
        id: impl Into<String>,
        input_mode: InputMode,
        source_id: impl Into<String>,
        output_dir: impl Into<String>,
        target_printer_id: impl Into<String>,
        target_endpoint: impl Into<String>,
        tasks: Vec<PrintTask>,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            input_mode,
            source_id: source_id.into(),
            output_dir: output_dir.into(),
            target_printer_id: target_printer_id.into(),
            target_endpoint: target_endpoint.into(),
            created_at: now,
            updated_at: now,
            completed: false,
            next_task_index: 0,
            tasks,
            last_error: None,
        }
    }

    /// `true` once every task has been executed and no error is pending.
    pub fn is_complete(&self) -> bool {
        self.completed && self.next_task_index == self.tasks.len() && self.last_error.is_none()
    }

    /// Records a successful task boundary: advances `next_task_index`, clears
    /// `last_error`, and flips `completed` when the task list is exhausted.
    pub fn record_success(&mut self, completed_index: usize, now: NaiveDateTime) {
        self.next_task_index = completed_index + 1;
        self.last_error = None;
        self.updated_at = now;
        self.completed = self.next_task_index == self.tasks.len();
    }

    /// Records a failure at `failed_index`: leaves `next_task_index` untouched
    /// (the failed task did not complete) and stores the error.
    pub fn record_failure(&mut self, error: impl Into<String>, now: NaiveDateTime) {
        self.completed = false;
        self.last_error = Some(error.into());
        self.updated_at = now;
    }

    /// The safe resume index: replay the most recently
    /// completed task, then continue.
    pub fn resume_index(&self) -> usize {
        self.next_task_index.saturating_sub(1)
    }
}

/// Non-panicking "now" used throughout checkpoint bookkeeping; callers in
/// production code use `Utc::now().naive_utc()`, tests pass a fixed value.
pub fn now_naive() -> NaiveDateTime {
    Utc::now().naive_utc()
}
