//! Executor + Checkpoint (component J): runs a job's task
//! list in order, persisting progress atomically after every task boundary so
//! an interrupted job can be resumed safely.

use std::path::{Path, PathBuf};

use tracing::warn;

use crate::errors::{WmsError, WmsResult};
use crate::models::{now_naive, JobCheckpoint, PrinterConfig};
use crate::printing::WireTransport;

fn checkpoint_path(dir: &Path, id: &str) -> PathBuf {
    dir.join(format!("{id}.json"))
}

/// Writes `checkpoint` to its file via temp-file-then-rename so concurrent
/// readers (listing) always observe a consistent state.
fn write_checkpoint_atomic(dir: &Path, checkpoint: &JobCheckpoint) -> WmsResult<()> {
    std::fs::create_dir_all(dir)?;
    let final_path = checkpoint_path(dir, &checkpoint.id);
    let tmp_path = dir.join(format!("{}.json.tmp", checkpoint.id));
    let json = serde_json::to_vec_pretty(checkpoint)?;
    std::fs::write(&tmp_path, json)?;
    std::fs::rename(&tmp_path, &final_path)?;
    Ok(())
}

/// Creates the job's output directory and its initial checkpoint (`nextTaskIndex
/// = 0`), persisted before any task runs.
pub fn create_checkpoint(checkpoint_dir: &Path, checkpoint: &JobCheckpoint) -> WmsResult<()> {
    std::fs::create_dir_all(&checkpoint.output_dir)?;
    write_checkpoint_atomic(checkpoint_dir, checkpoint)
}

/// Executes `checkpoint.tasks[checkpoint.next_task_index..]` in order: writes
/// each task's payload to `output_dir/file_name`, transmits it to `printer`
/// unless running in file-only mode (`printer.is_none()`), and persists the
/// checkpoint atomically after every task boundary. A task failure aborts the
/// job, leaving prior tasks printed and the checkpoint on disk.
pub async fn execute(
    checkpoint_dir: &Path,
    mut checkpoint: JobCheckpoint,
    transport: &WireTransport,
    printer: Option<&PrinterConfig>,
) -> WmsResult<JobCheckpoint> {
    let output_dir = PathBuf::from(&checkpoint.output_dir);
    std::fs::create_dir_all(&output_dir)?;

    let start = checkpoint.next_task_index;
    for i in start..checkpoint.tasks.len() {
        let task = checkpoint.tasks[i].clone();
        let file_path = output_dir.join(&task.file_name);

        if let Err(e) = std::fs::write(&file_path, task.payload.as_bytes()) {
            let err = WmsError::from(e);
            checkpoint.record_failure(err.to_string(), now_naive());
            write_checkpoint_atomic(checkpoint_dir, &checkpoint)?;
            return Err(err);
        }

        if let Some(printer) = printer {
            if let Err(e) = transport.send(&printer.id, &printer.ip, printer.port, task.payload.as_bytes()).await {
                checkpoint.record_failure(e.to_string(), now_naive());
                write_checkpoint_atomic(checkpoint_dir, &checkpoint)?;
                return Err(e);
            }
        }

        checkpoint.record_success(i, now_naive());
        write_checkpoint_atomic(checkpoint_dir, &checkpoint)?;
    }

    Ok(checkpoint)
}

/// Enumerates the checkpoint directory and returns every incomplete
/// checkpoint, most-recently-updated first. Never panics; a malformed file is
/// logged and skipped.
pub fn list_incomplete_jobs(checkpoint_dir: &Path) -> Vec<JobCheckpoint> {
    let mut out = Vec::new();
    let Ok(entries) = std::fs::read_dir(checkpoint_dir) else {
        return out;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        let Ok(bytes) = std::fs::read(&path) else {
            warn!("checkpoint listing: could not read {:?}, skipping", path);
            continue;
        };
        match serde_json::from_slice::<JobCheckpoint>(&bytes) {
            Ok(cp) if !cp.completed => out.push(cp),
            Ok(_) => {}
            Err(e) => warn!("checkpoint listing: malformed checkpoint {:?}: {e}, skipping", path),
        }
    }
    out.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    out
}

/// Prepares a checkpoint for resume: rewinds `next_task_index` to
/// `max(next_task_index - 1, 0)` so the
/// most recently completed task is reprinted before continuing. Fails if the
/// checkpoint is already complete.
pub fn resume(mut checkpoint: JobCheckpoint) -> WmsResult<JobCheckpoint> {
    if checkpoint.completed {
        return Err(WmsError::validation(format!(
            "checkpoint {} is already complete and cannot be resumed",
            checkpoint.id
        )));
    }
    checkpoint.next_task_index = checkpoint.resume_index();
    Ok(checkpoint)
}

/// Loads a single checkpoint by id from `checkpoint_dir`.
pub fn load_checkpoint(checkpoint_dir: &Path, id: &str) -> WmsResult<JobCheckpoint> {
    let path = checkpoint_path(checkpoint_dir, id);
    let bytes = std::fs::read(&path)?;
    Ok(serde_json::from_slice(&bytes)?)
}
