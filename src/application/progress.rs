//! Progress feed reducer
//! Folds a job's event stream into a compact snapshot for rendering.

use uuid::Uuid;

use crate::application::batch_validator::ValidationSummary;
use crate::domain::events::{JobState, ValidationEvent};

#[derive(Debug, Clone, PartialEq)]
pub struct CompactProgress {
    pub job_id: Uuid,
    pub completed: usize,
    pub total: usize,
    pub percentage: f64,
    pub last_message: String,
    pub summary: ValidationSummary,
    pub state: JobState,
}

#[derive(Debug, Default)]
pub struct ProgressReducer {
    compact: Option<CompactProgress>,
}

impl ProgressReducer {
    #[must_use]
    pub fn new() -> Self {
        Self { compact: None }
    }

    pub fn apply(&mut self, ev: &ValidationEvent) {
        match ev {
            ValidationEvent::Progress {
                job_id,
                completed,
                total,
            } => {
                let progress = self.entry(*job_id, *total);
                progress.completed = *completed;
                progress.percentage = percentage(*completed, *total);
                progress.last_message = format!("[{completed}/{total}]");
            }
            ValidationEvent::SlotStatus {
                job_id,
                slot,
                imei,
                status,
            } => {
                let progress = self.entry(*job_id, 0);
                progress.summary.record(*status);
                progress.last_message = format!("slot {slot}: {imei} {status}");
            }
            ValidationEvent::Finished {
                job_id,
                state,
                processed,
                total,
            } => {
                let progress = self.entry(*job_id, *total);
                progress.state = *state;
                progress.completed = *processed;
                progress.percentage = percentage(*processed, *total);
                progress.last_message = format!("{state}: {processed}/{total}");
            }
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<CompactProgress> {
        self.compact.clone()
    }

    fn entry(&mut self, job_id: Uuid, total: usize) -> &mut CompactProgress {
        let stale = self.compact.as_ref().is_none_or(|c| c.job_id != job_id);
        if stale {
            self.compact = None;
        }
        self.compact.get_or_insert_with(|| CompactProgress {
            job_id,
            completed: 0,
            total,
            percentage: 0.0,
            last_message: String::new(),
            summary: ValidationSummary::default(),
            state: JobState::Running,
        })
    }
}

#[allow(clippy::cast_precision_loss)]
fn percentage(completed: usize, total: usize) -> f64 {
    if total == 0 {
        100.0
    } else {
        completed as f64 / total as f64 * 100.0
    }
}
