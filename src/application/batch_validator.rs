//! Sequential batch validation
//!
//! A [`BatchJob`] walks its `(slot, imei)` requests one at a time, asking the
//! [`ValidationProvider`] about each. Before every dispatch it emits a
//! progress event, after every answer a slot status event. Cancellation is
//! cooperative: the token is checked once per iteration, an in-flight
//! provider call always runs to completion.
//!
//! [`BatchValidator::spawn`] runs a job on its own tokio task so the caller
//! keeps control while events stream in over an unbounded channel.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use crate::domain::events::{JobState, SlotRef, ValidationEvent};
use crate::domain::services::ValidationProvider;
use crate::domain::template::ValidationStatus;
use crate::domain::value_objects::Imei;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("invalid job transition {from} -> {to}")]
    InvalidTransition { from: JobState, to: JobState },

    #[error("validation task failed: {0}")]
    TaskJoin(String),
}

/// One IMEI to validate, tagged with the template row it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRequest {
    pub slot: SlotRef,
    pub imei: Imei,
}

impl ValidationRequest {
    #[must_use]
    pub const fn new(slot: SlotRef, imei: Imei) -> Self {
        Self { slot, imei }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotResult {
    pub slot: SlotRef,
    pub imei: Imei,
    pub status: ValidationStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub valid: usize,
    pub invalid: usize,
    pub unknown_error: usize,
    pub network_error: usize,
}

impl ValidationSummary {
    pub fn record(&mut self, status: ValidationStatus) {
        match status {
            ValidationStatus::Valid => self.valid += 1,
            ValidationStatus::Invalid => self.invalid += 1,
            ValidationStatus::UnknownError => self.unknown_error += 1,
            ValidationStatus::NetworkError => self.network_error += 1,
            ValidationStatus::NotGenerated | ValidationStatus::Pending => {}
        }
    }
}

/// What a finished job hands back to its caller
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub job_id: Uuid,
    pub state: JobState,
    pub total: usize,
    pub processed: usize,
    pub results: Vec<SlotResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl BatchReport {
    #[must_use]
    pub fn summary(&self) -> ValidationSummary {
        let mut summary = ValidationSummary::default();
        for result in &self.results {
            summary.record(result.status);
        }
        summary
    }
}

/// A single validation run over an ordered list of requests
#[derive(Debug)]
pub struct BatchJob {
    id: Uuid,
    requests: Vec<ValidationRequest>,
    state: watch::Sender<JobState>,
    cancellation_token: CancellationToken,
}

impl BatchJob {
    #[must_use]
    pub fn new(requests: Vec<ValidationRequest>) -> Self {
        let (state, _) = watch::channel(JobState::Created);
        Self {
            id: Uuid::new_v4(),
            requests,
            state,
            cancellation_token: CancellationToken::new(),
        }
    }

    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    #[must_use]
    pub fn requests(&self) -> &[ValidationRequest] {
        &self.requests
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        *self.state.borrow()
    }

    /// Receiver that observes every state change
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<JobState> {
        self.state.subscribe()
    }

    /// Requests cancellation. Safe to call at any time, any number of times.
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    #[must_use]
    pub fn is_cancel_requested(&self) -> bool {
        self.cancellation_token.is_cancelled()
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Created -> Running
    pub fn start(&self) -> Result<(), BatchError> {
        self.transition(JobState::Running)
    }

    fn transition(&self, next: JobState) -> Result<(), BatchError> {
        let mut result = Ok(());
        self.state.send_if_modified(|current| {
            if current.can_transition_to(next) {
                *current = next;
                true
            } else {
                result = Err(BatchError::InvalidTransition {
                    from: *current,
                    to: next,
                });
                false
            }
        });
        result
    }

    /// Runs the job to completion (or cancellation) on the current task.
    pub async fn run(
        &self,
        provider: &dyn ValidationProvider,
        events: &mpsc::UnboundedSender<ValidationEvent>,
    ) -> Result<BatchReport, BatchError> {
        self.start()?;
        let started_at = Utc::now();
        let total = self.requests.len();
        info!(
            "🚀 Validation job {} started: {} IMEI(s) via {}",
            self.id,
            total,
            provider.name()
        );

        let mut results = Vec::with_capacity(total);
        for (index, request) in self.requests.iter().enumerate() {
            if self.cancellation_token.is_cancelled() {
                info!(
                    "🛑 Validation job {} cancelled after {}/{}",
                    self.id, index, total
                );
                break;
            }

            self.emit(
                events,
                ValidationEvent::Progress {
                    job_id: self.id,
                    completed: index + 1,
                    total,
                },
            );

            let outcome = provider.check_identifier(&request.imei).await;
            let status = outcome.to_status();
            debug!("IMEI {} (slot {}) -> {}", request.imei, request.slot, status);

            self.emit(
                events,
                ValidationEvent::SlotStatus {
                    job_id: self.id,
                    slot: request.slot,
                    imei: request.imei.clone(),
                    status,
                },
            );
            results.push(SlotResult {
                slot: request.slot,
                imei: request.imei.clone(),
                status,
            });
        }

        let processed = results.len();
        let final_state = if processed < total {
            JobState::Cancelled
        } else {
            JobState::Completed
        };
        self.transition(final_state)?;

        self.emit(
            events,
            ValidationEvent::Finished {
                job_id: self.id,
                state: final_state,
                processed,
                total,
            },
        );

        let report = BatchReport {
            job_id: self.id,
            state: final_state,
            total,
            processed,
            results,
            started_at,
            finished_at: Utc::now(),
        };
        let summary = report.summary();
        info!(
            "✅ Validation job {} {}: {}/{} processed (valid {}, invalid {}, unknown {}, network {})",
            self.id,
            final_state,
            processed,
            total,
            summary.valid,
            summary.invalid,
            summary.unknown_error,
            summary.network_error
        );
        Ok(report)
    }

    fn emit(&self, events: &mpsc::UnboundedSender<ValidationEvent>, event: ValidationEvent) {
        if events.send(event).is_err() {
            debug!("Event receiver for job {} is gone, event dropped", self.id);
        }
    }
}

/// Runs batch jobs against a shared provider
#[derive(Clone)]
pub struct BatchValidator {
    provider: Arc<dyn ValidationProvider>,
}

impl BatchValidator {
    #[must_use]
    pub fn new(provider: Arc<dyn ValidationProvider>) -> Self {
        Self { provider }
    }

    /// Runs `requests` inline, sending events to `events`
    pub async fn validate(
        &self,
        requests: Vec<ValidationRequest>,
        events: &mpsc::UnboundedSender<ValidationEvent>,
    ) -> Result<BatchReport, BatchError> {
        BatchJob::new(requests)
            .run(self.provider.as_ref(), events)
            .await
    }

    /// Starts a job on its own task and returns a handle to observe and cancel it
    #[must_use]
    pub fn spawn(&self, requests: Vec<ValidationRequest>) -> BatchJobHandle {
        let job = Arc::new(BatchJob::new(requests));
        let (tx, rx) = mpsc::unbounded_channel();
        let provider = Arc::clone(&self.provider);
        let task_job = Arc::clone(&job);

        let task = tokio::spawn(async move { task_job.run(provider.as_ref(), &tx).await });

        BatchJobHandle {
            job,
            events: rx,
            task,
        }
    }
}

/// Caller side of a spawned job
#[derive(Debug)]
pub struct BatchJobHandle {
    job: Arc<BatchJob>,
    events: mpsc::UnboundedReceiver<ValidationEvent>,
    task: JoinHandle<Result<BatchReport, BatchError>>,
}

impl BatchJobHandle {
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.job.id()
    }

    #[must_use]
    pub fn state(&self) -> JobState {
        self.job.state()
    }

    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<JobState> {
        self.job.watch_state()
    }

    pub fn cancel(&self) {
        self.job.cancel();
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.job.cancellation_token()
    }

    /// Next event, `None` once the job has finished and every event was read
    pub async fn next_event(&mut self) -> Option<ValidationEvent> {
        self.events.recv().await
    }

    /// Waits for the job task and returns its report
    pub async fn join(self) -> Result<BatchReport, BatchError> {
        self.task
            .await
            .map_err(|e| BatchError::TaskJoin(e.to_string()))?
    }
}
