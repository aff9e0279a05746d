//! Event types emitted by batch validation jobs
//!
//! A job never touches the template store. It reports what happened through
//! these events and the caller applies them to whatever store it owns.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::template::ValidationStatus;
use super::value_objects::Imei;

/// Index of a template row in the caller's store
pub type SlotRef = usize;

/// Lifecycle of a batch validation job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobState {
    /// Job built, nothing dispatched yet
    Created,
    /// Sequential loop in progress
    Running,
    /// Every request was processed
    Completed,
    /// Loop left early because cancellation was requested
    Cancelled,
}

impl JobState {
    /// Whether `self -> next` is a legal transition
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Running)
                | (Self::Running, Self::Completed)
                | (Self::Running, Self::Cancelled)
        )
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Created => "Created",
            Self::Running => "Running",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        };
        f.write_str(label)
    }
}

/// Events emitted by a job, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationEvent {
    /// Emitted before the `completed`-th request is dispatched
    Progress {
        job_id: Uuid,
        completed: usize,
        total: usize,
    },
    /// Outcome of one request, mapped to a status
    SlotStatus {
        job_id: Uuid,
        slot: SlotRef,
        imei: Imei,
        status: ValidationStatus,
    },
    /// Last event of every job
    Finished {
        job_id: Uuid,
        state: JobState,
        processed: usize,
        total: usize,
    },
}

impl ValidationEvent {
    #[must_use]
    pub const fn job_id(&self) -> Uuid {
        match self {
            Self::Progress { job_id, .. }
            | Self::SlotStatus { job_id, .. }
            | Self::Finished { job_id, .. } => *job_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowed_transitions() {
        use JobState::{Cancelled, Completed, Created, Running};
        assert!(Created.can_transition_to(Running));
        assert!(Running.can_transition_to(Completed));
        assert!(Running.can_transition_to(Cancelled));

        assert!(!Created.can_transition_to(Completed));
        assert!(!Created.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Running));
        assert!(!Running.can_transition_to(Running));
    }

    #[test]
    fn terminal_states() {
        assert!(JobState::Completed.is_terminal());
        assert!(JobState::Cancelled.is_terminal());
        assert!(!JobState::Running.is_terminal());
    }
}
