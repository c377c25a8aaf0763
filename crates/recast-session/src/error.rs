use recast_core::{ErrorSetError, VerdictUnavailable};

use crate::types::Phase;

/// How the caller should react to a failed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Transient collaborator failure: offer "try again" with the same input.
    Retry,
    /// Unusable data or a caller out of step with the session: start a new submission.
    Restart,
    /// The learner's input was rejected before any external call: ask for new input.
    Fix,
    /// The event was already applied: re-render the current state.
    Resync,
}

/// Failures of a session step. None of them changes the state passed in.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("essay text is empty")]
    EmptyEssayText,

    #[error("cannot submit an attempt in phase {phase}")]
    InvalidPhaseForAttempt { phase: Phase },

    #[error("nothing to acknowledge in phase {phase}")]
    InvalidPhaseForAcknowledge { phase: Phase },

    #[error("cannot rewrite the essay in phase {phase}")]
    InvalidPhaseForRewrite { phase: Phase },

    #[error(transparent)]
    ErrorSet(#[from] ErrorSetError),

    #[error(transparent)]
    VerdictUnavailable(#[from] VerdictUnavailable),

    #[error("event {event_id} was already applied")]
    DuplicateEvent { event_id: String },

    #[error("invalid session snapshot: {0}")]
    InvalidSnapshot(String),
}

impl SessionError {
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::EmptyEssayText => Recovery::Fix,
            Self::VerdictUnavailable(_) => Recovery::Retry,
            Self::DuplicateEvent { .. } => Recovery::Resync,
            Self::InvalidPhaseForAttempt { .. }
            | Self::InvalidPhaseForAcknowledge { .. }
            | Self::InvalidPhaseForRewrite { .. }
            | Self::ErrorSet(_)
            | Self::InvalidSnapshot(_) => Recovery::Restart,
        }
    }
}
