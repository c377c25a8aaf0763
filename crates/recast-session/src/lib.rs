//! Progressive-hint correction session.
//!
//! `CorrectionSession` walks a learner through an `ErrorSet` one error at a
//! time: a hint, a retry hint, then a full reveal followed by a mandatory final
//! practice. Every operation takes the current `SessionState` by reference and
//! returns a new one together with a `DisplayPayload`, so callers can keep the
//! state wherever they like between requests.

mod attempt;
mod error;
mod response;
mod rewrite;
mod types;

#[cfg(test)]
mod tests;

use tracing::debug;

use recast_core::{ErrorSet, VerdictService};

pub use error::{Recovery, SessionError};
pub use types::{DisplayKind, DisplayPayload, ErrorPosition, Phase, Reveal, SessionConfig, SessionState};

use types::FIRST_ATTEMPT;

/// Drives `SessionState` transitions, judging attempts with `V`.
pub struct CorrectionSession<V> {
    verdict: V,
    config: SessionConfig,
}

impl<V: VerdictService> CorrectionSession<V> {
    /// A session using the global settings.
    pub fn new(verdict: V) -> Self {
        Self::with_config(verdict, SessionConfig::default())
    }

    pub fn with_config(verdict: V, config: SessionConfig) -> Self {
        Self { verdict, config }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Begin a session over `error_set`. An empty set starts out `Completed`
    /// with `corrections_needed() == false`.
    pub fn start(
        &self,
        error_set: ErrorSet,
        original_essay_text: &str,
    ) -> Result<SessionState, SessionError> {
        if original_essay_text.trim().is_empty() {
            return Err(SessionError::EmptyEssayText);
        }
        let corrections_needed = !error_set.is_empty();
        let phase = if corrections_needed {
            Phase::AwaitingAttempt
        } else {
            Phase::Completed
        };
        debug!(error_count = error_set.len(), %phase, "session started");
        Ok(SessionState {
            error_set,
            current_error_index: 0,
            current_attempt_number: FIRST_ATTEMPT,
            phase,
            pending_display_message: None,
            final_practice_misses: 0,
            original_essay_text: original_essay_text.to_string(),
            corrections_needed,
            last_event_id: None,
        })
    }

    /// A fresh state with nothing in it, discarding whatever came before.
    pub fn reset(&self) -> SessionState {
        SessionState::blank()
    }

    /// Serialize a state so it can be handed back on a later request.
    pub fn snapshot(&self, state: &SessionState) -> Result<String, SessionError> {
        serde_json::to_string(state).map_err(|e| SessionError::InvalidSnapshot(e.to_string()))
    }

    /// Parse and validate a state produced by [`CorrectionSession::snapshot`].
    pub fn restore(&self, snapshot: &str) -> Result<SessionState, SessionError> {
        let state: SessionState = serde_json::from_str(snapshot)
            .map_err(|e| SessionError::InvalidSnapshot(e.to_string()))?;
        state.validate().map_err(SessionError::InvalidSnapshot)?;
        Ok(state)
    }
}
