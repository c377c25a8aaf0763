use tracing::{debug, debug_span, warn};

use recast_core::{ErrorRecord, Verdict, VerdictService};

use super::types::{DisplayPayload, Phase, SessionState, FIRST_ATTEMPT, SECOND_ATTEMPT};
use super::{CorrectionSession, SessionError};

impl<V: VerdictService> CorrectionSession<V> {
    /// Judge one attempt on the current error and apply the verdict.
    ///
    /// The text goes to the verdict service as given, blank included; a blank
    /// attempt is judged like any other and usually counts as a miss. If the
    /// service fails, the error is returned and `state` is still the state to
    /// retry with.
    pub fn submit_attempt(
        &self,
        state: &SessionState,
        raw_attempt_text: &str,
    ) -> Result<(SessionState, DisplayPayload), SessionError> {
        let _span = debug_span!(
            "submit_attempt",
            index = state.current_error_index,
            attempt = state.current_attempt_number,
            phase = %state.phase,
        )
        .entered();

        let record = attempt_target(state)?;
        let verdict = self
            .verdict
            .judge(
                &record.original_sentence,
                &record.corrected_sentence,
                raw_attempt_text,
            )
            .map_err(|e| {
                warn!(error = %e, "verdict service failed; state unchanged");
                e
            })?;

        self.apply_verdict(state, verdict)
    }

    /// [`submit_attempt`](Self::submit_attempt) with an idempotency key. An
    /// event whose id matches the last applied one is rejected before the
    /// verdict service is called.
    pub fn submit_attempt_with_id(
        &self,
        state: &SessionState,
        event_id: &str,
        raw_attempt_text: &str,
    ) -> Result<(SessionState, DisplayPayload), SessionError> {
        if state.last_event_id.as_deref() == Some(event_id) {
            debug!(event_id, "duplicate attempt event");
            return Err(SessionError::DuplicateEvent {
                event_id: event_id.to_string(),
            });
        }
        let (mut next, payload) = self.submit_attempt(state, raw_attempt_text)?;
        next.last_event_id = Some(event_id.to_string());
        Ok((next, payload))
    }

    /// The transition function: apply an already-known verdict to `state`.
    pub fn apply_verdict(
        &self,
        state: &SessionState,
        verdict: Verdict,
    ) -> Result<(SessionState, DisplayPayload), SessionError> {
        let record = attempt_target(state)?;
        let mut next = state.clone();

        match (state.phase, verdict) {
            (Phase::AwaitingAttempt, Verdict::Correct) => {
                let message = if state.current_attempt_number == FIRST_ATTEMPT {
                    &record.success_message_attempt1
                } else {
                    &record.success_message_attempt2
                };
                self.advance(&mut next, Some(message.clone()));
            }
            (Phase::AwaitingAttempt, Verdict::Incorrect)
                if state.current_attempt_number == FIRST_ATTEMPT =>
            {
                next.current_attempt_number = SECOND_ATTEMPT;
                next.pending_display_message = Some(record.retry_hint_text.clone());
            }
            (Phase::AwaitingAttempt, Verdict::Incorrect) => {
                next.phase = Phase::AwaitingFinalPractice;
                next.pending_display_message = Some(record.final_explanation.clone());
            }
            (Phase::AwaitingFinalPractice, Verdict::Correct) => {
                self.advance(&mut next, None);
            }
            (Phase::AwaitingFinalPractice, Verdict::Incorrect) => {
                next.final_practice_misses += 1;
                next.pending_display_message =
                    Some(self.config.messages.final_practice_retry.clone());
            }
            (phase, _) => return Err(SessionError::InvalidPhaseForAttempt { phase }),
        }

        debug!(
            ?verdict,
            from = %state.phase,
            to = %next.phase,
            index = next.current_error_index,
            attempt = next.current_attempt_number,
            "transition"
        );
        let payload = self.current_display(&next)?;
        Ok((next, payload))
    }

    /// Leave the intermediate success message and show the next error.
    pub fn acknowledge(
        &self,
        state: &SessionState,
    ) -> Result<(SessionState, DisplayPayload), SessionError> {
        if state.phase != Phase::ShowingIntermediateFeedback {
            return Err(SessionError::InvalidPhaseForAcknowledge { phase: state.phase });
        }
        let mut next = state.clone();
        next.phase = Phase::AwaitingAttempt;
        next.pending_display_message = None;
        let payload = self.current_display(&next)?;
        Ok((next, payload))
    }

    /// Move past the current error. `message` is the feedback for the error
    /// just passed.
    fn advance(&self, next: &mut SessionState, message: Option<String>) {
        next.current_error_index += 1;
        next.current_attempt_number = FIRST_ATTEMPT;
        next.final_practice_misses = 0;
        next.phase = if next.current_error_index >= next.error_set.len() {
            Phase::Completed
        } else if self.config.pause_between_errors && message.is_some() {
            Phase::ShowingIntermediateFeedback
        } else {
            Phase::AwaitingAttempt
        };
        next.pending_display_message = message;
    }
}

/// The record an attempt in `state` is judged against.
fn attempt_target(state: &SessionState) -> Result<&ErrorRecord, SessionError> {
    if !state.phase.accepts_attempt() {
        return Err(SessionError::InvalidPhaseForAttempt { phase: state.phase });
    }
    Ok(state.error_set.at(state.current_error_index)?)
}
