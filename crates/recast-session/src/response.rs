use recast_core::{Verdict, VerdictService};

use super::types::{DisplayPayload, Phase, Reveal, SessionState, FIRST_ATTEMPT};
use super::{CorrectionSession, SessionError};

impl<V: VerdictService> CorrectionSession<V> {
    /// What to show for `state`. Pure: the same state always yields the same
    /// payload, so a client that lost a response can call this to re-render.
    pub fn current_display(&self, state: &SessionState) -> Result<DisplayPayload, SessionError> {
        let messages = &self.config.messages;
        let payload = match state.phase {
            Phase::AwaitingAttempt => {
                let record = state.error_set.at(state.current_error_index)?;
                if state.current_attempt_number == FIRST_ATTEMPT {
                    DisplayPayload::ShowError {
                        position: state.position(),
                        original_sentence: record.original_sentence.clone(),
                        hint: record.hint_text.clone(),
                        feedback: state.pending_display_message.clone(),
                    }
                } else {
                    DisplayPayload::ShowFeedback {
                        position: state.position(),
                        verdict: Verdict::Incorrect,
                        message: record.retry_hint_text.clone(),
                    }
                }
            }
            Phase::ShowingIntermediateFeedback => DisplayPayload::ShowFeedback {
                position: state.position(),
                verdict: Verdict::Correct,
                message: state.pending_display_message.clone().unwrap_or_default(),
            },
            Phase::AwaitingFinalPractice => {
                let record = state.error_set.at(state.current_error_index)?;
                let retry_message = (state.final_practice_misses > 0)
                    .then(|| messages.final_practice_retry.clone());
                DisplayPayload::ShowFinalPracticePrompt {
                    position: state.position(),
                    explanation: record.final_explanation.clone(),
                    reveal: Reveal {
                        original_sentence: record.original_sentence.clone(),
                        corrected_sentence: record.corrected_sentence.clone(),
                        explanation_detail: record.explanation_detail.clone(),
                    },
                    retry_message,
                }
            }
            Phase::Completed => DisplayPayload::ShowCompletion {
                message: if state.corrections_needed {
                    messages.completion.clone()
                } else {
                    messages.no_corrections.clone()
                },
                feedback: state.pending_display_message.clone(),
                corrections_needed: state.corrections_needed,
            },
            Phase::AwaitingFinalRewrite => DisplayPayload::ShowRewritePrompt {
                message: messages.rewrite_prompt.clone(),
                original_essay: state.original_essay_text.clone(),
            },
            Phase::Finished => DisplayPayload::ShowCompletion {
                message: state
                    .pending_display_message
                    .clone()
                    .unwrap_or_else(|| messages.session_closed.clone()),
                feedback: None,
                corrections_needed: state.corrections_needed,
            },
        };
        Ok(payload)
    }
}
