use tracing::debug;

use recast_core::VerdictService;

use super::types::{DisplayPayload, Phase, SessionState};
use super::{CorrectionSession, SessionError};

impl<V: VerdictService> CorrectionSession<V> {
    /// After completion, ask the learner to rewrite the whole essay.
    pub fn begin_rewrite(
        &self,
        state: &SessionState,
    ) -> Result<(SessionState, DisplayPayload), SessionError> {
        if state.phase != Phase::Completed {
            return Err(SessionError::InvalidPhaseForRewrite { phase: state.phase });
        }
        let mut next = state.clone();
        next.phase = Phase::AwaitingFinalRewrite;
        next.pending_display_message = None;
        let payload = self.current_display(&next)?;
        Ok((next, payload))
    }

    /// Accept the rewritten essay. It is not judged.
    pub fn submit_final_rewrite(
        &self,
        state: &SessionState,
        rewritten_text: &str,
    ) -> Result<(SessionState, DisplayPayload), SessionError> {
        if state.phase != Phase::AwaitingFinalRewrite {
            return Err(SessionError::InvalidPhaseForRewrite { phase: state.phase });
        }
        if rewritten_text.trim().is_empty() {
            return Err(SessionError::EmptyEssayText);
        }
        let mut next = state.clone();
        next.phase = Phase::Finished;
        next.pending_display_message = Some(self.config.messages.rewrite_received.clone());
        debug!(chars = rewritten_text.chars().count(), "final rewrite received");
        let payload = self.current_display(&next)?;
        Ok((next, payload))
    }
}
