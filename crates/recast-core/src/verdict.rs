//! Offline verdict service.
//!
//! `ExactMatchJudge` accepts an attempt when it equals the target correction
//! after [`normalize_sentence`]. It is stricter than a language model (a
//! different but valid fix is rejected) and never unavailable.

use tracing::debug;

use crate::services::{Verdict, VerdictService, VerdictUnavailable};
use crate::unicode::normalize_sentence;

#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatchJudge;

impl VerdictService for ExactMatchJudge {
    fn judge(
        &self,
        _original_sentence: &str,
        target_correction: &str,
        attempt_text: &str,
    ) -> Result<Verdict, VerdictUnavailable> {
        let verdict = if normalize_sentence(attempt_text) == normalize_sentence(target_correction)
        {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        };
        debug!(?verdict, "exact-match verdict");
        Ok(verdict)
    }
}
