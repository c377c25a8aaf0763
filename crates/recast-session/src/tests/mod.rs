
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use recast_core::settings::MessageSettings;
use recast_core::{ErrorRecord, ErrorSet, Verdict, VerdictService, VerdictUnavailable};

use super::{CorrectionSession, SessionConfig};

pub(super) const ESSAY: &str = "Yo soy 10 años. Me gusta el playa.";

pub(super) fn record(n: usize) -> ErrorRecord {
    ErrorRecord {
        original_sentence: format!("original {n}"),
        corrected_sentence: format!("corrected {n}"),
        hint_text: format!("hint {n}"),
        success_message_attempt1: format!("first try {n}"),
        retry_hint_text: format!("retry hint {n}"),
        success_message_attempt2: format!("second try {n}"),
        final_explanation: format!("explanation {n}"),
        explanation_detail: format!("detail {n}"),
    }
}

pub(super) fn error_set(n: usize) -> ErrorSet {
    ErrorSet::from_records((0..n).map(record).collect()).unwrap()
}

pub(super) fn test_config(pause_between_errors: bool) -> SessionConfig {
    SessionConfig {
        pause_between_errors,
        messages: MessageSettings {
            final_practice_retry: "Try the corrected sentence once more.".to_string(),
            completion: "All errors corrected.".to_string(),
            no_corrections: "Nothing to correct.".to_string(),
            rewrite_prompt: "Rewrite your essay.".to_string(),
            rewrite_received: "Rewrite received.".to_string(),
            session_closed: "Session closed.".to_string(),
        },
    }
}

pub(super) fn session<V: VerdictService>(verdict: V) -> CorrectionSession<V> {
    CorrectionSession::with_config(verdict, test_config(false))
}

/// Hands out queued verdicts in order and counts calls. An empty queue or a
/// queued `None` reports the service as unavailable.
#[derive(Default)]
pub(super) struct ScriptedJudge {
    script: RefCell<VecDeque<Option<Verdict>>>,
    calls: Cell<usize>,
}

impl ScriptedJudge {
    pub fn new(script: impl IntoIterator<Item = Option<Verdict>>) -> Self {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            calls: Cell::new(0),
        }
    }

    pub fn verdicts(verdicts: &[Verdict]) -> Self {
        Self::new(verdicts.iter().copied().map(Some))
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl VerdictService for ScriptedJudge {
    fn judge(
        &self,
        _original_sentence: &str,
        _target_correction: &str,
        _attempt_text: &str,
    ) -> Result<Verdict, VerdictUnavailable> {
        self.calls.set(self.calls.get() + 1);
        self.script
            .borrow_mut()
            .pop_front()
            .flatten()
            .ok_or_else(|| VerdictUnavailable("connection refused".to_string()))
    }
}

/// Must never be consulted.
pub(super) struct PanickingJudge;

impl VerdictService for PanickingJudge {
    fn judge(&self, _: &str, _: &str, _: &str) -> Result<Verdict, VerdictUnavailable> {
        panic!("verdict service must not be called");
    }
}
