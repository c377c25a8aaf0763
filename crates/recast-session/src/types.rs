use std::fmt;

use serde::{Deserialize, Serialize};

use recast_core::settings::{settings, MessageSettings, Settings};
use recast_core::{ErrorSet, Verdict};

pub(crate) const FIRST_ATTEMPT: u8 = 1;
pub(crate) const SECOND_ATTEMPT: u8 = 2;

/// Where a session is in the correction flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for attempt 1 or 2 on the current error.
    AwaitingAttempt,
    /// A success message is on screen; `acknowledge` moves on to the next error.
    ShowingIntermediateFeedback,
    /// Both tiered attempts failed and the answer was revealed.
    AwaitingFinalPractice,
    /// Every error has been passed (or there were none).
    Completed,
    AwaitingFinalRewrite,
    Finished,
}

impl Phase {
    pub fn accepts_attempt(self) -> bool {
        matches!(self, Self::AwaitingAttempt | Self::AwaitingFinalPractice)
    }

    /// Phases in which every error of the set has been passed.
    pub fn is_past_all_errors(self) -> bool {
        matches!(
            self,
            Self::Completed | Self::AwaitingFinalRewrite | Self::Finished
        )
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::AwaitingAttempt => "awaiting_attempt",
            Self::ShowingIntermediateFeedback => "showing_intermediate_feedback",
            Self::AwaitingFinalPractice => "awaiting_final_practice",
            Self::Completed => "completed",
            Self::AwaitingFinalRewrite => "awaiting_final_rewrite",
            Self::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Progress of one learner through one `ErrorSet`.
///
/// Fields are read-only outside this crate; every change goes through a
/// `CorrectionSession` operation, which returns a new value and leaves the
/// input untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub(crate) error_set: ErrorSet,
    pub(crate) current_error_index: usize,
    pub(crate) current_attempt_number: u8,
    pub(crate) phase: Phase,
    pub(crate) pending_display_message: Option<String>,
    /// Failed final-practice attempts on the current error.
    #[serde(default)]
    pub(crate) final_practice_misses: u32,
    pub(crate) original_essay_text: String,
    pub(crate) corrections_needed: bool,
    /// Id of the last attempt event applied, for duplicate detection.
    pub(crate) last_event_id: Option<String>,
}

impl SessionState {
    /// A state with nothing left to do: empty set, no essay, `Finished`.
    pub fn blank() -> Self {
        Self {
            error_set: ErrorSet::empty(),
            current_error_index: 0,
            current_attempt_number: FIRST_ATTEMPT,
            phase: Phase::Finished,
            pending_display_message: None,
            final_practice_misses: 0,
            original_essay_text: String::new(),
            corrections_needed: false,
            last_event_id: None,
        }
    }

    pub fn error_set(&self) -> &ErrorSet {
        &self.error_set
    }

    pub fn current_error_index(&self) -> usize {
        self.current_error_index
    }

    pub fn current_attempt_number(&self) -> u8 {
        self.current_attempt_number
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_display_message(&self) -> Option<&str> {
        self.pending_display_message.as_deref()
    }

    pub fn final_practice_misses(&self) -> u32 {
        self.final_practice_misses
    }

    pub fn original_essay_text(&self) -> &str {
        &self.original_essay_text
    }

    /// False when the analysis found no errors.
    pub fn corrections_needed(&self) -> bool {
        self.corrections_needed
    }

    pub fn last_event_id(&self) -> Option<&str> {
        self.last_event_id.as_deref()
    }

    pub(crate) fn position(&self) -> ErrorPosition {
        ErrorPosition {
            index: self.current_error_index,
            total: self.error_set.len(),
            attempt: self.current_attempt_number,
        }
    }

    /// Check the structural invariants. Used when a state comes back from a
    /// snapshot rather than from a transition.
    pub fn validate(&self) -> Result<(), String> {
        let len = self.error_set.len();
        if self.current_error_index > len {
            return Err(format!(
                "current_error_index {} exceeds error count {len}",
                self.current_error_index
            ));
        }
        if (self.current_error_index == len) != self.phase.is_past_all_errors() {
            return Err(format!(
                "phase {} does not match error index {} of {len}",
                self.phase, self.current_error_index
            ));
        }
        match self.current_attempt_number {
            FIRST_ATTEMPT => {}
            SECOND_ATTEMPT
                if matches!(
                    self.phase,
                    Phase::AwaitingAttempt | Phase::AwaitingFinalPractice
                ) => {}
            n => {
                return Err(format!(
                    "attempt number {n} is not valid in phase {}",
                    self.phase
                ))
            }
        }
        if self.phase == Phase::AwaitingFinalPractice
            && self.current_attempt_number != SECOND_ATTEMPT
        {
            return Err("final practice must follow the second attempt".to_string());
        }
        if self.final_practice_misses > 0 && self.phase != Phase::AwaitingFinalPractice {
            return Err(format!(
                "final practice misses recorded in phase {}",
                self.phase
            ));
        }
        if self.phase == Phase::ShowingIntermediateFeedback
            && self.pending_display_message.is_none()
        {
            return Err("intermediate feedback has no message".to_string());
        }
        if self.corrections_needed == self.error_set.is_empty() {
            return Err("corrections_needed does not match the error set".to_string());
        }
        if self.phase != Phase::Finished && self.original_essay_text.trim().is_empty() {
            return Err("original essay text is empty".to_string());
        }
        Ok(())
    }
}

/// Which error the learner is on, and which attempt comes next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPosition {
    /// 0-based index into the error set.
    pub index: usize,
    pub total: usize,
    pub attempt: u8,
}

/// The full answer, shown once both tiered attempts have failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reveal {
    pub original_sentence: String,
    pub corrected_sentence: String,
    pub explanation_detail: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayKind {
    ShowError,
    ShowFeedback,
    ShowFinalPracticePrompt,
    ShowCompletion,
    ShowRewritePrompt,
}

/// What the presentation layer should show next. The session computes it but
/// renders nothing. `position` always describes the state after the transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DisplayPayload {
    /// Prompt for the first attempt on an error, optionally preceded by the
    /// success message for the previous one.
    ShowError {
        position: ErrorPosition,
        original_sentence: String,
        hint: String,
        feedback: Option<String>,
    },
    /// A verdict message: the retry hint before attempt 2, or a success
    /// message while pausing between errors.
    ShowFeedback {
        position: ErrorPosition,
        verdict: Verdict,
        message: String,
    },
    ShowFinalPracticePrompt {
        position: ErrorPosition,
        explanation: String,
        reveal: Reveal,
        /// Set after a failed final-practice attempt.
        retry_message: Option<String>,
    },
    ShowCompletion {
        message: String,
        feedback: Option<String>,
        corrections_needed: bool,
    },
    ShowRewritePrompt {
        message: String,
        original_essay: String,
    },
}

impl DisplayPayload {
    pub fn kind(&self) -> DisplayKind {
        match self {
            Self::ShowError { .. } => DisplayKind::ShowError,
            Self::ShowFeedback { .. } => DisplayKind::ShowFeedback,
            Self::ShowFinalPracticePrompt { .. } => DisplayKind::ShowFinalPracticePrompt,
            Self::ShowCompletion { .. } => DisplayKind::ShowCompletion,
            Self::ShowRewritePrompt { .. } => DisplayKind::ShowRewritePrompt,
        }
    }

    /// The main line of text for this payload.
    pub fn text(&self) -> &str {
        match self {
            Self::ShowError { hint, .. } => hint,
            Self::ShowFeedback { message, .. } => message,
            Self::ShowFinalPracticePrompt { explanation, .. } => explanation,
            Self::ShowCompletion { message, .. } => message,
            Self::ShowRewritePrompt { message, .. } => message,
        }
    }

    /// Feedback from the previous step that precedes the main text, if any.
    pub fn feedback(&self) -> Option<&str> {
        match self {
            Self::ShowError { feedback, .. } | Self::ShowCompletion { feedback, .. } => {
                feedback.as_deref()
            }
            Self::ShowFinalPracticePrompt { retry_message, .. } => retry_message.as_deref(),
            Self::ShowFeedback { .. } | Self::ShowRewritePrompt { .. } => None,
        }
    }

    pub fn position(&self) -> Option<ErrorPosition> {
        match self {
            Self::ShowError { position, .. }
            | Self::ShowFeedback { position, .. }
            | Self::ShowFinalPracticePrompt { position, .. } => Some(*position),
            Self::ShowCompletion { .. } | Self::ShowRewritePrompt { .. } => None,
        }
    }
}

/// Behaviour switches and fixed strings for a `CorrectionSession`.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub pause_between_errors: bool,
    pub messages: MessageSettings,
}

impl SessionConfig {
    pub fn from_settings(s: &Settings) -> Self {
        Self {
            pause_between_errors: s.session.pause_between_errors,
            messages: s.messages.clone(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_settings(settings())
    }
}
