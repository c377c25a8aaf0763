use serde::{Deserialize, Serialize};

/// One correctable mistake in the submitted text, with its tiered feedback.
///
/// The record is opaque to the session: nothing here is parsed or checked
/// beyond "every field is a non-blank string" (see [`ErrorRecord::blank_field`]).
/// The aliases accept the key names the analysis prompt asks the model for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorRecord {
    #[serde(alias = "error_orig")]
    pub original_sentence: String,
    #[serde(alias = "error_corrected")]
    pub corrected_sentence: String,
    /// Shown before attempt 1.
    #[serde(alias = "line_1")]
    pub hint_text: String,
    #[serde(alias = "response_1_correct")]
    pub success_message_attempt1: String,
    /// Shown after a failed attempt 1.
    #[serde(alias = "response_1_incorrect")]
    pub retry_hint_text: String,
    #[serde(alias = "response_2_correct")]
    pub success_message_attempt2: String,
    /// Shown after a failed attempt 2, before the final practice.
    #[serde(alias = "response_2_incorrect")]
    pub final_explanation: String,
    #[serde(alias = "explanation")]
    pub explanation_detail: String,
}

impl ErrorRecord {
    /// Field names in declaration order, paired with their values.
    pub fn fields(&self) -> [(&'static str, &str); 8] {
        [
            ("original_sentence", self.original_sentence.as_str()),
            ("corrected_sentence", self.corrected_sentence.as_str()),
            ("hint_text", self.hint_text.as_str()),
            ("success_message_attempt1", self.success_message_attempt1.as_str()),
            ("retry_hint_text", self.retry_hint_text.as_str()),
            ("success_message_attempt2", self.success_message_attempt2.as_str()),
            ("final_explanation", self.final_explanation.as_str()),
            ("explanation_detail", self.explanation_detail.as_str()),
        ]
    }

    /// First field that is empty or whitespace-only, if any.
    pub fn blank_field(&self) -> Option<&'static str> {
        self.fields()
            .into_iter()
            .find(|(_, value)| value.trim().is_empty())
            .map(|(name, _)| name)
    }
}
