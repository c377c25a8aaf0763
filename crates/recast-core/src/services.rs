//! Contracts for the two external collaborators.
//!
//! Both calls are blocking from the caller's point of view. Implementations
//! must report transport or format problems as `*Unavailable`, never as a
//! default answer: an empty analysis or an `Incorrect` verdict is a real result.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The verdict service's judgment of one attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("analysis service unavailable: {0}")]
pub struct AnalysisUnavailable(pub String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("verdict service unavailable: {0}")]
pub struct VerdictUnavailable(pub String);

/// Turns raw essay text into error-record-shaped JSON.
///
/// The returned value is one record object, an array of records, or an empty
/// array for "no errors". It is validated by [`crate::ErrorSet::build`].
pub trait AnalysisService {
    fn analyze(&self, essay_text: &str) -> Result<Value, AnalysisUnavailable>;
}

/// Judges whether an attempt matches the target correction.
pub trait VerdictService {
    fn judge(
        &self,
        original_sentence: &str,
        target_correction: &str,
        attempt_text: &str,
    ) -> Result<Verdict, VerdictUnavailable>;
}

impl<T: AnalysisService + ?Sized> AnalysisService for &T {
    fn analyze(&self, essay_text: &str) -> Result<Value, AnalysisUnavailable> {
        (**self).analyze(essay_text)
    }
}

impl<T: VerdictService + ?Sized> VerdictService for &T {
    fn judge(
        &self,
        original_sentence: &str,
        target_correction: &str,
        attempt_text: &str,
    ) -> Result<Verdict, VerdictUnavailable> {
        (**self).judge(original_sentence, target_correction, attempt_text)
    }
}

impl<T: AnalysisService + ?Sized> AnalysisService for Box<T> {
    fn analyze(&self, essay_text: &str) -> Result<Value, AnalysisUnavailable> {
        (**self).analyze(essay_text)
    }
}

impl<T: VerdictService + ?Sized> VerdictService for Box<T> {
    fn judge(
        &self,
        original_sentence: &str,
        target_correction: &str,
        attempt_text: &str,
    ) -> Result<Verdict, VerdictUnavailable> {
        (**self).judge(original_sentence, target_correction, attempt_text)
    }
}
