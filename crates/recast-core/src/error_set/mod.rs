//! Ordered, immutable collection of error records for one submitted text.
//!
//! `ErrorSet::build` accepts whatever shape the analysis collaborator returned
//! (one record object, an array of records, or an `{"errors": [...]}` envelope)
//! and normalizes it into a fixed sequence. An empty sequence is a valid result:
//! it means no errors were detected.


use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::record::ErrorRecord;

const ENVELOPE_KEY: &str = "errors";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorSetError {
    #[error("malformed analysis result{}: {reason}", at_position(.position))]
    MalformedAnalysisResult {
        /// 0-based record position, when the failure is tied to one record.
        position: Option<usize>,
        reason: String,
    },

    #[error("error index {index} out of range (set has {len} errors)")]
    IndexOutOfRange { index: usize, len: usize },
}

fn at_position(position: &Option<usize>) -> String {
    match position {
        Some(p) => format!(" (record {p})"),
        None => String::new(),
    }
}

impl ErrorSetError {
    fn malformed(position: Option<usize>, reason: impl Into<String>) -> Self {
        Self::MalformedAnalysisResult {
            position,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<ErrorRecord>", into = "Vec<ErrorRecord>")]
pub struct ErrorSet {
    records: Vec<ErrorRecord>,
}

impl ErrorSet {
    /// An empty set ("no errors detected").
    pub fn empty() -> Self {
        Self::default()
    }

    /// Normalize the analysis collaborator's parsed output into an `ErrorSet`.
    ///
    /// A lone record becomes a one-element set. Every record must carry all
    /// eight fields as non-blank strings.
    pub fn build(raw: &Value) -> Result<Self, ErrorSetError> {
        let items: Vec<&Value> = match raw {
            Value::Array(items) => items.iter().collect(),
            Value::Object(map) => match map.get(ENVELOPE_KEY) {
                Some(Value::Array(items)) if map.len() == 1 => items.iter().collect(),
                _ => vec![raw],
            },
            other => {
                return Err(ErrorSetError::malformed(
                    None,
                    format!(
                        "expected a record or a list of records, got {}",
                        json_kind(other)
                    ),
                ))
            }
        };

        let records = items
            .into_iter()
            .enumerate()
            .map(|(position, item)| parse_record(position, item))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(record_count = records.len(), "error set built");
        Ok(Self { records })
    }

    /// Parse JSON text, then [`ErrorSet::build`] it.
    pub fn from_json(text: &str) -> Result<Self, ErrorSetError> {
        let raw: Value = serde_json::from_str(text)
            .map_err(|e| ErrorSetError::malformed(None, format!("invalid JSON: {e}")))?;
        Self::build(&raw)
    }

    /// Build directly from already-typed records, validating them the same way.
    pub fn from_records(records: Vec<ErrorRecord>) -> Result<Self, ErrorSetError> {
        for (position, record) in records.iter().enumerate() {
            if let Some(field) = record.blank_field() {
                return Err(ErrorSetError::malformed(
                    Some(position),
                    format!("field `{field}` is blank"),
                ));
            }
        }
        Ok(Self { records })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn at(&self, index: usize) -> Result<&ErrorRecord, ErrorSetError> {
        self.records
            .get(index)
            .ok_or(ErrorSetError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ErrorRecord> {
        self.records.iter()
    }
}

impl TryFrom<Vec<ErrorRecord>> for ErrorSet {
    type Error = ErrorSetError;

    fn try_from(records: Vec<ErrorRecord>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl From<ErrorSet> for Vec<ErrorRecord> {
    fn from(set: ErrorSet) -> Self {
        set.records
    }
}

impl<'a> IntoIterator for &'a ErrorSet {
    type Item = &'a ErrorRecord;
    type IntoIter = std::slice::Iter<'a, ErrorRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

fn parse_record(position: usize, item: &Value) -> Result<ErrorRecord, ErrorSetError> {
    if !item.is_object() {
        return Err(ErrorSetError::malformed(
            Some(position),
            format!("expected an object, got {}", json_kind(item)),
        ));
    }
    let record = ErrorRecord::deserialize(item)
        .map_err(|e| ErrorSetError::malformed(Some(position), e.to_string()))?;
    if let Some(field) = record.blank_field() {
        return Err(ErrorSetError::malformed(
            Some(position),
            format!("field `{field}` is blank"),
        ));
    }
    Ok(record)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
