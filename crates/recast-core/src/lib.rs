//! Core data for guided self-correction: error records produced by an analysis
//! collaborator, the ordered `ErrorSet` a session walks through, the collaborator
//! contracts, and the global settings.

pub mod error_set;
pub mod record;
pub mod services;
pub mod settings;
pub mod unicode;
pub mod verdict;

pub use error_set::{ErrorSet, ErrorSetError};
pub use record::ErrorRecord;
pub use services::{AnalysisService, AnalysisUnavailable, Verdict, VerdictService, VerdictUnavailable};
