//! Recast engine: runs guided self-correction sessions for essays.
//!
//! The state machine lives in `recast-session` and the data model in
//! `recast-core`; this crate wires them to the analysis and verdict services
//! and keeps a registry of live sessions.

pub mod api;
mod trace_init;

pub use api::{Engine, EngineError, SessionId};
pub use trace_init::{init_tracing, DEFAULT_TRACE_FILTER, TRACE_FILE_NAME};

pub use recast_core::{
    AnalysisService, AnalysisUnavailable, ErrorRecord, ErrorSet, ErrorSetError, Verdict,
    VerdictService, VerdictUnavailable,
};
pub use recast_session::{
    CorrectionSession, DisplayKind, DisplayPayload, ErrorPosition, Phase, Recovery, Reveal,
    SessionConfig, SessionError, SessionState,
};
