use recast_core::{AnalysisUnavailable, ErrorSetError};
use recast_session::{Recovery, SessionError};

/// Opaque handle for one registered session.
pub type SessionId = uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("essay text is empty")]
    EmptyEssayText,

    #[error(transparent)]
    AnalysisUnavailable(#[from] AnalysisUnavailable),

    #[error(transparent)]
    MalformedAnalysisResult(#[from] ErrorSetError),

    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    #[error("session {0} changed while the step was running")]
    StaleState(SessionId),

    #[error("invalid snapshot: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Session(SessionError),

    #[error("config: {msg}")]
    Config { msg: String },
}

impl From<SessionError> for EngineError {
    fn from(e: SessionError) -> Self {
        match e {
            SessionError::EmptyEssayText => Self::EmptyEssayText,
            SessionError::InvalidSnapshot(msg) => Self::Snapshot(msg),
            other => Self::Session(other),
        }
    }
}

impl EngineError {
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::EmptyEssayText | Self::Config { .. } => Recovery::Fix,
            Self::AnalysisUnavailable(_) => Recovery::Retry,
            Self::StaleState(_) => Recovery::Resync,
            Self::MalformedAnalysisResult(_) | Self::UnknownSession(_) | Self::Snapshot(_) => {
                Recovery::Restart
            }
            Self::Session(e) => e.recovery(),
        }
    }
}
