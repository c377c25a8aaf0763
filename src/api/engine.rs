use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, debug_span, warn};

use recast_core::{AnalysisService, ErrorSet, VerdictService};
use recast_session::{CorrectionSession, DisplayPayload, SessionConfig, SessionError, SessionState};

use super::{EngineError, SessionId};

/// Session registry: turns essays into sessions and routes learner events to
/// them by id.
///
/// The registry lock only guards map access. Analysis and verdict calls run
/// on a cloned state with the lock released. The result is written back only
/// if the stored state is still the one the step started from; otherwise the
/// step fails with [`EngineError::StaleState`] and the newer state is kept.
pub struct Engine<A, V> {
    analysis: A,
    session: CorrectionSession<V>,
    sessions: Mutex<HashMap<SessionId, SessionState>>,
}

impl<A: AnalysisService, V: VerdictService> Engine<A, V> {
    pub fn new(analysis: A, verdict: V) -> Self {
        Self::with_config(analysis, verdict, SessionConfig::default())
    }

    pub fn with_config(analysis: A, verdict: V, config: SessionConfig) -> Self {
        Self {
            analysis,
            session: CorrectionSession::with_config(verdict, config),
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Analyze an essay and register a session for it.
    pub fn submit_essay(&self, text: &str) -> Result<(SessionId, DisplayPayload), EngineError> {
        let _span = debug_span!("submit_essay", chars = text.chars().count()).entered();
        if text.trim().is_empty() {
            return Err(EngineError::EmptyEssayText);
        }

        let raw = self.analysis.analyze(text).map_err(|e| {
            warn!(error = %e, "analysis failed");
            e
        })?;
        let error_set = ErrorSet::build(&raw).map_err(|e| {
            warn!(error = %e, "analysis result rejected");
            e
        })?;

        let state = self.session.start(error_set, text)?;
        let payload = self.session.current_display(&state)?;
        let id = SessionId::new_v4();
        debug!(%id, error_count = state.error_set().len(), "session registered");
        self.sessions().insert(id, state);
        Ok((id, payload))
    }

    /// Judge one attempt. With an `event_id`, a re-delivered event is
    /// rejected instead of being judged twice.
    pub fn submit_attempt(
        &self,
        id: SessionId,
        event_id: Option<&str>,
        text: &str,
    ) -> Result<DisplayPayload, EngineError> {
        self.step(id, |state| match event_id {
            Some(event_id) => self.session.submit_attempt_with_id(state, event_id, text),
            None => self.session.submit_attempt(state, text),
        })
    }

    pub fn acknowledge(&self, id: SessionId) -> Result<DisplayPayload, EngineError> {
        self.step(id, |state| self.session.acknowledge(state))
    }

    pub fn begin_rewrite(&self, id: SessionId) -> Result<DisplayPayload, EngineError> {
        self.step(id, |state| self.session.begin_rewrite(state))
    }

    pub fn submit_final_rewrite(
        &self,
        id: SessionId,
        text: &str,
    ) -> Result<DisplayPayload, EngineError> {
        self.step(id, |state| self.session.submit_final_rewrite(state, text))
    }

    /// Re-render the current state, e.g. after a lost response.
    pub fn current(&self, id: SessionId) -> Result<DisplayPayload, EngineError> {
        let state = self.state(id)?;
        Ok(self.session.current_display(&state)?)
    }

    /// A copy of the stored state.
    pub fn state(&self, id: SessionId) -> Result<SessionState, EngineError> {
        self.sessions()
            .get(&id)
            .cloned()
            .ok_or(EngineError::UnknownSession(id))
    }

    /// Discard a session.
    pub fn reset(&self, id: SessionId) -> Result<(), EngineError> {
        match self.sessions().remove(&id) {
            Some(_) => {
                debug!(%id, "session reset");
                Ok(())
            }
            None => Err(EngineError::UnknownSession(id)),
        }
    }

    pub fn snapshot(&self, id: SessionId) -> Result<String, EngineError> {
        let state = self.state(id)?;
        Ok(self.session.snapshot(&state)?)
    }

    /// Register a session from a snapshot under a fresh id.
    pub fn restore(&self, snapshot: &str) -> Result<SessionId, EngineError> {
        let state = self.session.restore(snapshot)?;
        let id = SessionId::new_v4();
        debug!(%id, phase = %state.phase(), "session restored");
        self.sessions().insert(id, state);
        Ok(id)
    }

    pub fn session_count(&self) -> usize {
        self.sessions().len()
    }

    /// Look up, run `op` without holding the lock, store the result unless
    /// another step got there first.
    fn step<F>(&self, id: SessionId, op: F) -> Result<DisplayPayload, EngineError>
    where
        F: FnOnce(&SessionState) -> Result<(SessionState, DisplayPayload), SessionError>,
    {
        let state = self.state(id)?;
        let (next, payload) = op(&state)?;
        match self.sessions().get_mut(&id) {
            Some(slot) if *slot == state => {
                *slot = next;
                Ok(payload)
            }
            Some(_) => {
                warn!(%id, "concurrent step already changed the session");
                Err(EngineError::StaleState(id))
            }
            None => Err(EngineError::UnknownSession(id)),
        }
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<SessionId, SessionState>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
