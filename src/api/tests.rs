use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Barrier;
use std::thread;

use serde_json::{json, Value};

use recast_core::settings::MessageSettings;
use recast_core::verdict::ExactMatchJudge;
use recast_core::{
    AnalysisService, AnalysisUnavailable, ErrorSetError, Verdict, VerdictService,
    VerdictUnavailable,
};
use recast_session::{DisplayKind, DisplayPayload, Phase, Recovery, SessionConfig, SessionError};

use super::*;

/// Returns a fixed analysis result, or fails when `result` is `None`.
struct FakeAnalyzer {
    result: Option<Value>,
    calls: AtomicUsize,
}

impl FakeAnalyzer {
    fn returning(result: Value) -> Self {
        Self {
            result: Some(result),
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
        }
    }
}

impl AnalysisService for FakeAnalyzer {
    fn analyze(&self, _essay_text: &str) -> Result<Value, AnalysisUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .ok_or_else(|| AnalysisUnavailable("HTTP 503".to_string()))
    }
}

fn wire_record(n: usize) -> Value {
    json!({
        "error_orig": format!("Yo soy {n} años."),
        "error_corrected": format!("Yo tengo {n} años."),
        "line_1": "Revisa el verbo.",
        "response_1_correct": "¡Muy bien!",
        "response_1_incorrect": "Pista: la edad se «tiene».",
        "response_2_correct": "¡Correcto!",
        "response_2_incorrect": "Se usa «tener».",
        "explanation": "«Ser» no expresa la edad."
    })
}

fn config() -> SessionConfig {
    SessionConfig {
        pause_between_errors: false,
        messages: MessageSettings {
            final_practice_retry: "again".to_string(),
            completion: "done".to_string(),
            no_corrections: "clean".to_string(),
            rewrite_prompt: "rewrite".to_string(),
            rewrite_received: "received".to_string(),
            session_closed: "closed".to_string(),
        },
    }
}

fn engine(result: Value) -> Engine<FakeAnalyzer, ExactMatchJudge> {
    Engine::with_config(FakeAnalyzer::returning(result), ExactMatchJudge, config())
}

#[test]
fn test_submit_essay_registers_session() {
    let engine = engine(json!([wire_record(10), wire_record(11)]));
    let (id, payload) = engine.submit_essay("Yo soy 10 años. Yo soy 11 años.").unwrap();

    assert_eq!(engine.session_count(), 1);
    assert_eq!(payload.kind(), DisplayKind::ShowError);
    assert_eq!(payload.text(), "Revisa el verbo.");
    assert_eq!(engine.current(id).unwrap(), payload);
    assert_eq!(engine.state(id).unwrap().error_set().len(), 2);
}

#[test]
fn test_single_record_result_accepted() {
    let engine = engine(wire_record(10));
    let (id, _) = engine.submit_essay("Yo soy 10 años.").unwrap();
    assert_eq!(engine.state(id).unwrap().error_set().len(), 1);
}

#[test]
fn test_blank_essay_skips_analysis() {
    let analyzer = FakeAnalyzer::returning(json!([]));
    let engine = Engine::with_config(&analyzer, ExactMatchJudge, config());
    let err = engine.submit_essay("   ").unwrap_err();
    assert_eq!(err, EngineError::EmptyEssayText);
    assert_eq!(err.recovery(), Recovery::Fix);
    assert_eq!(analyzer.calls.load(Ordering::SeqCst), 0);
    assert_eq!(engine.session_count(), 0);
}

#[test]
fn test_no_errors_found() {
    let engine = engine(json!([]));
    let (id, payload) = engine.submit_essay("Tengo 10 años.").unwrap();
    assert_eq!(
        payload,
        DisplayPayload::ShowCompletion {
            message: "clean".to_string(),
            feedback: None,
            corrections_needed: false,
        }
    );
    assert_eq!(engine.state(id).unwrap().phase(), Phase::Completed);
}

#[test]
fn test_analysis_unavailable() {
    let engine = Engine::with_config(FakeAnalyzer::failing(), ExactMatchJudge, config());
    let err = engine.submit_essay("Yo soy 10 años.").unwrap_err();
    assert!(matches!(err, EngineError::AnalysisUnavailable(_)));
    assert_eq!(err.recovery(), Recovery::Retry);
    assert_eq!(engine.session_count(), 0);
}

#[test]
fn test_malformed_analysis_result() {
    let mut bad = wire_record(10);
    bad.as_object_mut().unwrap().remove("line_1");
    let engine = engine(json!([wire_record(9), bad]));

    let err = engine.submit_essay("Yo soy 10 años.").unwrap_err();
    match &err {
        EngineError::MalformedAnalysisResult(ErrorSetError::MalformedAnalysisResult {
            position,
            ..
        }) => assert_eq!(*position, Some(1)),
        other => panic!("expected malformed result, got {other:?}"),
    }
    assert_eq!(err.recovery(), Recovery::Restart);
    assert_eq!(engine.session_count(), 0);
}

#[test]
fn test_full_flow_through_engine() {
    let engine = engine(json!([wire_record(10)]));
    let (id, _) = engine.submit_essay("Yo soy 10 años.").unwrap();

    let payload = engine.submit_attempt(id, Some("e1"), "Yo soy 10 años.").unwrap();
    assert_eq!(payload.text(), "Pista: la edad se «tiene».");

    let err = engine
        .submit_attempt(id, Some("e1"), "Yo soy 10 años.")
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::Session(SessionError::DuplicateEvent {
            event_id: "e1".to_string()
        })
    );
    assert_eq!(err.recovery(), Recovery::Resync);
    assert_eq!(engine.state(id).unwrap().current_attempt_number(), 2);

    let payload = engine.submit_attempt(id, Some("e2"), "yo tengo 10 años").unwrap();
    assert_eq!(payload.text(), "done");
    assert_eq!(payload.feedback(), Some("¡Correcto!"));

    let payload = engine.begin_rewrite(id).unwrap();
    assert_eq!(payload.kind(), DisplayKind::ShowRewritePrompt);
    let payload = engine.submit_final_rewrite(id, "Tengo 10 años.").unwrap();
    assert_eq!(payload.text(), "received");
    assert_eq!(engine.state(id).unwrap().phase(), Phase::Finished);
}

#[test]
fn test_failed_step_keeps_stored_state() {
    let engine = engine(json!([wire_record(10)]));
    let (id, _) = engine.submit_essay("Yo soy 10 años.").unwrap();
    let before = engine.state(id).unwrap();

    let err = engine.acknowledge(id).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Session(SessionError::InvalidPhaseForAcknowledge { .. })
    ));
    let err = engine.begin_rewrite(id).unwrap_err();
    assert!(matches!(
        err,
        EngineError::Session(SessionError::InvalidPhaseForRewrite { .. })
    ));
    assert_eq!(engine.state(id).unwrap(), before);
}

#[test]
fn test_blank_attempt_counts_as_miss() {
    let engine = engine(json!([wire_record(10)]));
    let (id, _) = engine.submit_essay("Yo soy 10 años.").unwrap();

    let payload = engine.submit_attempt(id, None, "").unwrap();
    assert_eq!(payload.text(), "Pista: la edad se «tiene».");
    let payload = engine.submit_attempt(id, None, "  ").unwrap();
    assert_eq!(payload.kind(), DisplayKind::ShowFinalPracticePrompt);
    assert_eq!(engine.state(id).unwrap().phase(), Phase::AwaitingFinalPractice);
}

/// Holds each judge call at the barrier until both callers arrive, then says no.
struct GatedJudge {
    gate: Barrier,
    calls: AtomicUsize,
}

impl VerdictService for GatedJudge {
    fn judge(&self, _: &str, _: &str, _: &str) -> Result<Verdict, VerdictUnavailable> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.wait();
        Ok(Verdict::Incorrect)
    }
}

#[test]
fn test_concurrent_attempts_apply_once() {
    let judge = GatedJudge {
        gate: Barrier::new(2),
        calls: AtomicUsize::new(0),
    };
    let engine = Engine::with_config(
        FakeAnalyzer::returning(json!([wire_record(10)])),
        &judge,
        config(),
    );
    let (id, _) = engine.submit_essay("Yo soy 10 años.").unwrap();

    let engine = &engine;
    let results: Vec<_> = thread::scope(|s| {
        let handles: Vec<_> = (0..2)
            .map(move |_| s.spawn(move || engine.submit_attempt(id, Some("e1"), "wrong")))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(judge.calls.load(Ordering::SeqCst), 2);
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    let err = results.into_iter().find_map(Result::err).unwrap();
    assert_eq!(err, EngineError::StaleState(id));
    assert_eq!(err.recovery(), Recovery::Resync);

    let state = engine.state(id).unwrap();
    assert_eq!(state.current_attempt_number(), 2);
    assert_eq!(state.last_event_id(), Some("e1"));
}

#[test]
fn test_unknown_session() {
    let engine = engine(json!([]));
    let id = SessionId::new_v4();
    assert_eq!(engine.current(id).unwrap_err(), EngineError::UnknownSession(id));
    assert_eq!(
        engine.submit_attempt(id, None, "x").unwrap_err(),
        EngineError::UnknownSession(id)
    );
    assert_eq!(engine.reset(id).unwrap_err(), EngineError::UnknownSession(id));
}

#[test]
fn test_reset_drops_session() {
    let engine = engine(json!([wire_record(10)]));
    let (id, _) = engine.submit_essay("Yo soy 10 años.").unwrap();
    engine.reset(id).unwrap();
    assert_eq!(engine.session_count(), 0);
    assert_eq!(engine.current(id).unwrap_err(), EngineError::UnknownSession(id));
}

#[test]
fn test_snapshot_restore() {
    let engine = engine(json!([wire_record(10), wire_record(11)]));
    let (id, _) = engine.submit_essay("Yo soy 10 años.").unwrap();
    engine.submit_attempt(id, Some("e1"), "Yo tengo 10 años").unwrap();

    let json = engine.snapshot(id).unwrap();
    let restored = engine.restore(&json).unwrap();
    assert_ne!(restored, id);
    assert_eq!(engine.state(restored).unwrap(), engine.state(id).unwrap());
    assert_eq!(engine.current(restored).unwrap(), engine.current(id).unwrap());

    let err = engine.restore("{}").unwrap_err();
    assert!(matches!(err, EngineError::Snapshot(_)));
}

#[test]
fn test_default_config_text() {
    let toml = settings_default_config();
    assert!(toml.contains("[llm]"));
    assert!(toml.contains("[messages]"));
    assert!(!engine_version().is_empty());
}

#[test]
fn test_settings_load_missing_file() {
    let err = settings_load_config(Path::new("/nonexistent/recast.toml")).unwrap_err();
    assert!(matches!(err, EngineError::Config { .. }));
}
