use std::fs;
use std::io::{self, BufRead, Write};
use std::process;

use serde_json::Value;
use tracing::debug;

use recast_core::settings::settings;
use recast_core::verdict::ExactMatchJudge;
use recast_core::{AnalysisService, AnalysisUnavailable, VerdictService};
use recast_engine::{DisplayPayload, Engine, EngineError, Phase, Recovery};

use crate::display::{render, DEFAULT_WIDTH};
use crate::llm::{ChatClient, LlmAnalyzer, LlmJudge};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

#[derive(Debug, thiserror::Error)]
pub enum PracticeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Analysis service that replays a previously saved result.
pub struct RecordedAnalysis(pub Value);

impl AnalysisService for RecordedAnalysis {
    fn analyze(&self, _essay_text: &str) -> Result<Value, AnalysisUnavailable> {
        Ok(self.0.clone())
    }
}

pub struct PracticeOptions<'a> {
    pub essay_file: &'a str,
    /// Saved `analyze` output to use instead of calling the analysis model.
    pub errors_json: Option<&'a str>,
    /// Judge attempts by exact match instead of calling the verdict model.
    pub offline: bool,
}

pub fn practice(opts: &PracticeOptions) {
    let essay_file = opts.essay_file;
    let essay = die!(fs::read_to_string(essay_file), "Error reading {essay_file}: {}");
    let llm = &settings().llm;

    let analysis: Box<dyn AnalysisService> = match opts.errors_json {
        Some(path) => {
            let content = die!(fs::read_to_string(path), "Error reading {path}: {}");
            let raw: Value = die!(serde_json::from_str(&content), "Error parsing {path}: {}");
            Box::new(RecordedAnalysis(raw))
        }
        None => {
            let client = die!(ChatClient::from_settings(llm), "Error: {}");
            Box::new(LlmAnalyzer::new(client, llm.clone()))
        }
    };
    let verdict: Box<dyn VerdictService> = if opts.offline {
        Box::new(ExactMatchJudge)
    } else {
        let client = die!(ChatClient::from_settings(llm), "Error: {}");
        Box::new(LlmJudge::new(client, llm.verdict_max_tokens))
    };

    let engine = Engine::new(analysis, verdict);
    let stdin = io::stdin();
    let stdout = io::stdout();
    die!(
        run_session(&engine, &essay, &mut stdin.lock(), &mut stdout.lock()),
        "Error: {}"
    );
}

/// Drive sessions from `input` until one finishes without a resubmission or
/// input runs out. After a final rewrite the learner may send the rewritten
/// text through analysis again. Returns the phase the last session ended in.
pub fn run_session<A, V>(
    engine: &Engine<A, V>,
    essay: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<Phase, PracticeError>
where
    A: AnalysisService,
    V: VerdictService,
{
    let mut essay = essay.to_string();
    let mut rounds = 1u32;
    loop {
        let (phase, rewrite) = practise_once(engine, &essay, input, out)?;
        let Some(rewrite) = rewrite else {
            return Ok(phase);
        };
        match prompt(input, out, "Practise your rewritten text? [y/N] ")? {
            Some(answer) if is_yes(&answer) => {
                rounds += 1;
                debug!(rounds, "resubmitting rewritten text");
                essay = rewrite;
            }
            _ => return Ok(phase),
        }
    }
}

/// One session over `essay`. Returns the phase it ended in and the accepted
/// final rewrite, if any.
fn practise_once<A, V>(
    engine: &Engine<A, V>,
    essay: &str,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> Result<(Phase, Option<String>), PracticeError>
where
    A: AnalysisService,
    V: VerdictService,
{
    let (id, payload) = engine.submit_essay(essay)?;
    show(out, &payload)?;
    let mut events = 0u32;
    let mut rewrite = None;

    loop {
        let result = match engine.state(id)?.phase() {
            Phase::AwaitingAttempt | Phase::AwaitingFinalPractice => {
                let Some(line) = prompt(input, out, "> ")? else {
                    break;
                };
                events += 1;
                let event_id = format!("attempt-{events}");
                engine.submit_attempt(id, Some(&event_id), &line)
            }
            Phase::ShowingIntermediateFeedback => {
                if prompt(input, out, "(press Enter to continue) ")?.is_none() {
                    break;
                }
                engine.acknowledge(id)
            }
            Phase::Completed => match prompt(input, out, "Rewrite your essay now? [y/N] ")? {
                Some(answer) if is_yes(&answer) => engine.begin_rewrite(id),
                _ => break,
            },
            Phase::AwaitingFinalRewrite => {
                let Some(text) = read_paragraph(input, out)? else {
                    break;
                };
                let result = engine.submit_final_rewrite(id, &text);
                if result.is_ok() {
                    rewrite = Some(text);
                }
                result
            }
            Phase::Finished => break,
        };

        match result {
            Ok(payload) => show(out, &payload)?,
            Err(e) => match e.recovery() {
                Recovery::Fix => writeln!(out, "! {e}")?,
                Recovery::Retry => writeln!(out, "! {e}\n  Please try again.")?,
                Recovery::Resync => show(out, &engine.current(id)?)?,
                Recovery::Restart => return Err(e.into()),
            },
        }
    }

    let phase = engine.state(id)?.phase();
    debug!(%id, %phase, events, "practice session ended");
    engine.reset(id)?;
    Ok((phase, rewrite))
}

fn show(out: &mut impl Write, payload: &DisplayPayload) -> io::Result<()> {
    writeln!(out, "{}", render(payload, DEFAULT_WIDTH))
}

/// One line of input without its line ending, or `None` at end of input.
fn prompt(input: &mut impl BufRead, out: &mut impl Write, label: &str) -> io::Result<Option<String>> {
    write!(out, "{label}")?;
    out.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
}

/// Lines up to the first empty one, joined with newlines.
fn read_paragraph(input: &mut impl BufRead, out: &mut impl Write) -> io::Result<Option<String>> {
    writeln!(out, "(finish with an empty line)")?;
    let mut lines = Vec::new();
    loop {
        match prompt(input, out, "| ")? {
            Some(line) if line.trim().is_empty() => break,
            Some(line) => lines.push(line),
            None if lines.is_empty() => return Ok(None),
            None => break,
        }
    }
    Ok(Some(lines.join("\n")))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
