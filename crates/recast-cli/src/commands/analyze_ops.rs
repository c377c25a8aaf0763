use std::fs;
use std::process;

use serde::Serialize;

use recast_core::settings::settings;
use recast_core::{AnalysisService, ErrorSet};

use crate::llm::{ChatClient, LlmAnalyzer};

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// The `{"errors": [...]}` file written by `analyze` and read back by
/// `practice --errors-json`.
#[derive(Serialize)]
struct ErrorsFile<'a> {
    errors: &'a ErrorSet,
}

pub fn errors_file_json(set: &ErrorSet) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ErrorsFile { errors: set })
}

/// Run the analysis model on an essay and print the normalized error records.
pub fn analyze(essay_file: &str) {
    let essay = die!(fs::read_to_string(essay_file), "Error reading {essay_file}: {}");
    let llm = &settings().llm;
    let client = die!(ChatClient::from_settings(llm), "Error: {}");
    let analyzer = LlmAnalyzer::new(client, llm.clone());

    eprintln!("Analyzing {essay_file} with {}...", llm.model);
    let raw = die!(analyzer.analyze(&essay), "Error: {}");
    let set = die!(ErrorSet::build(&raw), "Error: {}");
    println!("{}", die!(errors_file_json(&set), "Error: {}"));
    eprintln!("{} errors", set.len());
}

/// Read an error-record file (one record, a list, or an `errors` envelope).
pub fn read_error_set(file: &str) -> Result<ErrorSet, String> {
    let content = fs::read_to_string(file).map_err(|e| format!("reading {file}: {e}"))?;
    ErrorSet::from_json(&content).map_err(|e| format!("{file}: {e}"))
}

/// Validate an error-record file without starting a session.
pub fn check_errors(file: &str) {
    let set = die!(read_error_set(file), "Error: {}");
    println!("OK: {} errors", set.len());
    for (i, record) in set.iter().enumerate() {
        println!(
            "{:>3}: {} → {}",
            i + 1,
            record.original_sentence,
            record.corrected_sentence
        );
    }
}
