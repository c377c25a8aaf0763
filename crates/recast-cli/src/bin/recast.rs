use std::path::Path;

use clap::{Parser, Subcommand};

use recast_cli::commands::{analyze_ops, config_ops, practice_ops};

#[derive(Parser)]
#[command(name = "recast", about = "Guided self-correction for language learners")]
struct Cli {
    /// Settings TOML to use instead of the built-in defaults
    #[arg(long, global = true)]
    settings: Option<String>,
    /// Write JSON trace logs to this directory (needs the `trace` feature)
    #[arg(long, global = true)]
    trace_dir: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Work through the errors in an essay interactively
    Practice {
        /// Essay text file
        essay_file: String,
        /// Use saved `analyze` output instead of calling the analysis model
        #[arg(long)]
        errors_json: Option<String>,
        /// Judge attempts by exact match instead of calling the verdict model
        #[arg(long)]
        offline: bool,
    },
    /// Analyze an essay and print its error records as JSON
    Analyze {
        /// Essay text file
        essay_file: String,
    },
    /// Validate an error-record JSON file
    CheckErrors {
        /// JSON file (one record, a list, or {"errors": [...]})
        file: String,
    },
    /// Print the default settings TOML
    SettingsExport,
    /// Validate a settings TOML file
    SettingsValidate {
        /// TOML file to validate
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Some(dir) = &cli.trace_dir {
        recast_engine::init_tracing(Path::new(dir));
    }
    config_ops::load_settings(cli.settings.as_deref());

    match cli.command {
        Command::Practice {
            essay_file,
            errors_json,
            offline,
        } => practice_ops::practice(&practice_ops::PracticeOptions {
            essay_file: &essay_file,
            errors_json: errors_json.as_deref(),
            offline,
        }),
        Command::Analyze { essay_file } => analyze_ops::analyze(&essay_file),
        Command::CheckErrors { file } => analyze_ops::check_errors(&file),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
