use std::fs;
use std::process;

use recast_core::settings::Settings;

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

/// Install a settings file before anything reads the settings.
pub fn load_settings(file: Option<&str>) {
    if let Some(file) = file {
        let content = die!(fs::read_to_string(file), "Error reading {file}: {}");
        die!(
            recast_core::settings::init_custom(content),
            "Error in {file}: {}"
        );
    }
}

pub fn settings_export() {
    print!("{}", recast_core::settings::default_toml());
}

/// Read and validate a settings file.
pub fn read_settings(file: &str) -> Result<Settings, String> {
    let content = fs::read_to_string(file).map_err(|e| format!("reading {file}: {e}"))?;
    recast_core::settings::parse_settings_toml(&content).map_err(|e| e.to_string())
}

pub fn settings_validate(file: &str) {
    let s = die!(read_settings(file), "Error: {}");
    println!(
        "OK: llm.model={}, llm.base_url={}, llm.timeout_secs={}, session.pause_between_errors={}",
        s.llm.model, s.llm.base_url, s.llm.timeout_secs, s.session.pause_between_errors
    );
}
