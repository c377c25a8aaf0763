//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;

use serde::Deserialize;

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub llm: LlmSettings,
    #[serde(default)]
    pub session: SessionSettings,
    pub messages: MessageSettings,
}

/// Connection and prompt parameters for the chat-completions adapters.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the bearer token.
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub analysis_max_tokens: u32,
    pub verdict_max_tokens: u32,
    pub temperature: f64,
    pub target_language: String,
    pub learner_language: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionSettings {
    /// Stop on the success message before showing the next error.
    #[serde(default)]
    pub pause_between_errors: bool,
}

/// Fixed learner-facing strings that do not come from the analysis result.
#[derive(Debug, Clone, Deserialize)]
pub struct MessageSettings {
    pub final_practice_retry: String,
    pub completion: String,
    pub no_corrections: String,
    pub rewrite_prompt: String,
    pub rewrite_received: String,
    /// Shown for a session that was reset and holds no essay.
    pub session_closed: String,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_non_blank {
        ($section:ident . $field:ident) => {
            if s.$section.$field.trim().is_empty() {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must not be blank".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field == 0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field)).to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_non_blank!(llm.base_url);
    check_non_blank!(llm.model);
    check_non_blank!(llm.api_key_env);
    check_non_blank!(llm.target_language);
    check_non_blank!(llm.learner_language);
    check_positive!(llm.timeout_secs);
    check_positive!(llm.analysis_max_tokens);
    check_positive!(llm.verdict_max_tokens);
    if !(0.0..=2.0).contains(&s.llm.temperature) {
        return Err(SettingsError::InvalidValue {
            field: "llm.temperature".to_string(),
            reason: "must be between 0.0 and 2.0".to_string(),
        });
    }

    check_non_blank!(messages.final_practice_retry);
    check_non_blank!(messages.completion);
    check_non_blank!(messages.no_corrections);
    check_non_blank!(messages.rewrite_prompt);
    check_non_blank!(messages.rewrite_received);
    check_non_blank!(messages.session_closed);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
[llm]
base_url = "http://localhost:8080/v1"
model = "local-model"
api_key_env = "LOCAL_KEY"
timeout_secs = 10
analysis_max_tokens = 2000
verdict_max_tokens = 20
temperature = 0.0
target_language = "French"
learner_language = "English"

[messages]
final_practice_retry = "again"
completion = "done"
no_corrections = "clean"
rewrite_prompt = "rewrite"
rewrite_received = "got it"
session_closed = "closed"
"#;

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert_eq!(s.llm.base_url, "https://api.openai.com/v1");
        assert_eq!(s.llm.api_key_env, "OPENAI_API_KEY");
        assert_eq!(s.llm.timeout_secs, 60);
        assert_eq!(s.llm.analysis_max_tokens, 5000);
        assert_eq!(s.llm.verdict_max_tokens, 100);
        assert!((s.llm.temperature - 0.5).abs() < f64::EPSILON);
        assert_eq!(s.llm.target_language, "Spanish");
        assert!(!s.session.pause_between_errors);
        assert!(!s.messages.final_practice_retry.is_empty());
        assert!(!s.messages.session_closed.is_empty());
    }

    #[test]
    fn parse_valid_custom_toml() {
        let s = parse_settings_toml(VALID).unwrap();
        assert_eq!(s.llm.model, "local-model");
        assert_eq!(s.llm.target_language, "French");
        assert_eq!(s.messages.completion, "done");
    }

    #[test]
    fn session_section_is_optional() {
        let s = parse_settings_toml(VALID).unwrap();
        assert!(!s.session.pause_between_errors);

        let with_pause = format!("{VALID}\n[session]\npause_between_errors = true\n");
        let s = parse_settings_toml(&with_pause).unwrap();
        assert!(s.session.pause_between_errors);
    }

    #[test]
    fn error_zero_timeout() {
        let toml = VALID.replace("timeout_secs = 10", "timeout_secs = 0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("llm.timeout_secs"));
    }

    #[test]
    fn error_temperature_out_of_range() {
        let toml = VALID.replace("temperature = 0.0", "temperature = 3.5");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("llm.temperature"));
    }

    #[test]
    fn error_blank_message() {
        let toml = VALID.replace("completion = \"done\"", "completion = \"  \"");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("messages.completion"));
    }

    #[test]
    fn error_missing_message() {
        let toml = VALID.replace("session_closed = \"closed\"\n", "");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_settings_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn error_missing_section() {
        let toml = r#"
[messages]
final_practice_retry = "again"
completion = "done"
no_corrections = "clean"
rewrite_prompt = "rewrite"
rewrite_received = "got it"
session_closed = "closed"
"#;
        let err = parse_settings_toml(toml).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
