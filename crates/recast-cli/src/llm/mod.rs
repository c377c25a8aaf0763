//! Chat-completions adapters for the analysis and verdict services.
//!
//! Both talk to an OpenAI-compatible `POST {base_url}/chat/completions`
//! endpoint. Everything model-specific (prompts, tag extraction, yes/no
//! parsing) stays here; the session only ever sees `Value`s and `Verdict`s.

pub mod prompts;
pub mod tags;

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, debug_span};

use recast_core::settings::LlmSettings;
use recast_core::{
    AnalysisService, AnalysisUnavailable, Verdict, VerdictService, VerdictUnavailable,
};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("environment variable {0} is not set")]
    MissingApiKey(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("unexpected response: {0}")]
    Response(String),
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Blocking chat-completions client.
pub struct ChatClient {
    agent: ureq::Agent,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f64,
}

impl ChatClient {
    /// Build a client, reading the bearer token from the environment variable
    /// named by `llm.api_key_env`.
    pub fn from_settings(llm: &LlmSettings) -> Result<Self, ChatError> {
        let api_key = std::env::var(&llm.api_key_env)
            .map_err(|_| ChatError::MissingApiKey(llm.api_key_env.clone()))?;
        Ok(Self::new(llm, api_key))
    }

    pub fn new(llm: &LlmSettings, api_key: String) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(llm.timeout_secs)))
            .build()
            .into();
        Self {
            agent,
            endpoint: chat_endpoint(&llm.base_url),
            model: llm.model.clone(),
            api_key,
            temperature: llm.temperature,
        }
    }

    /// Send one user message and return the reply text.
    pub fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, ChatError> {
        let _span = debug_span!("chat", model = %self.model, max_tokens).entered();
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: self.temperature,
        };
        let body =
            serde_json::to_string(&request).map_err(|e| ChatError::Response(e.to_string()))?;
        let auth = format!("Bearer {}", self.api_key);

        let text = self
            .agent
            .post(self.endpoint.as_str())
            .header("Authorization", auth.as_str())
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(|e| ChatError::Http(format!("{}: {e}", self.endpoint)))?
            .into_body()
            .read_to_string()
            .map_err(|e| ChatError::Http(format!("{}: {e}", self.endpoint)))?;

        let reply = parse_chat_response(&text)?;
        debug!(reply_chars = reply.chars().count(), "chat reply");
        Ok(reply)
    }
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}/chat/completions", base_url.trim_end_matches('/'))
}

fn parse_chat_response(text: &str) -> Result<String, ChatError> {
    let response: ChatResponse =
        serde_json::from_str(text).map_err(|e| ChatError::Response(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| ChatError::Response("no message content in reply".to_string()))
}

/// Analysis service backed by a chat model.
pub struct LlmAnalyzer {
    client: ChatClient,
    llm: LlmSettings,
}

impl LlmAnalyzer {
    pub fn new(client: ChatClient, llm: LlmSettings) -> Self {
        Self { client, llm }
    }
}

impl AnalysisService for LlmAnalyzer {
    fn analyze(&self, essay_text: &str) -> Result<Value, AnalysisUnavailable> {
        let prompt = prompts::analysis_prompt(&self.llm, essay_text);
        let reply = self
            .client
            .complete(&prompt, self.llm.analysis_max_tokens)
            .map_err(|e| AnalysisUnavailable(e.to_string()))?;
        analysis_from_reply(&reply)
    }
}

pub(crate) fn analysis_from_reply(reply: &str) -> Result<Value, AnalysisUnavailable> {
    let block = tags::extract_tagged(reply, prompts::ANALYSIS_TAG).ok_or_else(|| {
        AnalysisUnavailable(format!("reply has no <{}> block", prompts::ANALYSIS_TAG))
    })?;
    tags::parse_json_block(block)
        .map_err(|e| AnalysisUnavailable(format!("analysis block is not JSON: {e}")))
}

/// Verdict service backed by a chat model.
pub struct LlmJudge {
    client: ChatClient,
    max_tokens: u32,
}

impl LlmJudge {
    pub fn new(client: ChatClient, max_tokens: u32) -> Self {
        Self { client, max_tokens }
    }
}

impl VerdictService for LlmJudge {
    fn judge(
        &self,
        original_sentence: &str,
        target_correction: &str,
        attempt_text: &str,
    ) -> Result<Verdict, VerdictUnavailable> {
        let prompt = prompts::verdict_prompt(original_sentence, target_correction, attempt_text);
        let reply = self
            .client
            .complete(&prompt, self.max_tokens)
            .map_err(|e| VerdictUnavailable(e.to_string()))?;
        verdict_from_reply(&reply)
    }
}

pub(crate) fn verdict_from_reply(reply: &str) -> Result<Verdict, VerdictUnavailable> {
    let answer = tags::extract_tagged(reply, prompts::VERDICT_TAG).ok_or_else(|| {
        VerdictUnavailable(format!("reply has no <{}> block", prompts::VERDICT_TAG))
    })?;
    tags::parse_yes_no(answer)
        .ok_or_else(|| VerdictUnavailable(format!("unexpected answer {:?}", answer.trim())))
}
