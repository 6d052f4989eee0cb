//! Oracle client for OpenAI-compatible chat completion endpoints.
//!
//! Sends the request as a system/user message pair and pulls the JSON
//! payload out of the reply text with [`clean_json`].

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use tracing::debug;

use crate::error::OracleError;
use crate::oracle::{OracleRequest, SemanticOracle};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str = "You map relationships in source code. \
    Reply with JSON only, no prose, following the requested shape exactly. \
    Use the file paths exactly as given.";

/// Semantic oracle backed by an OpenAI-compatible chat completions API.
///
/// Works with OpenAI, Ollama (`http://localhost:11434/v1`), vLLM,
/// OpenRouter and anything else speaking the same protocol.
pub struct ChatOracle {
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    client: Client,
}

impl ChatOracle {
    /// Creates a client.
    ///
    /// # Arguments
    /// * `base_url` - The API base URL (e.g., "https://api.openai.com/v1")
    /// * `api_key` - The API key (can be empty for local providers)
    /// * `model` - The model name
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            client: Client::new(),
        }
    }

    /// Creates a client from `FAULTLINE_LLM_BASE_URL`, `FAULTLINE_LLM_API_KEY`
    /// and `FAULTLINE_LLM_MODEL`.
    ///
    /// The hosted default endpoint needs a key; a custom base URL may not.
    pub fn from_env() -> Result<Self, OracleError> {
        let base_url = std::env::var("FAULTLINE_LLM_BASE_URL").ok();
        let api_key = std::env::var("FAULTLINE_LLM_API_KEY").unwrap_or_default();
        let model =
            std::env::var("FAULTLINE_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        if base_url.is_none() && api_key.is_empty() {
            return Err(OracleError::MissingConfig(
                "set FAULTLINE_LLM_API_KEY or FAULTLINE_LLM_BASE_URL".to_string(),
            ));
        }

        Ok(Self::new(
            base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model,
        ))
    }

    /// Sets the maximum tokens for responses.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, prompt: String) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt,
                },
            ],
            max_tokens: Some(self.max_tokens),
        };

        let url = format!("{}/chat/completions", self.base_url);
        let mut req = self
            .client
            .post(&url)
            .header("content-type", "application/json");

        if !self.api_key.is_empty() {
            req = req.header("authorization", format!("Bearer {}", self.api_key));
        }

        let response = req.json(&request).send().await?;
        let status = response.status();

        if status == 429 {
            return Err(OracleError::RateLimited);
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        Ok(chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default())
    }
}

#[async_trait]
impl SemanticOracle for ChatOracle {
    async fn complete(
        &self,
        request: &OracleRequest,
    ) -> Result<Option<serde_json::Value>, OracleError> {
        debug!(
            "Sending {} request to {} ({} bytes of context)",
            request.kind,
            self.model,
            request.context.len()
        );
        let text = self.send_request(request.prompt()).await?;

        match clean_json(&text) {
            Some(serde_json::Value::Null) => Ok(None),
            Some(value) => Ok(Some(value)),
            None => Err(OracleError::Malformed(format!(
                "no JSON in reply ({} bytes)",
                text.len()
            ))),
        }
    }
}

fn json_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)(\{.*\}|\[.*\])").expect("valid regex"))
}

/// Extracts a JSON value from a model reply.
///
/// Markdown code fences are stripped first; if the rest still does not
/// parse, the widest `{...}` or `[...]` span is tried.
pub fn clean_json(text: &str) -> Option<serde_json::Value> {
    let stripped = text.replace("```json", "").replace("```", "");
    if let Ok(value) = serde_json::from_str(stripped.trim()) {
        return Some(value);
    }

    let span = json_span().find(text)?;
    serde_json::from_str(span.as_str()).ok()
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}
