//! HTTP chat client for the rule-generation endpoint.
//!
//! Two wire formats are supported: the Ollama-native chat API and
//! OpenAI-compatible chat completions. One request per generation, the
//! full reply awaited, no streaming and no retry.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::GenerationError;

/// Wire protocol spoken by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatProvider {
    Ollama,
    OpenAi,
}

impl ChatProvider {
    pub fn parse(name: &str) -> Option<ChatProvider> {
        match name.trim().to_ascii_lowercase().as_str() {
            "ollama" => Some(ChatProvider::Ollama),
            "openai" => Some(ChatProvider::OpenAi),
            _ => None,
        }
    }
}

/// Connection settings for the chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub provider: ChatProvider,
    pub base_url: String,
    pub model: String,
    /// Bearer token, required for OpenAI-compatible endpoints.
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: ChatProvider::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "phi4-mini".to_string(),
            api_key: None,
            timeout_seconds: 120,
        }
    }
}

impl ChatConfig {
    /// Read settings from `DQ_LLM_PROVIDER`, `DQ_LLM_BASE_URL`,
    /// `DQ_LLM_MODEL` and `DQ_LLM_API_KEY`, with Ollama defaults.
    pub fn from_env() -> Result<Self, GenerationError> {
        let mut config = ChatConfig::default();
        if let Ok(provider) = std::env::var("DQ_LLM_PROVIDER") {
            config.provider = ChatProvider::parse(&provider).ok_or_else(|| {
                GenerationError::Config(format!("unknown provider {provider:?}"))
            })?;
            if config.provider == ChatProvider::OpenAi {
                config.base_url = "https://api.openai.com/v1".to_string();
            }
        }
        if let Ok(base_url) = std::env::var("DQ_LLM_BASE_URL") {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var("DQ_LLM_MODEL") {
            config.model = model;
        }
        if let Ok(api_key) = std::env::var("DQ_LLM_API_KEY") {
            config.api_key = Some(api_key);
        }
        Ok(config)
    }
}

/// Blocking-from-the-caller's-view chat client; see `ChatConfig`.
pub struct ChatClient {
    http: Client,
    config: ChatConfig,
}

impl ChatClient {
    pub fn new(config: ChatConfig) -> Result<Self, GenerationError> {
        if config.provider == ChatProvider::OpenAi && config.api_key.is_none() {
            return Err(GenerationError::Config(
                "an API key is required for OpenAI-compatible endpoints".to_string(),
            ));
        }
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> Result<Self, GenerationError> {
        Self::new(ChatConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Send one system instruction + user message pair and await the full
    /// textual reply.
    pub async fn chat(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        match self.config.provider {
            ChatProvider::Ollama => self.call_ollama(system, user).await,
            ChatProvider::OpenAi => self.call_openai(system, user).await,
        }
    }

    async fn call_ollama(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            stream: bool,
        }

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            message: OllamaMessage,
        }

        #[derive(Deserialize)]
        struct OllamaMessage {
            content: String,
        }

        let request = OllamaRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
        };

        debug!(model = %self.config.model, "calling ollama chat endpoint");

        let response = self
            .http
            .post(format!("{}/api/chat", self.config.base_url.trim_end_matches('/')))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let result: OllamaResponse = response.json().await?;
        let content = result.message.content;
        if content.trim().is_empty() {
            return Err(GenerationError::EmptyReply);
        }
        Ok(content)
    }

    async fn call_openai(&self, system: &str, user: &str) -> Result<String, GenerationError> {
        #[derive(Serialize)]
        struct OpenAiRequest<'a> {
            model: &'a str,
            messages: Vec<Message<'a>>,
            temperature: f32,
        }

        #[derive(Serialize)]
        struct Message<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAiResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChoiceMessage,
        }

        #[derive(Deserialize)]
        struct ChoiceMessage {
            content: Option<String>,
        }

        let request = OpenAiRequest {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system,
                },
                Message {
                    role: "user",
                    content: user,
                },
            ],
            temperature: 0.1,
        };

        debug!(model = %self.config.model, "calling openai-compatible chat endpoint");

        let mut builder = self
            .http
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .json(&request);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Status { status, body });
        }

        let result: OpenAiResponse = response.json().await?;
        let content = result
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();
        if content.trim().is_empty() {
            return Err(GenerationError::EmptyReply);
        }
        Ok(content)
    }
}
