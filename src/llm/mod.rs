//! Answer-engine clients for the optional AI-citation category.
//!
//! Engines are configured by name; an empty configuration disables the
//! category rather than failing the audit. The HTTP implementation talks
//! to OpenAI-compatible chat-completions endpoints.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{EngineConfig, Settings};

/// Response from one answer-engine query.
#[derive(Debug, Clone, Default)]
pub struct EngineResponse {
    pub text: String,
    pub citations: Vec<String>,
}

/// Errors from engine queries.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("connection error: {0}")]
    Connection(String),
    #[error("API error: {0}")]
    Api(String),
    #[error("parse error: {0}")]
    Parse(String),
}

/// An answer engine that can be asked a prompt. Implementations wrap
/// arbitrary providers.
#[async_trait]
pub trait AnswerEngine: Send + Sync {
    fn name(&self) -> &str;
    async fn query(&self, prompt: &str) -> Result<EngineResponse, EngineError>;
}

/// OpenAI-compatible chat-completions client.
pub struct HttpAnswerEngine {
    name: String,
    config: EngineConfig,
    client: Client,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    citations: Vec<String>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

impl HttpAnswerEngine {
    pub fn new(name: String, config: EngineConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            name,
            config,
            client,
        }
    }
}

#[async_trait]
impl AnswerEngine for HttpAnswerEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(&self, prompt: &str) -> Result<EngineResponse, EngineError> {
        debug!("Querying engine {} with prompt", self.name);

        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.0,
            max_tokens: 512,
        };

        let mut builder = self.client.post(&self.config.endpoint).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| EngineError::Connection(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Api(format!("HTTP {}: {}", status, body)));
        }

        let parsed: ChatResponse = resp
            .json()
            .await
            .map_err(|e| EngineError::Parse(e.to_string()))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| EngineError::Parse("empty choices".to_string()))?;

        Ok(EngineResponse {
            text,
            citations: parsed.citations,
        })
    }
}

/// Build engines from settings. Empty config yields an empty list, which
/// disables the AI-citation category downstream.
pub fn build_engines(settings: &Settings) -> Vec<Arc<dyn AnswerEngine>> {
    settings
        .llm_engines
        .iter()
        .map(|(name, config)| {
            Arc::new(HttpAnswerEngine::new(name.clone(), config.clone())) as Arc<dyn AnswerEngine>
        })
        .collect()
}

#[cfg(test)]
pub mod testing {
    //! Scripted engine for tests.

    use super::*;

    pub struct StaticEngine {
        pub name: String,
        pub response: String,
    }

    #[async_trait]
    impl AnswerEngine for StaticEngine {
        fn name(&self) -> &str {
            &self.name
        }

        async fn query(&self, _prompt: &str) -> Result<EngineResponse, EngineError> {
            Ok(EngineResponse {
                text: self.response.clone(),
                citations: Vec::new(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_engines_without_config() {
        let settings = Settings::default();
        assert!(build_engines(&settings).is_empty());
    }

    #[test]
    fn test_engines_built_from_config() {
        let mut settings = Settings::default();
        settings.llm_engines.insert(
            "local".into(),
            EngineConfig {
                endpoint: "http://localhost:11434/v1/chat/completions".into(),
                model: "llama3.2".into(),
                api_key: None,
            },
        );
        let engines = build_engines(&settings);
        assert_eq!(engines.len(), 1);
        assert_eq!(engines[0].name(), "local");
    }
}
