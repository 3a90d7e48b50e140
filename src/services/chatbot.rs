//! Chatbot service
//!
//! Answers visitor questions and suggests product categories through an
//! OpenAI-compatible chat completions endpoint. Every failure degrades to a
//! canned answer so the public widget never sees an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::ChatbotConfig;

const DEFAULT_CONFIDENCE: f64 = 0.8;
const FALLBACK_CONFIDENCE: f64 = 0.5;

const REPHRASE_ANSWER: &str =
    "I'm here to help with agricultural questions. Could you please rephrase your question?";
const FALLBACK_ANSWER: &str = "I'm experiencing technical difficulties. Please contact our support team directly for immediate assistance.";

const ASSISTANT_PROMPT: &str = "You are AgriBot, an AI assistant for Sakthi Sai Biotech, a Tamil Nadu-based agricultural products manufacturer and exporter since 1999.

Company Information:
- Location: Pollachi, Tamil Nadu, India
- Founded: 1999
- Products: Micronutrients, Bactericides, Growth Promoters, Bio-Fertilizers
- Export Markets: Ethiopia, Indonesia, and 50+ other countries
- Specialties: Premium agricultural solutions for crop health and yield improvement

Guidelines:
- Be helpful and professional
- Focus on agricultural solutions and company products
- Provide accurate information about crop health, farming practices
- If asked about specific products, mention our categories: micronutrients, bactericides, growth promoters, bio-fertilizers
- For business inquiries, suggest contacting our sales team
- Keep responses concise but informative
- If you don't know specific details, be honest and suggest contacting the company directly

Respond in JSON format with \"response\" and \"confidence\" (0-1) fields.";

const SUGGESTION_PROMPT: &str = "You are an agricultural expert. Based on the crop or farming issue mentioned, suggest relevant product categories from: micronutrients, bactericides, growth-promoters, bio-fertilizers. Respond with a JSON object whose \"suggestions\" field is an array of category names.";

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    #[error("Empty completion")]
    Empty,
}

/// A chat model that answers with a JSON object
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete_json(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<serde_json::Value, ChatError>;
}

/// OpenAI chat completions with `response_format: json_object`
pub struct OpenAiChatBackend {
    base_url: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiChatBackend {
    pub fn new(config: &ChatbotConfig, api_key: impl Into<String>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
            client,
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiChatBackend {
    async fn complete_json(
        &self,
        system: &str,
        user: &str,
        max_tokens: u32,
    ) -> Result<serde_json::Value, ChatError> {
        let body = serde_json::json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
            "response_format": {"type": "json_object"},
            "max_completion_tokens": max_tokens,
        });

        let resp = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let json: serde_json::Value = resp.json().await?;
        if status >= 400 {
            let message = json["error"]["message"]
                .as_str()
                .unwrap_or("unknown API error")
                .to_string();
            return Err(ChatError::Api { status, message });
        }

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .filter(|c| !c.trim().is_empty())
            .ok_or(ChatError::Empty)?;
        Ok(serde_json::from_str(content)?)
    }
}

/// Answer returned to the chat widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatbotReply {
    pub response: String,
    /// Always within [0, 1]
    pub confidence: f64,
}

impl ChatbotReply {
    fn fallback() -> Self {
        Self {
            response: FALLBACK_ANSWER.to_string(),
            confidence: FALLBACK_CONFIDENCE,
        }
    }

    fn from_completion(value: &serde_json::Value) -> Self {
        let response = value["response"]
            .as_str()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(REPHRASE_ANSWER)
            .to_string();
        let confidence = value["confidence"]
            .as_f64()
            .filter(|c| c.is_finite())
            .unwrap_or(DEFAULT_CONFIDENCE)
            .clamp(0.0, 1.0);
        Self {
            response,
            confidence,
        }
    }
}

pub struct ChatbotService {
    backend: Option<Arc<dyn ChatBackend>>,
}

impl ChatbotService {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>) -> Self {
        Self { backend }
    }

    /// Build from configuration; no API key means canned answers only
    pub fn from_config(config: &ChatbotConfig) -> Result<Self, ChatError> {
        let backend = match config.api_key.as_deref().filter(|k| !k.is_empty()) {
            Some(key) => Some(Arc::new(OpenAiChatBackend::new(config, key)?) as Arc<dyn ChatBackend>),
            None => {
                tracing::warn!("No chatbot API key configured, chatbot will use fallback answers");
                None
            }
        };
        Ok(Self::new(backend))
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    pub async fn query(&self, query: &str, context: Option<&str>) -> ChatbotReply {
        let Some(backend) = &self.backend else {
            return ChatbotReply::fallback();
        };

        let user = match context.map(str::trim).filter(|c| !c.is_empty()) {
            Some(context) => format!("Context: {}\n\nQuestion: {}", context, query),
            None => query.to_string(),
        };

        match backend.complete_json(ASSISTANT_PROMPT, &user, 2048).await {
            Ok(value) => ChatbotReply::from_completion(&value),
            Err(e) => {
                tracing::error!("Chatbot query failed: {}", e);
                ChatbotReply::fallback()
            }
        }
    }

    /// Product categories relevant to the visitor's problem
    pub async fn suggestions(&self, query: &str) -> Vec<String> {
        let Some(backend) = &self.backend else {
            return Vec::new();
        };

        match backend.complete_json(SUGGESTION_PROMPT, query, 1024).await {
            Ok(value) => value["suggestions"]
                .as_array()
                .map(|items| {
                    items
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
            Err(e) => {
                tracing::error!("Product suggestion failed: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Replays a fixed completion and records the prompts it saw
    struct ScriptedBackend {
        reply: Result<serde_json::Value, u16>,
        seen: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        fn ok(value: serde_json::Value) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(value),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: Err(503),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        async fn complete_json(&self, _system: &str, user: &str, _max: u32) -> Result<serde_json::Value, ChatError> {
            self.seen.lock().unwrap().push(user.to_string());
            match &self.reply {
                Ok(v) => Ok(v.clone()),
                Err(status) => Err(ChatError::Api {
                    status: *status,
                    message: "unavailable".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_query_passes_answer_through() {
        let backend = ScriptedBackend::ok(serde_json::json!({
            "response": "Try Micro Mac for zinc deficiency.",
            "confidence": 0.9
        }));
        let service = ChatbotService::new(Some(backend.clone()));

        let reply = service.query("My paddy leaves are yellow", Some("product page")).await;
        assert_eq!(reply.response, "Try Micro Mac for zinc deficiency.");
        assert_eq!(reply.confidence, 0.9);
        assert!(backend.seen.lock().unwrap()[0].starts_with("Context: product page"));
    }

    #[tokio::test]
    async fn test_confidence_is_clamped() {
        let high = ChatbotService::new(Some(ScriptedBackend::ok(
            serde_json::json!({"response": "ok", "confidence": 7.5}),
        )));
        assert_eq!(high.query("q", None).await.confidence, 1.0);

        let low = ChatbotService::new(Some(ScriptedBackend::ok(
            serde_json::json!({"response": "ok", "confidence": -2}),
        )));
        assert_eq!(low.query("q", None).await.confidence, 0.0);
    }

    #[tokio::test]
    async fn test_missing_fields_use_defaults() {
        let service = ChatbotService::new(Some(ScriptedBackend::ok(serde_json::json!({}))));
        let reply = service.query("q", None).await;
        assert_eq!(reply.response, REPHRASE_ANSWER);
        assert_eq!(reply.confidence, DEFAULT_CONFIDENCE);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let service = ChatbotService::new(Some(ScriptedBackend::failing()));
        assert_eq!(service.query("q", None).await, ChatbotReply::fallback());
        assert!(service.suggestions("q").await.is_empty());
    }

    #[tokio::test]
    async fn test_disabled_without_backend() {
        let service = ChatbotService::from_config(&ChatbotConfig::default()).unwrap();
        assert!(!service.is_enabled());
        assert_eq!(service.query("hello", None).await.confidence, FALLBACK_CONFIDENCE);
        assert!(service.suggestions("coconut").await.is_empty());
    }

    #[tokio::test]
    async fn test_suggestions_keep_strings_only() {
        let service = ChatbotService::new(Some(ScriptedBackend::ok(serde_json::json!({
            "suggestions": ["micronutrients", 3, "bio-fertilizers", null]
        }))));
        assert_eq!(
            service.suggestions("coconut yield").await,
            vec!["micronutrients".to_string(), "bio-fertilizers".to_string()]
        );
    }
}
