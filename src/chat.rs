//! Client for the external text-generation service behind `/api/chat`.
//!
//! Speaks the Gemini `generateContent` REST call. One conversation is kept
//! for the whole process, so replies see the earlier turns.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::config::ChatConfig;

/// Oldest turns are dropped past this many messages
const MAX_HISTORY: usize = 40;

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service returned no text")]
    EmptyReply,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn text(role: &str, text: &str) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: &'a [Content],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GenerateResponse {
    /// Text of the first candidate, parts joined
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.is_empty()).then_some(text)
    }
}

pub struct ChatClient {
    client: Client,
    url: String,
    api_key: String,
    max_output_tokens: u32,
    history: Mutex<Vec<Content>>,
}

impl ChatClient {
    pub fn new(config: &ChatConfig, api_key: impl Into<String>) -> Result<Self, ChatError> {
        let client = Client::builder()
            .user_agent("Geocerca/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url: format!(
                "{}/models/{}:generateContent",
                config.endpoint.trim_end_matches('/'),
                config.model
            ),
            api_key: api_key.into(),
            max_output_tokens: config.max_output_tokens,
            history: Mutex::new(Vec::new()),
        })
    }

    /// Send a user message and return the model's reply.
    ///
    /// The turn is only added to the conversation when the call succeeds.
    pub async fn send(&self, message: &str) -> Result<String, ChatError> {
        let mut history = self.history.lock().await;

        let mut contents = history.clone();
        contents.push(Content::text("user", message));

        debug!("Sending chat turn with {} messages of context", contents.len());
        let response = self
            .client
            .post(&self.url)
            .header("x-goog-api-key", &self.api_key)
            .json(&GenerateRequest {
                contents: &contents,
                generation_config: GenerationConfig {
                    max_output_tokens: self.max_output_tokens,
                },
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let reply = response
            .json::<GenerateResponse>()
            .await?
            .into_text()
            .ok_or(ChatError::EmptyReply)?;

        contents.push(Content::text("model", &reply));
        if contents.len() > MAX_HISTORY {
            contents.drain(..contents.len() - MAX_HISTORY);
        }
        *history = contents;

        info!("Chat reply received ({} chars)", reply.len());
        Ok(reply)
    }

    /// Messages currently kept as context
    pub async fn history_len(&self) -> usize {
        self.history.lock().await.len()
    }
}
