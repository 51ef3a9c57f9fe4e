//! Telegram Bot API relay.
//!
//! Posts poll results to a group or channel with `sendMessage`.
//! Docs: <https://core.telegram.org/bots/api#sendmessage>

use async_trait::async_trait;
use pollcast_core::{config::TelegramConfig, error::PollcastError, traits::Broadcaster};
use serde::Deserialize;
use tracing::debug;

use crate::split::split_message;

/// Telegram's per-message character cap.
const MAX_MESSAGE_LEN: usize = 4096;

#[derive(Debug, Deserialize)]
struct TgResponse {
    ok: bool,
    description: Option<String>,
}

/// Sends results to one Telegram chat.
pub struct TelegramRelay {
    config: TelegramConfig,
    client: reqwest::Client,
    base_url: String,
}

impl TelegramRelay {
    /// Create a new Telegram relay from config.
    pub fn new(config: TelegramConfig) -> Self {
        let base_url = format!("https://api.telegram.org/bot{}", config.bot_token);
        Self {
            config,
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// Send a text message to the configured chat, as plain text.
    async fn send_message(&self, text: &str) -> Result<(), PollcastError> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            let url = format!("{}/sendMessage", self.base_url);
            let body = serde_json::json!({
                "chat_id": self.config.chat_id,
                "text": chunk,
            });

            let resp = self
                .client
                .post(&url)
                .json(&body)
                .send()
                .await
                .map_err(|e| PollcastError::Channel(format!("telegram send failed: {e}")))?;

            let status = resp.status();
            let body: TgResponse = resp.json().await.map_err(|e| {
                PollcastError::Channel(format!("telegram response parse failed ({status}): {e}"))
            })?;

            if !body.ok {
                return Err(PollcastError::Channel(format!(
                    "telegram sendMessage rejected ({status}): {}",
                    body.description.unwrap_or_default()
                )));
            }
            debug!("telegram: sent {} bytes to {}", chunk.len(), self.config.chat_id);
        }

        Ok(())
    }
}

#[async_trait]
impl Broadcaster for TelegramRelay {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn broadcast(&self, text: &str) -> Result<(), PollcastError> {
        if self.config.chat_id.is_empty() {
            return Err(PollcastError::Config("telegram chat_id is empty".into()));
        }
        self.send_message(text).await
    }
}
