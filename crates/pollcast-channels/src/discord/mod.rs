//! Discord channel that hosts the poll.
//!
//! Events arrive over the gateway websocket (v10, JSON encoding); replies,
//! the poll embed, and its reactions go through the REST API.
//! Docs: <https://discord.com/developers/docs/events/gateway>

mod gateway;
mod rest;
pub(crate) mod types;

#[cfg(test)]
mod tests;

use async_trait::async_trait;
use pollcast_core::{
    config::DiscordConfig,
    error::PollcastError,
    event::{MessageRef, PollEvent},
    marker,
    traits::PollHost,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::info;

use crate::split::split_message;
use types::{DcEmbed, DcEmbedField};

const API_BASE: &str = "https://discord.com/api/v10";
const GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

/// Upper bound on a single REST call; handlers await these inline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Discord's per-message character cap.
const MAX_MESSAGE_LEN: usize = 2000;
const MAX_EMBED_TITLE: usize = 256;
const MAX_FIELD_VALUE: usize = 1024;

/// Discord bot connected through the gateway.
pub struct DiscordChannel {
    config: DiscordConfig,
    client: reqwest::Client,
    api_base: String,
    request_timeout: Duration,
    /// The bot's own user id, learned from READY.
    self_id: Arc<Mutex<Option<String>>>,
}

impl DiscordChannel {
    /// Create a new Discord channel from config.
    pub fn new(config: DiscordConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            api_base: API_BASE.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            self_id: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl PollHost for DiscordChannel {
    fn name(&self) -> &str {
        "discord"
    }

    async fn start(&self) -> Result<mpsc::Receiver<PollEvent>, PollcastError> {
        if self.config.bot_token.is_empty() {
            return Err(PollcastError::Config("discord bot_token is empty".into()));
        }

        let (tx, rx) = mpsc::channel(64);
        let session = gateway::Session {
            url: GATEWAY_URL.to_string(),
            token: self.config.bot_token.clone(),
            self_id: self.self_id.clone(),
        };

        info!("Discord channel connecting to gateway...");
        tokio::spawn(gateway::run(session, tx));

        Ok(rx)
    }

    async fn send_text(&self, channel_id: &str, text: &str) -> Result<(), PollcastError> {
        for chunk in split_message(text, MAX_MESSAGE_LEN) {
            self.create_message(channel_id, &serde_json::json!({ "content": chunk }))
                .await?;
        }
        Ok(())
    }

    async fn open_poll(
        &self,
        channel_id: &str,
        question: &str,
    ) -> Result<MessageRef, PollcastError> {
        let embed = poll_embed(question, &[]);
        let message_id = self
            .create_message(channel_id, &serde_json::json!({ "embeds": [embed] }))
            .await?;
        Ok(MessageRef {
            channel_id: channel_id.to_string(),
            message_id,
        })
    }

    async fn show_options(
        &self,
        anchor: &MessageRef,
        question: &str,
        options: &[String],
    ) -> Result<(), PollcastError> {
        let embed = poll_embed(question, options);
        self.edit_message(anchor, &serde_json::json!({ "embeds": [embed] }))
            .await?;

        if let Some(emoji) = marker::emoji_for(options.len()) {
            self.add_reaction(anchor, emoji).await?;
        }
        Ok(())
    }

    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<(), PollcastError> {
        self.delete(channel_id, message_id).await
    }

    async fn user_name(&self, user_id: &str) -> Result<Option<String>, PollcastError> {
        self.fetch_user(user_id).await.map(|u| Some(u.username))
    }

    async fn stop(&self) -> Result<(), PollcastError> {
        info!("Discord channel stopped");
        Ok(())
    }
}

/// Build the poll embed: the question as title, one field per option.
pub(crate) fn poll_embed(question: &str, options: &[String]) -> DcEmbed {
    let fields = options
        .iter()
        .enumerate()
        .filter_map(|(i, option)| {
            marker::emoji_for(i + 1).map(|emoji| DcEmbedField {
                name: emoji.to_string(),
                value: truncate_chars(option, MAX_FIELD_VALUE),
                inline: false,
            })
        })
        .collect();

    DcEmbed {
        title: truncate_chars(question, MAX_EMBED_TITLE),
        description: "React to vote!".to_string(),
        fields,
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => s[..byte_idx].to_string(),
        None => s.to_string(),
    }
}
