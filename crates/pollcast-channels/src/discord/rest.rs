//! Discord REST calls used by the poll host.

use pollcast_core::{error::PollcastError, event::MessageRef};
use reqwest::Method;
use tracing::warn;

use super::{
    types::{DcCreatedMessage, DcUser},
    DiscordChannel,
};

impl DiscordChannel {
    /// Issue an authenticated request; non-2xx responses become errors.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<reqwest::Response, PollcastError> {
        let url = format!("{}/{path}", self.api_base);
        let mut req = self
            .client
            .request(method.clone(), &url)
            .timeout(self.request_timeout)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Bot {}", self.config.bot_token),
            );
        if let Some(body) = body {
            req = req.json(body);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PollcastError::Channel(format!("discord {method} {path} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                warn!("discord rate limited on {method} {path}");
            }
            return Err(PollcastError::Channel(format!(
                "discord {method} {path} returned {status}: {error_text}"
            )));
        }
        Ok(resp)
    }

    /// Post a message and return its id.
    pub(super) async fn create_message(
        &self,
        channel_id: &str,
        body: &serde_json::Value,
    ) -> Result<String, PollcastError> {
        let path = format!("channels/{channel_id}/messages");
        let created: DcCreatedMessage = self
            .request(Method::POST, &path, Some(body))
            .await?
            .json()
            .await
            .map_err(|e| PollcastError::Channel(format!("discord message parse failed: {e}")))?;
        Ok(created.id)
    }

    pub(super) async fn edit_message(
        &self,
        anchor: &MessageRef,
        body: &serde_json::Value,
    ) -> Result<(), PollcastError> {
        let path = format!(
            "channels/{}/messages/{}",
            anchor.channel_id, anchor.message_id
        );
        self.request(Method::PATCH, &path, Some(body)).await?;
        Ok(())
    }

    /// React to a message as the bot.
    pub(super) async fn add_reaction(
        &self,
        anchor: &MessageRef,
        emoji: &str,
    ) -> Result<(), PollcastError> {
        let path = reaction_path(anchor, emoji);
        self.request(Method::PUT, &path, None).await?;
        Ok(())
    }

    pub(super) async fn delete(&self, channel_id: &str, message_id: &str) -> Result<(), PollcastError> {
        let path = format!("channels/{channel_id}/messages/{message_id}");
        self.request(Method::DELETE, &path, None).await?;
        Ok(())
    }

    pub(super) async fn fetch_user(&self, user_id: &str) -> Result<DcUser, PollcastError> {
        let path = format!("users/{user_id}");
        self.request(Method::GET, &path, None)
            .await?
            .json()
            .await
            .map_err(|e| PollcastError::Channel(format!("discord user parse failed: {e}")))
    }
}

/// `PUT` path for the bot's own reaction; the emoji must be percent-encoded.
pub(super) fn reaction_path(anchor: &MessageRef, emoji: &str) -> String {
    format!(
        "channels/{}/messages/{}/reactions/{}/@me",
        anchor.channel_id,
        anchor.message_id,
        urlencoding::encode(emoji)
    )
}
