//! WhatsApp relay via the WhatsApp Business Cloud API.
//!
//! Sends a text message from the configured business phone number to a
//! group or a single recipient.
//! Docs: <https://developers.facebook.com/docs/whatsapp/cloud-api/messages/text-messages>

use async_trait::async_trait;
use pollcast_core::{config::WhatsAppConfig, error::PollcastError, traits::Broadcaster};
use tracing::debug;

use crate::split::split_message;

const MAX_MESSAGE_LEN: usize = 4096;

/// Sends results to one WhatsApp destination.
pub struct WhatsAppRelay {
    config: WhatsAppConfig,
    client: reqwest::Client,
}

impl WhatsAppRelay {
    /// Create a new WhatsApp relay from config.
    pub fn new(config: WhatsAppConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/{}/messages",
            self.config.api_base.trim_end_matches('/'),
            self.config.phone_number_id
        )
    }

    fn text_payload(&self, body: &str) -> serde_json::Value {
        serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": self.config.recipient_type,
            "to": self.config.to,
            "type": "text",
            "text": {
                "preview_url": false,
                "body": body,
            },
        })
    }

    async fn send_text(&self, text: &str) -> Result<(), PollcastError> {
        let text = sanitize_for_whatsapp(text);
        let url = self.messages_url();

        for chunk in split_message(&text, MAX_MESSAGE_LEN) {
            let resp = self
                .client
                .post(&url)
                .bearer_auth(&self.config.access_token)
                .json(&self.text_payload(chunk))
                .send()
                .await
                .map_err(|e| PollcastError::Channel(format!("whatsapp send failed: {e}")))?;

            if !resp.status().is_success() {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();
                return Err(PollcastError::Channel(format!(
                    "whatsapp API error {status}: {body}"
                )));
            }
            debug!("whatsapp: sent {} bytes to {}", chunk.len(), self.config.to);
        }

        Ok(())
    }
}

#[async_trait]
impl Broadcaster for WhatsAppRelay {
    fn name(&self) -> &str {
        "whatsapp"
    }

    async fn broadcast(&self, text: &str) -> Result<(), PollcastError> {
        if self.config.to.is_empty() || self.config.phone_number_id.is_empty() {
            return Err(PollcastError::Config(
                "whatsapp needs both phone_number_id and to".into(),
            ));
        }
        self.send_text(text).await
    }
}

/// Rewrite Markdown into WhatsApp's formatting.
///
/// `**bold**` becomes `*bold*` and `#` headers become bold lines; native
/// WhatsApp markup passes through.
pub fn sanitize_for_whatsapp(text: &str) -> String {
    let mut out = text
        .lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                let title = trimmed.trim_start_matches('#').trim();
                if !title.is_empty() {
                    return format!("*{}*", title.replace("**", ""));
                }
            }
            line.replace("**", "*")
        })
        .collect::<Vec<_>>()
        .join("\n");
    if text.ends_with('\n') {
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> WhatsAppConfig {
        WhatsAppConfig {
            enabled: true,
            access_token: "token".into(),
            phone_number_id: "10987".into(),
            to: "120363001234567890".into(),
            recipient_type: "group".into(),
            api_base: "https://graph.facebook.com/v21.0/".into(),
        }
    }

    #[test]
    fn test_messages_url() {
        let relay = WhatsAppRelay::new(config());
        assert_eq!(
            relay.messages_url(),
            "https://graph.facebook.com/v21.0/10987/messages"
        );
    }

    #[test]
    fn test_text_payload_shape() {
        let relay = WhatsAppRelay::new(config());
        let payload = relay.text_payload("hi");
        assert_eq!(payload["messaging_product"], "whatsapp");
        assert_eq!(payload["recipient_type"], "group");
        assert_eq!(payload["to"], "120363001234567890");
        assert_eq!(payload["type"], "text");
        assert_eq!(payload["text"]["body"], "hi");
    }

    #[test]
    fn test_sanitize_bold() {
        assert_eq!(
            sanitize_for_whatsapp("**Poll Results:**\n\nPizza: 50.00%\n"),
            "*Poll Results:*\n\nPizza: 50.00%\n"
        );
    }

    #[test]
    fn test_sanitize_headers() {
        assert_eq!(sanitize_for_whatsapp("## Results"), "*Results*");
        assert_eq!(sanitize_for_whatsapp("# **Big**"), "*Big*");
    }

    #[test]
    fn test_sanitize_passthrough() {
        assert_eq!(sanitize_for_whatsapp("*bold*"), "*bold*");
        assert_eq!(sanitize_for_whatsapp("_italic_"), "_italic_");
        assert_eq!(sanitize_for_whatsapp("plain text"), "plain text");
    }

    #[tokio::test]
    async fn test_broadcast_requires_destination() {
        let mut cfg = config();
        cfg.to.clear();
        let err = WhatsAppRelay::new(cfg).broadcast("x").await.unwrap_err();
        assert!(matches!(err, PollcastError::Config(_)));
    }
}
