//! Discord gateway and REST deserialization types.

use serde::{Deserialize, Serialize};

/// Gateway opcodes we send or act on.
pub(crate) const OP_DISPATCH: u8 = 0;
pub(crate) const OP_HEARTBEAT: u8 = 1;
pub(crate) const OP_IDENTIFY: u8 = 2;
pub(crate) const OP_RECONNECT: u8 = 7;
pub(crate) const OP_INVALID_SESSION: u8 = 9;
pub(crate) const OP_HELLO: u8 = 10;
pub(crate) const OP_HEARTBEAT_ACK: u8 = 11;

/// GUILDS | GUILD_MESSAGES | GUILD_MESSAGE_REACTIONS | MESSAGE_CONTENT.
pub(crate) const INTENTS: u64 = (1 << 0) | (1 << 9) | (1 << 10) | (1 << 15);

#[derive(Debug, Deserialize)]
pub(crate) struct GatewayPayload {
    pub op: u8,
    #[serde(default)]
    pub d: serde_json::Value,
    pub s: Option<u64>,
    pub t: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Hello {
    pub heartbeat_interval: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Ready {
    pub user: DcUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub bot: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcMessage {
    pub id: String,
    pub channel_id: String,
    pub author: DcUser,
    /// Empty unless the MESSAGE_CONTENT intent is granted.
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcReaction {
    pub user_id: String,
    pub channel_id: String,
    pub message_id: String,
    /// Only on guild reaction adds.
    pub member: Option<DcMember>,
    pub emoji: DcEmoji,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcMember {
    pub user: Option<DcUser>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcEmoji {
    /// Set for custom guild emoji only.
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DcCreatedMessage {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct DcEmbed {
    pub title: String,
    pub description: String,
    pub fields: Vec<DcEmbedField>,
}

#[derive(Debug, Serialize)]
pub(crate) struct DcEmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}
