use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event delivered by the host chat platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PollEvent {
    /// The host session is established.
    Ready { user_id: String, user_name: String },
    /// A text message that may carry a bot command.
    Command(CommandMessage),
    ReactionAdded(ReactionEvent),
    ReactionRemoved(ReactionEvent),
}

/// A chat message seen by the bot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandMessage {
    pub channel_id: String,
    pub message_id: String,
    pub author_id: String,
    pub author_name: String,
    pub text: String,
}

/// A reaction added to or removed from a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionEvent {
    pub channel_id: String,
    pub message_id: String,
    pub user_id: String,
    /// Present when the platform includes it (Discord omits it on removal).
    pub user_name: Option<String>,
    /// Unicode emoji, or the custom emoji's name.
    pub emoji: String,
    #[serde(default)]
    pub is_bot: bool,
}

/// Location of a message on the host platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub channel_id: String,
    pub message_id: String,
}

/// A spreadsheet write: set or clear `voter`'s choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub timestamp: DateTime<Utc>,
    pub voter: String,
    /// `None` clears the voter's row.
    pub choice: Option<String>,
}

impl VoteRecord {
    pub fn set(voter: &str, choice: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            voter: voter.to_string(),
            choice: Some(choice.to_string()),
        }
    }

    pub fn clear(voter: &str) -> Self {
        Self {
            timestamp: Utc::now(),
            voter: voter.to_string(),
            choice: None,
        }
    }
}
