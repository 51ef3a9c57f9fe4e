use serde::{Deserialize, Serialize};

use super::defaults::*;

/// Discord bot config (the host platform).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub bot_token: String,
    /// Only accept commands from this channel. Empty = any channel.
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default = "default_command_prefix")]
    pub command_prefix: String,
    /// Delete command messages once handled.
    #[serde(default = "default_true")]
    pub delete_commands: bool,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            bot_token: String::new(),
            channel_id: None,
            command_prefix: default_command_prefix(),
            delete_commands: true,
        }
    }
}

/// Where and how results are relayed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Upper bound on any single outbound call.
    #[serde(default = "default_relay_timeout")]
    pub timeout_secs: u64,
    pub telegram: Option<TelegramConfig>,
    pub whatsapp: Option<WhatsAppConfig>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_relay_timeout(),
            telegram: None,
            whatsapp: None,
        }
    }
}

/// Telegram Bot API relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub bot_token: String,
    /// Group or channel chat id (e.g. `-1001234567890`).
    #[serde(default)]
    pub chat_id: String,
}

/// WhatsApp Cloud API relay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WhatsAppConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub phone_number_id: String,
    /// Destination group id or phone number.
    #[serde(default)]
    pub to: String,
    /// `"group"` or `"individual"`.
    #[serde(default = "default_recipient_type")]
    pub recipient_type: String,
    #[serde(default = "default_whatsapp_api_base")]
    pub api_base: String,
}

/// Google Sheets vote ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub spreadsheet_id: String,
    /// OAuth access token with the spreadsheets scope.
    #[serde(default)]
    pub access_token: String,
    /// Sheet tab name. Empty = first tab.
    #[serde(default)]
    pub tab: Option<String>,
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,
}
