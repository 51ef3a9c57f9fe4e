mod channels;
mod defaults;


pub use channels::*;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::PollcastError;
use defaults::*;

/// Top-level pollcast configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pollcast: GeneralConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub sheets: Option<SheetsConfig>,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Also write logs to `{data_dir}/logs/pollcast.log`.
    #[serde(default)]
    pub log_to_file: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            log_to_file: false,
        }
    }
}

/// Expand `~` to home directory.
pub fn shellexpand(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME") {
            return format!("{}/{rest}", home.to_string_lossy());
        }
    }
    path.to_string()
}

/// Load configuration from a TOML file, then apply environment overrides.
///
/// Falls back to defaults if the file does not exist.
pub fn load(path: &str) -> Result<Config, PollcastError> {
    let path = Path::new(path);
    let mut config = if !path.exists() {
        tracing::info!(
            "Config file not found at {}, using defaults",
            path.display()
        );
        Config::default()
    } else {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PollcastError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content)
            .map_err(|e| PollcastError::Config(format!("failed to parse config: {}", e)))?
    };

    apply_env(&mut config, |key| std::env::var(key).ok());
    Ok(config)
}

/// Overlay secrets and identifiers from the environment.
///
/// A section created here from scratch is enabled; an existing section keeps
/// its `enabled` flag.
pub fn apply_env(config: &mut Config, lookup: impl Fn(&str) -> Option<String>) {
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(token) = var("DISCORD_BOT_TOKEN") {
        config.discord.bot_token = token;
    }
    if let Some(channel) = var("DISCORD_CHANNEL_ID") {
        config.discord.channel_id = Some(channel);
    }

    let tg_token = var("TELEGRAM_BOT_TOKEN");
    let tg_chat = var("TELEGRAM_GROUP_ID");
    if tg_token.is_some() || tg_chat.is_some() {
        let tg = config.relay.telegram.get_or_insert_with(|| TelegramConfig {
            enabled: true,
            bot_token: String::new(),
            chat_id: String::new(),
        });
        if let Some(token) = tg_token {
            tg.bot_token = token;
        }
        if let Some(chat) = tg_chat {
            tg.chat_id = chat;
        }
    }

    let wa_token = var("WHATSAPP_ACCESS_TOKEN");
    let wa_phone = var("WHATSAPP_PHONE_NUMBER_ID");
    let wa_group = var("WHATSAPP_GROUP_ID");
    if wa_token.is_some() || wa_phone.is_some() || wa_group.is_some() {
        let wa = config.relay.whatsapp.get_or_insert_with(|| WhatsAppConfig {
            enabled: true,
            access_token: String::new(),
            phone_number_id: String::new(),
            to: String::new(),
            recipient_type: default_recipient_type(),
            api_base: default_whatsapp_api_base(),
        });
        if let Some(token) = wa_token {
            wa.access_token = token;
        }
        if let Some(phone) = wa_phone {
            wa.phone_number_id = phone;
        }
        if let Some(group) = wa_group {
            wa.to = group;
        }
    }

    let sheet_id = var("GOOGLE_SHEET_ID");
    let sheet_token = var("GOOGLE_ACCESS_TOKEN");
    if sheet_id.is_some() || sheet_token.is_some() {
        let sheets = config.sheets.get_or_insert_with(|| SheetsConfig {
            enabled: true,
            spreadsheet_id: String::new(),
            access_token: String::new(),
            tab: None,
            api_base: default_sheets_api_base(),
        });
        if let Some(id) = sheet_id {
            sheets.spreadsheet_id = id;
        }
        if let Some(token) = sheet_token {
            sheets.access_token = token;
        }
    }
}
