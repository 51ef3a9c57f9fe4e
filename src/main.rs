mod commands;
mod gateway;
mod relay;

use clap::{Parser, Subcommand};
use pollcast_channels::{discord::DiscordChannel, telegram::TelegramRelay, whatsapp::WhatsAppRelay};
use pollcast_core::{
    config::{self, shellexpand, Config},
    traits::{Broadcaster, PollHost, VoteLedger},
};
use pollcast_sheets::GoogleSheetsLedger;
use std::sync::Arc;
use std::time::Duration;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pollcast",
    version,
    about = "Discord reaction polls, relayed to Telegram, WhatsApp and Google Sheets"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect to Discord and run the poll bot.
    Start,
    /// Show which integrations are configured.
    Status,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();
    let cfg = config::load(&cli.config)?;
    let _log_guard = init_logging(&cfg)?;

    match cli.command {
        Commands::Start => {
            if cfg.discord.bot_token.is_empty() {
                anyhow::bail!(
                    "Discord bot_token is empty. \
                     Set it in config.toml or DISCORD_BOT_TOKEN env var."
                );
            }

            let host: Arc<dyn PollHost> = Arc::new(DiscordChannel::new(cfg.discord.clone()));
            let relay = relay::Relay::new(
                build_ledger(&cfg),
                build_broadcasters(&cfg),
                Duration::from_secs(cfg.relay.timeout_secs.max(1)),
            );

            println!("{} starting...", cfg.pollcast.name);
            let gw = gateway::Gateway::new(host, relay, &cfg.discord);
            gw.run().await?;
        }
        Commands::Status => {
            println!("{} status\n", cfg.pollcast.name);
            println!("Config: {}", cli.config);
            println!();
            println!(
                "  discord: {}",
                if cfg.discord.bot_token.is_empty() {
                    "missing bot_token"
                } else {
                    "configured"
                }
            );

            match &cfg.relay.telegram {
                Some(tg) => println!(
                    "  telegram: {}",
                    describe(tg.enabled, !tg.bot_token.is_empty() && !tg.chat_id.is_empty())
                ),
                None => println!("  telegram: not configured"),
            }
            match &cfg.relay.whatsapp {
                Some(wa) => println!(
                    "  whatsapp: {}",
                    describe(
                        wa.enabled,
                        !wa.access_token.is_empty()
                            && !wa.phone_number_id.is_empty()
                            && !wa.to.is_empty()
                    )
                ),
                None => println!("  whatsapp: not configured"),
            }
            match &cfg.sheets {
                Some(sh) => println!(
                    "  sheets: {}",
                    describe(
                        sh.enabled,
                        !sh.spreadsheet_id.is_empty() && !sh.access_token.is_empty()
                    )
                ),
                None => println!("  sheets: not configured"),
            }
        }
    }

    Ok(())
}

fn describe(enabled: bool, complete: bool) -> &'static str {
    match (enabled, complete) {
        (true, true) => "configured",
        (true, false) => "enabled but missing credentials",
        (false, _) => "disabled",
    }
}

/// Console logging, plus a log file under the data dir when enabled.
///
/// `RUST_LOG` wins over the configured level. Keep the returned guard alive
/// for the life of the process or buffered file output is lost.
fn init_logging(cfg: &Config) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&cfg.pollcast.log_level));

    let (file_layer, guard) = if cfg.pollcast.log_to_file {
        let dir = format!("{}/logs", shellexpand(&cfg.pollcast.data_dir));
        std::fs::create_dir_all(&dir)?;
        let appender = tracing_appender::rolling::never(&dir, "pollcast.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .init();
    Ok(guard)
}

/// Build the vote ledger, if one is enabled and complete.
fn build_ledger(cfg: &Config) -> Option<Arc<dyn VoteLedger>> {
    let sheets = cfg.sheets.as_ref().filter(|s| s.enabled)?;
    if sheets.spreadsheet_id.is_empty() || sheets.access_token.is_empty() {
        tracing::warn!(
            "Google Sheets is enabled but spreadsheet_id or access_token is empty; \
             votes will not be recorded"
        );
        return None;
    }
    Some(Arc::new(GoogleSheetsLedger::new(sheets.clone())))
}

/// Build every enabled result broadcaster.
fn build_broadcasters(cfg: &Config) -> Vec<Arc<dyn Broadcaster>> {
    let mut out: Vec<Arc<dyn Broadcaster>> = Vec::new();

    if let Some(tg) = cfg.relay.telegram.as_ref().filter(|t| t.enabled) {
        if tg.bot_token.is_empty() || tg.chat_id.is_empty() {
            tracing::warn!("Telegram is enabled but bot_token or chat_id is empty; skipping");
        } else {
            out.push(Arc::new(TelegramRelay::new(tg.clone())));
        }
    }

    if let Some(wa) = cfg.relay.whatsapp.as_ref().filter(|w| w.enabled) {
        if wa.access_token.is_empty() || wa.phone_number_id.is_empty() || wa.to.is_empty() {
            tracing::warn!(
                "WhatsApp is enabled but access_token, phone_number_id or to is empty; skipping"
            );
        } else {
            out.push(Arc::new(WhatsAppRelay::new(wa.clone())));
        }
    }

    out
}
