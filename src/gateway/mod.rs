//! Gateway: the event loop between the host chat, the poll and the relay.
//!
//! Events are handled one at a time against the owned `PollManager`.
//! Host replies are awaited; ledger and broadcast notifications are handed
//! to the relay and never awaited.


use crate::commands::{self, Command};
use crate::relay::Relay;
use async_trait::async_trait;
use pollcast_core::{
    config::DiscordConfig,
    event::{CommandMessage, MessageRef, ReactionEvent, VoteRecord},
    marker,
    poll::{PollManager, VoteOutcome, Voter},
    report,
    traits::{PollEventHandler, PollHost},
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Routes host events into the poll and out to the relay.
pub struct Gateway {
    host: Arc<dyn PollHost>,
    relay: Relay,
    prefix: String,
    /// Only handle commands from this channel, when set.
    channel_id: Option<String>,
    delete_commands: bool,
    poll: PollManager,
    /// The message carrying the current poll's reactions.
    anchor: Option<MessageRef>,
    bot_user_id: Option<String>,
    /// Voter id → last known display name.
    names: HashMap<String, String>,
}

impl Gateway {
    /// Create a new gateway.
    pub fn new(host: Arc<dyn PollHost>, relay: Relay, config: &DiscordConfig) -> Self {
        Self {
            host,
            relay,
            prefix: config.command_prefix.clone(),
            channel_id: config.channel_id.clone().filter(|c| !c.is_empty()),
            delete_commands: config.delete_commands,
            poll: PollManager::new(),
            anchor: None,
            bot_user_id: None,
            names: HashMap::new(),
        }
    }

    /// Run the main event loop until the host closes or Ctrl-C.
    pub async fn run(mut self) -> anyhow::Result<()> {
        let mut rx = self
            .host
            .start()
            .await
            .map_err(|e| anyhow::anyhow!("failed to start {}: {e}", self.host.name()))?;

        info!(
            "pollcast gateway running | host: {} | relays: {} | prefix: {}",
            self.host.name(),
            self.relay.describe(),
            self.prefix,
        );

        loop {
            tokio::select! {
                event = rx.recv() => match event {
                    Some(event) => self.dispatch(event).await,
                    None => {
                        warn!("{} event stream closed", self.host.name());
                        break;
                    }
                },
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        if let Err(e) = self.host.stop().await {
            warn!("failed to stop {}: {e}", self.host.name());
        }
        self.relay.shutdown().await;
        info!("pollcast stopped");
        Ok(())
    }

    async fn reply(&self, channel_id: &str, text: &str) {
        if let Err(e) = self.host.send_text(channel_id, text).await {
            error!("failed to reply in {channel_id}: {e}");
        }
    }

    async fn handle_create(&mut self, channel_id: &str, question: &str) -> Option<String> {
        if question.is_empty() {
            return Some(commands::usage(&self.prefix, "create", "question"));
        }
        if let Err(e) = self.poll.create(question) {
            return Some(commands::create_rejected(&e));
        }

        match self.host.open_poll(channel_id, question).await {
            Ok(anchor) => {
                info!("poll created: {question}");
                self.anchor = Some(anchor);
                Some(commands::created(&self.prefix))
            }
            Err(e) => {
                // Without a poll message nobody can vote; close it again.
                error!("failed to post poll message: {e}");
                if let Err(e) = self.poll.end() {
                    warn!("could not close unposted poll: {e}");
                }
                self.anchor = None;
                Some("Could not post the poll message. Please try again.".to_string())
            }
        }
    }

    async fn handle_add(&mut self, option: &str) -> Option<String> {
        if option.is_empty() {
            return Some(commands::usage(&self.prefix, "add", "option"));
        }
        let index = match self.poll.add_option(option) {
            Ok(index) => index,
            Err(e) => return Some(commands::add_rejected(&e)),
        };
        debug!("option {index} added: {option}");

        if let Some(anchor) = &self.anchor {
            if let Err(e) = self
                .host
                .show_options(anchor, self.poll.question(), self.poll.options())
                .await
            {
                error!("failed to show option {index} on the poll message: {e}");
            }
        }
        None
    }

    fn handle_end(&mut self) -> String {
        match self.poll.end() {
            Ok(()) => {
                info!("poll ended with {} vote(s)", self.poll.vote_count());
                commands::ended(&self.prefix)
            }
            Err(e) => commands::end_rejected(&e),
        }
    }

    async fn handle_result(&mut self, channel_id: &str) -> Option<String> {
        let summary = match self.poll.summarize() {
            Ok(summary) => summary,
            Err(e) => return Some(commands::result_rejected(&e)),
        };

        let text = report::render(&summary);
        self.reply(channel_id, &text).await;
        self.relay.broadcast(&text);
        None
    }

    /// Whether a reaction belongs to a human on the current poll message.
    fn is_poll_reaction(&self, reaction: &ReactionEvent) -> bool {
        if reaction.is_bot || self.bot_user_id.as_deref() == Some(reaction.user_id.as_str()) {
            return false;
        }
        self.anchor
            .as_ref()
            .is_some_and(|a| a.message_id == reaction.message_id)
    }

    /// Best available display name for a voter.
    async fn resolve_name(&mut self, user_id: &str, hint: Option<&str>) -> Option<String> {
        if let Some(name) = hint {
            self.names.insert(user_id.to_string(), name.to_string());
            return Some(name.to_string());
        }
        if let Some(name) = self.names.get(user_id) {
            return Some(name.clone());
        }
        // A hung lookup must not hold up the events queued behind it.
        let lookup = self.host.user_name(user_id);
        match tokio::time::timeout(self.relay.timeout(), lookup).await {
            Ok(Ok(Some(name))) => {
                self.names.insert(user_id.to_string(), name.clone());
                Some(name)
            }
            Ok(Ok(None)) => None,
            Ok(Err(e)) => {
                warn!("failed to look up user {user_id}: {e}");
                None
            }
            Err(_) => {
                warn!("lookup of user {user_id} timed out");
                None
            }
        }
    }
}

#[async_trait]
impl PollEventHandler for Gateway {
    async fn on_ready(&mut self, user_id: &str, user_name: &str) {
        info!("Bot is ready. Logged in as {user_name}");
        self.bot_user_id = Some(user_id.to_string());
    }

    async fn on_command(&mut self, message: CommandMessage) {
        if let Some(only) = &self.channel_id {
            if *only != message.channel_id {
                return;
            }
        }
        let Some(command) = Command::parse(&message.text, &self.prefix) else {
            return;
        };
        self.names
            .insert(message.author_id.clone(), message.author_name.clone());
        debug!("{} ran {command:?}", message.author_name);

        let reply = match command {
            Command::Create(question) => self.handle_create(&message.channel_id, &question).await,
            Command::Add(option) => self.handle_add(&option).await,
            Command::End => Some(self.handle_end()),
            Command::Result => self.handle_result(&message.channel_id).await,
        };

        if let Some(reply) = reply {
            self.reply(&message.channel_id, &reply).await;
        }

        if self.delete_commands {
            if let Err(e) = self
                .host
                .delete_message(&message.channel_id, &message.message_id)
                .await
            {
                warn!("failed to delete command message: {e}");
            }
        }
    }

    async fn on_reaction_add(&mut self, reaction: ReactionEvent) {
        if !self.is_poll_reaction(&reaction) {
            return;
        }
        let Some(index) = marker::index_for(&reaction.emoji) else {
            debug!("ignoring non-marker reaction {}", reaction.emoji);
            return;
        };

        let name = self
            .resolve_name(&reaction.user_id, reaction.user_name.as_deref())
            .await
            .unwrap_or_else(|| reaction.user_id.clone());

        match self.poll.vote(Voter::new(&reaction.user_id, &name), index) {
            Ok(VoteOutcome::Recorded { option }) => {
                info!("{name} voted for {option}");
                self.relay.record(VoteRecord::set(&name, &option));
            }
            Ok(VoteOutcome::Ignored) => debug!("{name} reacted with unused marker {index}"),
            Err(e) => debug!("vote from {name} ignored: {e}"),
        }
    }

    async fn on_reaction_remove(&mut self, reaction: ReactionEvent) {
        if !self.is_poll_reaction(&reaction) {
            return;
        }
        let Some(index) = marker::index_for(&reaction.emoji) else {
            return;
        };
        // Removing a marker other than the current choice leaves the vote alone.
        if let Some(ballot) = self.poll.ballot(&reaction.user_id) {
            if ballot.option != index {
                return;
            }
        }

        let removed = match self.poll.unvote(&reaction.user_id) {
            Ok(removed) => removed,
            Err(e) => {
                debug!("unvote from {} ignored: {e}", reaction.user_id);
                return;
            }
        };

        let name = match removed {
            Some(ballot) => Some(ballot.voter.name),
            None => {
                self.resolve_name(&reaction.user_id, reaction.user_name.as_deref())
                    .await
            }
        };
        match name {
            Some(name) => {
                info!("{name} withdrew their vote");
                self.relay.record(VoteRecord::clear(&name));
            }
            None => warn!("cannot clear ledger row for unknown user {}", reaction.user_id),
        }
    }
}
