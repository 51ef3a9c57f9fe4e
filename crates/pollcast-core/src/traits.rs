use crate::{
    error::PollcastError,
    event::{CommandMessage, MessageRef, PollEvent, ReactionEvent, VoteRecord},
};
use async_trait::async_trait;

/// Host chat platform where polls are posted and votes are cast.
///
/// Discord is the only implementation; the gateway talks to it through
/// this trait so tests can substitute an in-memory host.
#[async_trait]
pub trait PollHost: Send + Sync {
    /// Human-readable platform name.
    fn name(&self) -> &str;

    /// Connect and start delivering events.
    async fn start(&self) -> Result<tokio::sync::mpsc::Receiver<PollEvent>, PollcastError>;

    /// Post a plain text message.
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<(), PollcastError>;

    /// Post a fresh poll message and return where it lives.
    async fn open_poll(&self, channel_id: &str, question: &str)
        -> Result<MessageRef, PollcastError>;

    /// Re-render the poll message with `options` and add the marker
    /// reaction for the last one.
    async fn show_options(
        &self,
        anchor: &MessageRef,
        question: &str,
        options: &[String],
    ) -> Result<(), PollcastError>;

    /// Delete a message (used to tidy up command messages).
    async fn delete_message(&self, _channel_id: &str, _message_id: &str) -> Result<(), PollcastError> {
        Ok(())
    }

    /// Look up a user's display name.
    async fn user_name(&self, _user_id: &str) -> Result<Option<String>, PollcastError> {
        Ok(None)
    }

    /// Graceful shutdown.
    async fn stop(&self) -> Result<(), PollcastError>;
}

/// Spreadsheet-like store of each voter's current choice.
#[async_trait]
pub trait VoteLedger: Send + Sync {
    fn name(&self) -> &str;

    /// Upsert or clear the voter's row.
    async fn record(&self, record: &VoteRecord) -> Result<(), PollcastError>;
}

/// Secondary destination for poll results.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    fn name(&self) -> &str;

    async fn broadcast(&self, text: &str) -> Result<(), PollcastError>;
}

/// Receives host events, one method per event type.
#[async_trait]
pub trait PollEventHandler: Send {
    async fn on_ready(&mut self, user_id: &str, user_name: &str);

    async fn on_command(&mut self, message: CommandMessage);

    async fn on_reaction_add(&mut self, reaction: ReactionEvent);

    async fn on_reaction_remove(&mut self, reaction: ReactionEvent);

    /// Route an event to its handler method.
    async fn dispatch(&mut self, event: PollEvent) {
        match event {
            PollEvent::Ready { user_id, user_name } => self.on_ready(&user_id, &user_name).await,
            PollEvent::Command(message) => self.on_command(message).await,
            PollEvent::ReactionAdded(reaction) => self.on_reaction_add(reaction).await,
            PollEvent::ReactionRemoved(reaction) => self.on_reaction_remove(reaction).await,
        }
    }
}
