//! Discord gateway session: Hello → Identify → heartbeat + dispatch loop.
//!
//! Sessions are not resumed; after any disconnect a fresh session is
//! identified, with exponential backoff on failures. The backoff starts
//! over once a session has reached READY. A heartbeat that goes
//! unacknowledged until the next beat drops the session.

use futures_util::{Sink, SinkExt, Stream, StreamExt};
use pollcast_core::{
    error::PollcastError,
    event::{CommandMessage, PollEvent, ReactionEvent},
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use super::types::*;

/// Everything a gateway session needs, detached from the channel.
pub(super) struct Session {
    pub url: String,
    pub token: String,
    pub self_id: Arc<Mutex<Option<String>>>,
}

const MAX_BACKOFF_SECS: u64 = 60;

/// Why a session ended without an error.
#[derive(Debug, PartialEq, Eq)]
enum SessionEnd {
    /// Discord asked for a reconnect or invalidated the session.
    Reconnect,
    /// Nobody is listening for events anymore.
    ReceiverDropped,
}

/// Keep a gateway session alive until the event receiver is dropped.
pub(super) async fn run(session: Session, tx: mpsc::Sender<PollEvent>) {
    let mut backoff_secs: u64 = 1;

    loop {
        let mut ready = false;
        let outcome = run_session(&session, &tx, &mut ready).await;

        let (wait, next) = next_backoff(backoff_secs, ready);
        backoff_secs = next;
        match outcome {
            Ok(SessionEnd::ReceiverDropped) => {
                info!("discord event receiver dropped, closing gateway");
                return;
            }
            Ok(SessionEnd::Reconnect) => {
                info!("discord gateway reconnecting in {wait}s");
            }
            Err(e) => {
                error!("discord gateway error (retry in {wait}s): {e}");
            }
        }
        tokio::time::sleep(Duration::from_secs(wait)).await;

        if tx.is_closed() {
            return;
        }
    }
}

/// Delay before the next connect attempt, and the delay after that.
///
/// A session that reached READY was healthy, so its end starts the
/// backoff over instead of continuing to double it.
pub(super) fn next_backoff(current_secs: u64, session_was_ready: bool) -> (u64, u64) {
    let wait = if session_was_ready { 1 } else { current_secs.max(1) };
    (wait, (wait * 2).min(MAX_BACKOFF_SECS))
}

/// Tracks whether the last heartbeat was acknowledged.
#[derive(Debug, Default)]
pub(super) struct HeartbeatState {
    awaiting_ack: bool,
}

impl HeartbeatState {
    /// Called when a beat is due. Returns `false` if the previous beat was
    /// never acknowledged, meaning the connection is dead.
    pub(super) fn beat(&mut self) -> bool {
        if self.awaiting_ack {
            return false;
        }
        self.awaiting_ack = true;
        true
    }

    pub(super) fn ack(&mut self) {
        self.awaiting_ack = false;
    }
}

async fn run_session(
    session: &Session,
    tx: &mpsc::Sender<PollEvent>,
    ready: &mut bool,
) -> Result<SessionEnd, PollcastError> {
    let (ws, _) = tokio_tungstenite::connect_async(session.url.as_str())
        .await
        .map_err(|e| PollcastError::Channel(format!("discord gateway connect failed: {e}")))?;
    let (mut sink, mut stream) = ws.split();

    let hello: Hello = loop {
        let text = match next_text(&mut stream).await? {
            Some(t) => t,
            None => continue,
        };
        let payload: GatewayPayload = serde_json::from_str(&text)?;
        if payload.op == OP_HELLO {
            break serde_json::from_value(payload.d)?;
        }
    };

    sink.send(Message::Text(identify_payload(&session.token).to_string()))
        .await
        .map_err(|e| PollcastError::Channel(format!("discord identify failed: {e}")))?;

    let mut heartbeat = tokio::time::interval(Duration::from_millis(hello.heartbeat_interval));
    // The first tick fires immediately; Discord expects the first beat later.
    heartbeat.tick().await;
    let mut seq: Option<u64> = None;
    let mut acks = HeartbeatState::default();

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                if !acks.beat() {
                    warn!("discord heartbeat not acknowledged, reconnecting");
                    return Ok(SessionEnd::Reconnect);
                }
                send_heartbeat(&mut sink, seq).await?;
            }
            frame = next_text(&mut stream) => {
                let Some(text) = frame? else { continue };
                let payload: GatewayPayload = match serde_json::from_str(&text) {
                    Ok(p) => p,
                    Err(e) => {
                        warn!("discord: unparseable gateway frame: {e}");
                        continue;
                    }
                };
                if payload.s.is_some() {
                    seq = payload.s;
                }

                match payload.op {
                    OP_DISPATCH => {
                        let Some(kind) = payload.t else { continue };
                        let self_id = session.self_id.lock().await.clone();
                        let Some(event) = parse_dispatch(&kind, payload.d, self_id.as_deref()) else {
                            continue;
                        };
                        if let PollEvent::Ready { user_id, user_name } = &event {
                            info!("Discord ready as {user_name} ({user_id})");
                            *session.self_id.lock().await = Some(user_id.clone());
                            *ready = true;
                        }
                        if tx.send(event).await.is_err() {
                            return Ok(SessionEnd::ReceiverDropped);
                        }
                    }
                    OP_HEARTBEAT => send_heartbeat(&mut sink, seq).await?,
                    OP_HEARTBEAT_ACK => {
                        acks.ack();
                        debug!("discord heartbeat acknowledged");
                    }
                    OP_RECONNECT => return Ok(SessionEnd::Reconnect),
                    OP_INVALID_SESSION => {
                        warn!("discord session invalidated");
                        return Ok(SessionEnd::Reconnect);
                    }
                    other => debug!("discord: ignoring opcode {other}"),
                }
            }
        }
    }
}

/// Next text frame; `Ok(None)` for frames with no payload for us.
async fn next_text<S>(stream: &mut S) -> Result<Option<String>, PollcastError>
where
    S: Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    match stream.next().await {
        Some(Ok(Message::Text(text))) => Ok(Some(text)),
        Some(Ok(Message::Close(frame))) => Err(PollcastError::Channel(format!(
            "discord gateway closed: {frame:?}"
        ))),
        Some(Ok(_)) => Ok(None),
        Some(Err(e)) => Err(PollcastError::Channel(format!(
            "discord gateway read failed: {e}"
        ))),
        None => Err(PollcastError::Channel("discord gateway stream ended".into())),
    }
}

async fn send_heartbeat<S>(sink: &mut S, seq: Option<u64>) -> Result<(), PollcastError>
where
    S: Sink<Message, Error = tokio_tungstenite::tungstenite::Error> + Unpin,
{
    let beat = serde_json::json!({ "op": OP_HEARTBEAT, "d": seq });
    sink.send(Message::Text(beat.to_string()))
        .await
        .map_err(|e| PollcastError::Channel(format!("discord heartbeat failed: {e}")))
}

pub(super) fn identify_payload(token: &str) -> serde_json::Value {
    serde_json::json!({
        "op": OP_IDENTIFY,
        "d": {
            "token": token,
            "intents": INTENTS,
            "properties": {
                "os": std::env::consts::OS,
                "browser": "pollcast",
                "device": "pollcast",
            },
        },
    })
}

/// Turn a dispatch into a poll event. Returns `None` for events we ignore,
/// including messages written by bots.
pub(super) fn parse_dispatch(
    kind: &str,
    data: serde_json::Value,
    self_id: Option<&str>,
) -> Option<PollEvent> {
    match kind {
        "READY" => {
            let ready: Ready = parse_or_warn(kind, data)?;
            Some(PollEvent::Ready {
                user_id: ready.user.id,
                user_name: ready.user.username,
            })
        }
        "MESSAGE_CREATE" => {
            let msg: DcMessage = parse_or_warn(kind, data)?;
            if msg.author.bot {
                return None;
            }
            Some(PollEvent::Command(CommandMessage {
                channel_id: msg.channel_id,
                message_id: msg.id,
                author_id: msg.author.id,
                author_name: msg.author.username,
                text: msg.content,
            }))
        }
        "MESSAGE_REACTION_ADD" | "MESSAGE_REACTION_REMOVE" => {
            let reaction: DcReaction = parse_or_warn(kind, data)?;
            let member_user = reaction.member.and_then(|m| m.user);
            let is_bot = member_user.as_ref().is_some_and(|u| u.bot)
                || self_id == Some(reaction.user_id.as_str());
            let event = ReactionEvent {
                channel_id: reaction.channel_id,
                message_id: reaction.message_id,
                user_id: reaction.user_id,
                user_name: member_user.map(|u| u.username),
                emoji: reaction.emoji.name.unwrap_or_default(),
                is_bot,
            };
            if reaction.emoji.id.is_some() {
                debug!("discord: custom emoji reaction {}", event.emoji);
            }
            Some(if kind == "MESSAGE_REACTION_ADD" {
                PollEvent::ReactionAdded(event)
            } else {
                PollEvent::ReactionRemoved(event)
            })
        }
        _ => None,
    }
}

fn parse_or_warn<T: serde::de::DeserializeOwned>(kind: &str, data: serde_json::Value) -> Option<T> {
    match serde_json::from_value(data) {
        Ok(v) => Some(v),
        Err(e) => {
            warn!("discord: failed to parse {kind}: {e}");
            None
        }
    }
}
