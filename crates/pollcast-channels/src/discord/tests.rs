use super::gateway::{identify_payload, next_backoff, parse_dispatch, HeartbeatState};
use super::rest::reaction_path;
use super::types::*;
use super::*;

#[test]
fn test_intents_include_reactions_and_content() {
    assert_eq!(INTENTS, 34305);
    let identify = identify_payload("secret");
    assert_eq!(identify["op"], 2);
    assert_eq!(identify["d"]["token"], "secret");
    assert_eq!(identify["d"]["intents"], 34305);
}

#[test]
fn test_gateway_hello_payload() {
    let payload: GatewayPayload =
        serde_json::from_str(r#"{"op": 10, "d": {"heartbeat_interval": 41250}, "s": null, "t": null}"#)
            .unwrap();
    assert_eq!(payload.op, OP_HELLO);
    let hello: Hello = serde_json::from_value(payload.d).unwrap();
    assert_eq!(hello.heartbeat_interval, 41250);
}

#[test]
fn test_gateway_ack_without_data() {
    let payload: GatewayPayload = serde_json::from_str(r#"{"op": 11}"#).unwrap();
    assert_eq!(payload.op, OP_HEARTBEAT_ACK);
    assert!(payload.d.is_null());
    assert!(payload.t.is_none());
}

#[test]
fn test_parse_ready() {
    let data = serde_json::json!({
        "v": 10,
        "user": {"id": "900", "username": "pollbot", "bot": true},
        "session_id": "abc",
    });
    match parse_dispatch("READY", data, None) {
        Some(PollEvent::Ready { user_id, user_name }) => {
            assert_eq!(user_id, "900");
            assert_eq!(user_name, "pollbot");
        }
        other => panic!("expected Ready, got {other:?}"),
    }
}

#[test]
fn test_parse_message_create() {
    let data = serde_json::json!({
        "id": "111",
        "channel_id": "222",
        "author": {"id": "333", "username": "alice"},
        "content": "/create Lunch?",
    });
    match parse_dispatch("MESSAGE_CREATE", data, None) {
        Some(PollEvent::Command(msg)) => {
            assert_eq!(msg.message_id, "111");
            assert_eq!(msg.channel_id, "222");
            assert_eq!(msg.author_id, "333");
            assert_eq!(msg.author_name, "alice");
            assert_eq!(msg.text, "/create Lunch?");
        }
        other => panic!("expected Command, got {other:?}"),
    }
}

#[test]
fn test_parse_message_from_bot_ignored() {
    let data = serde_json::json!({
        "id": "111",
        "channel_id": "222",
        "author": {"id": "900", "username": "pollbot", "bot": true},
        "content": "Poll ended.",
    });
    assert!(parse_dispatch("MESSAGE_CREATE", data, None).is_none());
}

#[test]
fn test_parse_reaction_add_with_member() {
    let data = serde_json::json!({
        "user_id": "333",
        "channel_id": "222",
        "message_id": "444",
        "guild_id": "1",
        "member": {"user": {"id": "333", "username": "alice"}, "roles": []},
        "emoji": {"id": null, "name": "2\u{fe0f}\u{20e3}"},
    });
    match parse_dispatch("MESSAGE_REACTION_ADD", data, Some("900")) {
        Some(PollEvent::ReactionAdded(r)) => {
            assert_eq!(r.user_id, "333");
            assert_eq!(r.user_name.as_deref(), Some("alice"));
            assert_eq!(r.message_id, "444");
            assert_eq!(pollcast_core::marker::index_for(&r.emoji), Some(2));
            assert!(!r.is_bot);
        }
        other => panic!("expected ReactionAdded, got {other:?}"),
    }
}

#[test]
fn test_parse_reaction_remove_has_no_name() {
    let data = serde_json::json!({
        "user_id": "333",
        "channel_id": "222",
        "message_id": "444",
        "emoji": {"id": null, "name": "1\u{fe0f}\u{20e3}"},
    });
    match parse_dispatch("MESSAGE_REACTION_REMOVE", data, None) {
        Some(PollEvent::ReactionRemoved(r)) => {
            assert!(r.user_name.is_none());
            assert!(!r.is_bot);
        }
        other => panic!("expected ReactionRemoved, got {other:?}"),
    }
}

#[test]
fn test_parse_own_reaction_flagged_as_bot() {
    let data = serde_json::json!({
        "user_id": "900",
        "channel_id": "222",
        "message_id": "444",
        "emoji": {"id": null, "name": "1\u{fe0f}\u{20e3}"},
    });
    match parse_dispatch("MESSAGE_REACTION_ADD", data, Some("900")) {
        Some(PollEvent::ReactionAdded(r)) => assert!(r.is_bot),
        other => panic!("expected ReactionAdded, got {other:?}"),
    }
}

#[test]
fn test_parse_custom_emoji_reaction() {
    let data = serde_json::json!({
        "user_id": "333",
        "channel_id": "222",
        "message_id": "444",
        "emoji": {"id": "777", "name": "partyparrot"},
    });
    match parse_dispatch("MESSAGE_REACTION_ADD", data, None) {
        Some(PollEvent::ReactionAdded(r)) => assert_eq!(r.emoji, "partyparrot"),
        other => panic!("expected ReactionAdded, got {other:?}"),
    }
}

#[test]
fn test_parse_unknown_and_malformed_dispatches() {
    assert!(parse_dispatch("TYPING_START", serde_json::json!({}), None).is_none());
    assert!(parse_dispatch("MESSAGE_CREATE", serde_json::json!({"id": "1"}), None).is_none());
}

#[test]
fn test_poll_embed_fields() {
    let options = vec!["Pizza".to_string(), "Sushi".to_string()];
    let embed = poll_embed("Lunch?", &options);
    assert_eq!(embed.title, "Lunch?");
    assert_eq!(embed.description, "React to vote!");
    assert_eq!(embed.fields.len(), 2);
    assert_eq!(embed.fields[0].name, "1\u{fe0f}\u{20e3}");
    assert_eq!(embed.fields[1].value, "Sushi");
    assert!(!embed.fields[1].inline);

    let json = serde_json::to_value(&embed).unwrap();
    assert_eq!(json["fields"][0]["value"], "Pizza");
}

#[test]
fn test_poll_embed_truncates_long_title() {
    let question = "é".repeat(300);
    let embed = poll_embed(&question, &[]);
    assert_eq!(embed.title.chars().count(), 256);
    assert!(embed.fields.is_empty());
}

#[test]
fn test_reaction_path_encodes_emoji() {
    let anchor = pollcast_core::event::MessageRef {
        channel_id: "222".into(),
        message_id: "444".into(),
    };
    assert_eq!(
        reaction_path(&anchor, "1\u{fe0f}\u{20e3}"),
        "channels/222/messages/444/reactions/1%EF%B8%8F%E2%83%A3/@me"
    );
}

#[tokio::test]
async fn test_start_without_token_fails() {
    let channel = DiscordChannel::new(DiscordConfig::default());
    assert!(matches!(
        channel.start().await,
        Err(PollcastError::Config(_))
    ));
}

#[test]
fn test_backoff_doubles_until_capped() {
    assert_eq!(next_backoff(1, false), (1, 2));
    assert_eq!(next_backoff(8, false), (8, 16));
    assert_eq!(next_backoff(60, false), (60, 60));
}

#[test]
fn test_backoff_restarts_after_ready_session() {
    // A long healthy session that drops must not inherit old failures.
    assert_eq!(next_backoff(60, true), (1, 2));
    assert_eq!(next_backoff(1, true), (1, 2));
}

#[test]
fn test_unacknowledged_heartbeat_is_detected() {
    let mut acks = HeartbeatState::default();
    assert!(acks.beat());
    acks.ack();
    assert!(acks.beat());
    // No ACK arrived for the last beat.
    assert!(!acks.beat());
}

#[tokio::test]
async fn test_stalled_rest_call_times_out() {
    // Accepts connections and never answers.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let mut channel = DiscordChannel::new(DiscordConfig {
        bot_token: "token".into(),
        ..DiscordConfig::default()
    });
    channel.api_base = format!("http://{addr}");
    channel.request_timeout = std::time::Duration::from_millis(100);

    let result = tokio::time::timeout(std::time::Duration::from_secs(5), channel.user_name("42"))
        .await
        .expect("user lookup ignored its request timeout");
    assert!(matches!(result, Err(PollcastError::Channel(_))));
}
