//! Poll commands typed in chat, and the replies for rejected ones.


use pollcast_core::{marker::MAX_OPTIONS, poll::PollError};

/// Known bot commands.
#[derive(Debug, PartialEq, Eq)]
pub enum Command {
    /// `create <question>`
    Create(String),
    /// `add <option text>`
    Add(String),
    End,
    Result,
}

impl Command {
    /// Parse a command from message text. Returns `None` for anything that
    /// is not one of ours, so ordinary chatter passes through untouched.
    pub fn parse(text: &str, prefix: &str) -> Option<Self> {
        let rest = text.trim().strip_prefix(prefix)?;
        let (head, arg) = match rest.split_once(char::is_whitespace) {
            Some((head, arg)) => (head, arg.trim()),
            None => (rest, ""),
        };
        // Strip @botname suffix (e.g. "/end@pollcast" → "/end").
        let cmd = head.split('@').next().unwrap_or(head);
        match cmd {
            "create" => Some(Self::Create(arg.to_string())),
            "add" => Some(Self::Add(arg.to_string())),
            "end" => Some(Self::End),
            "result" => Some(Self::Result),
            _ => None,
        }
    }
}

/// Reply for a rejected `create`.
pub fn create_rejected(err: &PollError) -> String {
    match err {
        PollError::AlreadyActive => {
            "A poll is already active. Please end it before creating a new one.".to_string()
        }
        other => other.to_string(),
    }
}

/// Reply for a rejected `add`.
pub fn add_rejected(err: &PollError) -> String {
    match err {
        PollError::NotActive => "No active poll to add options to.".to_string(),
        PollError::OptionLimitExceeded { .. } => {
            format!("You can't add more than {MAX_OPTIONS} options (Discord emoji limit).")
        }
        other => other.to_string(),
    }
}

/// Reply for a rejected `end`.
pub fn end_rejected(err: &PollError) -> String {
    match err {
        PollError::NotActive => "No active poll to end.".to_string(),
        other => other.to_string(),
    }
}

/// Reply for a rejected `result`.
pub fn result_rejected(err: &PollError) -> String {
    match err {
        PollError::StillActive => {
            "Poll is still active. End it before viewing the results.".to_string()
        }
        PollError::NoResults => "No poll results to show.".to_string(),
        other => other.to_string(),
    }
}

pub fn created(prefix: &str) -> String {
    format!("Use {prefix}add <option> to add poll options.")
}

pub fn ended(prefix: &str) -> String {
    format!("Poll ended. Use {prefix}result to see the results.")
}

pub fn usage(prefix: &str, command: &str, arg: &str) -> String {
    format!("Usage: {prefix}{command} <{arg}>")
}
