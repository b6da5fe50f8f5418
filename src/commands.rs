//! The command table and every fixed user-facing string.
//!
//! Reply wording is a compatibility contract: downstream chats display these
//! verbatim, and the integration tests assert them byte for byte.

pub const CMD_START: &str = "/start";
pub const CMD_STOP: &str = "/stop";
pub const CMD_HELP: &str = "/help";
pub const CMD_CHATS: &str = "/chats";

pub const RESPONSE_FALLBACK: &str = "Sorry, I don't understand...";
pub const RESPONSE_CHATS_NONE: &str = "Currently no one is subscribed.";
pub const RESPONSE_CHATS_HEADER: &str = "Currently these chat have subscribed:\n";

pub const RESPONSE_HELP: &str = "I'm a bot that forwards alerts from your monitoring backend.

Available commands:
/start - Subscribe to alert notifications.
/stop - Unsubscribe from alert notifications.
/chats - List all subscribed chats.
/help - Show this help message.";

pub fn response_subscribed(first_name: &str) -> String {
    format!("Hey, {first_name}! I will now keep you up to date!\n/help")
}

pub fn response_unsubscribed(first_name: &str) -> String {
    format!("Alright, {first_name}! I won't talk to you again.\n/help")
}

/// Closed set of commands the dispatcher understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Stop,
    Help,
    Chats,
    Unknown,
}

impl Command {
    /// Exact-prefix match against the fixed token table, so `/start@botname`
    /// still routes. Anything else, including empty text, is `Unknown`.
    pub fn parse(text: &str) -> Self {
        if text.starts_with(CMD_START) {
            Self::Start
        } else if text.starts_with(CMD_STOP) {
            Self::Stop
        } else if text.starts_with(CMD_HELP) {
            Self::Help
        } else if text.starts_with(CMD_CHATS) {
            Self::Chats
        } else {
            Self::Unknown
        }
    }
}
