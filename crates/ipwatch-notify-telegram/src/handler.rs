//! Authorization and execution of Telegram commands.

use std::num::NonZeroUsize;

use ipwatch_core::IpWatchEngine;
use ipwatch_core::report;
use teloxide::types::ChatId;
use tracing::{info, warn};

use crate::command::{CommandParseError, IpWatchCommand, command_help, parse_command};

/// Process a message and return a response if it's an authorized command.
///
/// Returns `None` for:
/// - Messages from unauthorized chats
/// - Messages that are not commands (don't start with `/`)
///
/// Returns `Some(response)` for:
/// - Valid commands from the authorized chat
/// - Invalid commands (with error message and help)
pub async fn command_response_for_message(
    text: &str,
    incoming_chat: ChatId,
    allowed_chat: ChatId,
    engine: &IpWatchEngine,
) -> Option<String> {
    if !is_authorized_chat(incoming_chat, allowed_chat) {
        return None;
    }

    match parse_command(text) {
        Ok(command) => Some(execute(command, engine).await),
        Err(CommandParseError::NotACommand) => None,
        Err(err) => Some(format!("Invalid command: {err}\n\n{}", command_help())),
    }
}

/// Check if a chat is authorized to send commands.
fn is_authorized_chat(incoming_chat: ChatId, allowed_chat: ChatId) -> bool {
    if incoming_chat == allowed_chat {
        return true;
    }

    warn!(
        chat_id = incoming_chat.0,
        "Ignoring Telegram message from unauthorized chat"
    );
    false
}

/// Run a parsed command against the engine and render the reply
pub async fn execute(command: IpWatchCommand, engine: &IpWatchEngine) -> String {
    match command {
        IpWatchCommand::Start => format!(
            "👋 ipwatch is watching this host's public IP address.\n\n{}",
            command_help()
        ),
        IpWatchCommand::Help => command_help().to_string(),
        IpWatchCommand::Ip => match engine.get_latest().await {
            Ok(latest) => report::latest_message(latest.as_ref()),
            Err(e) => history_unavailable(&e),
        },
        IpWatchCommand::History(count) => {
            let count = history_count(count, engine);
            match engine.get_recent(count).await {
                Ok(recent) => report::recent_message(&recent),
                Err(e) => history_unavailable(&e),
            }
        }
        IpWatchCommand::Check => {
            info!("Check requested via Telegram");
            match engine.check_now().await {
                Ok(outcome) => report::outcome_message(&outcome),
                Err(e) => format!("⚠️ Check failed: {e}"),
            }
        }
    }
}

/// Requested count, or the default, capped at the engine maximum
fn history_count(requested: Option<usize>, engine: &IpWatchEngine) -> NonZeroUsize {
    requested
        .and_then(NonZeroUsize::new)
        .unwrap_or(engine.recent_default())
        .min(engine.recent_max())
}

fn history_unavailable(error: &ipwatch_core::Error) -> String {
    warn!("History query failed: {}", error);
    format!("⚠️ Could not read the IP history: {error}")
}
