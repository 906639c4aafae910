//! Telegram command parsing.

use std::fmt;

/// Supported bot commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IpWatchCommand {
    Start,
    Help,
    /// Last known addresses
    Ip,
    /// Recent changes; `None` uses the engine default
    History(Option<usize>),
    /// Run a detection now
    Check,
}

/// Parse error for Telegram command messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandParseError {
    NotACommand,
    UnknownCommand(String),
    InvalidCount(String),
}

impl fmt::Display for CommandParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
            Self::InvalidCount(value) => {
                write!(f, "invalid count `{value}` (use a positive number)")
            }
        }
    }
}

impl std::error::Error for CommandParseError {}

/// Parse a Telegram message into a bot command
///
/// A `@botname` suffix on the command word is ignored. Commands are
/// case-sensitive.
pub fn parse_command(text: &str) -> Result<IpWatchCommand, CommandParseError> {
    let mut parts = text.split_whitespace();
    let Some(raw_command) = parts.next() else {
        return Err(CommandParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(CommandParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/start" => Ok(IpWatchCommand::Start),
        "/help" => Ok(IpWatchCommand::Help),
        "/ip" => Ok(IpWatchCommand::Ip),
        "/check" => Ok(IpWatchCommand::Check),
        "/history" => match parts.next() {
            None => Ok(IpWatchCommand::History(None)),
            Some(raw) => match raw.parse::<usize>() {
                Ok(count) if count > 0 => Ok(IpWatchCommand::History(Some(count))),
                _ => Err(CommandParseError::InvalidCount(raw.to_string())),
            },
        },
        other => Err(CommandParseError::UnknownCommand(other.to_string())),
    }
}

/// Help text returned by `/start`, `/help` and after parse errors
pub const fn command_help() -> &'static str {
    "📋 Commands\n\n\
    /ip - 📍 Last known public IP\n\
    /history [n] - 🕘 Last n IP changes (default 5)\n\
    /check - 🔄 Check the public IP now\n\
    /help - ❓ Show all commands"
}

/// Bot commands for Telegram menu registration.
///
/// Returns tuples of (command, description) for `set_my_commands`.
pub fn bot_commands() -> Vec<(&'static str, &'static str)> {
    vec![
        ("ip", "Last known public IP"),
        ("history", "Recent IP changes"),
        ("check", "Check the public IP now"),
        ("help", "Show all commands"),
    ]
}
