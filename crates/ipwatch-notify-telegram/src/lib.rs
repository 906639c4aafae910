// # Telegram channel for ipwatch
//
// Two halves sharing one bot:
//
// - **TelegramNotifier**: implements `Notifier`, sends change alerts as
//   plain text to the configured chat
// - **Command front-end**: long-polls for bot commands and answers
//   `/ip`, `/history [n]` and `/check` from the configured chat only
//
// The front-end only calls `IpWatchEngine` operations; it never touches
// the history file directly.

pub mod command;
pub mod handler;
pub mod listener;
pub mod notifier;

pub use command::{CommandParseError, IpWatchCommand, bot_commands, command_help, parse_command};
pub use handler::command_response_for_message;
pub use listener::run_command_listener;
pub use notifier::TelegramNotifier;
