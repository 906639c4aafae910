//! Long-polling command listener.

use std::sync::Arc;

use ipwatch_core::IpWatchEngine;
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{error, info, warn};

use crate::command::bot_commands;
use crate::handler::command_response_for_message;

/// Answer bot commands from `allowed_chat` until Ctrl-C
///
/// Runs in the caller's task and returns once teloxide's polling loop has
/// shut down.
pub async fn run_command_listener(bot: Bot, allowed_chat: ChatId, engine: Arc<IpWatchEngine>) {
    // Register commands with Telegram so they appear in the "/" menu
    if let Err(e) = register_bot_commands(&bot).await {
        warn!(error = %e, "Failed to register bot commands with Telegram");
    }

    info!(chat_id = allowed_chat.0, "Telegram command listener started");

    teloxide::repl(bot, move |bot: Bot, msg: Message| {
        let engine = Arc::clone(&engine);
        async move {
            let Some(text) = msg.text() else {
                return respond(());
            };

            if let Some(response) =
                command_response_for_message(text, msg.chat.id, allowed_chat, &engine).await
            {
                if let Err(e) = bot.send_message(msg.chat.id, response).await {
                    error!(error = %e, "Failed to send Telegram command response");
                }
            }

            respond(())
        }
    })
    .await;

    info!("Telegram command listener stopped");
}

/// Register bot commands with Telegram for the "/" menu.
async fn register_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    let commands: Vec<BotCommand> = bot_commands()
        .into_iter()
        .map(|(cmd, desc)| BotCommand::new(cmd, desc))
        .collect();

    bot.set_my_commands(commands).await?;
    info!("Registered bot commands with Telegram");
    Ok(())
}
