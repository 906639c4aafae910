//! Telegram notifier
//!
//! Delivers one plain-text message per call. No queueing and no retries:
//! the caller records the outcome as a delivery status.

use ipwatch_core::config::NotifierConfig;
use ipwatch_core::traits::Notifier;
use ipwatch_core::{Error, Result};
use std::fmt;
use teloxide::prelude::*;
use tracing::{debug, warn};

/// Telegram notifier that sends messages to a single chat
#[derive(Clone)]
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    /// Create a notifier for `chat_id` using `bot_token`
    pub fn new(bot_token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(bot_token),
            chat_id: ChatId(chat_id),
        }
    }

    /// Create a notifier from configuration
    pub fn from_config(config: &NotifierConfig) -> Result<Self> {
        config.validate()?;

        match config {
            NotifierConfig::Telegram { bot_token, chat_id } => {
                Ok(Self::new(bot_token.clone(), *chat_id))
            }
        }
    }

    /// The bot handle, shared with the command listener
    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }
}

impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("bot_token", &"<REDACTED>")
            .field("chat_id", &self.chat_id.0)
            .finish()
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, message: &str) -> Result<()> {
        match self.bot.send_message(self.chat_id, message).await {
            Ok(_) => {
                debug!(chat_id = self.chat_id.0, "Telegram message delivered");
                Ok(())
            }
            Err(e) => {
                let reason = redact_token(&e.to_string(), self.bot.token());
                warn!(chat_id = self.chat_id.0, "Failed to send Telegram message: {}", reason);
                Err(Error::delivery(format!("Telegram API error: {}", reason)))
            }
        }
    }

    fn notifier_name(&self) -> &'static str {
        "telegram"
    }
}

/// Strip the bot token from error text (request URLs embed it)
pub(crate) fn redact_token(text: &str, token: &str) -> String {
    if token.is_empty() {
        return text.to_string();
    }
    text.replace(token, "<REDACTED>")
}
