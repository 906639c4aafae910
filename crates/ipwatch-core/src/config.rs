//! Configuration types for ipwatch
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Default IPv4 lookup endpoint
pub const DEFAULT_IPV4_URL: &str = "https://api.ipify.org";

/// Default IPv6 lookup endpoint (answers with IPv4 when IPv6 is unreachable)
pub const DEFAULT_IPV6_URL: &str = "https://api64.ipify.org";

/// Default location of the history file
pub const DEFAULT_HISTORY_PATH: &str = "data/ip_history.json";

/// Main ipwatch configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IpWatchConfig {
    /// Address resolver configuration
    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Notification channel configuration
    pub notifier: NotifierConfig,

    /// History store configuration
    #[serde(default)]
    pub history: HistoryStoreConfig,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl IpWatchConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.resolver.validate()?;
        self.notifier.validate()?;
        self.history.validate()?;
        self.engine.validate()?;

        Ok(())
    }
}

/// Address resolver configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolverConfig {
    /// HTTP lookup services returning the caller's address
    Http {
        /// Endpoint answering with the public IPv4 address
        ipv4_url: String,
        /// Endpoint answering with the public IPv6 address
        ipv6_url: String,
        /// Per-request timeout in seconds
        #[serde(default = "default_http_timeout_secs")]
        timeout_secs: u64,
    },
}

impl ResolverConfig {
    /// Validate the resolver configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ResolverConfig::Http {
                ipv4_url,
                ipv6_url,
                timeout_secs,
            } => {
                for (name, url) in [("IPv4", ipv4_url), ("IPv6", ipv6_url)] {
                    if url.is_empty() {
                        return Err(crate::Error::config(format!(
                            "{} lookup URL cannot be empty",
                            name
                        )));
                    }
                    if !url.starts_with("https://") && !url.starts_with("http://") {
                        return Err(crate::Error::config(format!(
                            "{} lookup URL must use HTTP or HTTPS scheme. Got: {}",
                            name, url
                        )));
                    }
                }
                if *timeout_secs == 0 {
                    return Err(crate::Error::config("HTTP timeout must be > 0"));
                }
                Ok(())
            }
        }
    }
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig::Http {
            ipv4_url: DEFAULT_IPV4_URL.to_string(),
            ipv6_url: DEFAULT_IPV6_URL.to_string(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Notification channel configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotifierConfig {
    /// Telegram bot
    Telegram {
        /// Bot API token
        bot_token: String,
        /// Chat receiving notifications and allowed to send commands
        chat_id: i64,
    },
}

impl NotifierConfig {
    /// Validate the notifier configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            NotifierConfig::Telegram { bot_token, chat_id } => {
                if bot_token.is_empty() {
                    return Err(crate::Error::config("Telegram bot token cannot be empty"));
                }
                if *chat_id == 0 {
                    return Err(crate::Error::config("Telegram chat id cannot be 0"));
                }
                Ok(())
            }
        }
    }

    /// Get the notifier type name
    pub fn type_name(&self) -> &'static str {
        match self {
            NotifierConfig::Telegram { .. } => "telegram",
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        NotifierConfig::Telegram {
            bot_token: String::new(),
            chat_id: 0,
        }
    }
}

// Custom Debug implementation that hides the bot token
impl fmt::Debug for NotifierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifierConfig::Telegram { chat_id, .. } => f
                .debug_struct("Telegram")
                .field("bot_token", &"<REDACTED>")
                .field("chat_id", chat_id)
                .finish(),
        }
    }
}

/// History store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HistoryStoreConfig {
    /// JSON file
    File {
        /// Path to the history file
        path: String,
    },

    /// In-memory store (not persistent)
    Memory,
}

impl HistoryStoreConfig {
    /// Validate the history store configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            HistoryStoreConfig::File { path } if path.is_empty() => {
                Err(crate::Error::config("History file path cannot be empty"))
            }
            _ => Ok(()),
        }
    }
}

impl Default for HistoryStoreConfig {
    fn default() -> Self {
        HistoryStoreConfig::File {
            path: DEFAULT_HISTORY_PATH.to_string(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound for one resolver call (in seconds)
    ///
    /// A resolver that does not answer in time counts as a resolution
    /// failure for that check.
    #[serde(default = "default_resolve_timeout_secs")]
    pub resolve_timeout_secs: u64,

    /// Interval between timer-triggered checks (in seconds)
    ///
    /// `None` means checks only run at startup and on demand.
    #[serde(default)]
    pub check_interval_secs: Option<u64>,

    /// Number of entries returned by a history query without a count
    #[serde(default = "default_recent_default")]
    pub recent_default: usize,

    /// Largest count a history query may ask for
    #[serde(default = "default_recent_max")]
    pub recent_max: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.resolve_timeout_secs == 0 {
            return Err(crate::Error::config("Resolve timeout must be > 0"));
        }

        if let Some(interval) = self.check_interval_secs
            && !(60..=86_400).contains(&interval)
        {
            return Err(crate::Error::config(format!(
                "Check interval must be between 60 and 86400 seconds. Got: {}",
                interval
            )));
        }

        if self.recent_default == 0 || self.recent_default > self.recent_max {
            return Err(crate::Error::config(format!(
                "Default history count must be between 1 and {}. Got: {}",
                self.recent_max, self.recent_default
            )));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            resolve_timeout_secs: default_resolve_timeout_secs(),
            check_interval_secs: None,
            recent_default: default_recent_default(),
            recent_max: default_recent_max(),
        }
    }
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_resolve_timeout_secs() -> u64 {
    15
}

fn default_recent_default() -> usize {
    5
}

fn default_recent_max() -> usize {
    50
}
