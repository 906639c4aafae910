// # ipwatchd - public IP watch daemon
//
// A thin integration layer over ipwatch-core:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP resolver, Telegram notifier and history store
// 4. Running a startup check, the optional timer and the bot commands
//
// Detection rules, persistence and rendering live in the library crates.
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// ### Telegram (required)
// - `TELEGRAM_TOKEN`: Bot API token
// - `TELEGRAM_CHAT_ID`: Chat receiving alerts; the only chat allowed to send commands
//
// ### History
// - `IPWATCH_HISTORY_STORE`: Type of history store (file, memory)
// - `IPWATCH_HISTORY_PATH`: Path to the history file (default: data/ip_history.json)
//
// ### Resolver
// - `IPWATCH_IPV4_URL`: IPv4 lookup endpoint (default: https://api.ipify.org)
// - `IPWATCH_IPV6_URL`: IPv6 lookup endpoint (default: https://api64.ipify.org)
// - `IPWATCH_HTTP_TIMEOUT_SECS`: Per-request timeout (default: 10)
//
// ### Engine
// - `IPWATCH_RESOLVE_TIMEOUT_SECS`: Bound on one resolve (default: 15)
// - `IPWATCH_CHECK_INTERVAL_SECS`: Timer-triggered checks (unset: startup and /check only)
// - `IPWATCH_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export TELEGRAM_TOKEN=123456:ABC-your-bot-token
// export TELEGRAM_CHAT_ID=123456789
// export IPWATCH_CHECK_INTERVAL_SECS=300
//
// ipwatchd
// ```

use anyhow::{Context, Result};
use ipwatch_core::config::{DEFAULT_HISTORY_PATH, DEFAULT_IPV4_URL, DEFAULT_IPV6_URL};
use ipwatch_core::state::build_history_store;
use ipwatch_core::{
    EngineConfig, HistoryStoreConfig, IpWatchConfig, IpWatchEngine, NotifierConfig,
    ResolverConfig, report,
};
use ipwatch_ip_http::HttpAddressResolver;
use ipwatch_notify_telegram::{TelegramNotifier, run_command_listener};
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::IntervalStream;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum IpwatchExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<IpwatchExitCode> for ExitCode {
    fn from(code: IpwatchExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// How long the timer task may take to finish after shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Application configuration
struct Config {
    telegram_token: String,
    telegram_chat_id: i64,
    history_store_type: String,
    history_path: String,
    ipv4_url: String,
    ipv6_url: String,
    http_timeout_secs: u64,
    resolve_timeout_secs: u64,
    check_interval_secs: Option<u64>,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let telegram_token = lookup("TELEGRAM_TOKEN")
            .filter(|s| !s.trim().is_empty())
            .context(
                "TELEGRAM_TOKEN is required. \
                Set it via: export TELEGRAM_TOKEN=your_bot_token",
            )?;

        let raw_chat_id = lookup("TELEGRAM_CHAT_ID").context(
            "TELEGRAM_CHAT_ID is required. \
            Set it via: export TELEGRAM_CHAT_ID=your_chat_id",
        )?;
        let telegram_chat_id = raw_chat_id.trim().parse::<i64>().with_context(|| {
            format!(
                "TELEGRAM_CHAT_ID must be an integer. Got: '{}'",
                raw_chat_id
            )
        })?;

        Ok(Self {
            telegram_token: telegram_token.trim().to_string(),
            telegram_chat_id,
            history_store_type: lookup("IPWATCH_HISTORY_STORE")
                .unwrap_or_else(|| "file".to_string()),
            history_path: lookup("IPWATCH_HISTORY_PATH")
                .unwrap_or_else(|| DEFAULT_HISTORY_PATH.to_string()),
            ipv4_url: lookup("IPWATCH_IPV4_URL").unwrap_or_else(|| DEFAULT_IPV4_URL.to_string()),
            ipv6_url: lookup("IPWATCH_IPV6_URL").unwrap_or_else(|| DEFAULT_IPV6_URL.to_string()),
            http_timeout_secs: parse_var(&lookup, "IPWATCH_HTTP_TIMEOUT_SECS")?.unwrap_or(10),
            resolve_timeout_secs: parse_var(&lookup, "IPWATCH_RESOLVE_TIMEOUT_SECS")?
                .unwrap_or(15),
            check_interval_secs: parse_var(&lookup, "IPWATCH_CHECK_INTERVAL_SECS")?,
            log_level: lookup("IPWATCH_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// Validate the configuration
    ///
    /// Daemon-level checks first; the library configuration validates the rest.
    fn validate(&self) -> Result<()> {
        match self.history_store_type.as_str() {
            "file" | "memory" => {}
            _ => anyhow::bail!(
                "IPWATCH_HISTORY_STORE '{}' is not supported. \
                Supported types: file, memory",
                self.history_store_type
            ),
        }

        if self.http_timeout_secs == 0 || self.http_timeout_secs > 300 {
            anyhow::bail!(
                "IPWATCH_HTTP_TIMEOUT_SECS must be between 1 and 300 seconds. Got: {}",
                self.http_timeout_secs
            );
        }

        for (name, url) in [
            ("IPWATCH_IPV4_URL", &self.ipv4_url),
            ("IPWATCH_IPV6_URL", &self.ipv6_url),
        ] {
            if url.starts_with("http://") {
                eprintln!(
                    "WARNING: {} uses HTTP (not HTTPS). \
                    Answers can be spoofed on the path. Consider using HTTPS.",
                    name
                );
            }
        }

        self.log_level()?;

        self.to_ipwatch_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Parse the log level
    fn log_level(&self) -> Result<Level> {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Ok(Level::TRACE),
            "debug" => Ok(Level::DEBUG),
            "info" => Ok(Level::INFO),
            "warn" => Ok(Level::WARN),
            "error" => Ok(Level::ERROR),
            _ => anyhow::bail!(
                "IPWATCH_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }
    }

    /// Build the library configuration
    fn to_ipwatch_config(&self) -> IpWatchConfig {
        let history = match self.history_store_type.as_str() {
            "memory" => HistoryStoreConfig::Memory,
            _ => HistoryStoreConfig::File {
                path: self.history_path.clone(),
            },
        };

        IpWatchConfig {
            resolver: ResolverConfig::Http {
                ipv4_url: self.ipv4_url.clone(),
                ipv6_url: self.ipv6_url.clone(),
                timeout_secs: self.http_timeout_secs,
            },
            notifier: NotifierConfig::Telegram {
                bot_token: self.telegram_token.clone(),
                chat_id: self.telegram_chat_id,
            },
            history,
            engine: EngineConfig {
                resolve_timeout_secs: self.resolve_timeout_secs,
                check_interval_secs: self.check_interval_secs,
                ..EngineConfig::default()
            },
        }
    }
}

/// Parse an optional numeric variable; a present but malformed value is an error
fn parse_var<T: FromStr>(lookup: impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<T>> {
    match lookup(name) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow::anyhow!("{} must be a positive integer. Got: '{}'", name, raw)),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return IpwatchExitCode::ConfigError.into();
        }
    };

    // Validate configuration
    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return IpwatchExitCode::ConfigError.into();
    }

    // Initialize tracing
    let log_level = config.log_level().unwrap_or(Level::INFO);
    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return IpwatchExitCode::ConfigError.into();
    }

    let ipwatch_config = config.to_ipwatch_config();

    info!("Starting ipwatchd daemon");
    info!("Notifier: {}", ipwatch_config.notifier.type_name());
    info!("History store: {:?}", ipwatch_config.history);

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return IpwatchExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(ipwatch_config).await {
            error!("Daemon error: {}", e);
            IpwatchExitCode::RuntimeError
        } else {
            IpwatchExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Run the daemon
async fn run_daemon(config: IpWatchConfig) -> Result<()> {
    let store = build_history_store(&config.history);
    let resolver = HttpAddressResolver::from_config(&config.resolver)?;
    let notifier = TelegramNotifier::from_config(&config.notifier)?;
    let bot = notifier.bot();
    let allowed_chat = notifier.chat_id();

    let engine = Arc::new(IpWatchEngine::new(
        Box::new(resolver),
        Box::new(notifier),
        store,
        config.engine.clone(),
    )?);

    // Startup check; a failure here is reported, not fatal
    match engine.check_now().await {
        Ok(outcome) => info!("Startup check: {}", outcome.label()),
        Err(e) => error!("Startup check failed: {}", e),
    }
    match engine.get_latest().await {
        Ok(latest) => info!("{}", report::latest_message(latest.as_ref())),
        Err(e) => warn!("History unavailable: {}", e),
    }

    // Optional timer trigger
    let (timer_shutdown_tx, timer_shutdown_rx) = tokio::sync::oneshot::channel();
    let timer = config.engine.check_interval_secs.map(|secs| {
        let period = Duration::from_secs(secs);
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!("Checking every {}s", secs);

        let engine = Arc::clone(&engine);
        tokio::spawn(async move {
            let triggers = IntervalStream::new(interval).map(|_| ());
            engine
                .run_with_shutdown(triggers, Some(timer_shutdown_rx))
                .await
        })
    });

    // Bot commands until a shutdown signal
    tokio::select! {
        _ = run_command_listener(bot, allowed_chat, Arc::clone(&engine)) => {
            info!("Command listener finished");
        }
        signal = wait_for_shutdown_signal() => {
            let signal = signal?;
            info!("Received shutdown signal: {}", signal);
        }
    }

    info!("Shutting down daemon");

    if let Some(handle) = timer {
        let _ = timer_shutdown_tx.send(());
        match tokio::time::timeout(SHUTDOWN_TIMEOUT, handle).await {
            Ok(Ok(result)) => result?,
            Ok(Err(e)) => anyhow::bail!("Timer task failed: {}", e),
            Err(_) => anyhow::bail!("Shutdown timeout after {:?}", SHUTDOWN_TIMEOUT),
        }
    }

    Ok(())
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    let name = tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    };
    Ok(name)
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown_signal() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
