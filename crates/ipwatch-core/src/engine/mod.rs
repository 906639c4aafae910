//! ipwatch engine
//!
//! The IpWatchEngine is responsible for:
//! - Serializing detection runs (one check in flight at a time)
//! - Exposing the operations a command front-end needs
//! - Running one check per externally supplied trigger
//!
//! ## Architecture
//!
//! ```text
//!  triggers ──┐        ┌───────────────┐
//!             ├──────► │ IpWatchEngine │ ◄────── front-end commands
//!  /check ────┘        └───────────────┘
//!                        │           │
//!                        ▼           ▼
//!              ┌────────────────┐ ┌──────────────┐
//!              │ ChangeDetector │ │ QueryService │
//!              └────────────────┘ └──────────────┘
//!                        │           │
//!                        ▼           ▼
//!                     ┌────────────────┐
//!                     │  HistoryStore  │
//!                     └────────────────┘
//! ```
//!
//! The engine never schedules checks itself. The caller decides when a
//! trigger fires (startup, timer, manual command).

use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, info};

use crate::config::EngineConfig;
use crate::detector::{ChangeDetector, DetectionOutcome};
use crate::error::{Error, Result};
use crate::query::QueryService;
use crate::snapshot::AddressSnapshot;
use crate::traits::{AddressResolver, HistoryStore, Notifier};

/// Core ipwatch engine
///
/// ## Threading
///
/// Detection runs take an async mutex, so a manual `/check` and a timer
/// tick never interleave their read-modify-write of the history. Queries
/// do not take the lock; stores guarantee atomic saves.
pub struct IpWatchEngine {
    /// Change detection (the only writer)
    detector: ChangeDetector,

    /// Read-only reporting
    queries: QueryService,

    /// Serializes detection runs
    check_lock: Mutex<()>,

    /// Entries returned by a history query without a count
    recent_default: NonZeroUsize,

    /// Largest count a history query may ask for
    recent_max: NonZeroUsize,
}

impl IpWatchEngine {
    /// Create a new engine
    ///
    /// # Parameters
    ///
    /// - `resolver`: Address resolver implementation
    /// - `notifier`: Notifier implementation
    /// - `store`: History store shared by detection and queries
    /// - `config`: Engine settings
    pub fn new(
        resolver: Box<dyn AddressResolver>,
        notifier: Box<dyn Notifier>,
        store: Arc<dyn HistoryStore>,
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        let recent_default = NonZeroUsize::new(config.recent_default)
            .ok_or_else(|| Error::config("Default history count must be > 0"))?;
        let recent_max = NonZeroUsize::new(config.recent_max)
            .ok_or_else(|| Error::config("Maximum history count must be > 0"))?;

        let detector = ChangeDetector::new(
            resolver,
            notifier,
            Arc::clone(&store),
            Duration::from_secs(config.resolve_timeout_secs),
        );

        Ok(Self {
            detector,
            queries: QueryService::new(store),
            check_lock: Mutex::new(()),
            recent_default,
            recent_max,
        })
    }

    /// Run a detection now
    ///
    /// Waits for any check already in progress to finish first.
    pub async fn check_now(&self) -> Result<DetectionOutcome> {
        let _guard = self.check_lock.lock().await;
        self.detector.check_and_update().await
    }

    /// The most recent snapshot, `None` when nothing is recorded
    pub async fn get_latest(&self) -> Result<Option<AddressSnapshot>> {
        self.queries.latest().await
    }

    /// Up to the last `n` snapshots, most recent first
    pub async fn get_recent(&self, n: NonZeroUsize) -> Result<Vec<AddressSnapshot>> {
        self.queries.recent(n).await
    }

    pub fn recent_default(&self) -> NonZeroUsize {
        self.recent_default
    }

    pub fn recent_max(&self) -> NonZeroUsize {
        self.recent_max
    }

    /// Run one check per trigger until the stream ends or Ctrl-C
    ///
    /// Errors from individual checks are logged and do not stop the loop.
    pub async fn run<S>(&self, triggers: S) -> Result<()>
    where
        S: Stream<Item = ()> + Send,
    {
        self.run_internal(triggers, None).await
    }

    /// Like [`IpWatchEngine::run`], stopped by `shutdown_rx` instead of Ctrl-C
    ///
    /// With `None` this behaves exactly like `run()`.
    pub async fn run_with_shutdown<S>(
        &self,
        triggers: S,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()>
    where
        S: Stream<Item = ()> + Send,
    {
        self.run_internal(triggers, shutdown_rx).await
    }

    async fn run_internal<S>(
        &self,
        triggers: S,
        shutdown_rx: Option<tokio::sync::oneshot::Receiver<()>>,
    ) -> Result<()>
    where
        S: Stream<Item = ()> + Send,
    {
        tokio::pin!(triggers);

        let mut shutdown: Pin<Box<dyn Future<Output = ()> + Send>> = match shutdown_rx {
            Some(rx) => Box::pin(async move {
                let _ = rx.await;
            }),
            None => Box::pin(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl-C: {}", e);
                    std::future::pending::<()>().await;
                }
            }),
        };

        info!("Waiting for check triggers");

        loop {
            tokio::select! {
                trigger = triggers.next() => match trigger {
                    Some(()) => self.handle_trigger().await,
                    None => {
                        info!("Trigger stream ended");
                        break;
                    }
                },

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        Ok(())
    }

    /// Handle a single trigger
    async fn handle_trigger(&self) {
        match self.check_now().await {
            Ok(outcome) => debug!("Check finished: {}", outcome.label()),
            Err(e) => error!("Check failed: {}", e),
        }
    }
}
