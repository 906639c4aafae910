//! Test doubles and common utilities for contract tests
//!
//! This module provides minimal test doubles that record how the core
//! drives its collaborators.

#![allow(dead_code)]

use ipwatch_core::error::{Error, Result};
use ipwatch_core::traits::{AddressResolver, HistoryStore, Notifier};
use ipwatch_core::{
    AddressCandidate, AddressSnapshot, EngineConfig, History, Ipv6Record, MemoryHistoryStore,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A resolver that replays a fixed script of results
///
/// Once the script is exhausted the last result is repeated.
pub struct ScriptedResolver {
    script: Arc<Mutex<VecDeque<Result<AddressCandidate>>>>,
    last: Arc<Mutex<Option<AddressCandidate>>>,
    /// Call counter for resolve()
    call_count: Arc<AtomicUsize>,
}

impl ScriptedResolver {
    pub fn new(script: Vec<Result<AddressCandidate>>) -> Self {
        Self {
            script: Arc::new(Mutex::new(script.into())),
            last: Arc::new(Mutex::new(None)),
            call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A resolver that always answers with `candidate`
    pub fn fixed(candidate: AddressCandidate) -> Self {
        Self::new(vec![Ok(candidate)])
    }

    /// Get the number of times resolve() was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Create a resolver that shares script and counters with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            script: Arc::clone(&other.script),
            last: Arc::clone(&other.last),
            call_count: Arc::clone(&other.call_count),
        }
    }
}

#[async_trait::async_trait]
impl AddressResolver for ScriptedResolver {
    async fn resolve(&self) -> Result<AddressCandidate> {
        self.call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Ok(candidate)) => {
                *self.last.lock().unwrap() = Some(candidate.clone());
                Ok(candidate)
            }
            Some(Err(e)) => Err(e),
            None => Ok(self.last.lock().unwrap().clone().unwrap_or_default()),
        }
    }

    fn resolver_name(&self) -> &'static str {
        "scripted"
    }
}

/// A resolver that takes longer than any reasonable timeout
pub struct StalledResolver {
    delay: Duration,
}

impl StalledResolver {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait::async_trait]
impl AddressResolver for StalledResolver {
    async fn resolve(&self) -> Result<AddressCandidate> {
        tokio::time::sleep(self.delay).await;
        Ok(AddressCandidate::dual_stack("9.9.9.9", "::9"))
    }

    fn resolver_name(&self) -> &'static str {
        "stalled"
    }
}

/// A notifier that records every message
///
/// When given a store, it also records how many entries that store held at
/// the moment each message was sent.
pub struct RecordingNotifier {
    messages: Arc<Mutex<Vec<String>>>,
    history_len_at_send: Arc<Mutex<Vec<usize>>>,
    inspected_store: Option<Arc<dyn HistoryStore>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
            history_len_at_send: Arc::new(Mutex::new(Vec::new())),
            inspected_store: None,
            fail: false,
        }
    }

    /// A notifier whose every delivery fails (after recording the attempt)
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }

    /// Inspect `store` at every send
    pub fn inspecting(mut self, store: Arc<dyn HistoryStore>) -> Self {
        self.inspected_store = Some(store);
        self
    }

    /// Get the messages sent so far
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// Get the number of send attempts
    pub fn send_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    /// History length seen by each send
    pub fn history_len_at_send(&self) -> Vec<usize> {
        self.history_len_at_send.lock().unwrap().clone()
    }

    /// Create a notifier that shares recordings with an existing one
    pub fn sharing_counters_with(other: &Self) -> Self {
        Self {
            messages: Arc::clone(&other.messages),
            history_len_at_send: Arc::clone(&other.history_len_at_send),
            inspected_store: other.inspected_store.clone(),
            fail: other.fail,
        }
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, text: &str) -> Result<()> {
        if let Some(store) = &self.inspected_store {
            let len = store.load().await?.len();
            self.history_len_at_send.lock().unwrap().push(len);
        }

        self.messages.lock().unwrap().push(text.to_string());

        if self.fail {
            return Err(Error::delivery("channel unreachable"));
        }
        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "recording"
    }
}

/// A store that tracks calls and can refuse to save
#[derive(Clone)]
pub struct MockHistoryStore {
    inner: MemoryHistoryStore,
    /// Call counter for load()
    load_call_count: Arc<AtomicUsize>,
    /// Call counter for save()
    save_call_count: Arc<AtomicUsize>,
    fail_saves: bool,
}

impl MockHistoryStore {
    pub fn new(history: History) -> Self {
        Self {
            inner: MemoryHistoryStore::with_history(history),
            load_call_count: Arc::new(AtomicUsize::new(0)),
            save_call_count: Arc::new(AtomicUsize::new(0)),
            fail_saves: false,
        }
    }

    /// A store whose save() always fails
    pub fn failing_saves(history: History) -> Self {
        Self {
            fail_saves: true,
            ..Self::new(history)
        }
    }

    /// Get the number of times load() was called
    pub fn load_call_count(&self) -> usize {
        self.load_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times save() was called
    pub fn save_call_count(&self) -> usize {
        self.save_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl HistoryStore for MockHistoryStore {
    async fn load(&self) -> Result<History> {
        self.load_call_count.fetch_add(1, Ordering::SeqCst);
        self.inner.load().await
    }

    async fn save(&self, history: &History) -> Result<()> {
        self.save_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_saves {
            return Err(Error::state_store("disk full"));
        }
        self.inner.save(history).await
    }

    fn store_name(&self) -> &'static str {
        "mock"
    }
}

/// Snapshot helper; `None` records the IPv6 sentinel
pub fn snapshot(ipv4: &str, ipv6: Option<&str>) -> AddressSnapshot {
    let ipv6 = match ipv6 {
        Some(addr) => Ipv6Record::Address(addr.to_string()),
        None => Ipv6Record::Unavailable,
    };
    AddressSnapshot::new(chrono::Utc::now(), ipv4, ipv6)
}

/// History helper built from `(ipv4, ipv6)` pairs in chronological order
pub fn history_of(entries: &[(&str, Option<&str>)]) -> History {
    let mut history = History::new();
    for (ipv4, ipv6) in entries {
        history.append(snapshot(ipv4, *ipv6));
    }
    history
}

/// Helper to create an EngineConfig for testing
pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        resolve_timeout_secs: 1,
        check_interval_secs: None,
        recent_default: 5,
        recent_max: 50,
    }
}
