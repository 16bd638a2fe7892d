//! Transient key/value caches.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use pip_container_common::config::ConfigParams;
use pip_container_common::constants::GROUP;
use pip_container_common::error::{ContainerError, Result};
use pip_container_common::types::Descriptor;
use serde_json::Value;

use crate::build::SimpleFactory;
use crate::component::{Component, Configurable};

/// Default time-to-live of a cached entry in milliseconds.
pub const DEFAULT_TIMEOUT_MS: i64 = 60_000;

/// Default maximum number of cached entries.
pub const DEFAULT_MAX_SIZE: i64 = 1_000;

/// Transient storage for values that are expensive to compute.
pub trait Cache: Send + Sync {
    /// Returns the live value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn retrieve(&self, correlation_id: Option<&str>, key: &str) -> Result<Option<Value>>;

    /// Stores `value` under `key` for `timeout`, or the cache default.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn store(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        value: Value,
        timeout: Option<Duration>,
    ) -> Result<()>;

    /// Removes the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unavailable.
    fn remove(&self, correlation_id: Option<&str>, key: &str) -> Result<()>;
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCache;

impl Cache for NullCache {
    fn retrieve(&self, _: Option<&str>, _: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    fn store(&self, _: Option<&str>, _: &str, _: Value, _: Option<Duration>) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _: Option<&str>, _: &str) -> Result<()> {
        Ok(())
    }
}

impl Component for NullCache {}

#[derive(Debug)]
struct Entry {
    value: Value,
    expires_at: Instant,
}

/// Bounded in-process cache with per-entry expiration.
///
/// When full, the entry closest to expiring is evicted.
#[derive(Debug)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
    timeout: Duration,
    max_size: usize,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS.unsigned_abs()),
            max_size: usize::try_from(DEFAULT_MAX_SIZE).unwrap_or(usize::MAX),
        }
    }
}

impl MemoryCache {
    /// Creates an empty cache with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default time-to-live of an entry.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Maximum number of entries.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Returns `true` if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

fn positive(config: &ConfigParams, keys: &[&str], default: i64) -> Result<i64> {
    let Some(raw) = config.get_first(keys) else {
        return Ok(default);
    };
    match raw.trim().parse::<i64>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ContainerError::config(format!(
            "{} must be a positive integer, got '{raw}'",
            keys.first().copied().unwrap_or_default()
        ))),
    }
}

impl Configurable for MemoryCache {
    fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        let timeout = positive(config, &["timeout", "options.timeout"], DEFAULT_TIMEOUT_MS)?;
        let max_size = positive(config, &["max_size", "options.max_size"], DEFAULT_MAX_SIZE)?;
        self.timeout = Duration::from_millis(timeout.unsigned_abs());
        self.max_size = usize::try_from(max_size).unwrap_or(usize::MAX);
        Ok(())
    }
}

impl Cache for MemoryCache {
    fn retrieve(&self, _: Option<&str>, key: &str) -> Result<Option<Value>> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        if let Some(entry) = entries.get(key).filter(|e| e.expires_at > now) {
            return Ok(Some(entry.value.clone()));
        }
        let _ = entries.remove(key);
        Ok(None)
    }

    fn store(
        &self,
        correlation_id: Option<&str>,
        key: &str,
        value: Value,
        timeout: Option<Duration>,
    ) -> Result<()> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        entries.retain(|_, e| e.expires_at > now);

        if !entries.contains_key(key) && entries.len() >= self.max_size {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.expires_at)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(correlation_id, key = %oldest, "cache full, evicting entry");
                let _ = entries.remove(&oldest);
            }
        }

        let _ = entries.insert(
            key.to_owned(),
            Entry {
                value,
                expires_at: now + timeout.unwrap_or(self.timeout),
            },
        );
        Ok(())
    }

    fn remove(&self, _: Option<&str>, key: &str) -> Result<()> {
        let _ = self.entries.lock().remove(key);
        Ok(())
    }
}

impl Component for MemoryCache {
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }
}

/// Factory for the standard caches.
#[must_use]
pub fn default_factory() -> SimpleFactory {
    let mut factory = SimpleFactory::new();
    factory.register_default::<NullCache>(Descriptor::new(GROUP, "cache", "null", "*", "1.0"));
    factory.register_default::<MemoryCache>(Descriptor::new(GROUP, "cache", "memory", "*", "1.0"));
    factory
}
