//! Performance counters.
//!
//! Components record increments, last values, statistics, and timings
//! through [`Counters`]. [`LogCounters`] accumulates them in memory and
//! dumps them through the container's logger when it is closed.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};
use pip_container_common::constants::GROUP;
use pip_container_common::error::Result;
use pip_container_common::types::Descriptor;

use crate::build::SimpleFactory;
use crate::component::{Closeable, Component, Openable, Referenceable, Unreferenceable};
use crate::log::{CompositeLogger, Logger};
use crate::refer::References;

/// What a counter measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterType {
    /// Elapsed milliseconds of a timed block.
    Interval,
    /// Most recent value.
    LastValue,
    /// Min, max, and average of recorded values.
    Statistics,
    /// Time of the most recent event.
    Timestamp,
    /// Running total.
    Increment,
}

/// Accumulated state of one named counter.
#[derive(Debug, Clone, PartialEq)]
pub struct Counter {
    /// Counter name.
    pub name: String,
    /// What the counter measures.
    pub kind: CounterType,
    /// Most recent value.
    pub last: Option<f64>,
    /// Number of recorded values.
    pub count: u64,
    /// Smallest recorded value.
    pub min: Option<f64>,
    /// Largest recorded value.
    pub max: Option<f64>,
    /// Mean of recorded values.
    pub average: Option<f64>,
    /// Time of the most recent update.
    pub time: DateTime<Utc>,
}

impl Counter {
    fn new(name: &str, kind: CounterType) -> Self {
        Self {
            name: name.to_owned(),
            kind,
            last: None,
            count: 0,
            min: None,
            max: None,
            average: None,
            time: Utc::now(),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn record(&mut self, value: f64) {
        let previous = self.count as f64;
        self.count += 1;
        self.last = Some(value);
        self.min = Some(self.min.map_or(value, |m| m.min(value)));
        self.max = Some(self.max.map_or(value, |m| m.max(value)));
        self.average = Some(
            self.average
                .map_or(value, |avg| avg.mul_add(previous, value) / self.count as f64),
        );
        self.time = Utc::now();
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            CounterType::Increment => {
                write!(f, "{}: total={}", self.name, self.last.unwrap_or_default())
            }
            CounterType::LastValue => {
                write!(f, "{}: last={}", self.name, self.last.unwrap_or_default())
            }
            CounterType::Timestamp => write!(f, "{}: time={}", self.name, self.time),
            CounterType::Interval | CounterType::Statistics => write!(
                f,
                "{}: count={} min={} max={} avg={}",
                self.name,
                self.count,
                self.min.unwrap_or_default(),
                self.max.unwrap_or_default(),
                self.average.unwrap_or_default()
            ),
        }
    }
}

/// Sink for performance counters.
pub trait Counters: Send + Sync {
    /// Adds `value` to a running total.
    fn increment(&self, name: &str, value: i64);

    /// Records the most recent value.
    fn last(&self, name: &str, value: f64);

    /// Adds a value to min/max/average statistics.
    fn stats(&self, name: &str, value: f64);

    /// Records the time of an event.
    fn timestamp(&self, name: &str, value: DateTime<Utc>);

    /// Records the duration of a timed block in milliseconds.
    fn end_timing(&self, name: &str, elapsed_ms: f64);

    /// Increments a counter by one.
    fn increment_one(&self, name: &str) {
        self.increment(name, 1);
    }
}

/// Measures a block and records its duration when dropped.
#[must_use = "the timing is recorded when the guard is dropped"]
pub struct Timing<'a> {
    counters: &'a dyn Counters,
    name: String,
    started: Instant,
}

impl<'a> Timing<'a> {
    /// Starts timing `name`.
    pub fn start(counters: &'a dyn Counters, name: impl Into<String>) -> Self {
        Self {
            counters,
            name: name.into(),
            started: Instant::now(),
        }
    }
}

impl Drop for Timing<'_> {
    fn drop(&mut self) {
        let elapsed = self.started.elapsed().as_secs_f64() * 1000.0;
        self.counters.end_timing(&self.name, elapsed);
    }
}

/// Counters that record nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCounters;

impl Counters for NullCounters {
    fn increment(&self, _: &str, _: i64) {}
    fn last(&self, _: &str, _: f64) {}
    fn stats(&self, _: &str, _: f64) {}
    fn timestamp(&self, _: &str, _: DateTime<Utc>) {}
    fn end_timing(&self, _: &str, _: f64) {}
}

impl Component for NullCounters {}

/// In-memory counters dumped to the logger on close.
#[derive(Default)]
pub struct LogCounters {
    counters: Mutex<IndexMap<String, Counter>>,
    logger: RwLock<Option<Arc<dyn Logger>>>,
    opened: AtomicBool,
}

impl LogCounters {
    /// Creates empty counters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a timing guard recording into these counters.
    pub fn begin_timing(&self, name: impl Into<String>) -> Timing<'_> {
        Timing::start(self, name)
    }

    /// Snapshot of every counter in creation order.
    #[must_use]
    pub fn all(&self) -> Vec<Counter> {
        self.counters.lock().values().cloned().collect()
    }

    /// Snapshot of one counter.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Counter> {
        self.counters.lock().get(name).cloned()
    }

    /// Clears every counter.
    pub fn clear(&self) {
        self.counters.lock().clear();
    }

    /// Writes every counter to the logger.
    pub fn dump(&self, correlation_id: Option<&str>) {
        let snapshot = self.all();
        let logger = self.logger.read().clone();
        for counter in &snapshot {
            match &logger {
                Some(logger) => logger.info(correlation_id, &counter.to_string()),
                None => tracing::info!(correlation_id, counter = %counter, "counter"),
            }
        }
    }

    fn update(&self, name: &str, kind: CounterType, apply: impl FnOnce(&mut Counter)) {
        let mut counters = self.counters.lock();
        let counter = counters
            .entry(name.to_owned())
            .or_insert_with(|| Counter::new(name, kind));
        apply(counter);
    }
}

impl fmt::Debug for LogCounters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogCounters")
            .field("counters", &self.counters.lock().len())
            .finish_non_exhaustive()
    }
}

impl Counters for LogCounters {
    #[allow(clippy::cast_precision_loss)]
    fn increment(&self, name: &str, value: i64) {
        self.update(name, CounterType::Increment, |c| {
            let total = c.last.unwrap_or_default() + value as f64;
            c.count += 1;
            c.last = Some(total);
            c.time = Utc::now();
        });
    }

    fn last(&self, name: &str, value: f64) {
        self.update(name, CounterType::LastValue, |c| {
            c.count += 1;
            c.last = Some(value);
            c.time = Utc::now();
        });
    }

    fn stats(&self, name: &str, value: f64) {
        self.update(name, CounterType::Statistics, |c| c.record(value));
    }

    fn timestamp(&self, name: &str, value: DateTime<Utc>) {
        self.update(name, CounterType::Timestamp, |c| {
            c.count += 1;
            c.time = value;
        });
    }

    fn end_timing(&self, name: &str, elapsed_ms: f64) {
        self.update(name, CounterType::Interval, |c| c.record(elapsed_ms));
    }
}

impl Referenceable for LogCounters {
    fn set_references(&self, references: &References) -> Result<()> {
        let logger: Arc<dyn Logger> = Arc::new(CompositeLogger::from_references(references));
        *self.logger.write() = Some(logger);
        Ok(())
    }
}

impl Unreferenceable for LogCounters {
    fn unset_references(&self) {
        *self.logger.write() = None;
    }
}

impl Closeable for LogCounters {
    fn close(&self, correlation_id: Option<&str>) -> Result<()> {
        if self.opened.swap(false, Ordering::SeqCst) {
            self.dump(correlation_id);
        }
        Ok(())
    }
}

impl Openable for LogCounters {
    fn is_open(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    fn open(&self, _: Option<&str>) -> Result<()> {
        self.opened.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Component for LogCounters {
    fn as_referenceable(&self) -> Option<&dyn Referenceable> {
        Some(self)
    }

    fn as_unreferenceable(&self) -> Option<&dyn Unreferenceable> {
        Some(self)
    }

    fn as_openable(&self) -> Option<&dyn Openable> {
        Some(self)
    }

    fn as_closeable(&self) -> Option<&dyn Closeable> {
        Some(self)
    }
}

/// Factory for the standard counters.
#[must_use]
pub fn default_factory() -> SimpleFactory {
    let mut factory = SimpleFactory::new();
    factory.register_default::<NullCounters>(Descriptor::new(GROUP, "counters", "null", "*", "1.0"));
    factory.register_default::<LogCounters>(Descriptor::new(GROUP, "counters", "log", "*", "1.0"));
    factory
}
