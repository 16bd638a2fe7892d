//! Component-facing logging.
//!
//! Components log through the [`Logger`] trait and resolve their logger from
//! the reference registry. The console logger forwards to `tracing`, so the
//! process-wide subscriber decides formatting and filtering.

pub mod composite;
pub mod console;
pub mod null;

use std::error::Error;
use std::fmt;
use std::str::FromStr;

use pip_container_common::constants::GROUP;
use pip_container_common::error::{ContainerError, Result};
use pip_container_common::types::Descriptor;

use crate::build::SimpleFactory;

pub use composite::CompositeLogger;
pub use console::ConsoleLogger;
pub use null::NullLogger;

/// Log severity, from least to most verbose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Nothing is logged.
    None = 0,
    /// Unrecoverable failure; the process is about to stop.
    Fatal = 1,
    /// Failure of a single operation.
    Error = 2,
    /// Recoverable problem.
    Warn = 3,
    /// Lifecycle and other notable events.
    #[default]
    Info = 4,
    /// Diagnostic detail.
    Debug = 5,
    /// Step-by-step tracing.
    Trace = 6,
}

impl LogLevel {
    /// Returns `true` if a logger at this level emits `message_level`.
    #[must_use]
    pub fn enables(self, message_level: Self) -> bool {
        message_level != Self::None && message_level <= self
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Fatal => "fatal",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        };
        write!(f, "{name}")
    }
}

impl FromStr for LogLevel {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "none" | "nothing" => Ok(Self::None),
            "1" | "fatal" => Ok(Self::Fatal),
            "2" | "error" => Ok(Self::Error),
            "3" | "warn" | "warning" => Ok(Self::Warn),
            "4" | "info" => Ok(Self::Info),
            "5" | "debug" => Ok(Self::Debug),
            "6" | "trace" => Ok(Self::Trace),
            other => Err(ContainerError::config(format!("unknown log level '{other}'"))),
        }
    }
}

/// Severity-aware logger used by components.
pub trait Logger: Send + Sync {
    /// Maximum level this logger emits.
    fn level(&self) -> LogLevel;

    /// Records a message at `level`.
    fn log(
        &self,
        level: LogLevel,
        correlation_id: Option<&str>,
        error: Option<&dyn Error>,
        message: &str,
    );

    /// Records an unrecoverable failure.
    fn fatal(&self, correlation_id: Option<&str>, error: Option<&dyn Error>, message: &str) {
        self.log(LogLevel::Fatal, correlation_id, error, message);
    }

    /// Records a failed operation.
    fn error(&self, correlation_id: Option<&str>, error: Option<&dyn Error>, message: &str) {
        self.log(LogLevel::Error, correlation_id, error, message);
    }

    /// Records a recoverable problem.
    fn warn(&self, correlation_id: Option<&str>, message: &str) {
        self.log(LogLevel::Warn, correlation_id, None, message);
    }

    /// Records a notable event.
    fn info(&self, correlation_id: Option<&str>, message: &str) {
        self.log(LogLevel::Info, correlation_id, None, message);
    }

    /// Records diagnostic detail.
    fn debug(&self, correlation_id: Option<&str>, message: &str) {
        self.log(LogLevel::Debug, correlation_id, None, message);
    }

    /// Records step-by-step detail.
    fn trace(&self, correlation_id: Option<&str>, message: &str) {
        self.log(LogLevel::Trace, correlation_id, None, message);
    }
}

/// Locator of the null logger.
#[must_use]
pub fn null_logger_descriptor() -> Descriptor {
    Descriptor::new(GROUP, "logger", "null", "*", "1.0")
}

/// Locator of the console logger.
#[must_use]
pub fn console_logger_descriptor() -> Descriptor {
    Descriptor::new(GROUP, "logger", "console", "*", "1.0")
}

/// Locator of the composite logger.
#[must_use]
pub fn composite_logger_descriptor() -> Descriptor {
    Descriptor::new(GROUP, "logger", "composite", "*", "1.0")
}

/// Factory for the standard loggers.
#[must_use]
pub fn default_factory() -> SimpleFactory {
    let mut factory = SimpleFactory::new();
    factory.register_default::<NullLogger>(null_logger_descriptor());
    factory.register_default::<ConsoleLogger>(console_logger_descriptor());
    factory.register_default::<CompositeLogger>(composite_logger_descriptor());
    factory
}
