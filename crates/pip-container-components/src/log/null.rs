//! Logger that discards everything.

use std::error::Error;
use std::sync::Arc;

use crate::component::Component;
use crate::log::{LogLevel, Logger};

/// Discards every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl NullLogger {
    /// Creates a null logger.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Logger for NullLogger {
    fn level(&self) -> LogLevel {
        LogLevel::None
    }

    fn log(&self, _: LogLevel, _: Option<&str>, _: Option<&dyn Error>, _: &str) {}
}

impl Component for NullLogger {
    fn to_logger(self: Arc<Self>) -> Option<Arc<dyn Logger>> {
        Some(self)
    }
}
