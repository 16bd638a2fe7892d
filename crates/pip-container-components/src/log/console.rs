//! Logger that forwards to the process-wide `tracing` subscriber.

use std::error::Error;
use std::sync::Arc;

use parking_lot::RwLock;
use pip_container_common::config::ConfigParams;
use pip_container_common::constants;
use pip_container_common::error::Result;

use crate::component::{Component, Configurable, Referenceable};
use crate::info::ContextInfo;
use crate::log::{LogLevel, Logger};
use crate::refer::References;

/// Emits component log messages as `tracing` events.
///
/// Messages are tagged with the correlation id and, once references are set,
/// with the name of the container's context info as `source`.
#[derive(Debug, Default)]
pub struct ConsoleLogger {
    level: LogLevel,
    source: RwLock<Option<String>>,
}

impl ConsoleLogger {
    /// Creates a console logger at `level`.
    #[must_use]
    pub fn new(level: LogLevel) -> Self {
        Self {
            level,
            source: RwLock::new(None),
        }
    }

    /// Name attached to every event, if known.
    #[must_use]
    pub fn source(&self) -> Option<String> {
        self.source.read().clone()
    }

    /// Overrides the event source name.
    pub fn set_source(&self, source: impl Into<String>) {
        *self.source.write() = Some(source.into());
    }
}

impl Logger for ConsoleLogger {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn log(
        &self,
        level: LogLevel,
        correlation_id: Option<&str>,
        error: Option<&dyn Error>,
        message: &str,
    ) {
        if !self.level.enables(level) {
            return;
        }
        let source = self.source.read();
        let source = source.as_deref();
        let error = error.map(tracing::field::display);
        match level {
            LogLevel::None => {}
            LogLevel::Fatal => {
                tracing::error!(correlation_id, source, error, fatal = true, "{message}");
            }
            LogLevel::Error => tracing::error!(correlation_id, source, error, "{message}"),
            LogLevel::Warn => tracing::warn!(correlation_id, source, error, "{message}"),
            LogLevel::Info => tracing::info!(correlation_id, source, error, "{message}"),
            LogLevel::Debug => tracing::debug!(correlation_id, source, error, "{message}"),
            LogLevel::Trace => tracing::trace!(correlation_id, source, error, "{message}"),
        }
    }
}

impl Configurable for ConsoleLogger {
    fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        if let Some(level) = config.get_first(&["level", "options.level"]) {
            self.level = level.parse()?;
        }
        if let Some(source) = config.get("source").filter(|s| !s.is_empty()) {
            *self.source.get_mut() = Some(source.to_owned());
        }
        Ok(())
    }
}

impl Referenceable for ConsoleLogger {
    fn set_references(&self, references: &References) -> Result<()> {
        if self.source.read().is_some() {
            return Ok(());
        }
        if let Some(info) =
            references.get_one_optional_as::<ContextInfo>(constants::context_info_any())
        {
            self.set_source(info.name());
        }
        Ok(())
    }
}

impl Component for ConsoleLogger {
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }

    fn as_referenceable(&self) -> Option<&dyn Referenceable> {
        Some(self)
    }

    fn to_logger(self: Arc<Self>) -> Option<Arc<dyn Logger>> {
        Some(self)
    }
}
