//! Logger that fans messages out to every registered logger.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use pip_container_common::constants;
use pip_container_common::error::Result;

use crate::component::{Component, Referenceable, Unreferenceable};
use crate::log::{LogLevel, Logger};
use crate::refer::References;

/// Forwards each message to every logger found in the registry.
///
/// Other composite loggers are skipped so fan-out never recurses.
#[derive(Default)]
pub struct CompositeLogger {
    loggers: RwLock<Vec<Arc<dyn Logger>>>,
}

impl CompositeLogger {
    /// Creates a composite with no children.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a composite over the loggers registered in `references`.
    #[must_use]
    pub fn from_references(references: &References) -> Self {
        let composite = Self::new();
        composite.collect(references);
        composite
    }

    /// Number of child loggers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.loggers.read().len()
    }

    /// Returns `true` if there are no child loggers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.loggers.read().is_empty()
    }

    fn collect(&self, references: &References) {
        let found: Vec<Arc<dyn Logger>> = references
            .get_optional(constants::logger_any())
            .into_iter()
            .filter(|c| !c.is::<Self>())
            .filter_map(|c| c.to_logger())
            .collect();
        *self.loggers.write() = found;
    }
}

impl fmt::Debug for CompositeLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeLogger")
            .field("loggers", &self.len())
            .finish()
    }
}

impl Logger for CompositeLogger {
    fn level(&self) -> LogLevel {
        self.loggers
            .read()
            .iter()
            .map(|l| l.level())
            .max()
            .unwrap_or(LogLevel::None)
    }

    fn log(
        &self,
        level: LogLevel,
        correlation_id: Option<&str>,
        error: Option<&dyn Error>,
        message: &str,
    ) {
        for logger in self.loggers.read().iter() {
            if logger.level().enables(level) {
                logger.log(level, correlation_id, error, message);
            }
        }
    }
}

impl Referenceable for CompositeLogger {
    fn set_references(&self, references: &References) -> Result<()> {
        self.collect(references);
        Ok(())
    }
}

impl Unreferenceable for CompositeLogger {
    fn unset_references(&self) {
        self.loggers.write().clear();
    }
}

impl Component for CompositeLogger {
    fn as_referenceable(&self) -> Option<&dyn Referenceable> {
        Some(self)
    }

    fn as_unreferenceable(&self) -> Option<&dyn Unreferenceable> {
        Some(self)
    }

    fn to_logger(self: Arc<Self>) -> Option<Arc<dyn Logger>> {
        Some(self)
    }
}
