//! Component that deliberately breaks the container, for failure testing.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use pip_container_common::config::ConfigParams;
use pip_container_common::constants::GROUP;
use pip_container_common::error::{ContainerError, Result};
use pip_container_common::types::Descriptor;

use crate::build::SimpleFactory;
use crate::component::{Closeable, Component, Configurable, Openable};

/// How the shutdown component fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShutdownMode {
    /// Return an error.
    #[default]
    Error,
    /// Panic.
    Panic,
}

/// When the shutdown component fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ShutdownPhase {
    /// While the container opens.
    #[default]
    Open,
    /// While the container closes.
    Close,
}

impl FromStr for ShutdownMode {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" | "exception" => Ok(Self::Error),
            "panic" | "crash" => Ok(Self::Panic),
            other => Err(ContainerError::config(format!("unknown shutdown mode '{other}'"))),
        }
    }
}

impl FromStr for ShutdownPhase {
    type Err = ContainerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "close" => Ok(Self::Close),
            other => Err(ContainerError::config(format!("unknown shutdown phase '{other}'"))),
        }
    }
}

/// Fails on purpose in the configured phase.
#[derive(Debug, Default)]
pub struct Shutdown {
    mode: ShutdownMode,
    phase: ShutdownPhase,
    opened: AtomicBool,
}

impl Shutdown {
    /// Creates a shutdown component.
    #[must_use]
    pub fn new(mode: ShutdownMode, phase: ShutdownPhase) -> Self {
        Self {
            mode,
            phase,
            opened: AtomicBool::new(false),
        }
    }

    /// Configured failure mode.
    #[must_use]
    pub const fn mode(&self) -> ShutdownMode {
        self.mode
    }

    /// Configured failure phase.
    #[must_use]
    pub const fn phase(&self) -> ShutdownPhase {
        self.phase
    }

    /// Fails according to the configured mode.
    ///
    /// # Errors
    ///
    /// Always returns a component error in [`ShutdownMode::Error`].
    ///
    /// # Panics
    ///
    /// Always panics in [`ShutdownMode::Panic`].
    #[allow(clippy::panic)]
    pub fn shutdown(&self, correlation_id: Option<&str>) -> Result<()> {
        match self.mode {
            ShutdownMode::Error => Err(ContainerError::component(
                correlation_id,
                "SHUTDOWN",
                "shutdown requested",
            )),
            ShutdownMode::Panic => panic!("shutdown requested"),
        }
    }
}

impl Configurable for Shutdown {
    fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        if let Some(mode) = config.get_first(&["mode", "options.mode"]) {
            self.mode = mode.parse()?;
        }
        if let Some(phase) = config.get_first(&["phase", "options.phase"]) {
            self.phase = phase.parse()?;
        }
        Ok(())
    }
}

impl Closeable for Shutdown {
    fn close(&self, correlation_id: Option<&str>) -> Result<()> {
        let was_open = self.opened.swap(false, Ordering::SeqCst);
        if was_open && self.phase == ShutdownPhase::Close {
            return self.shutdown(correlation_id);
        }
        Ok(())
    }
}

impl Openable for Shutdown {
    fn is_open(&self) -> bool {
        self.opened.load(Ordering::SeqCst)
    }

    fn open(&self, correlation_id: Option<&str>) -> Result<()> {
        if self.phase == ShutdownPhase::Open {
            return self.shutdown(correlation_id);
        }
        self.opened.store(true, Ordering::SeqCst);
        Ok(())
    }
}

impl Component for Shutdown {
    fn as_configurable(&mut self) -> Option<&mut dyn Configurable> {
        Some(self)
    }

    fn as_openable(&self) -> Option<&dyn Openable> {
        Some(self)
    }

    fn as_closeable(&self) -> Option<&dyn Closeable> {
        Some(self)
    }
}

/// Factory for the shutdown component.
#[must_use]
pub fn default_factory() -> SimpleFactory {
    let mut factory = SimpleFactory::new();
    factory.register_default::<Shutdown>(Descriptor::new(GROUP, "shutdown", "default", "*", "1.0"));
    factory
}
