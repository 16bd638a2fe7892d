//! Container that runs as the main unit of an OS process.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};

use pip_container_common::config::ConfigParams;
use pip_container_common::constants;
use pip_container_common::error::{ContainerError, Result};
use pip_container_components::log::ConsoleLogger;
use uuid::Uuid;

use crate::container::Container;

/// Reads its configuration from a file, opens, waits for a shutdown signal,
/// and closes.
///
/// Configuration placeholders are filled from the process environment,
/// overridden by explicitly supplied parameters.
#[derive(Debug)]
pub struct ProcessContainer {
    container: Container,
    config_path: PathBuf,
    parameters: ConfigParams,
}

impl ProcessContainer {
    /// Creates a process container logging to the console.
    ///
    /// The configuration path defaults to `$CONFIG_PATH`, else
    /// `./config/config.yml`.
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        let mut container = Container::new(name, description);
        container.set_logger(Arc::new(ConsoleLogger::default()));
        let config_path = std::env::var(constants::CONFIG_PATH_ENV)
            .ok()
            .filter(|p| !p.is_empty())
            .map_or_else(|| PathBuf::from(constants::DEFAULT_CONFIG_PATH), PathBuf::from);
        Self {
            container,
            config_path,
            parameters: ConfigParams::new(),
        }
    }

    /// Sets the configuration file.
    #[must_use]
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = path.into();
        self
    }

    /// Adds parameters that override environment variables.
    #[must_use]
    pub fn with_parameters(mut self, parameters: &ConfigParams) -> Self {
        self.parameters = self.parameters.override_with(parameters);
        self
    }

    /// Configuration file that will be read.
    #[must_use]
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The wrapped container.
    #[must_use]
    pub const fn container(&self) -> &Container {
        &self.container
    }

    /// The wrapped container, for adding factories before running.
    pub const fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    /// Parameters used to fill configuration placeholders.
    #[must_use]
    pub fn effective_parameters(&self) -> ConfigParams {
        ConfigParams::from_env().override_with(&self.parameters)
    }

    /// Reads the configuration, opens, blocks until `shutdown` fires or its
    /// sender is dropped, then closes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be read, or the error of
    /// the failed open or close.
    pub fn run_until(&mut self, correlation_id: Option<&str>, shutdown: Receiver<()>) -> Result<()> {
        let correlation_id = correlation_id.map_or_else(|| Uuid::new_v4().to_string(), str::to_owned);
        let cid = Some(correlation_id.as_str());
        let parameters = self.effective_parameters();

        self.container
            .read_config_from_file(cid, &self.config_path, Some(&parameters))?;
        self.container.open(cid)?;

        let logger = self.container.logger();
        logger.info(
            cid,
            &format!(
                "container {} is running, press Ctrl+C to stop",
                self.container.info().name()
            ),
        );
        if shutdown.recv().is_err() {
            logger.debug(cid, "shutdown channel closed");
        }
        logger.info(cid, "shutdown requested");

        self.container.close(cid)
    }

    /// Runs until the process receives Ctrl+C or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handler cannot be installed, or any
    /// error of [`Self::run_until`].
    pub fn run(&mut self, correlation_id: Option<&str>) -> Result<()> {
        let (sender, receiver) = mpsc::channel();
        ctrlc::set_handler(move || {
            let _ = sender.send(());
        })
        .map_err(|e| {
            ContainerError::component(correlation_id, "SIGNAL_HANDLER", e.to_string())
        })?;
        self.run_until(correlation_id, receiver)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_parameters_override_environment() {
        let process = ProcessContainer::new("svc", "")
            .with_parameters(&ConfigParams::from_tuples(&[("PATH", "overridden")]));
        assert_eq!(process.effective_parameters().get("PATH"), Some("overridden"));
    }

    #[test]
    fn config_path_can_be_replaced() {
        let process = ProcessContainer::new("svc", "").with_config_path("/etc/svc/config.json");
        assert_eq!(process.config_path(), Path::new("/etc/svc/config.json"));
        assert!(!process.container().is_open());
    }

    #[test]
    fn missing_config_file_fails_before_open() {
        let (_sender, receiver) = mpsc::channel();
        let mut process =
            ProcessContainer::new("svc", "").with_config_path("/nonexistent/pipc/config.yml");
        let err = process.run_until(Some("123"), receiver).unwrap_err();
        assert!(matches!(err, ContainerError::Io { .. }));
        assert!(!process.container().is_open());
    }
}
