//! The container lifecycle state machine.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use pip_container_common::config::ConfigParams;
use pip_container_common::constants;
use pip_container_common::error::{ContainerError, Result};
use pip_container_components::build::{CompositeFactory, Factory};
use pip_container_components::component::Component;
use pip_container_components::info::ContextInfo;
use pip_container_components::log::{CompositeLogger, Logger, NullLogger};
use pip_container_components::refer::References;
use pip_container_config::container::ContainerConfig;
use pip_container_config::reader::ContainerConfigReader;

use crate::factory::default_container_factory;
use crate::fault;
use crate::references::ContainerReferences;

/// Error code returned when opening an open container.
pub const ALREADY_OPENED: &str = "ALREADY_OPENED";

/// Builds, opens, and closes the components of an application.
///
/// The container is open exactly while it holds a registry. `open` and
/// `close` take `&mut self`, so lifecycle calls on one container never
/// overlap.
pub struct Container {
    logger: Arc<dyn Logger>,
    factories: Arc<CompositeFactory>,
    info: Arc<ContextInfo>,
    config: ContainerConfig,
    references: Option<ContainerReferences>,
    parent: Option<Arc<dyn Component>>,
}

impl Container {
    /// Creates a closed container with the default factory bundle.
    #[must_use]
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            logger: Arc::new(NullLogger::new()),
            factories: Arc::new(default_container_factory()),
            info: Arc::new(ContextInfo::new(name, description)),
            config: ContainerConfig::default(),
            references: None,
            parent: None,
        }
    }

    /// Creates a container nested inside `parent`.
    ///
    /// On open the parent receives this container's registry through its
    /// referenceable capability; on close it is asked to release it.
    #[must_use]
    pub fn inherit(name: &str, description: &str, parent: Arc<dyn Component>) -> Self {
        Self {
            parent: Some(parent),
            ..Self::new(name, description)
        }
    }

    /// Parses and stores the container configuration.
    ///
    /// The last successful call wins. An open registry is not affected.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a section is malformed; the
    /// previously stored configuration is kept.
    pub fn configure(&mut self, config: &ConfigParams) -> Result<()> {
        match ContainerConfig::from_config(config) {
            Ok(parsed) => {
                self.config = parsed;
                Ok(())
            }
            Err(err) => {
                self.logger
                    .error(None, Some(&err), "invalid container configuration");
                Err(err)
            }
        }
    }

    /// Reads, parameterizes, and stores the configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed; the previously
    /// stored configuration is kept.
    pub fn read_config_from_file(
        &mut self,
        correlation_id: Option<&str>,
        path: impl AsRef<Path>,
        parameters: Option<&ConfigParams>,
    ) -> Result<()> {
        let path = path.as_ref();
        match ContainerConfigReader::read_from_file(correlation_id, path, parameters) {
            Ok(config) => {
                self.config = config;
                Ok(())
            }
            Err(err) => {
                self.logger.error(
                    correlation_id,
                    Some(&err),
                    &format!("failed to read configuration from {}", path.display()),
                );
                Err(err)
            }
        }
    }

    /// Replaces the stored configuration.
    pub fn set_config(&mut self, config: ContainerConfig) {
        self.config = config;
    }

    /// Stored configuration.
    #[must_use]
    pub const fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Returns `true` while the container holds a registry.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.references.is_some()
    }

    /// Registry of the open container.
    #[must_use]
    pub fn references(&self) -> Option<&References> {
        self.references.as_ref().map(ContainerReferences::references)
    }

    /// Current logger.
    #[must_use]
    pub fn logger(&self) -> Arc<dyn Logger> {
        Arc::clone(&self.logger)
    }

    /// Replaces the logger until the next open resolves one from the registry.
    pub fn set_logger(&mut self, logger: Arc<dyn Logger>) {
        self.logger = logger;
    }

    /// Current context info.
    #[must_use]
    pub fn info(&self) -> &ContextInfo {
        &self.info
    }

    /// Appends a factory used by subsequent opens.
    pub fn add_factory(&self, factory: Arc<dyn Factory>) {
        self.factories.add(factory);
    }

    /// Builds the registry from the stored configuration and opens every
    /// component.
    ///
    /// A failure at any step, including a panic inside a component, is
    /// logged, rolled back by closing whatever was built, and returned.
    ///
    /// # Errors
    ///
    /// Returns an invalid-state error if the container is already open, or
    /// the error that aborted the open.
    pub fn open(&mut self, correlation_id: Option<&str>) -> Result<()> {
        if self.is_open() {
            return Err(ContainerError::invalid_state(
                correlation_id,
                ALREADY_OPENED,
                "container was already opened",
            ));
        }

        self.logger.trace(correlation_id, "starting container");
        match fault::catch(correlation_id, || self.build(correlation_id)) {
            Ok(()) => {
                self.logger.info(
                    correlation_id,
                    &format!("container {} started", self.info.name()),
                );
                Ok(())
            }
            Err(err) => {
                tracing::error!(correlation_id, error = %err, "failed to start container");
                self.logger
                    .fatal(correlation_id, Some(&err), "failed to start container");
                if let Err(close_err) = self.close(correlation_id) {
                    tracing::warn!(correlation_id, error = %close_err, "rollback after failed start did not close cleanly");
                    self.logger.warn(
                        correlation_id,
                        &format!("rollback after failed start did not close cleanly: {close_err}"),
                    );
                }
                Err(err)
            }
        }
    }

    fn build(&mut self, correlation_id: Option<&str>) -> Result<()> {
        let references = self.references.insert(ContainerReferences::new());

        if !self.config.declares(&constants::context_info_any()) {
            references.put(
                constants::context_info_default(),
                Arc::clone(&self.info) as Arc<dyn Component>,
            );
        }
        references.put(
            constants::container_factory(),
            Arc::clone(&self.factories) as Arc<dyn Component>,
        );
        references.put_from_config(correlation_id, &self.config)?;

        if let Some(parent) = self.parent.as_deref().and_then(|p| p.as_referenceable()) {
            parent.set_references(references.references())?;
        }

        if let Some(info) = references
            .references()
            .get_one_optional_as::<ContextInfo>(constants::context_info_any())
        {
            self.info = info;
        }
        let logger = CompositeLogger::from_references(references.references());
        if !logger.is_empty() {
            self.logger = Arc::new(logger);
        }

        references.open(correlation_id)
    }

    /// Closes every component and discards the registry.
    ///
    /// The container is closed afterwards even when a component fails.
    /// Closing a closed container does nothing.
    ///
    /// # Errors
    ///
    /// Returns the close failure of a single component, an aggregate when
    /// several fail, or a recovered fault for a panic.
    pub fn close(&mut self, correlation_id: Option<&str>) -> Result<()> {
        let Some(references) = self.references.take() else {
            return Ok(());
        };

        self.logger.trace(correlation_id, "stopping container");
        let parent = self.parent.as_deref();
        let result = fault::catch(correlation_id, || {
            if let Some(parent) = parent.and_then(|p| p.as_unreferenceable()) {
                parent.unset_references();
            }
            references.close(correlation_id)
        });

        match &result {
            Ok(()) => self.logger.info(
                correlation_id,
                &format!("container {} stopped", self.info.name()),
            ),
            Err(err) => self
                .logger
                .error(correlation_id, Some(err), "failed to stop container"),
        }
        result
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("name", &self.info.name())
            .field("sections", &self.config.len())
            .field("open", &self.is_open())
            .field("nested", &self.parent.is_some())
            .finish_non_exhaustive()
    }
}
