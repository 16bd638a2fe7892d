//! Reads container configuration from JSON or YAML documents.
//!
//! Reading is a three-step pipeline: the raw text is parameterized once,
//! parsed into a JSON value, then flattened into [`ConfigParams`] from which
//! the ordered sections are built.

use std::path::Path;

use pip_container_common::config::ConfigParams;
use pip_container_common::error::{ContainerError, Result};

use crate::container::ContainerConfig;
use crate::template;

/// Document syntax of a configuration source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON document.
    Json,
    /// YAML document.
    Yaml,
}

impl ConfigFormat {
    /// Detects the format from a file extension.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for unknown or missing extensions.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yml" | "yaml") => Ok(Self::Yaml),
            _ => Err(ContainerError::config(format!(
                "unknown configuration file type: {}",
                path.display()
            ))),
        }
    }
}

/// Loads [`ContainerConfig`] from files or in-memory documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerConfigReader;

impl ContainerConfigReader {
    /// Reads and parameterizes a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file type is unknown, the file cannot be read,
    /// the document cannot be parsed, or a section is invalid.
    pub fn read_from_file(
        correlation_id: Option<&str>,
        path: &Path,
        parameters: Option<&ConfigParams>,
    ) -> Result<ContainerConfig> {
        let format = ConfigFormat::from_path(path)?;
        tracing::info!(correlation_id, path = %path.display(), ?format, "reading container configuration");

        let content = std::fs::read_to_string(path).map_err(|e| ContainerError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::read_from_str(&content, format, parameters)
    }

    /// Parameterizes and parses a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed or a section is
    /// invalid.
    pub fn read_from_str(
        content: &str,
        format: ConfigFormat,
        parameters: Option<&ConfigParams>,
    ) -> Result<ContainerConfig> {
        let params = Self::read_params(content, format, parameters)?;
        ContainerConfig::from_config(&params)
    }

    /// Parameterizes, parses, and flattens a document without building sections.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be parsed.
    pub fn read_params(
        content: &str,
        format: ConfigFormat,
        parameters: Option<&ConfigParams>,
    ) -> Result<ConfigParams> {
        let rendered = match parameters {
            Some(params) => template::parameterize(content, params),
            None => content.to_owned(),
        };
        let value: serde_json::Value = match format {
            ConfigFormat::Json => serde_json::from_str(&rendered)?,
            ConfigFormat::Yaml => serde_yaml::from_str(&rendered)?,
        };
        Ok(ConfigParams::from_value(&value))
    }
}
