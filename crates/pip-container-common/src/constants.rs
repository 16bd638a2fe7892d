//! Well-known locators and defaults shared by every container.
//!
//! The locators below are a contract: components retrieve the container's
//! own metadata and factory through them.

use crate::types::Descriptor;

/// Group of every infrastructure component shipped with the container.
pub const GROUP: &str = "pip-services";

/// Default configuration file used when no path is supplied.
pub const DEFAULT_CONFIG_PATH: &str = "./config/config.yml";

/// Environment variable that overrides the configuration path.
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "pipc";

/// Locator under which a container registers its own `ContextInfo`.
#[must_use]
pub fn context_info_default() -> Descriptor {
    Descriptor::new(GROUP, "context-info", "default", "default", "1.0")
}

/// Pattern matching any context info, configured or default.
#[must_use]
pub fn context_info_any() -> Descriptor {
    Descriptor::new("*", "context-info", "*", "*", "*")
}

/// Locator under which a container registers its composite factory.
#[must_use]
pub fn container_factory() -> Descriptor {
    Descriptor::new(GROUP, "factory", "container", "default", "1.0")
}

/// Pattern matching any logger.
#[must_use]
pub fn logger_any() -> Descriptor {
    Descriptor::new("*", "logger", "*", "*", "*")
}
