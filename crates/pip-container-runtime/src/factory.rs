//! Default factory bundle every container starts with.

use std::sync::Arc;

use pip_container_components::build::{CompositeFactory, Factory};
use pip_container_components::{
    auth, cache, config_reader, connect, count, info, log, shutdown,
};

/// Builds the factory bundle for the standard infrastructure components.
///
/// Order matters: earlier factories win when several can create a locator.
/// The logger factory appears twice, after discovery as well as up front.
#[must_use]
pub fn default_container_factory() -> CompositeFactory {
    let factories: Vec<Arc<dyn Factory>> = vec![
        Arc::new(info::default_factory()),
        Arc::new(log::default_factory()),
        Arc::new(count::default_factory()),
        Arc::new(config_reader::default_factory()),
        Arc::new(cache::default_factory()),
        Arc::new(auth::default_factory()),
        Arc::new(connect::default_factory()),
        Arc::new(log::default_factory()),
        Arc::new(shutdown::default_factory()),
    ];
    CompositeFactory::from_factories(factories)
}

/// Builds the default bundle followed by `factories`.
///
/// The extra factories are consulted only for locators none of the
/// standard factories can create.
#[must_use]
pub fn default_container_factory_with(factories: Vec<Arc<dyn Factory>>) -> CompositeFactory {
    let bundle = default_container_factory();
    for factory in factories {
        bundle.add(factory);
    }
    bundle
}
