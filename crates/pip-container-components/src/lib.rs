//! # pip-container-components
//!
//! Building blocks the container composes at runtime.
//!
//! This crate provides:
//! - **Component**: the capability contract (configurable, referenceable,
//!   openable, closeable, ...) every managed component may implement.
//! - **Refer**: the ordered reference registry used to look components up.
//! - **Build**: factories resolving locators into new component instances.
//! - **Infrastructure**: context info, loggers, counters, a config reader,
//!   caches, a credential store, discovery, and a shutdown test stub.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod auth;
pub mod build;
pub mod cache;
pub mod component;
pub mod config_reader;
pub mod connect;
pub mod count;
pub mod info;
pub mod log;
pub mod refer;
pub mod shutdown;
