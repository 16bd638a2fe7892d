//! # pip-container-config
//!
//! Configuration model and reader for pip-container.
//!
//! Handles:
//! - **Component**: a single configuration section (descriptor or type plus parameters).
//! - **Container**: the ordered list of sections that drives creation and open order.
//! - **Template**: `{{ NAME }}` placeholder substitution applied to raw documents.
//! - **Reader**: loading JSON/YAML files into a [`ContainerConfig`](container::ContainerConfig).

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod component;
pub mod container;
pub mod reader;
pub mod template;
