//! Container lifecycle management.
//!
//! A [`Container`](container::Container) turns an ordered configuration into
//! a registry of live components: it creates them through its factories,
//! wires their references, opens them in order, and closes them in reverse.
//! A failed open is rolled back, and panics raised by components are
//! returned as errors instead of escaping the container.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod container;
pub mod factory;
pub mod fault;
pub mod process;
pub mod references;
