//! Conversion of component panics into errors.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use pip_container_common::error::{ContainerError, Result};

/// Runs `f`, turning a panic into [`ContainerError::RecoveredFault`].
///
/// # Errors
///
/// Returns the error produced by `f`, or a recovered fault if it panicked.
pub fn catch<T>(correlation_id: Option<&str>, f: impl FnOnce() -> Result<T>) -> Result<T> {
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            tracing::error!(correlation_id, %message, "recovered from component panic");
            Err(ContainerError::RecoveredFault {
                correlation_id: correlation_id.map(str::to_owned),
                message,
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_owned())
}
