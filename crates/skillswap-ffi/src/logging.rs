//! Optional tracing setup for hosts that load the library directly.

use std::ffi::c_char;

use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::error::{FfiError, status_call};
use crate::strings;

/// Install a compact stderr subscriber.
///
/// `filter` is an `EnvFilter` directive such as `"info"` or
/// `"skillswap_store=debug"`. When null, `RUST_LOG` is used, falling back
/// to `info`. Calling it again after a subscriber is installed succeeds
/// without changing anything.
///
/// # Safety
///
/// `filter` must be null or a valid NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn skillswap_init_logging(filter: *const c_char) -> i32 {
    status_call("skillswap_init_logging", || {
        let filter = if filter.is_null() {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
        } else {
            // SAFETY: forwarded caller contract.
            let directive = unsafe { strings::required(filter, "filter") }?;
            EnvFilter::try_new(&directive).map_err(|e| FfiError::InvalidFilter {
                reason: e.to_string(),
            })?
        };

        let installed = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .try_init();
        if installed.is_err() {
            debug!("tracing subscriber already installed");
        }
        Ok(())
    })
}
