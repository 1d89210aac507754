//! Boundary error type, status codes, and the last-error channel.
//!
//! Every entry point is written as a Rust function returning
//! `Result<_, FfiError>`. The adapters at the bottom of this module turn
//! that into an `i32` status (or a null handle / pointer) and record the
//! message in a thread-local slot readable via [`last_error_message`].
//!
//! The slot is overwritten by each failing call on the same thread and is
//! never cleared by a successful one.

use std::cell::RefCell;
use std::ffi::{CString, c_char};

use skillswap_store::StoreError;
use tracing::warn;

use crate::handle::HandleKind;

// ═══════════════════════════════════════════════════════════════════════
//  Status codes
// ═══════════════════════════════════════════════════════════════════════

/// The call succeeded.
pub const STATUS_OK: i32 = 0;
/// A required pointer was null, or a string was not valid UTF-8.
pub const STATUS_INVALID_ARGUMENT: i32 = 1;
/// A handle was null, stale, or belongs to another table.
pub const STATUS_INVALID_HANDLE: i32 = 2;
/// A write-through call was made before `set_data_path`.
pub const STATUS_NO_DATA_PATH: i32 = 3;
/// The data path cannot be written or created.
pub const STATUS_INVALID_PATH: i32 = 4;
/// The user has not been added to the store.
pub const STATUS_USER_NOT_FOUND: i32 = 5;
/// The store document could not be parsed or rendered.
pub const STATUS_SERIALIZATION: i32 = 6;
/// Reading or writing the data file failed.
pub const STATUS_IO: i32 = 7;
/// Internal state is unusable after a panic.
pub const STATUS_INTERNAL: i32 = 8;

// ═══════════════════════════════════════════════════════════════════════
//  FfiError
// ═══════════════════════════════════════════════════════════════════════

/// Errors surfaced across the C boundary.
#[derive(Debug, thiserror::Error)]
pub enum FfiError {
    /// A required pointer argument was null.
    #[error("{field} is null")]
    NullArgument { field: &'static str },

    /// A string argument was not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    /// A string produced for the caller contained an interior NUL byte.
    #[error("{field} contains an interior NUL byte")]
    InteriorNul { field: &'static str },

    /// A handle did not resolve to a live value.
    #[error("invalid {kind} handle: {handle:#x}")]
    InvalidHandle { kind: HandleKind, handle: u64 },

    /// A log filter directive could not be parsed.
    #[error("invalid log filter: {reason}")]
    InvalidFilter { reason: String },

    /// A handle table lock was poisoned.
    #[error("handle table lock poisoned")]
    LockPoisoned,

    /// The store rejected the operation.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl FfiError {
    /// The non-zero status code reported for this error.
    pub fn status(&self) -> i32 {
        match self {
            Self::NullArgument { .. } | Self::InvalidUtf8 { .. } | Self::InvalidFilter { .. } => {
                STATUS_INVALID_ARGUMENT
            }
            Self::InvalidHandle { .. } => STATUS_INVALID_HANDLE,
            Self::InteriorNul { .. } => STATUS_SERIALIZATION,
            Self::LockPoisoned => STATUS_INTERNAL,
            Self::Store(err) => match err {
                StoreError::NoDataPath => STATUS_NO_DATA_PATH,
                StoreError::InvalidPath { .. } => STATUS_INVALID_PATH,
                StoreError::UserNotFound { .. } => STATUS_USER_NOT_FOUND,
                StoreError::Parse(_) | StoreError::Serialize(_) => STATUS_SERIALIZATION,
                StoreError::Io(_) => STATUS_IO,
                StoreError::LockPoisoned => STATUS_INTERNAL,
            },
        }
    }
}

pub type FfiResult<T> = Result<T, FfiError>;

// ═══════════════════════════════════════════════════════════════════════
//  Last-error channel
// ═══════════════════════════════════════════════════════════════════════

thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(message: String) {
    let message = CString::new(message.replace('\0', "\\0")).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = Some(message));
}

/// Message of the most recent failing call on this thread.
///
/// Returns null if no call has failed on this thread yet. The pointer stays
/// valid until the next failing call on the same thread; callers should
/// copy it out immediately.
#[unsafe(no_mangle)]
pub extern "C" fn last_error_message() -> *const c_char {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |msg| msg.as_ptr())
    })
}

/// Owned copy of this thread's last error message, for Rust callers.
pub fn last_error() -> Option<String> {
    LAST_ERROR.with(|slot| {
        slot.borrow()
            .as_ref()
            .map(|msg| msg.to_string_lossy().into_owned())
    })
}

fn record(op: &'static str, err: &FfiError) -> i32 {
    let status = err.status();
    warn!(op, status, error = %err, "call failed");
    set_last_error(err.to_string());
    status
}

// ── adapters ─────────────────────────────────────────────────────────

/// Run a status-returning operation.
pub(crate) fn status_call(op: &'static str, f: impl FnOnce() -> FfiResult<()>) -> i32 {
    match f() {
        Ok(()) => STATUS_OK,
        Err(e) => record(op, &e),
    }
}

/// Run a handle-returning operation; `0` signals failure.
pub(crate) fn handle_call(op: &'static str, f: impl FnOnce() -> FfiResult<u64>) -> u64 {
    f().unwrap_or_else(|e| {
        record(op, &e);
        0
    })
}

/// Run a string-returning operation; the caller owns the result.
pub(crate) fn string_call(op: &'static str, f: impl FnOnce() -> FfiResult<String>) -> *mut c_char {
    let result = f().and_then(|s| {
        CString::new(s).map_err(|_| FfiError::InteriorNul { field: "result" })
    });
    match result {
        Ok(s) => s.into_raw(),
        Err(e) => {
            record(op, &e);
            std::ptr::null_mut()
        }
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_map_to_distinct_codes() {
        let codes = [
            FfiError::from(StoreError::NoDataPath).status(),
            FfiError::from(StoreError::UserNotFound { id: "x".into() }).status(),
            FfiError::from(StoreError::Io(std::io::Error::other("disk full"))).status(),
            FfiError::NullArgument { field: "name" }.status(),
            FfiError::InvalidHandle { kind: HandleKind::Skill, handle: 7 }.status(),
        ];
        assert_eq!(
            codes,
            [
                STATUS_NO_DATA_PATH,
                STATUS_USER_NOT_FOUND,
                STATUS_IO,
                STATUS_INVALID_ARGUMENT,
                STATUS_INVALID_HANDLE
            ]
        );
        assert!(codes.iter().all(|&c| c != STATUS_OK));
    }

    #[test]
    fn failure_sets_message_and_success_keeps_it() {
        let status = status_call("test", || Err(FfiError::NullArgument { field: "path" }));
        assert_eq!(status, STATUS_INVALID_ARGUMENT);
        assert_eq!(last_error().as_deref(), Some("path is null"));

        assert_eq!(status_call("test", || Ok(())), STATUS_OK);
        assert_eq!(last_error().as_deref(), Some("path is null"));
        assert!(!last_error_message().is_null());
    }

    #[test]
    fn error_slot_is_per_thread() {
        status_call("test", || Err(FfiError::LockPoisoned));
        let other = std::thread::spawn(last_error).join().unwrap();
        assert_eq!(other, None);
    }

    #[test]
    fn failed_handle_call_returns_null_handle() {
        let handle = handle_call("test", || Err(FfiError::NullArgument { field: "name" }));
        assert_eq!(handle, 0);
    }
}
