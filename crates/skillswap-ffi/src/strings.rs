//! C string conversion helpers.

use std::ffi::{CStr, c_char};

use crate::error::{FfiError, FfiResult};

/// Copy a required, NUL-terminated UTF-8 argument.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
pub(crate) unsafe fn required(ptr: *const c_char, field: &'static str) -> FfiResult<String> {
    if ptr.is_null() {
        return Err(FfiError::NullArgument { field });
    }
    // SAFETY: non-null, and the caller guarantees NUL termination.
    let cstr = unsafe { CStr::from_ptr(ptr) };
    cstr.to_str()
        .map(str::to_owned)
        .map_err(|_| FfiError::InvalidUtf8 { field })
}

/// Like [`required`], but a null pointer reads as the empty string.
///
/// # Safety
///
/// Same contract as [`required`].
pub(crate) unsafe fn optional(ptr: *const c_char, field: &'static str) -> FfiResult<String> {
    if ptr.is_null() {
        return Ok(String::new());
    }
    // SAFETY: forwarded caller contract.
    unsafe { required(ptr, field) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn null_required_is_rejected() {
        let err = unsafe { required(std::ptr::null(), "name") }.unwrap_err();
        assert!(matches!(err, FfiError::NullArgument { field: "name" }));
    }

    #[test]
    fn null_optional_is_empty() {
        assert_eq!(unsafe { optional(std::ptr::null(), "photo") }.unwrap(), "");
    }

    #[test]
    fn invalid_utf8_is_rejected() {
        let bytes = CString::new(vec![0xff, 0xfe]).unwrap();
        let err = unsafe { required(bytes.as_ptr(), "name") }.unwrap_err();
        assert!(matches!(err, FfiError::InvalidUtf8 { .. }));
    }

    #[test]
    fn valid_string_is_copied() {
        let s = CString::new("Guitar").unwrap();
        assert_eq!(unsafe { required(s.as_ptr(), "name") }.unwrap(), "Guitar");
    }
}
