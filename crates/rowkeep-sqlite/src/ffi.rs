//! Thin helpers over `libsqlite3-sys`.
//!
//! The raw bindings are re-exported unchanged; this module only adds the few
//! safe wrappers the driver needs for strings owned by SQLite.

pub use libsqlite3_sys::*;

// `libsqlite3-sys` blocklists this symbol from its generated bindings, but the
// linked library still exports it.
unsafe extern "C" {
    pub fn sqlite3_close_v2(db: *mut sqlite3) -> c_int;
}

use std::ffi::{CStr, c_char, c_int};

/// Copy a NUL-terminated string owned by SQLite.
///
/// # Safety
/// `ptr` must be null or point to a valid NUL-terminated string that stays
/// alive for the duration of the call.
pub(crate) unsafe fn owned_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        // SAFETY: non-null and NUL-terminated per the caller contract
        Some(unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned())
    }
}

/// Get the SQLite library version string.
pub fn version() -> &'static str {
    // SAFETY: sqlite3_libversion returns a pointer to a static string
    unsafe { CStr::from_ptr(sqlite3_libversion()) }
        .to_str()
        .unwrap_or("unknown")
}

/// English description of a result code.
pub fn error_string(code: c_int) -> String {
    // SAFETY: sqlite3_errstr returns a static string for every code
    unsafe { owned_string(sqlite3_errstr(code)) }.unwrap_or_else(|| format!("error code {code}"))
}

/// The message of the most recent failure on `db`.
///
/// # Safety
/// `db` must be a live connection handle.
pub(crate) unsafe fn last_error_message(db: *mut sqlite3) -> String {
    // SAFETY: db is live per the caller contract
    unsafe { owned_string(sqlite3_errmsg(db)) }.unwrap_or_else(|| "unknown error".to_string())
}
