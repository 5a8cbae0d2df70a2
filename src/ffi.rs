//! FFI bindings for cyclesense
//!
//! C-compatible entry points for calling the engine from the host app.
//! All functions use null-terminated C strings and return allocated memory
//! that must be freed by the caller using `cyclesense_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use chrono::{DateTime, Utc};

use crate::cycle::CycleModel;
use crate::report::ReportBuilder;
use crate::types::{CycleConfiguration, MoodEntry};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

/// Build a full insight report.
///
/// `entries_json` is a JSON array of mood entries, `config_json` an
/// optional cycle configuration (NULL for none), and `now_iso` the current
/// instant in RFC 3339.
///
/// # Safety
/// - `entries_json` and `now_iso` must be valid null-terminated C strings;
///   `config_json` may be NULL.
/// - Returns a newly allocated string that must be freed with
///   `cyclesense_free_string`.
/// - Returns NULL on error; call `cyclesense_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn cyclesense_report_json(
    entries_json: *const c_char,
    config_json: *const c_char,
    now_iso: *const c_char,
) -> *mut c_char {
    clear_last_error();

    let entries_str = match cstr_to_string(entries_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid entries pointer");
            return ptr::null_mut();
        }
    };

    let now_str = match cstr_to_string(now_iso) {
        Some(s) => s,
        None => {
            set_last_error("Invalid timestamp pointer");
            return ptr::null_mut();
        }
    };

    let entries: Vec<MoodEntry> = match serde_json::from_str(&entries_str) {
        Ok(entries) => entries,
        Err(e) => {
            set_last_error(&format!("Invalid entries JSON: {e}"));
            return ptr::null_mut();
        }
    };

    let now = match DateTime::parse_from_rfc3339(&now_str) {
        Ok(now) => now.with_timezone(&Utc),
        Err(e) => {
            set_last_error(&format!("Invalid timestamp: {e}"));
            return ptr::null_mut();
        }
    };

    let model = match cstr_to_string(config_json) {
        Some(config_str) => {
            let config: CycleConfiguration = match serde_json::from_str(&config_str) {
                Ok(config) => config,
                Err(e) => {
                    set_last_error(&format!("Invalid configuration JSON: {e}"));
                    return ptr::null_mut();
                }
            };
            match CycleModel::from_configuration(config) {
                Ok(model) => Some(model),
                Err(e) => {
                    set_last_error(&e.to_string());
                    return ptr::null_mut();
                }
            }
        }
        None => None,
    };

    match ReportBuilder::new().build_json(&entries, model.as_ref(), now) {
        Ok(json) => string_to_cstr(&json),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Get the last error message.
///
/// # Safety
/// Returns a newly allocated string that must be freed with
/// `cyclesense_free_string`, or NULL when no error is stored.
#[no_mangle]
pub unsafe extern "C" fn cyclesense_last_error() -> *mut c_char {
    LAST_ERROR.with(|e| match e.borrow().as_ref() {
        Some(msg) => string_to_cstr(msg.to_str().unwrap_or("Unknown error")),
        None => ptr::null_mut(),
    })
}

/// Free a string returned by this library.
///
/// # Safety
/// `ptr` must have been returned by a cyclesense function and not freed
/// before. Passing NULL is a no-op.
#[no_mangle]
pub unsafe extern "C" fn cyclesense_free_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(CString::from_raw(ptr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(entries: &str, config: Option<&str>, now: &str) -> Option<String> {
        let entries_c = CString::new(entries).unwrap();
        let now_c = CString::new(now).unwrap();
        let config_c = config.map(|c| CString::new(c).unwrap());
        let config_ptr = config_c
            .as_ref()
            .map(|c| c.as_ptr())
            .unwrap_or(ptr::null());

        unsafe {
            let out = cyclesense_report_json(entries_c.as_ptr(), config_ptr, now_c.as_ptr());
            if out.is_null() {
                return None;
            }
            let result = CStr::from_ptr(out).to_str().unwrap().to_string();
            cyclesense_free_string(out);
            Some(result)
        }
    }

    #[test]
    fn report_over_ffi() {
        let entries = r#"[{
            "id": "6f2c0f39-2f5e-4b7f-9d54-3f8a1f6f9d01",
            "timestamp": "2024-03-10T09:00:00Z",
            "score": 2.0,
            "tags": ["work"]
        }]"#;
        let json = call(entries, None, "2024-03-15T12:00:00Z").unwrap();
        assert!(json.contains("\"report_version\""));
        assert!(json.contains("\"correlations\""));
    }

    #[test]
    fn report_with_configuration() {
        let config = r#"{
            "pill_brand": "",
            "cycle_length": 28,
            "stop_week_start": 22,
            "stop_week_end": 28,
            "start_date": "2024-03-01"
        }"#;
        let json = call("[]", Some(config), "2024-03-15T12:00:00Z").unwrap();
        assert!(json.contains("\"cycle\""));
        assert!(json.contains("\"upcoming_stop_weeks\""));
    }

    #[test]
    fn invalid_input_sets_last_error() {
        assert!(call("not json", None, "2024-03-15T12:00:00Z").is_none());
        unsafe {
            let err = cyclesense_last_error();
            assert!(!err.is_null());
            let msg = CStr::from_ptr(err).to_str().unwrap().to_string();
            cyclesense_free_string(err);
            assert!(msg.contains("Invalid entries JSON"));
        }
    }

    #[test]
    fn invalid_configuration_rejected() {
        let config = r#"{
            "pill_brand": "",
            "cycle_length": 28,
            "stop_week_start": 25,
            "stop_week_end": 20,
            "start_date": "2024-03-01"
        }"#;
        assert!(call("[]", Some(config), "2024-03-15T12:00:00Z").is_none());
    }
}
