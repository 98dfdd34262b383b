//! C FFI bindings for newebpay-mpg.
//!
//! Builds an MPG checkout form from C, Python, Go, etc.
//!
//! # Example (C)
//!
//! ```c
//! #include "newebpay_mpg.h"
//!
//! int main() {
//!     MpgResult result = mpg_checkout_form(
//!         "MS123456",
//!         "12345678901234567890123456789012",
//!         "1234567890123456",
//!         NULL,
//!         "{\"MerchantID\":\"MS123456\",\"MerchantOrderNo\":\"ORDER_1\",\"Amt\":100,\"ItemDesc\":\"Test\"}");
//!     if (result.error_code == 0) {
//!         printf("%s\n", result.form_html);
//!     }
//!     mpg_free_result(result);
//!     return 0;
//! }
//! ```

use std::ffi::{c_char, CStr, CString};
use std::ptr;

use crate::{Credentials, Mpg, TradeInfo};

/// Result structure returned by `mpg_checkout_form`.
///
/// All string fields are heap-allocated and must be freed with `mpg_free_result`.
#[repr(C)]
pub struct MpgResult {
    /// 0 = success, non-zero = error
    pub error_code: i32,
    /// Error message if error_code != 0, NULL otherwise
    pub error_message: *mut c_char,
    /// Auto-submitting HTML form, NULL on error
    pub form_html: *mut c_char,
}

impl MpgResult {
    fn success(form_html: String) -> Self {
        Self {
            error_code: 0,
            error_message: ptr::null_mut(),
            form_html: string_to_ptr(form_html),
        }
    }

    fn error(code: i32, message: String) -> Self {
        Self {
            error_code: code,
            error_message: string_to_ptr(message),
            form_html: ptr::null_mut(),
        }
    }
}

/// Convert Rust String to C string pointer.
fn string_to_ptr(s: String) -> *mut c_char {
    CString::new(s)
        .map(|cs| cs.into_raw())
        .unwrap_or(ptr::null_mut())
}

/// Convert C string to Rust String, returns None if null or invalid UTF-8.
unsafe fn ptr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Build the checkout form for one trade (blocking, no I/O).
///
/// # Parameters
///
/// - `merchant_id`: Newebpay merchant ID (required)
/// - `hash_key`: Hash key, at least 32 bytes (required)
/// - `hash_iv`: Hash IV, 16 bytes (required)
/// - `gateway_url`: Form action URL, or NULL for the test gateway
/// - `trade_info_json`: JSON object keyed by gateway field names (required)
///
/// # Returns
///
/// An `MpgResult`. Check `error_code` for success (0) or failure (non-zero).
/// The caller must free the result with `mpg_free_result`.
///
/// # Safety
///
/// - `merchant_id`, `hash_key`, `hash_iv` and `trade_info_json` must be valid
///   null-terminated C strings
/// - `gateway_url` must be NULL or a valid null-terminated C string
#[no_mangle]
pub unsafe extern "C" fn mpg_checkout_form(
    merchant_id: *const c_char,
    hash_key: *const c_char,
    hash_iv: *const c_char,
    gateway_url: *const c_char,
    trade_info_json: *const c_char,
) -> MpgResult {
    let merchant_id = match ptr_to_string(merchant_id) {
        Some(s) if !s.is_empty() => s,
        _ => return MpgResult::error(1, "merchant_id is required".to_string()),
    };

    let (hash_key, hash_iv) = match (ptr_to_string(hash_key), ptr_to_string(hash_iv)) {
        (Some(key), Some(iv)) => (key, iv),
        _ => return MpgResult::error(2, "hash_key and hash_iv are required".to_string()),
    };

    let trade_info_json = match ptr_to_string(trade_info_json) {
        Some(s) => s,
        None => return MpgResult::error(3, "trade_info_json is required".to_string()),
    };

    let mut builder = Mpg::builder(Credentials::new(merchant_id, hash_key, hash_iv));
    if let Some(url) = ptr_to_string(gateway_url) {
        builder = builder.gateway_url(url);
    }

    let mpg = match builder.build() {
        Ok(m) => m,
        Err(e) => return MpgResult::error(4, format!("Invalid credentials: {}", e)),
    };

    let info = match TradeInfo::from_json(&trade_info_json) {
        Ok(info) => info,
        Err(e) => return MpgResult::error(5, format!("Invalid trade info: {}", e)),
    };

    match mpg.checkout_form(&info) {
        Ok(html) => MpgResult::success(html),
        Err(e) => MpgResult::error(6, format!("Failed to build form: {}", e)),
    }
}

/// Free an MpgResult structure.
///
/// # Safety
///
/// - `result` must be a valid MpgResult previously returned by `mpg_checkout_form`
/// - Each result must only be freed once
#[no_mangle]
pub unsafe extern "C" fn mpg_free_result(result: MpgResult) {
    if !result.error_message.is_null() {
        let _ = CString::from_raw(result.error_message);
    }
    if !result.form_html.is_null() {
        let _ = CString::from_raw(result.form_html);
    }
}

/// Get the library version.
///
/// # Returns
///
/// A static string with the version number. Do NOT free this string.
#[no_mangle]
pub extern "C" fn mpg_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}
