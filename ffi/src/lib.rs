//! C-ABI wrapper around `causality-core`.
//!
//! # Overview
//! Exposes the Causality API's request building and response parsing
//! through `extern "C"` functions so any language with a C FFI can talk to
//! the service over its own HTTP stack, without linking Rust's async runtime.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Per-operation `build_*` / `parse_*` mirrors the core API 1:1.
//! - A single `FfiCausalityResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `causality_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use causality_core::{ApiStatusCheckParams, CausalityClient, HttpResponse};

use types::*;

/// Borrow a C string as `&str`. Invalid UTF-8 reads as empty.
///
/// # Safety
/// `ptr` must be non-null and point to a NUL-terminated string that outlives
/// the returned reference.
unsafe fn str_arg<'a>(ptr: *const c_char) -> &'a str {
    unsafe { CStr::from_ptr(ptr) }.to_str().unwrap_or("")
}

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for the production API with the given credentials.
///
/// Returns null if `key` or `token` is null or if an internal panic occurs.
/// The caller must free the returned pointer with `causality_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn causality_client_new(
    key: *const c_char,
    token: *const c_char,
) -> *mut FfiCausalityClient {
    catch_unwind(|| {
        if key.is_null() || token.is_null() {
            return std::ptr::null_mut();
        }
        let (key, token) = unsafe { (str_arg(key), str_arg(token)) };
        let client = CausalityClient::new(key, token);
        Box::into_raw(Box::new(FfiCausalityClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Create a client against `base_url` (used verbatim as the endpoint prefix).
///
/// Returns null if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn causality_client_new_with_base_url(
    base_url: *const c_char,
    key: *const c_char,
    token: *const c_char,
) -> *mut FfiCausalityClient {
    catch_unwind(|| {
        if base_url.is_null() || key.is_null() || token.is_null() {
            return std::ptr::null_mut();
        }
        let (base_url, key, token) = unsafe { (str_arg(base_url), str_arg(key), str_arg(token)) };
        let client = CausalityClient::with_base_url(base_url, key, token);
        Box::into_raw(Box::new(FfiCausalityClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `causality_client_new*`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn causality_client_free(client: *mut FfiCausalityClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Insert or overwrite a stored header. Returns false on null arguments.
#[unsafe(no_mangle)]
pub extern "C" fn causality_client_set_header(
    client: *mut FfiCausalityClient,
    name: *const c_char,
    value: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || name.is_null() || value.is_null() {
            return false;
        }
        let client = unsafe { &mut *client };
        let (name, value) = unsafe { (str_arg(name), str_arg(value)) };
        client.inner.set_header(name, value);
        true
    }))
    .unwrap_or(false)
}

/// Remove a stored header; removing an absent header succeeds.
/// Returns false on null arguments.
#[unsafe(no_mangle)]
pub extern "C" fn causality_client_remove_header(
    client: *mut FfiCausalityClient,
    name: *const c_char,
) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() || name.is_null() {
            return false;
        }
        let client = unsafe { &mut *client };
        client.inner.remove_header(unsafe { str_arg(name) });
        true
    }))
    .unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Build the `POST /requestQrCode` request.
///
/// Returns null if `client` is null.
/// The caller must free the returned pointer with `causality_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn causality_build_request_qr_code(
    client: *const FfiCausalityClient,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.build_request_qr_code() {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the `POST /apiStatusCheck` request for `code`. An empty code is
/// sent as-is.
///
/// Returns null if `client` or `code` is null.
#[unsafe(no_mangle)]
pub extern "C" fn causality_build_api_status_check(
    client: *const FfiCausalityClient,
    code: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() || code.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        let params = ApiStatusCheckParams::new(unsafe { str_arg(code) });
        match client.inner.build_api_status_check(&params) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Build the `POST /clear_uids` request.
///
/// Returns null if `client` is null.
#[unsafe(no_mangle)]
pub extern "C" fn causality_build_clear_uids(
    client: *const FfiCausalityClient,
) -> *mut FfiHttpRequest {
    catch_unwind(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match client.inner.build_clear_uids() {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Convert an `FfiHttpResponse` to a core `HttpResponse`. A null body reads
/// as an empty string.
fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let body = if resp.body.is_null() {
        String::new()
    } else {
        unsafe { str_arg(resp.body) }.to_string()
    };
    HttpResponse::new(resp.status, body)
}

/// Validate the pointer pair shared by every parse function.
fn parse_args<'a>(
    client: *const FfiCausalityClient,
    response: *const FfiHttpResponse,
) -> Result<(&'a CausalityClient, HttpResponse), *mut FfiCausalityResult> {
    if client.is_null() {
        return Err(FfiCausalityResult::null_arg("client"));
    }
    if response.is_null() {
        return Err(FfiCausalityResult::null_arg("response"));
    }
    let client = unsafe { &*client };
    let resp = unsafe { &*response };
    Ok((&client.inner, ffi_response_to_core(resp)))
}

/// Parse the response to a request-QR-code request.
///
/// Returns a result with `data_tag = RequestQrCode` on success.
#[unsafe(no_mangle)]
pub extern "C" fn causality_parse_request_qr_code(
    client: *const FfiCausalityClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCausalityResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match client.parse_request_qr_code(resp) {
            Ok(result) => FfiCausalityResult::ok_request_qr_code(result),
            Err(e) => FfiCausalityResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCausalityResult::panic("panic in causality_parse_request_qr_code"))
}

/// Parse the response to a status-check request.
///
/// Returns a result with `data_tag = ApiStatusCheck` on success.
#[unsafe(no_mangle)]
pub extern "C" fn causality_parse_api_status_check(
    client: *const FfiCausalityClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCausalityResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match client.parse_api_status_check(resp) {
            Ok(result) => FfiCausalityResult::ok_api_status_check(result),
            Err(e) => FfiCausalityResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCausalityResult::panic("panic in causality_parse_api_status_check"))
}

/// Parse the response to a clear-UIDs request.
///
/// Returns a result with `data_tag = ClearUids` on success.
#[unsafe(no_mangle)]
pub extern "C" fn causality_parse_clear_uids(
    client: *const FfiCausalityClient,
    response: *const FfiHttpResponse,
) -> *mut FfiCausalityResult {
    catch_unwind(|| {
        let (client, resp) = match parse_args(client, response) {
            Ok(args) => args,
            Err(result) => return result,
        };
        match client.parse_clear_uids(resp) {
            Ok(result) => FfiCausalityResult::ok_clear_uids(result),
            Err(e) => FfiCausalityResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiCausalityResult::panic("panic in causality_parse_clear_uids"))
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by any `causality_build_*` function.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn causality_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let headers = unsafe {
                Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                    req.headers,
                    req.headers_len as usize,
                ))
            };
            for h in headers.iter() {
                free_c_string(h.name);
                free_c_string(h.value);
            }
        }
    });
}

/// Free an `FfiCausalityResult` returned by any `causality_parse_*`
/// function. Safe to call with null. Uses `data_tag` to determine what
/// `data` points to.
#[unsafe(no_mangle)]
pub extern "C" fn causality_free_result(result: *mut FfiCausalityResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let result = unsafe { Box::from_raw(result) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::RequestQrCode => {
                let data = unsafe { Box::from_raw(result.data as *mut FfiRequestQrCode) };
                free_c_string(data.qr_code_link);
                free_c_string(data.qrcode);
                free_c_string(data.deeplink);
                free_c_string(data.message);
            }
            FfiDataTag::ApiStatusCheck => {
                let data = unsafe { Box::from_raw(result.data as *mut FfiApiStatusCheck) };
                free_c_string(data.message);
                free_c_string(data.nfc_tag);
                free_c_string(data.chip_type);
                free_c_string(data.product_id);
                free_c_string(data.product_name);
            }
            FfiDataTag::ClearUids => {
                let data = unsafe { Box::from_raw(result.data as *mut FfiClearUids) };
                free_c_string(data.message);
                free_c_string(data.status);
            }
            FfiDataTag::None => {}
        }
    });
}

/// Reclaim a C string produced by `CString::into_raw`. Null is ignored.
fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn causality_free_string(s: *mut c_char) {
    if !s.is_null() {
        let _ = catch_unwind(|| free_c_string(s));
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
