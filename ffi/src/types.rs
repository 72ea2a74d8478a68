//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers instead of `Vec`, and
//! tagged enums with explicit discriminants. Optional strings are null when
//! absent. Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::ffi::CString;
use std::os::raw::c_char;

use causality_core::{
    ApiError, ApiStatusCheckResult, ClearUidsResult, HttpMethod, RequestQrCodeResult,
};

/// Opaque handle to a `CausalityClient`. C callers receive a pointer to
/// this and pass it back into every FFI function.
pub struct FfiCausalityClient {
    pub(crate) inner: causality_core::CausalityClient,
}

/// Copy `s` into a heap-allocated C string. Interior NULs truncate to empty.
pub(crate) fn to_c_string(s: impl Into<Vec<u8>>) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}

pub(crate) fn to_c_string_opt(s: Option<String>) -> *mut c_char {
    s.map(to_c_string).unwrap_or(std::ptr::null_mut())
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a name-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub name: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// Built by `causality_build_*` functions. The C caller executes the request
/// and passes the response back through `causality_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: causality_core::HttpRequest) -> *mut Self {
        let url = to_c_string(req.url);
        let body = to_c_string_opt(req.body);

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Vec<FfiHeader> = req
                .headers
                .into_iter()
                .map(|(name, value)| FfiHeader {
                    name: to_c_string(name),
                    value: to_c_string(value),
                })
                .collect();
            // Boxed slice so capacity == len when rebuilt in `causality_free_request`.
            Box::into_raw(ffi_headers.into_boxed_slice()) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// An HTTP response described as C-compatible plain data.
///
/// The C caller constructs this on the stack after executing an HTTP
/// request, then passes a pointer to a `causality_parse_*` function. The FFI
/// layer reads but does not free these fields.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const c_char,
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiCausalityResult`.
#[repr(C)]
pub enum FfiErrorCode {
    Ok = 0,
    Request = 1,
    Parse = 2,
    Serialization = 3,
    Transport = 4,
    Config = 5,
    Panic = 6,
    NullArg = 7,
}

/// Tag that tells `causality_free_result` what `FfiCausalityResult::data` points to.
#[repr(C)]
pub enum FfiDataTag {
    None = 0,
    RequestQrCode = 1,
    ApiStatusCheck = 2,
    ClearUids = 3,
}

/// `RequestQrCodeResult` exposed to C. Absent optional fields are null.
#[repr(C)]
pub struct FfiRequestQrCode {
    pub status: i64,
    pub qr_code_link: *mut c_char,
    pub qrcode: *mut c_char,
    pub deeplink: *mut c_char,
    pub message: *mut c_char,
}

/// `ApiStatusCheckResult` exposed to C.
#[repr(C)]
pub struct FfiApiStatusCheck {
    pub message: *mut c_char,
    pub nfc_tag: *mut c_char,
    pub chip_type: *mut c_char,
    pub product_id: *mut c_char,
    pub product_name: *mut c_char,
    pub status: i64,
}

/// `ClearUidsResult` exposed to C.
#[repr(C)]
pub struct FfiClearUids {
    pub message: *mut c_char,
    pub status: *mut c_char,
}

/// Result envelope for all parse operations.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the parsed payload (tagged by `data_tag`).
/// On failure `error_code` describes the category, `error_message` is a
/// human-readable C string, `http_status` is set for `Request` errors, and
/// `data` is null.
#[repr(C)]
pub struct FfiCausalityResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut std::ffi::c_void,
}

impl FfiCausalityResult {
    fn ok(data_tag: FfiDataTag, data: *mut std::ffi::c_void) -> *mut Self {
        Box::into_raw(Box::new(FfiCausalityResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data,
        }))
    }

    fn error(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiCausalityResult {
            error_code,
            error_message: to_c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_request_qr_code(result: RequestQrCodeResult) -> *mut Self {
        let data = Box::new(FfiRequestQrCode {
            status: result.status,
            qr_code_link: to_c_string_opt(result.qr_code_link),
            qrcode: to_c_string_opt(result.qrcode),
            deeplink: to_c_string_opt(result.deeplink),
            message: to_c_string_opt(result.message),
        });
        Self::ok(FfiDataTag::RequestQrCode, Box::into_raw(data) as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_api_status_check(result: ApiStatusCheckResult) -> *mut Self {
        let data = Box::new(FfiApiStatusCheck {
            message: to_c_string(result.message),
            nfc_tag: to_c_string(result.nfc_tag),
            chip_type: to_c_string(result.chip_type),
            product_id: to_c_string(result.product_id),
            product_name: to_c_string(result.product_name),
            status: result.status,
        });
        Self::ok(FfiDataTag::ApiStatusCheck, Box::into_raw(data) as *mut std::ffi::c_void)
    }

    pub(crate) fn ok_clear_uids(result: ClearUidsResult) -> *mut Self {
        let data = Box::new(FfiClearUids {
            message: to_c_string(result.message),
            status: to_c_string(result.status),
        });
        Self::ok(FfiDataTag::ClearUids, Box::into_raw(data) as *mut std::ffi::c_void)
    }

    /// Build an error result from an `ApiError`.
    pub(crate) fn from_error(err: ApiError) -> *mut Self {
        let msg = err.to_string();
        match err {
            ApiError::Request { status, .. } => Self::error(FfiErrorCode::Request, status, msg),
            ApiError::Parse(_) => Self::error(FfiErrorCode::Parse, 0, msg),
            ApiError::Serialization(_) => Self::error(FfiErrorCode::Serialization, 0, msg),
            ApiError::Transport(_) => Self::error(FfiErrorCode::Transport, 0, msg),
            ApiError::Config(_) => Self::error(FfiErrorCode::Config, 0, msg),
        }
    }

    /// Build an error result for a null argument.
    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::error(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    /// Build an error result for a caught panic.
    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::error(FfiErrorCode::Panic, 0, msg.to_string())
    }
}
