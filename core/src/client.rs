//! Request builder and response parser for the Causality API.
//!
//! # Design
//! `CausalityClient` holds the base URL, the stored header set and the
//! caller's credentials. Each operation is split into a `build_*` method
//! that produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the HTTP round-trip in between,
//! keeping this type deterministic and free of I/O.
//!
//! Every composed request takes a snapshot of the stored headers, so a
//! request that has already been built is unaffected by later
//! `set_header` / `remove_header` calls.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, Result};
use crate::http::{HeaderSet, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
use crate::types::{
    ApiStatusCheckParams, ApiStatusCheckResult, ClearUidsParams, ClearUidsResult, Credentials,
    RequestQrCodeParams, RequestQrCodeResult,
};

pub const CAUSALITY_BASE_URL: &str = "https://causality.xyz/api";

pub const REQUEST_QR_CODE_PATH: &str = "/requestQrCode";
pub const API_STATUS_CHECK_PATH: &str = "/apiStatusCheck";
pub const CLEAR_UIDS_PATH: &str = "/clear_uids";

const CLEAR_UIDS_ACTION: &str = "remove";

/// Synchronous, I/O-free client for the Causality API.
#[derive(Debug, Clone)]
pub struct CausalityClient {
    base_url: String,
    headers: HeaderSet,
    credentials: Credentials,
}

impl CausalityClient {
    /// Create a client against the production API. No network call is made.
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_base_url(CAUSALITY_BASE_URL, key, token)
    }

    /// Create a client against another host. `base_url` is used verbatim:
    /// endpoint paths are appended to it without any normalization.
    pub fn with_base_url(
        base_url: impl Into<String>,
        key: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let mut headers = HeaderSet::new();
        headers.insert("Content-Type", "application/json");
        Self {
            base_url: base_url.into(),
            headers,
            credentials: Credentials::new(key, token),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_base_url(
            config.base_url.clone(),
            config.credentials.key.clone(),
            config.credentials.token.clone(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &HeaderSet {
        &self.headers
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Insert or overwrite a stored header.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.insert(name, value);
    }

    /// Remove a stored header. Removing an absent header is a no-op.
    pub fn remove_header(&mut self, name: &str) {
        self.headers.remove(name);
    }

    // -----------------------------------------------------------------------
    // Request composition
    // -----------------------------------------------------------------------

    /// Compose a request: `base_url + endpoint`, stored headers overlaid by
    /// `options.headers`, and the given body.
    pub fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<String>,
        options: &RequestOptions,
    ) -> HttpRequest {
        let url = format!("{}{}", self.base_url, endpoint);
        let headers = self.headers.merged(&options.headers).to_pairs();
        debug!(%method, %url, "composed request");
        HttpRequest {
            method,
            url,
            headers,
            body,
        }
    }

    pub fn post<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<HttpRequest> {
        let body = to_json(body)?;
        Ok(self.request(HttpMethod::Post, endpoint, Some(body), options))
    }

    pub fn put<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<HttpRequest> {
        let body = to_json(body)?;
        Ok(self.request(HttpMethod::Put, endpoint, Some(body), options))
    }

    pub fn get(&self, endpoint: &str, options: &RequestOptions) -> HttpRequest {
        self.request(HttpMethod::Get, endpoint, None, options)
    }

    pub fn delete(&self, endpoint: &str, options: &RequestOptions) -> HttpRequest {
        self.request(HttpMethod::Delete, endpoint, None, options)
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    pub fn build_request_qr_code(&self) -> Result<HttpRequest> {
        let params = RequestQrCodeParams {
            key: self.credentials.key.clone(),
            token: self.credentials.token.clone(),
            browsers: None,
        };
        self.post(REQUEST_QR_CODE_PATH, &params, &RequestOptions::default())
    }

    /// `params` is sent as-is; an empty `code` is left for the server to reject.
    pub fn build_api_status_check(&self, params: &ApiStatusCheckParams) -> Result<HttpRequest> {
        self.post(API_STATUS_CHECK_PATH, params, &RequestOptions::default())
    }

    pub fn build_clear_uids(&self) -> Result<HttpRequest> {
        let params = ClearUidsParams {
            key: self.credentials.key.clone(),
            token: self.credentials.token.clone(),
            action: CLEAR_UIDS_ACTION.to_string(),
        };
        self.post(CLEAR_UIDS_PATH, &params, &RequestOptions::default())
    }

    pub fn parse_request_qr_code(&self, response: HttpResponse) -> Result<RequestQrCodeResult> {
        parse_json(&response)
    }

    pub fn parse_api_status_check(&self, response: HttpResponse) -> Result<ApiStatusCheckResult> {
        parse_json(&response)
    }

    pub fn parse_clear_uids(&self, response: HttpResponse) -> Result<ClearUidsResult> {
        parse_json(&response)
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<String> {
    serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Reject non-2xx responses, then decode the body as `T`.
pub fn parse_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
    check_status(response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Parse(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let message = error_message(response);
    warn!(status = response.status, %message, "request rejected");
    Err(ApiError::Request {
        status: response.status,
        message,
    })
}

/// The server reports failures as `{"message": "..."}`. Anything else (no
/// body, non-JSON, missing or empty `message`) gets the generic text.
fn error_message(response: &HttpResponse) -> String {
    serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|body| match body.get("message") {
            Some(serde_json::Value::String(msg)) if !msg.is_empty() => Some(msg.clone()),
            _ => None,
        })
        .unwrap_or_else(|| format!("HTTP error! Status: {}", response.status))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> CausalityClient {
        CausalityClient::new("k1", "t1")
    }

    fn body_json(req: &HttpRequest) -> serde_json::Value {
        serde_json::from_str(req.body.as_deref().unwrap()).unwrap()
    }

    #[test]
    fn new_uses_production_base_url_and_json_header() {
        let c = client();
        assert_eq!(c.base_url(), "https://causality.xyz/api");
        assert_eq!(c.headers().len(), 1);
        assert_eq!(c.headers().get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn build_request_qr_code_embeds_credentials() {
        let req = client().build_request_qr_code().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://causality.xyz/api/requestQrCode");
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(body_json(&req), serde_json::json!({"key": "k1", "token": "t1"}));
    }

    #[test]
    fn build_api_status_check_sends_params_verbatim() {
        let req = client()
            .build_api_status_check(&ApiStatusCheckParams::new("abc123"))
            .unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://causality.xyz/api/apiStatusCheck");
        assert_eq!(body_json(&req), serde_json::json!({"code": "abc123"}));
    }

    #[test]
    fn build_api_status_check_does_not_validate_code() {
        let req = client()
            .build_api_status_check(&ApiStatusCheckParams::new(""))
            .unwrap();
        assert_eq!(body_json(&req), serde_json::json!({"code": ""}));
    }

    #[test]
    fn build_clear_uids_always_sends_remove() {
        let req = client().build_clear_uids().unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.url, "https://causality.xyz/api/clear_uids");
        assert_eq!(
            body_json(&req),
            serde_json::json!({"key": "k1", "token": "t1", "action": "remove"})
        );
    }

    #[test]
    fn base_url_is_concatenated_verbatim() {
        let c = CausalityClient::with_base_url("http://localhost:3000/", "k", "t");
        let req = c.build_clear_uids().unwrap();
        assert_eq!(req.url, "http://localhost:3000//clear_uids");
    }

    #[test]
    fn set_header_applies_to_later_requests_only() {
        let mut c = client();
        let before = c.build_request_qr_code().unwrap();

        c.set_header("X-Test", "1");
        let with_header = c.build_request_qr_code().unwrap();
        assert_eq!(with_header.header("X-Test"), Some("1"));

        c.remove_header("X-Test");
        let after = c.build_request_qr_code().unwrap();
        assert_eq!(after.header("X-Test"), None);

        assert_eq!(before.header("X-Test"), None);
        assert_eq!(with_header.header("X-Test"), Some("1"));
    }

    #[test]
    fn set_header_overwrites_content_type() {
        let mut c = client();
        c.set_header("Content-Type", "text/plain");
        let req = c.build_clear_uids().unwrap();
        assert_eq!(req.header("Content-Type"), Some("text/plain"));
        assert_eq!(req.headers.len(), 1);
    }

    #[test]
    fn remove_absent_header_is_noop() {
        let mut c = client();
        c.remove_header("X-Never-Set");
        assert_eq!(c.headers().len(), 1);
    }

    #[test]
    fn per_call_overrides_win_without_touching_stored_headers() {
        let mut c = client();
        c.set_header("X-Env", "stored");
        let options = RequestOptions::default()
            .with_header("X-Env", "override")
            .with_header("X-Call", "yes");

        let req = c.post("/anything", &serde_json::json!({}), &options).unwrap();
        assert_eq!(req.header("X-Env"), Some("override"));
        assert_eq!(req.header("X-Call"), Some("yes"));
        assert_eq!(c.headers().get("X-Env"), Some("stored"));
        assert!(!c.headers().contains("X-Call"));
    }

    #[test]
    fn verb_helpers_fix_the_method() {
        let c = client();
        let opts = RequestOptions::default();
        let put = c.put("/thing", &serde_json::json!({"a": 1}), &opts).unwrap();
        assert_eq!(put.method, HttpMethod::Put);
        assert_eq!(body_json(&put), serde_json::json!({"a": 1}));

        let get = c.get("/thing", &opts);
        assert_eq!(get.method, HttpMethod::Get);
        assert!(get.body.is_none());

        let delete = c.delete("/thing", &opts);
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.url, "https://causality.xyz/api/thing");
        assert!(delete.body.is_none());
    }

    #[test]
    fn parse_request_qr_code_success() {
        let result = client()
            .parse_request_qr_code(HttpResponse::new(200, r#"{"status":1,"qrcode":"ABC"}"#))
            .unwrap();
        assert_eq!(
            result,
            RequestQrCodeResult {
                status: 1,
                qr_code_link: None,
                qrcode: Some("ABC".to_string()),
                deeplink: None,
                message: None,
            }
        );
    }

    #[test]
    fn parse_error_uses_server_message() {
        let err = client()
            .parse_api_status_check(HttpResponse::new(404, r#"{"message":"not found"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 404, .. }));
        assert_eq!(err.to_string(), "not found");
    }

    #[test]
    fn parse_error_falls_back_on_unparseable_body() {
        let err = client()
            .parse_clear_uids(HttpResponse::new(500, "<html>Internal Server Error</html>"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Request { status: 500, .. }));
        assert_eq!(err.to_string(), "HTTP error! Status: 500");
    }

    #[test]
    fn parse_error_falls_back_on_missing_or_empty_message() {
        let c = client();
        let err = c
            .parse_clear_uids(HttpResponse::new(403, r#"{"error":"nope"}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! Status: 403");

        let err = c
            .parse_clear_uids(HttpResponse::new(401, r#"{"message":""}"#))
            .unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! Status: 401");

        let err = c.parse_clear_uids(HttpResponse::new(502, "")).unwrap_err();
        assert_eq!(err.to_string(), "HTTP error! Status: 502");
    }

    #[test]
    fn parse_success_with_bad_json_is_parse_error() {
        let err = client()
            .parse_request_qr_code(HttpResponse::new(200, "not json"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn parse_success_missing_required_field_is_parse_error() {
        let err = client()
            .parse_clear_uids(HttpResponse::new(200, r#"{"message":"done"}"#))
            .unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }

    #[test]
    fn parse_api_status_check_success() {
        let body = r#"{"message":"Verified","nfc_tag":"04A1","chip_type":"NTAG424","product_id":"p-1","product_name":"Sneaker","status":1}"#;
        let result = client()
            .parse_api_status_check(HttpResponse::new(200, body))
            .unwrap();
        assert_eq!(result.product_name, "Sneaker");
        assert_eq!(result.status, 1);
    }
}
