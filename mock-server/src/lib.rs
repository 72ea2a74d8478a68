use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

pub use axum::http::StatusCode;

pub const DEFAULT_KEY: &str = "test-key";
pub const DEFAULT_TOKEN: &str = "test-token";
pub const KNOWN_TAG_CODE: &str = "abc123";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagRecord {
    pub nfc_tag: String,
    pub chip_type: String,
    pub product_id: String,
    pub product_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QrCodeRequest {
    pub key: String,
    pub token: String,
    #[serde(default)]
    pub browsers: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusCheckRequest {
    pub code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClearUidsRequest {
    pub key: String,
    pub token: String,
    pub action: String,
}

/// A request as the server saw it, kept for test assertions.
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl RecordedRequest {
    /// Header lookup; names are compared case-insensitively as on the wire.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug)]
pub struct MockState {
    pub key: String,
    pub token: String,
    pub tags: HashMap<String, TagRecord>,
    pub uids: Vec<String>,
    pub requests: Vec<RecordedRequest>,
    injected: Option<(StatusCode, String)>,
}

impl MockState {
    /// Empty state accepting only `key` / `token`.
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
            tags: HashMap::new(),
            uids: Vec::new(),
            requests: Vec::new(),
            injected: None,
        }
    }

    pub fn with_tag(mut self, code: impl Into<String>, record: TagRecord) -> Self {
        self.tags.insert(code.into(), record);
        self
    }

    /// Answer the next request with `status` and `body` verbatim.
    pub fn fail_next(&mut self, status: StatusCode, body: impl Into<String>) {
        self.injected = Some((status, body.into()));
    }

    fn authorized(&self, key: &str, token: &str) -> bool {
        self.key == key && self.token == token
    }

    fn record<B: Serialize>(&mut self, path: &str, headers: &HeaderMap, body: &B) {
        let headers = headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = serde_json::to_value(body).unwrap_or(serde_json::Value::Null);
        debug!(path, "mock request");
        self.requests.push(RecordedRequest {
            path: path.to_string(),
            headers,
            body,
        });
    }
}

impl Default for MockState {
    fn default() -> Self {
        MockState::new(DEFAULT_KEY, DEFAULT_TOKEN).with_tag(
            KNOWN_TAG_CODE,
            TagRecord {
                nfc_tag: "04:A2:3B:1C:5D:80".to_string(),
                chip_type: "NTAG424 DNA".to_string(),
                product_id: "prod-001".to_string(),
                product_name: "Limited Edition Sneaker".to_string(),
            },
        )
    }
}

pub type Db = Arc<RwLock<MockState>>;

pub fn shared(state: MockState) -> Db {
    Arc::new(RwLock::new(state))
}

/// Reply with either a JSON document or a raw (possibly non-JSON) body.
enum Reply {
    Json(StatusCode, serde_json::Value),
    Raw(StatusCode, String),
}

impl Reply {
    fn error(status: StatusCode, message: &str) -> Self {
        Reply::Json(status, json!({ "message": message }))
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Json(status, body) => (status, Json(body)).into_response(),
            Reply::Raw(status, body) => (status, body).into_response(),
        }
    }
}

pub fn app() -> Router {
    app_with_state(shared(MockState::default()))
}

pub fn app_with_state(db: Db) -> Router {
    Router::new()
        .route("/requestQrCode", post(request_qr_code))
        .route("/apiStatusCheck", post(api_status_check))
        .route("/clear_uids", post(clear_uids))
        .with_state(db)
}

pub async fn run_with_state(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with_state(db)).await
}

async fn request_qr_code(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<QrCodeRequest>,
) -> Reply {
    let mut state = db.write().await;
    state.record("/requestQrCode", &headers, &input);
    if let Some((status, body)) = state.injected.take() {
        return Reply::Raw(status, body);
    }
    if !state.authorized(&input.key, &input.token) {
        return Reply::error(StatusCode::UNAUTHORIZED, "Invalid key or token");
    }

    let uid = Uuid::new_v4().to_string();
    state.uids.push(uid.clone());
    Reply::Json(
        StatusCode::OK,
        json!({
            "status": 1,
            "qrcode": uid,
            "qrCodeLink": format!("https://causality.xyz/qr/{uid}"),
            "deeplink": format!("causality://verify/{uid}"),
        }),
    )
}

async fn api_status_check(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<StatusCheckRequest>,
) -> Reply {
    let mut state = db.write().await;
    state.record("/apiStatusCheck", &headers, &input);
    if let Some((status, body)) = state.injected.take() {
        return Reply::Raw(status, body);
    }
    if input.code.is_empty() {
        return Reply::error(StatusCode::BAD_REQUEST, "code is required");
    }

    match state.tags.get(&input.code) {
        Some(tag) => Reply::Json(
            StatusCode::OK,
            json!({
                "message": "Tag verified",
                "nfc_tag": tag.nfc_tag,
                "chip_type": tag.chip_type,
                "product_id": tag.product_id,
                "product_name": tag.product_name,
                "status": 1,
            }),
        ),
        None => Reply::error(StatusCode::NOT_FOUND, "Tag not found"),
    }
}

async fn clear_uids(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ClearUidsRequest>,
) -> Reply {
    let mut state = db.write().await;
    state.record("/clear_uids", &headers, &input);
    if let Some((status, body)) = state.injected.take() {
        return Reply::Raw(status, body);
    }
    if !state.authorized(&input.key, &input.token) {
        return Reply::error(StatusCode::UNAUTHORIZED, "Invalid key or token");
    }
    if input.action != "remove" {
        return Reply::error(
            StatusCode::BAD_REQUEST,
            &format!("Unsupported action: {}", input.action),
        );
    }

    let count = state.uids.len();
    state.uids.clear();
    Reply::Json(
        StatusCode::OK,
        json!({
            "message": format!("Cleared {count} UIDs"),
            "status": "success",
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_knows_one_tag() {
        let state = MockState::default();
        assert!(state.tags.contains_key(KNOWN_TAG_CODE));
        assert!(state.authorized(DEFAULT_KEY, DEFAULT_TOKEN));
        assert!(!state.authorized(DEFAULT_KEY, "wrong"));
    }

    #[test]
    fn qr_request_accepts_missing_browsers() {
        let input: QrCodeRequest = serde_json::from_str(r#"{"key":"k","token":"t"}"#).unwrap();
        assert!(input.browsers.is_none());
    }

    #[test]
    fn clear_request_rejects_missing_action() {
        let result: Result<ClearUidsRequest, _> = serde_json::from_str(r#"{"key":"k","token":"t"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn record_keeps_headers_and_body() {
        let mut state = MockState::default();
        let mut headers = HeaderMap::new();
        headers.insert("x-test", "1".parse().unwrap());
        state.record("/clear_uids", &headers, &json!({"a": 1}));

        let recorded = &state.requests[0];
        assert_eq!(recorded.path, "/clear_uids");
        assert_eq!(recorded.header("X-Test"), Some("1"));
        assert_eq!(recorded.body, json!({"a": 1}));
    }

    #[test]
    fn fail_next_is_consumed_once() {
        let mut state = MockState::default();
        state.fail_next(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(state.injected.take().is_some());
        assert!(state.injected.take().is_none());
    }
}
