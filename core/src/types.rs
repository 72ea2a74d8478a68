//! Request and response DTOs for the Causality API.
//!
//! # Design
//! Field names follow the server's JSON contract exactly (including the
//! mixed `qrCodeLink` / `nfc_tag` casing). These types are defined
//! independently from the mock-server crate; integration tests catch any
//! schema drift between the two.
//!
//! Result types are decoded with serde rather than trusted blindly, so a
//! success body missing a required field is reported as a parse error.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The key/token pair identifying the caller to the API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub key: String,
    pub token: String,
}

impl Credentials {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token: token.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /requestQrCode`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestQrCodeParams {
    pub key: String,
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browsers: Option<String>,
}

/// Response of `POST /requestQrCode`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestQrCodeResult {
    pub status: i64,
    #[serde(rename = "qrCodeLink", default, skip_serializing_if = "Option::is_none")]
    pub qr_code_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub qrcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deeplink: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Body of `POST /apiStatusCheck`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiStatusCheckParams {
    pub code: String,
}

impl ApiStatusCheckParams {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Response of `POST /apiStatusCheck`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiStatusCheckResult {
    pub message: String,
    pub nfc_tag: String,
    pub chip_type: String,
    pub product_id: String,
    pub product_name: String,
    pub status: i64,
}

/// Body of `POST /clear_uids`. The client always sends `action = "remove"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearUidsParams {
    pub key: String,
    pub token: String,
    pub action: String,
}

/// Response of `POST /clear_uids`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClearUidsResult {
    pub message: String,
    pub status: String,
}
