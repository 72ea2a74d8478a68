//! Client core for the Causality API.
//!
//! # Overview
//! Three operations against `https://causality.xyz/api`: request a QR code,
//! check an NFC tag's status, and clear the server-side UID list. Each is a
//! single JSON-over-POST exchange authenticated by a key/token pair embedded
//! in the request body.
//!
//! # Design
//! - `CausalityClient` builds `HttpRequest` values and parses `HttpResponse`
//!   values without touching the network (host-does-IO pattern).
//! - `ApiClient` (feature `async`, on by default) executes those requests
//!   over `reqwest` and is what most Rust callers want.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

#[cfg(feature = "async")]
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

#[cfg(feature = "async")]
pub use api::ApiClient;
pub use client::{CausalityClient, CAUSALITY_BASE_URL};
pub use config::ClientConfig;
pub use error::{ApiError, Result};
pub use http::{HeaderSet, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
pub use types::{
    ApiStatusCheckParams, ApiStatusCheckResult, ClearUidsParams, ClearUidsResult, Credentials,
    RequestQrCodeParams, RequestQrCodeResult,
};
