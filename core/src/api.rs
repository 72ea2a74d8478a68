//! Async executor that drives `CausalityClient` over `reqwest`.
//!
//! # Design
//! `ApiClient` owns a `CausalityClient` for request composition and response
//! parsing, and a `reqwest::Client` for the round-trip. `execute` is the one
//! place that touches the network; every operation is build, execute, parse.
//!
//! Header mutation takes `&mut self` while operations take `&self`, so a
//! header change can never interleave with request composition. Clones share
//! the underlying connection pool but not the header set.
//!
//! No retry, timeout or TLS settings are applied beyond reqwest's defaults.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::client::{parse_json, CausalityClient};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::http::{HeaderSet, HttpMethod, HttpRequest, HttpResponse, RequestOptions};
use crate::types::{
    ApiStatusCheckParams, ApiStatusCheckResult, ClearUidsResult, RequestQrCodeResult,
};

#[derive(Debug, Clone)]
pub struct ApiClient {
    inner: CausalityClient,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self::from_client(CausalityClient::new(key, token))
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        key: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self::from_client(CausalityClient::with_base_url(base_url, key, token))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::from_client(CausalityClient::from_config(config))
    }

    /// Wrap an existing request builder with a default `reqwest::Client`.
    pub fn from_client(inner: CausalityClient) -> Self {
        Self {
            inner,
            http: reqwest::Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        self.inner.base_url()
    }

    pub fn headers(&self) -> &HeaderSet {
        self.inner.headers()
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.set_header(name, value);
    }

    pub fn remove_header(&mut self, name: &str) {
        self.inner.remove_header(name);
    }

    pub async fn request_qr_code(&self) -> Result<RequestQrCodeResult> {
        let request = self.inner.build_request_qr_code()?;
        let response = self.execute(request).await?;
        self.inner.parse_request_qr_code(response)
    }

    pub async fn api_status_check(
        &self,
        params: &ApiStatusCheckParams,
    ) -> Result<ApiStatusCheckResult> {
        let request = self.inner.build_api_status_check(params)?;
        let response = self.execute(request).await?;
        self.inner.parse_api_status_check(response)
    }

    pub async fn clear_uids(&self) -> Result<ClearUidsResult> {
        let request = self.inner.build_clear_uids()?;
        let response = self.execute(request).await?;
        self.inner.parse_clear_uids(response)
    }

    pub async fn post<B, T>(&self, endpoint: &str, body: &B, options: &RequestOptions) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.inner.post(endpoint, body, options)?;
        self.send_json(request).await
    }

    pub async fn put<B, T>(&self, endpoint: &str, body: &B, options: &RequestOptions) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.inner.put(endpoint, body, options)?;
        self.send_json(request).await
    }

    pub async fn get<T: DeserializeOwned>(&self, endpoint: &str, options: &RequestOptions) -> Result<T> {
        let request = self.inner.get(endpoint, options);
        self.send_json(request).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        options: &RequestOptions,
    ) -> Result<T> {
        let request = self.inner.delete(endpoint, options);
        self.send_json(request).await
    }

    async fn send_json<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T> {
        let response = self.execute(request).await?;
        parse_json(&response)
    }

    /// Perform the round-trip for `request`. Only transport failures are
    /// errors here; status interpretation is left to the parse step.
    pub async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        debug!(method = %request.method, url = %request.url, "sending request");

        let mut builder = self.http.request(to_reqwest_method(request.method), &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.text().await?;

        debug!(status, bytes = body.len(), "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn to_reqwest_method(method: HttpMethod) -> reqwest::Method {
    match method {
        HttpMethod::Get => reqwest::Method::GET,
        HttpMethod::Post => reqwest::Method::POST,
        HttpMethod::Put => reqwest::Method::PUT,
        HttpMethod::Delete => reqwest::Method::DELETE,
    }
}
