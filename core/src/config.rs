//! Client configuration loaded from the environment.

use crate::client::CAUSALITY_BASE_URL;
use crate::error::{ApiError, Result};
use crate::types::Credentials;

pub const ENV_KEY: &str = "CAUSALITY_KEY";
pub const ENV_TOKEN: &str = "CAUSALITY_TOKEN";
pub const ENV_BASE_URL: &str = "CAUSALITY_BASE_URL";

/// Everything needed to construct a client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub credentials: Credentials,
}

impl ClientConfig {
    pub fn new(key: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: CAUSALITY_BASE_URL.to_string(),
            credentials: Credentials::new(key, token),
        }
    }

    /// Read `CAUSALITY_KEY`, `CAUSALITY_TOKEN` and the optional
    /// `CAUSALITY_BASE_URL` from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Empty values are
    /// treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let key = get(ENV_KEY).ok_or_else(|| ApiError::Config(format!("{ENV_KEY} is not set")))?;
        let token =
            get(ENV_TOKEN).ok_or_else(|| ApiError::Config(format!("{ENV_TOKEN} is not set")))?;
        let base_url = get(ENV_BASE_URL).unwrap_or_else(|| CAUSALITY_BASE_URL.to_string());

        Ok(Self {
            base_url,
            credentials: Credentials::new(key, token),
        })
    }
}
