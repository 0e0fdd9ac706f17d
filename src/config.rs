//! Gateway configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Base URL, storage slot names and the auth endpoint prefix live in one
//! explicit struct handed to the gateway at construction. Nothing here is
//! read from module-level globals after startup.

use crate::error::ErrorCode;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

pub const AUTH_HEADER: &str = "farmstay-token";
pub const SESSION_KEY: &str = "farmstay-token";
pub const REDIRECT_KEY: &str = "farmstay-redirect";
pub const LOGIN_PATH: &str = "/login";
pub const ROOT_PATH: &str = "/";
pub const AUTH_PATH_PREFIX: &str = "/api/auth";

const BASE_URL_VAR: &str = "FARMSTAY_API_BASE_URL";
const REQUEST_TIMEOUT_VAR: &str = "FARMSTAY_REQUEST_TIMEOUT_SECS";
const CONNECT_TIMEOUT_VAR: &str = "FARMSTAY_CONNECT_TIMEOUT_SECS";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidBaseUrl { .. } => "E_INVALID_BASE_URL",
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// API origin without a trailing slash.
    pub base_url: String,
    /// Header carrying the bare session token.
    pub auth_header: String,
    /// Storage slot holding the serialized session record.
    pub session_key: String,
    /// Storage slot holding the post-login redirect target.
    pub redirect_key: String,
    pub login_path: String,
    pub root_path: String,
    /// Paths under this prefix are authentication endpoints.
    pub auth_path_prefix: String,
    pub timeouts: Timeouts,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_owned(),
            auth_header: AUTH_HEADER.to_owned(),
            session_key: SESSION_KEY.to_owned(),
            redirect_key: REDIRECT_KEY.to_owned(),
            login_path: LOGIN_PATH.to_owned(),
            root_path: ROOT_PATH.to_owned(),
            auth_path_prefix: AUTH_PATH_PREFIX.to_owned(),
            timeouts: Timeouts::default(),
        }
    }
}

impl GatewayConfig {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `FARMSTAY_API_BASE_URL`: default `http://localhost:8080`
    /// - `FARMSTAY_REQUEST_TIMEOUT_SECS`: default 30
    /// - `FARMSTAY_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL is empty or not http(s).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build config from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the base URL is empty or not http(s).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw_base = lookup(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let timeouts = Timeouts {
            request_secs: parse_or(lookup(REQUEST_TIMEOUT_VAR), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(lookup(CONNECT_TIMEOUT_VAR), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        Ok(Self { base_url: normalize_base_url(&raw_base)?, timeouts, ..Self::default() })
    }

    /// Replace the base URL, validating it the same way `from_env` does.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the URL is empty or not http(s).
    pub fn with_base_url(mut self, raw: &str) -> Result<Self, ConfigError> {
        self.base_url = normalize_base_url(raw)?;
        Ok(self)
    }

    /// `true` when `path` targets login/register.
    #[must_use]
    pub fn is_auth_endpoint(&self, path: &str) -> bool {
        path.starts_with(&self.auth_path_prefix)
    }

    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

fn parse_or(raw: Option<String>, default: u64) -> u64 {
    raw.and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    let invalid = |reason: String| ConfigError::InvalidBaseUrl { url: raw.to_owned(), reason };
    if trimmed.is_empty() {
        return Err(invalid("empty".to_owned()));
    }
    let parsed = url::Url::parse(trimmed).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
