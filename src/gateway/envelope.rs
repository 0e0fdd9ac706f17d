//! Response envelope interpretation.
//!
//! Every API response is `{code, message, data}`. Success needs both a 2xx
//! transport status and `code < 400`; anything else is a failure, whatever
//! the transport said.
//!
//! A body that is not a JSON envelope at all is a transport failure, as is a
//! `data` field that does not match the caller's expected type.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Envelope codes at or above this value signal failure.
pub const FAILURE_CODE_FLOOR: i64 = 400;
pub const UNAUTHORIZED_CODE: i64 = 401;

/// The uniform wire wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: T,
}

/// Envelope with `data` left undecoded so failure bodies without data still parse.
#[derive(Debug, Deserialize)]
struct RawEnvelope {
    code: i64,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Classified result of one exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    /// Envelope parsed and carried `code >= 400`.
    ApplicationFailure { code: i64, message: Option<String> },
    /// No usable envelope, a non-2xx status with a non-failure code, or a
    /// `data` payload of the wrong shape.
    TransportFailure { status: Option<u16>, message: Option<String>, detail: String },
}

/// Classify a raw `(status, body)` pair.
pub fn interpret<T: DeserializeOwned>(status: u16, body: &str) -> Outcome<T> {
    let transport_ok = (200..300).contains(&status);

    let raw: RawEnvelope = match serde_json::from_str(body) {
        Ok(raw) => raw,
        Err(e) => {
            return Outcome::TransportFailure {
                status: Some(status),
                message: None,
                detail: format!("unparseable envelope: {e}"),
            };
        }
    };
    let message = raw.message.filter(|m| !m.is_empty());

    if raw.code >= FAILURE_CODE_FLOOR {
        return Outcome::ApplicationFailure { code: raw.code, message };
    }
    if !transport_ok {
        return Outcome::TransportFailure {
            status: Some(status),
            message,
            detail: format!("http status {status} with envelope code {}", raw.code),
        };
    }

    match serde_json::from_value(raw.data) {
        Ok(data) => Outcome::Success(data),
        Err(e) => Outcome::TransportFailure {
            status: Some(status),
            message: None,
            detail: format!("unexpected data shape: {e}"),
        },
    }
}

#[cfg(test)]
#[path = "envelope_test.rs"]
mod tests;
