//! Gateway failure taxonomy.
//!
//! Every variant displays as exactly the message a view should show: the
//! server-supplied message when there is one, otherwise [`FALLBACK_MESSAGE`].

use crate::error::ErrorCode;

pub const FALLBACK_MESSAGE: &str = "request failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Network failure or no usable envelope.
    #[error("{message}")]
    Transport {
        message: String,
        /// Diagnostic detail for logs; never shown to users.
        detail: String,
    },

    /// Envelope parsed with `code >= 400`.
    #[error("{message}")]
    Application { code: i64, message: String },

    /// Envelope `code == 401`. The stored session has already been cleared.
    #[error("{message}")]
    AuthExpired { message: String },

    /// The request body could not be serialized.
    #[error("{message}")]
    Encode { message: String, detail: String },
}

impl GatewayError {
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Transport { message, .. }
            | Self::Application { message, .. }
            | Self::AuthExpired { message }
            | Self::Encode { message, .. } => message,
        }
    }

    /// Envelope code, when the failure came from the application.
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Application { code, .. } => Some(*code),
            Self::AuthExpired { .. } => Some(super::envelope::UNAUTHORIZED_CODE),
            Self::Transport { .. } | Self::Encode { .. } => None,
        }
    }
}

pub(crate) fn message_or_fallback(message: Option<String>) -> String {
    message.unwrap_or_else(|| FALLBACK_MESSAGE.to_owned())
}

impl ErrorCode for GatewayError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "E_TRANSPORT",
            Self::Application { .. } => "E_APPLICATION",
            Self::AuthExpired { .. } => "E_AUTH_EXPIRED",
            Self::Encode { .. } => "E_ENCODE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
