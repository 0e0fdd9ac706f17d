//! Request gateway: every outbound API call goes through here.
//!
//! ARCHITECTURE
//! ============
//! `send` builds the request (JSON content type, session token header when a
//! token is stored), hands it to the [`Transport`], and classifies the reply
//! with [`envelope::interpret`]. Calls are independent; nothing is retried,
//! queued or cancelled.
//!
//! SESSION EXPIRY
//! ==============
//! An envelope `code == 401` clears the stored session. Unless the call
//! targeted an auth endpoint, and only when the host has a navigable
//! location, the gateway then records where the user was (the app root if
//! they were already on the login page) and broadcasts
//! [`GatewayEvent::SessionExpired`]. Prompting and navigating are the host's
//! job; see [`handle_session_expired`]. The call itself still fails.

pub mod envelope;
pub mod error;
pub mod platform;
pub mod transport;

pub use envelope::{Outcome, ResponseEnvelope};
pub use error::{FALLBACK_MESSAGE, GatewayError};
pub use platform::{FixedPlatform, HeadlessPlatform, Platform};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method, Transport, TransportError};

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::broadcast;

use crate::config::GatewayConfig;
use crate::session::{AuthSessionRecord, RedirectStore, SessionStore};
use crate::storage::Storage;
use envelope::UNAUTHORIZED_CODE;
use error::message_or_fallback;

const CONTENT_TYPE: &str = "Content-Type";
const JSON_MIME: &str = "application/json";
const EVENT_CAPACITY: usize = 16;

// =============================================================================
// EVENTS
// =============================================================================

/// Emitted once per 401 that the host should react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionExpired {
    /// Where login should return the user; already recorded in storage.
    pub redirect_to: String,
    pub login_path: String,
    /// Server message for the failed call.
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    SessionExpired(SessionExpired),
}

// =============================================================================
// GATEWAY
// =============================================================================

pub struct RequestGateway {
    config: GatewayConfig,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    redirect: RedirectStore,
    platform: Arc<dyn Platform>,
    events: broadcast::Sender<GatewayEvent>,
}

impl RequestGateway {
    /// Assemble a gateway. `storage == None` models a context without
    /// persistent storage: no credentials are sent and nothing is recorded.
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        transport: Arc<dyn Transport>,
        storage: Option<Arc<dyn Storage>>,
        platform: Arc<dyn Platform>,
    ) -> Self {
        let (session, redirect) = match storage {
            Some(storage) => {
                (SessionStore::new(Arc::clone(&storage), &config), RedirectStore::new(storage, &config))
            }
            None => (SessionStore::detached(), RedirectStore::detached()),
        };
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self { config, transport, session, redirect, platform, events }
    }

    /// Assemble a gateway over the reqwest transport.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::ClientBuild`] if the HTTP client cannot be built.
    pub fn with_http(
        config: GatewayConfig,
        storage: Option<Arc<dyn Storage>>,
        platform: Arc<dyn Platform>,
    ) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.timeouts)?;
        Ok(Self::new(config, Arc::new(transport), storage, platform))
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub fn redirect(&self) -> &RedirectStore {
        &self.redirect
    }

    #[must_use]
    pub fn platform(&self) -> &Arc<dyn Platform> {
        &self.platform
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events.subscribe()
    }

    /// Build the outgoing request, reading the session at call time.
    #[must_use]
    pub fn build_request(&self, path: &str, method: Method, body: Option<String>) -> HttpRequest {
        let mut headers = vec![(CONTENT_TYPE.to_owned(), JSON_MIME.to_owned())];
        if let Some(record) = self.session.read().filter(AuthSessionRecord::has_token) {
            headers.push((self.config.auth_header.clone(), record.token));
        }
        HttpRequest { method, url: self.config.url_for(path), headers, body }
    }

    /// Send one request and unwrap its envelope.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] whose message is the server's message when
    /// the envelope carried one, otherwise [`FALLBACK_MESSAGE`]. A 401 yields
    /// [`GatewayError::AuthExpired`] after the session has been cleared.
    pub async fn send<T, B>(&self, path: &str, method: Method, body: Option<&B>) -> Result<T, GatewayError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| GatewayError::Encode { message: FALLBACK_MESSAGE.to_owned(), detail: e.to_string() })?;

        let request = self.build_request(path, method, body);
        tracing::debug!(
            %method,
            path,
            authenticated = request.header(&self.config.auth_header).is_some(),
            "sending request"
        );

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(%method, path, error = %e, "transport failed");
                return Err(GatewayError::Transport { message: FALLBACK_MESSAGE.to_owned(), detail: e.to_string() });
            }
        };

        match envelope::interpret::<T>(response.status, &response.body) {
            Outcome::Success(data) => Ok(data),
            Outcome::ApplicationFailure { code, message } => {
                let message = message_or_fallback(message);
                tracing::warn!(%method, path, code, %message, "request rejected");
                if code == UNAUTHORIZED_CODE {
                    self.recover_session(path, &message);
                    return Err(GatewayError::AuthExpired { message });
                }
                Err(GatewayError::Application { code, message })
            }
            Outcome::TransportFailure { status, message, detail } => {
                tracing::warn!(%method, path, ?status, %detail, "no usable response envelope");
                Err(GatewayError::Transport { message: message_or_fallback(message), detail })
            }
        }
    }

    /// `send` without a body.
    ///
    /// # Errors
    ///
    /// See [`RequestGateway::send`].
    pub async fn call<T: DeserializeOwned>(&self, path: &str, method: Method) -> Result<T, GatewayError> {
        self.send::<T, ()>(path, method, None).await
    }

    fn recover_session(&self, path: &str, message: &str) {
        self.session.clear();
        tracing::info!(path, "session expired; stored session cleared");

        if self.config.is_auth_endpoint(path) {
            return;
        }
        let Some(location) = self.platform.location() else {
            return;
        };

        let redirect_to = redirect_target(&location, &self.config);
        self.redirect.record(&redirect_to);

        let event = SessionExpired {
            redirect_to,
            login_path: self.config.login_path.clone(),
            message: message.to_owned(),
        };
        if self
            .events
            .send(GatewayEvent::SessionExpired(event))
            .is_err()
        {
            tracing::debug!("no host subscribed to session expiry");
        }
    }
}

/// Where login should return to from `location`. The login page itself maps
/// to the app root.
#[must_use]
pub fn redirect_target(location: &str, config: &GatewayConfig) -> String {
    if location == config.login_path { config.root_path.clone() } else { location.to_owned() }
}

/// Host-side reaction to [`SessionExpired`]: navigate to the login page only
/// if `confirm` agrees. Returns whether navigation happened.
pub fn handle_session_expired<F>(event: &SessionExpired, platform: &dyn Platform, confirm: F) -> bool
where
    F: FnOnce(&SessionExpired) -> bool,
{
    if !confirm(event) {
        return false;
    }
    platform.navigate(&event.login_path);
    true
}

#[cfg(test)]
pub(crate) mod test_helpers;

#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;
