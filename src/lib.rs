//! Session and request-gateway layer for the farmstay booking client.
//!
//! ARCHITECTURE
//! ============
//! Leaves first: `storage` is the injected persistence capability, `session`
//! reads and writes the two persisted slots (session record, redirect
//! target), `observer` keeps a live view of the session across contexts, and
//! `gateway` sends requests, unwraps the `{code, message, data}` envelope and
//! drives 401 recovery. `api` layers typed per-endpoint calls on top.
//!
//! Hosting UIs own navigation and prompts; the gateway only emits a
//! [`gateway::GatewayEvent::SessionExpired`] and leaves the decision to them.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod observer;
pub mod session;
pub mod storage;

pub use api::FarmstayApi;
pub use config::GatewayConfig;
pub use error::ErrorCode;
pub use gateway::{GatewayError, GatewayEvent, Method, RequestGateway};
pub use observer::{ObserverSubscription, SessionObserver};
pub use session::{AuthSessionRecord, RedirectStore, SessionStore};
pub use storage::{FileStorage, MemoryStorage, Storage};
