//! Live view of the session shared across execution contexts.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards and identity-aware views read `is_authenticated` from here.
//! While activated, the observer listens for storage changes made by other
//! contexts and re-reads the session slot. Writes made through
//! [`SessionStore`] in the same context are not echoed back; callers invoke
//! [`SessionObserver::sync`] themselves after such writes.
//!
//! TRADE-OFFS
//! ==========
//! Consistency is last-write-wins and eventual. A lagged notification
//! receiver resyncs instead of replaying what it missed, since only the
//! latest stored value matters.

use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::session::{AuthSessionRecord, SessionStore};

type Payload = Option<AuthSessionRecord>;

pub struct SessionObserver {
    store: SessionStore,
    payload: Arc<watch::Sender<Payload>>,
}

impl SessionObserver {
    #[must_use]
    pub fn new(store: SessionStore) -> Self {
        let (tx, _) = watch::channel(store.read());
        Self { store, payload: Arc::new(tx) }
    }

    /// Re-read the stored session and publish it.
    pub fn sync(&self) {
        publish(&self.store, &self.payload);
    }

    #[must_use]
    pub fn payload(&self) -> Payload {
        self.payload.borrow().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        is_authenticated(self.payload.borrow().as_ref())
    }

    /// Receiver that observes every published payload.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<Payload> {
        self.payload.subscribe()
    }

    /// Sync now and start listening for changes from other contexts.
    ///
    /// The listener runs until the returned subscription is dropped. Without a
    /// Tokio runtime or a storage that reports changes, the subscription is
    /// inert and only the initial sync happens.
    #[must_use = "dropping the subscription stops cross-context updates"]
    pub fn activate(&self) -> ObserverSubscription {
        // Subscribe before the initial read so a foreign write in between
        // still produces an event.
        let events = self.store.storage().and_then(|s| s.subscribe());
        self.sync();

        let Some(mut events) = events else {
            return ObserverSubscription { task: None };
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no runtime; session observer will not follow other contexts");
            return ObserverSubscription { task: None };
        };

        let own_context = self.store.context();
        let store = self.store.clone();
        let payload = Arc::clone(&self.payload);
        let task = runtime.spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        if Some(event.origin) == own_context || event.key != store.key() {
                            continue;
                        }
                        publish(&store, &payload);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "session observer lagged; resyncing");
                        publish(&store, &payload);
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
        ObserverSubscription { task: Some(task) }
    }
}

fn publish(store: &SessionStore, payload: &watch::Sender<Payload>) {
    payload.send_replace(store.read());
}

/// `true` iff a record exists and carries a non-empty token.
#[must_use]
pub fn is_authenticated(payload: Option<&AuthSessionRecord>) -> bool {
    payload.is_some_and(AuthSessionRecord::has_token)
}

/// Scoped cross-context listener. Dropping it stops the listener exactly once.
#[derive(Debug)]
pub struct ObserverSubscription {
    task: Option<JoinHandle<()>>,
}

impl ObserverSubscription {
    #[must_use]
    pub fn is_listening(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for ObserverSubscription {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[path = "observer_test.rs"]
mod tests;
