//! Host navigation capability.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway needs the current navigable location when a session expires,
//! and hosts need somewhere to send the user afterwards. A host without a
//! notion of location (background jobs, server-side rendering) reports
//! `None`, which switches off redirect capture entirely.

use std::sync::{Mutex, PoisonError};

pub trait Platform: Send + Sync {
    /// Full current location (path + query + fragment), or `None` when the
    /// host cannot navigate.
    fn location(&self) -> Option<String>;

    fn navigate(&self, path: &str);
}

/// A host with no navigable surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessPlatform;

impl Platform for HeadlessPlatform {
    fn location(&self) -> Option<String> {
        None
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(path, "headless platform ignoring navigation");
    }
}

/// A host whose location is set explicitly and whose navigations are recorded.
#[derive(Debug, Default)]
pub struct FixedPlatform {
    location: Mutex<String>,
    navigations: Mutex<Vec<String>>,
}

impl FixedPlatform {
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self { location: Mutex::new(location.into()), navigations: Mutex::new(Vec::new()) }
    }

    pub fn set_location(&self, location: impl Into<String>) {
        *self
            .location
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = location.into();
    }

    /// Paths passed to `navigate`, oldest first.
    #[must_use]
    pub fn navigations(&self) -> Vec<String> {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Platform for FixedPlatform {
    fn location(&self) -> Option<String> {
        Some(
            self.location
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }

    fn navigate(&self, path: &str) {
        self.navigations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(path.to_owned());
        self.set_location(path);
    }
}
