//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use bytes::Bytes;

use crate::key::SealingKey;

/// Application state shared across all request handlers.
///
/// Everything here is immutable after startup and cheap to clone, so no
/// locking is needed on the request path.
#[derive(Clone, Debug)]
pub struct AppState {
    /// The sealing key, hydrated once at startup.
    pub key: Arc<SealingKey>,
    /// Associated data bound into every envelope.
    pub auth_context: Bytes,
    /// Largest accepted request body, in bytes.
    pub max_body_bytes: usize,
}

impl AppState {
    /// Create a new [`AppState`].
    pub fn new(key: SealingKey, auth_context: impl Into<Bytes>, max_body_bytes: usize) -> Self {
        Self {
            key: Arc::new(key),
            auth_context: auth_context.into(),
            max_body_bytes,
        }
    }
}
