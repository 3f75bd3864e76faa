//! Viewer connection abstraction.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::HubResult;

/// Identity of a single viewer connection. Registry membership is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A serialized event, shared by every recipient of one broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload(Arc<str>);

impl Payload {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<String> for Payload {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl From<&str> for Payload {
    fn from(s: &str) -> Self {
        Self(Arc::from(s))
    }
}

/// Write side of a live viewer channel.
///
/// Implementations must tolerate one concurrent writer (the dispatcher) racing
/// with `close` from the connection's own accept flow. `close` is idempotent.
#[async_trait]
pub trait ViewerConnection: Send + Sync {
    /// Stable identity of this connection.
    fn id(&self) -> ConnectionId;

    /// Deliver one payload to the viewer.
    async fn send(&self, payload: Payload) -> HubResult<()>;

    /// Close the underlying channel.
    async fn close(&self);

    /// Resolves once `close` has been called, from any task.
    ///
    /// The accept flow waits on this next to its inbound stream, so a viewer
    /// closed by the dispatcher also ends its read loop.
    async fn closed(&self);
}
