//! Registry of live viewer connections, partitioned by survey refid.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::connection::{ConnectionId, ViewerConnection};

/// Shared handle to one registered viewer.
pub type ViewerHandle = Arc<dyn ViewerConnection>;

#[derive(Default)]
struct RegistryState {
    /// refid -> connections watching that survey. Never holds an empty set.
    viewers: HashMap<String, HashMap<ConnectionId, ViewerHandle>>,
    /// connection -> refid it is registered under.
    owners: HashMap<ConnectionId, String>,
}

impl RegistryState {
    fn remove(&mut self, ref_id: &str, id: ConnectionId) -> bool {
        let Some(set) = self.viewers.get_mut(ref_id) else {
            return false;
        };
        let removed = set.remove(&id).is_some();
        if set.is_empty() {
            self.viewers.remove(ref_id);
        }
        if removed {
            self.owners.remove(&id);
        }
        removed
    }
}

/// Concurrency-safe map from survey refid to its open viewer connections.
///
/// Writers (`register`, `deregister`) take the exclusive lock, readers take
/// the shared lock. The lock is never held across an await point, so no
/// network I/O ever runs under it.
#[derive(Default)]
pub struct ConnectionRegistry {
    state: RwLock<RegistryState>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `conn` to the set for `ref_id`, creating the set if needed.
    ///
    /// A connection belongs to at most one refid; registering it again under
    /// another refid moves it.
    pub fn register(&self, ref_id: &str, conn: ViewerHandle) {
        let id = conn.id();
        let viewers = {
            let mut state = self.state.write();
            if let Some(previous) = state.owners.get(&id).cloned() {
                if previous != ref_id {
                    state.remove(&previous, id);
                }
            }
            state.owners.insert(id, ref_id.to_string());
            let set = state.viewers.entry(ref_id.to_string()).or_default();
            set.insert(id, conn);
            set.len()
        };

        debug!(refid = %ref_id, connection_id = %id, viewers, "Viewer registered");
    }

    /// Remove a connection from the set for `ref_id`.
    ///
    /// Idempotent. Drops the refid entry once its last connection is gone.
    /// Returns whether a connection was actually removed.
    pub fn deregister(&self, ref_id: &str, id: ConnectionId) -> bool {
        let (removed, remaining) = {
            let mut state = self.state.write();
            let removed = state.remove(ref_id, id);
            let remaining = state.viewers.get(ref_id).map_or(0, HashMap::len);
            (removed, remaining)
        };

        if removed {
            debug!(refid = %ref_id, connection_id = %id, remaining, "Viewer deregistered");
        }
        removed
    }

    /// Remove a connection from whichever refid it is currently registered
    /// under. Returns that refid, or `None` if it was not registered.
    pub fn deregister_connection(&self, id: ConnectionId) -> Option<String> {
        let (ref_id, remaining) = {
            let mut state = self.state.write();
            let ref_id = state.owners.get(&id).cloned()?;
            state.remove(&ref_id, id);
            let remaining = state.viewers.get(&ref_id).map_or(0, HashMap::len);
            (ref_id, remaining)
        };

        debug!(refid = %ref_id, connection_id = %id, remaining, "Viewer deregistered");
        Some(ref_id)
    }

    /// Point-in-time copy of the connections watching `ref_id`.
    pub fn snapshot(&self, ref_id: &str) -> Vec<ViewerHandle> {
        self.state
            .read()
            .viewers
            .get(ref_id)
            .map(|set| set.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Whether `ref_id` currently has a stored entry.
    pub fn is_tracked(&self, ref_id: &str) -> bool {
        self.state.read().viewers.contains_key(ref_id)
    }

    pub fn connection_count(&self, ref_id: &str) -> usize {
        self.state.read().viewers.get(ref_id).map_or(0, HashMap::len)
    }

    /// Number of surveys with at least one live viewer.
    pub fn tracked_surveys(&self) -> usize {
        self.state.read().viewers.len()
    }

    pub fn total_connections(&self) -> usize {
        self.state.read().owners.len()
    }
}
