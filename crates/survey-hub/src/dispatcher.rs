//! Broadcast of created responses to live viewers.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::connection::{Payload, ViewerConnection};
use crate::error::{HubError, HubResult};
use crate::registry::ConnectionRegistry;

/// Default deadline for a single viewer send.
const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Hub tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// Deadline for one send to one viewer. `None` waits indefinitely.
    pub send_timeout: Option<Duration>,
}

impl HubConfig {
    /// Build a config from a millisecond deadline, where `0` disables it.
    pub fn from_millis(send_timeout_ms: u64) -> Self {
        Self {
            send_timeout: (send_timeout_ms > 0).then(|| Duration::from_millis(send_timeout_ms)),
        }
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            send_timeout: Some(DEFAULT_SEND_TIMEOUT),
        }
    }
}

/// Outcome of one broadcast.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Connections in the snapshot.
    pub attempted: usize,
    pub delivered: usize,
    /// Connections closed and deregistered because their send failed.
    pub pruned: usize,
}

/// Live viewer hub: the connection registry plus the broadcast dispatcher.
///
/// Cheap to clone; all clones share one registry. Created once at server
/// start and handed to every collaborator that needs it.
#[derive(Clone, Default)]
pub struct LiveHub {
    registry: Arc<ConnectionRegistry>,
    config: HubConfig,
}

impl LiveHub {
    pub fn new(config: HubConfig) -> Self {
        Self {
            registry: Arc::new(ConnectionRegistry::new()),
            config,
        }
    }

    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    /// Entry point for response ingestion.
    ///
    /// Runs [`LiveHub::broadcast`] and swallows any failure: the response is
    /// already persisted, so a broadcast problem is only logged.
    pub async fn notify_created<E>(&self, ref_id: &str, event: &E)
    where
        E: Serialize + ?Sized,
    {
        // Failures are already logged by `broadcast`.
        let _ = self.broadcast(ref_id, event).await;
    }

    /// Serialize `event` once and deliver it to every viewer of `ref_id`.
    ///
    /// Returns only after every send has settled, so sequential calls for one
    /// refid reach each viewer in call order.
    pub async fn broadcast<E>(&self, ref_id: &str, event: &E) -> HubResult<BroadcastReport>
    where
        E: Serialize + ?Sized,
    {
        let payload = match serde_json::to_string(event) {
            Ok(json) => Payload::from(json),
            Err(e) => {
                error!(refid = %ref_id, error = %e, "Failed to serialize live event, broadcast skipped");
                return Err(e.into());
            }
        };

        Ok(self.broadcast_payload(ref_id, payload).await)
    }

    /// Deliver an already-serialized payload to every viewer of `ref_id`.
    ///
    /// A viewer whose send fails is deregistered and closed; the others are
    /// unaffected. Failed sends are never retried.
    pub async fn broadcast_payload(&self, ref_id: &str, payload: Payload) -> BroadcastReport {
        let viewers = self.registry.snapshot(ref_id);
        let mut report = BroadcastReport {
            attempted: viewers.len(),
            ..Default::default()
        };
        if viewers.is_empty() {
            return report;
        }

        let sends = viewers.iter().map(|conn| {
            let payload = payload.clone();
            async move { (conn, self.deliver(&**conn, payload).await) }
        });
        let results = join_all(sends).await;

        let mut dead = Vec::new();
        for (conn, result) in results {
            match result {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    warn!(
                        refid = %ref_id,
                        connection_id = %conn.id(),
                        error = %e,
                        "Live viewer send failed, dropping connection"
                    );
                    self.registry.deregister(ref_id, conn.id());
                    dead.push(conn);
                }
            }
        }

        report.pruned = dead.len();
        join_all(dead.into_iter().map(|conn| conn.close())).await;

        debug!(
            refid = %ref_id,
            bytes = payload.len(),
            delivered = report.delivered,
            pruned = report.pruned,
            "Response broadcast to live viewers"
        );
        report
    }

    async fn deliver(&self, conn: &dyn ViewerConnection, payload: Payload) -> HubResult<()> {
        match self.config.send_timeout {
            Some(limit) => tokio::time::timeout(limit, conn.send(payload))
                .await
                .map_err(|_| HubError::SendTimeout(limit))?,
            None => conn.send(payload).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behaviour, MockViewer};
    use serde_json::json;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("refusing to serialize"))
        }
    }

    fn response(id: &str, refid: &str) -> serde_json::Value {
        json!({
            "id": id,
            "refid": refid,
            "name": "Ada",
            "data": { "q1": "yes", "q2": 4 },
            "created_at": "2026-10-19T12:00:00.000Z",
        })
    }

    #[tokio::test]
    async fn test_broadcast_without_viewers_sends_nothing() {
        let hub = LiveHub::default();
        let report = hub.broadcast("R", &response("r1", "R")).await.unwrap();
        assert_eq!(report, BroadcastReport::default());
        assert!(!hub.registry().is_tracked("R"));
    }

    #[tokio::test]
    async fn test_two_viewers_then_one() {
        let hub = LiveHub::default();
        let a = MockViewer::new();
        let b = MockViewer::new();
        hub.registry().register("S1", a.clone());
        hub.registry().register("S1", b.clone());

        let event = response("r1", "S1");
        let report = hub.broadcast("S1", &event).await.unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(a.received_json(), vec![event.clone()]);
        assert_eq!(b.received_json(), vec![event.clone()]);

        hub.registry().deregister("S1", a.id());
        let event2 = response("r2", "S1");
        hub.broadcast("S1", &event2).await.unwrap();

        assert_eq!(a.received_json(), vec![event.clone()]);
        assert_eq!(b.received_json(), vec![event, event2]);
    }

    #[tokio::test]
    async fn test_broadcast_stays_within_refid() {
        let hub = LiveHub::default();
        let a = MockViewer::new();
        let b = MockViewer::new();
        hub.registry().register("S1", a.clone());
        hub.registry().register("S2", b.clone());

        hub.broadcast("S1", &response("r1", "S1")).await.unwrap();

        assert_eq!(a.received().len(), 1);
        assert!(b.received().is_empty());
    }

    #[tokio::test]
    async fn test_failed_viewer_is_pruned() {
        let hub = LiveHub::default();
        let good: Vec<_> = (0..3).map(|_| MockViewer::new()).collect();
        let bad = MockViewer::failing();
        for viewer in &good {
            hub.registry().register("S1", viewer.clone());
        }
        hub.registry().register("S1", bad.clone());

        let report = hub.broadcast("S1", &response("r1", "S1")).await.unwrap();
        assert_eq!(report.attempted, 4);
        assert_eq!(report.delivered, 3);
        assert_eq!(report.pruned, 1);
        assert!(bad.is_closed());
        assert_eq!(hub.registry().connection_count("S1"), 3);

        let report = hub.broadcast("S1", &response("r2", "S1")).await.unwrap();
        assert_eq!(report.attempted, 3);
        for viewer in &good {
            assert_eq!(viewer.received().len(), 2);
        }
    }

    #[tokio::test]
    async fn test_last_failed_viewer_drops_entry() {
        let hub = LiveHub::default();
        let viewer = MockViewer::new();
        hub.registry().register("S1", viewer.clone());
        viewer.set_behaviour(Behaviour::Fail);

        hub.broadcast("S1", &response("r1", "S1")).await.unwrap();

        assert!(!hub.registry().is_tracked("S1"));
    }

    #[tokio::test]
    async fn test_stalled_viewer_hits_send_deadline() {
        let hub = LiveHub::new(HubConfig {
            send_timeout: Some(Duration::from_millis(50)),
        });
        let stalled = MockViewer::stalling();
        let healthy = MockViewer::new();
        hub.registry().register("S1", stalled.clone());
        hub.registry().register("S1", healthy.clone());

        let report = hub.broadcast("S1", &response("r1", "S1")).await.unwrap();

        assert_eq!(report.delivered, 1);
        assert_eq!(report.pruned, 1);
        assert!(stalled.is_closed());
        assert_eq!(healthy.received().len(), 1);
        assert_eq!(hub.registry().connection_count("S1"), 1);
    }

    #[tokio::test]
    async fn test_serialization_failure_aborts_broadcast() {
        let hub = LiveHub::default();
        let viewer = MockViewer::new();
        hub.registry().register("S1", viewer.clone());

        let result = hub.broadcast("S1", &Unserializable).await;

        assert!(matches!(result, Err(HubError::Serialize(_))));
        assert!(viewer.received().is_empty());
        assert_eq!(hub.registry().connection_count("S1"), 1);

        // The ingestion entry point swallows the same failure.
        hub.notify_created("S1", &Unserializable).await;
        assert!(viewer.received().is_empty());
    }

    #[tokio::test]
    async fn test_sequential_broadcasts_keep_order() {
        let hub = LiveHub::default();
        let viewer = MockViewer::new();
        hub.registry().register("S1", viewer.clone());

        for i in 0..10 {
            hub.notify_created("S1", &json!({ "id": format!("r{i}") })).await;
        }

        let ids: Vec<_> = viewer
            .received_json()
            .into_iter()
            .map(|v| v["id"].as_str().unwrap().to_string())
            .collect();
        let expected: Vec<_> = (0..10).map(|i| format!("r{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_register_deregister_broadcast() {
        let hub = LiveHub::default();
        let viewers: Vec<_> = (0..64).map(|_| MockViewer::new()).collect();
        let mut tasks = tokio::task::JoinSet::new();

        for (i, viewer) in viewers.iter().enumerate() {
            let hub = hub.clone();
            let viewer = viewer.clone();
            tasks.spawn(async move {
                hub.registry().register("S1", viewer.clone());
                hub.broadcast("S1", &json!({ "n": i })).await.unwrap();
                if i % 2 == 1 {
                    hub.registry().deregister("S1", viewer.id());
                    hub.registry().deregister("S1", viewer.id());
                }
            });
        }
        for _ in 0..8 {
            let hub = hub.clone();
            tasks.spawn(async move {
                for _ in 0..10 {
                    hub.broadcast("S1", &json!({ "n": -1 })).await.unwrap();
                }
            });
        }
        while let Some(result) = tasks.join_next().await {
            result.unwrap();
        }

        assert_eq!(hub.registry().connection_count("S1"), 32);
        assert_eq!(hub.registry().total_connections(), 32);
        let live: Vec<_> = hub.registry().snapshot("S1").iter().map(|c| c.id()).collect();
        for (i, viewer) in viewers.iter().enumerate() {
            assert_eq!(live.contains(&viewer.id()), i % 2 == 0);
            assert!(!viewer.is_closed());
            // Registration happened before its own broadcast's snapshot.
            assert!(viewer.received_json().contains(&json!({ "n": i })));
        }
    }
}
