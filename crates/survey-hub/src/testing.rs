//! In-memory viewer used by the hub's unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::connection::{ConnectionId, Payload, ViewerConnection};
use crate::error::{HubError, HubResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    Deliver,
    Fail,
    Stall,
}

pub struct MockViewer {
    id: ConnectionId,
    behaviour: Mutex<Behaviour>,
    received: Mutex<Vec<String>>,
    closed: watch::Sender<bool>,
    close_calls: AtomicUsize,
}

impl MockViewer {
    pub fn new() -> Arc<Self> {
        Self::with_behaviour(Behaviour::Deliver)
    }

    pub fn failing() -> Arc<Self> {
        Self::with_behaviour(Behaviour::Fail)
    }

    pub fn stalling() -> Arc<Self> {
        Self::with_behaviour(Behaviour::Stall)
    }

    fn with_behaviour(behaviour: Behaviour) -> Arc<Self> {
        Arc::new(Self {
            id: ConnectionId::new(),
            behaviour: Mutex::new(behaviour),
            received: Mutex::new(Vec::new()),
            closed: watch::Sender::new(false),
            close_calls: AtomicUsize::new(0),
        })
    }

    pub fn set_behaviour(&self, behaviour: Behaviour) {
        *self.behaviour.lock() = behaviour;
    }

    pub fn received(&self) -> Vec<String> {
        self.received.lock().clone()
    }

    pub fn received_json(&self) -> Vec<serde_json::Value> {
        self.received()
            .iter()
            .map(|s| serde_json::from_str(s).unwrap())
            .collect()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ViewerConnection for MockViewer {
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, payload: Payload) -> HubResult<()> {
        if self.is_closed() {
            return Err(HubError::Closed);
        }
        let behaviour = *self.behaviour.lock();
        match behaviour {
            Behaviour::Deliver => {
                self.received.lock().push(payload.as_str().to_string());
                Ok(())
            }
            Behaviour::Fail => Err(HubError::send("broken pipe")),
            Behaviour::Stall => {
                futures::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    async fn close(&self) {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        self.closed.send_replace(true);
    }

    async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}
