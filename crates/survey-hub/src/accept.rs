//! Lifetime of one accepted viewer connection.

use std::fmt::Display;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tracing::{debug, info};

use crate::connection::{ConnectionId, ViewerConnection};
use crate::dispatcher::LiveHub;

/// Inbound frame as seen by the liveness loop. Content is never inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InboundFrame {
    /// Any data or control frame other than a close.
    Message,
    /// The peer asked to close the connection.
    Close,
}

/// Deregisters the connection when dropped, so cleanup also happens if the
/// task running the read loop is cancelled.
///
/// Removal goes by connection id, which also covers a connection that was
/// moved to another refid while its loop ran.
struct Registration<'a> {
    hub: &'a LiveHub,
    id: ConnectionId,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.hub.registry().deregister_connection(self.id);
    }
}

/// Register `conn` under `ref_id` and keep it registered until `inbound`
/// reports a close, an error, or ends, or until `conn` is closed elsewhere
/// (for example by the dispatcher after a failed send).
///
/// On every exit path the connection is deregistered first and then closed.
pub async fn run_viewer<S, E>(
    hub: &LiveHub,
    ref_id: &str,
    conn: Arc<dyn ViewerConnection>,
    mut inbound: S,
) where
    S: Stream<Item = Result<InboundFrame, E>> + Unpin,
    E: Display,
{
    let id = conn.id();
    hub.registry().register(ref_id, conn.clone());
    let registration = Registration { hub, id };

    info!(
        refid = %ref_id,
        connection_id = %id,
        viewers = hub.registry().connection_count(ref_id),
        "Live viewer connected"
    );

    loop {
        tokio::select! {
            frame = inbound.next() => match frame {
                Some(Ok(InboundFrame::Message)) => {}
                Some(Ok(InboundFrame::Close)) => {
                    debug!(refid = %ref_id, connection_id = %id, "Viewer sent close frame");
                    break;
                }
                Some(Err(e)) => {
                    debug!(refid = %ref_id, connection_id = %id, error = %e, "Viewer read failed");
                    break;
                }
                None => break,
            },
            _ = conn.closed() => {
                debug!(refid = %ref_id, connection_id = %id, "Viewer closed by hub");
                break;
            }
        }
    }

    drop(registration);
    conn.close().await;

    info!(refid = %ref_id, connection_id = %id, "Live viewer disconnected");
}
