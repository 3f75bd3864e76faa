//! WebSocket endpoint for the live response dashboard.

use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{IntoResponse, Response},
};
use futures::{
    sink::{Sink, SinkExt},
    stream::{SplitSink, StreamExt},
};
use survey_hub::{ConnectionId, HubError, HubResult, InboundFrame, LiveHub, Payload, ViewerConnection};
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::state::AppState;

/// Upper bound on acquiring the sink and sending the close frame.
const CLOSE_TIMEOUT: Duration = Duration::from_secs(2);

/// Write half of a dashboard WebSocket.
///
/// The sink sits behind its own mutex so a broadcast write and a close coming
/// from the read loop never interleave on the socket.
pub struct WsViewer<S = SplitSink<WebSocket, Message>> {
    id: ConnectionId,
    sink: Mutex<S>,
    closed: watch::Sender<bool>,
}

impl<S> WsViewer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            id: ConnectionId::new(),
            sink: Mutex::new(sink),
            closed: watch::Sender::new(false),
        }
    }
}

async fn shutdown<S>(sink: &mut S) -> Result<(), S::Error>
where
    S: Sink<Message> + Unpin,
{
    sink.send(Message::Close(None)).await?;
    sink.close().await
}

#[async_trait]
impl<S> ViewerConnection for WsViewer<S>
where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display + Send,
{
    fn id(&self) -> ConnectionId {
        self.id
    }

    async fn send(&self, payload: Payload) -> HubResult<()> {
        if *self.closed.borrow() {
            return Err(HubError::Closed);
        }
        let mut sink = self.sink.lock().await;
        sink.send(Message::Text(payload.as_str().into()))
            .await
            .map_err(HubError::send)
    }

    async fn close(&self) {
        if self.closed.send_replace(true) {
            return;
        }
        // A stalled send may still hold the sink, so the lock is bounded too.
        let result = tokio::time::timeout(CLOSE_TIMEOUT, async {
            let mut sink = self.sink.lock().await;
            shutdown(&mut *sink).await
        })
        .await;
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!(connection_id = %self.id, error = %e, "WebSocket close failed"),
            Err(_) => debug!(connection_id = %self.id, "WebSocket close timed out"),
        }
    }

    async fn closed(&self) {
        let mut rx = self.closed.subscribe();
        let _ = rx.wait_for(|closed| *closed).await;
    }
}

/// `GET /ws/dashboard/{refid}`: upgrade and stream new responses for `refid`.
pub async fn dashboard_ws(
    State(state): State<AppState>,
    Path(refid): Path<String>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!(refid = %refid, error = %rejection, "WebSocket upgrade rejected");
            return rejection.into_response();
        }
    };

    let failed_refid = refid.clone();
    ws.on_failed_upgrade(move |e| {
        warn!(refid = %failed_refid, error = %e, "WebSocket upgrade failed");
    })
    .on_upgrade(move |socket| handle_socket(socket, state.hub, refid))
}

/// Serve one upgraded dashboard connection until it closes.
async fn handle_socket(socket: WebSocket, hub: LiveHub, refid: String) {
    let (sender, receiver) = socket.split();
    let viewer = Arc::new(WsViewer::new(sender));

    let inbound = receiver.map(|msg| {
        msg.map(|msg| match msg {
            Message::Close(_) => InboundFrame::Close,
            _ => InboundFrame::Message,
        })
    });

    survey_hub::run_viewer(&hub, &refid, viewer, inbound).await;
}
