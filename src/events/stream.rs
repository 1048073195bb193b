//! Per-observer WebSocket pumps.
//!
//! Each connection owns its own delivery queue (handed out by the hub on
//! registration) and pumps it to the socket with periodic keep-alive
//! pings. Inbound frames are liveness only; any read or write failure
//! unregisters the connection.

use std::time::Duration;

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use serde_json::json;

use super::hub::{EventHub, EventKind, EventLevel, LogEvent};

const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Drive one observer connection until either side goes away.
pub async fn serve(hub: EventHub, socket: WebSocket) {
    let (id, mut events) = hub.register();
    let (mut sink, mut reader) = socket.split();

    // greeting goes out before any broadcast traffic
    let welcome = LogEvent::new(
        EventKind::Info,
        EventLevel::Info,
        "connected to agent-gateway log stream",
        Some(json!({
            "server": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        })),
    );
    if send_event(&mut sink, &welcome).await.is_err() {
        hub.unregister(id);
        return;
    }

    let mut keepalive = tokio::time::interval(KEEPALIVE_INTERVAL);
    keepalive.tick().await; // intervals fire immediately; skip the first

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    if send_event(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                None => {
                    // hub closed our queue (eviction); tell the client
                    let _ = sink.send(WsMessage::Close(None)).await;
                    break;
                }
            },
            _ = keepalive.tick() => {
                if sink.send(WsMessage::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
            inbound = reader.next() => match inbound {
                Some(Ok(_)) => {} // not interpreted beyond liveness
                _ => break,
            },
        }
    }

    hub.unregister(id);
}

async fn send_event(
    sink: &mut SplitSink<WebSocket, WsMessage>,
    event: &LogEvent,
) -> Result<(), axum::Error> {
    let frame = serde_json::to_string(event).map_err(axum::Error::new)?;
    sink.send(WsMessage::Text(frame.into())).await
}
