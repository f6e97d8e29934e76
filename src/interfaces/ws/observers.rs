//! WebSocket handler for observer clients
//!
//! Observers receive every `status` and `meter` event as it happens. There
//! is no replay: a client connecting late starts with the next event.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use tokio::select;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::application::events::SharedBroadcaster;
use crate::application::SharedGateway;

/// WebSocket upgrade handler for `/ws/client`
pub async fn ws_observer_handler(
    ws: WebSocketUpgrade,
    State(gateway): State<SharedGateway>,
) -> impl IntoResponse {
    let broadcaster = gateway.broadcaster().clone();
    ws.on_upgrade(move |socket| handle_observer_socket(socket, broadcaster))
}

async fn handle_observer_socket(socket: WebSocket, broadcaster: SharedBroadcaster) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut events) = mpsc::unbounded_channel::<String>();
    let observer_id = broadcaster.register(tx);

    loop {
        select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        debug!(%observer_id, "Ignoring observer message: {}", text.as_str());
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = sender.send(Message::Pong(data)).await {
                            error!(%observer_id, "Failed to send pong: {}", e);
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        warn!(%observer_id, "WebSocket error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }

            event = events.recv() => {
                match event {
                    Some(json) => {
                        if let Err(e) = sender.send(Message::Text(json.into())).await {
                            error!(%observer_id, "Failed to send event: {}", e);
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }

    broadcaster.unregister(observer_id);
}
