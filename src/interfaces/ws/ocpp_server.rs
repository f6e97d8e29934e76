//! OCPP 1.6 WebSocket server
//!
//! Accepts charge-point connections at `ws://<host>:<port>/ocpp/{charge_point_id}`.
//! The identifier is the last path segment, so any path shape works.

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, warn};

use crate::application::gateway::SharedGateway;
use crate::support::id::random_charger_id;
use crate::support::shutdown::ShutdownSignal;

/// OCPP 1.6 WebSocket subprotocol
const OCPP_SUBPROTOCOL: &str = "ocpp1.6";

/// OCPP WebSocket Server
pub struct OcppServer {
    gateway: SharedGateway,
    shutdown_signal: ShutdownSignal,
}

impl OcppServer {
    pub fn new(gateway: SharedGateway) -> Self {
        Self {
            gateway,
            shutdown_signal: ShutdownSignal::new(),
        }
    }

    /// Set the shutdown signal for graceful shutdown
    pub fn with_shutdown(mut self, signal: ShutdownSignal) -> Self {
        self.shutdown_signal = signal;
        self
    }

    /// Bind the configured address and serve until shutdown
    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let addr = self.gateway.config().address();
        let listener = TcpListener::bind(&addr).await?;

        info!("🔌 OCPP 1.6 gateway listening on ws://{}", addr);
        info!(
            "   Charge points should connect to: ws://{}/ocpp/{{charge_point_id}}",
            addr
        );

        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(
        &self,
        listener: TcpListener,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => self.spawn_connection(stream, addr),
                        Err(e) => error!("Failed to accept connection: {}", e),
                    }
                }
                _ = self.shutdown_signal.notified().wait() => {
                    info!("🛑 WebSocket server received shutdown signal");
                    let closed = self.gateway.shutdown();
                    info!(closed, "✅ WebSocket server shutdown complete");
                    return Ok(());
                }
            }
        }
    }

    fn spawn_connection(&self, stream: TcpStream, addr: SocketAddr) {
        let gateway = self.gateway.clone();
        let shutdown = self.shutdown_signal.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, addr, gateway, shutdown).await {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// The charger identifier carried by a connection path: its last non-empty
/// segment. Paths without one get a random `client-` identifier.
pub fn charger_id_from_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_string)
        .unwrap_or_else(random_charger_id)
}

/// Handle a single WebSocket connection
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    gateway: SharedGateway,
    shutdown: ShutdownSignal,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    debug!("New connection from: {}", addr);

    let mut request_path = String::new();

    let ws_stream = tokio_tungstenite::accept_hdr_async(
        stream,
        |req: &Request, mut response: Response| {
            request_path = req.uri().path().to_string();

            let requested_protocols = req
                .headers()
                .get("Sec-WebSocket-Protocol")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("");

            let supports_ocpp16 = requested_protocols
                .split(',')
                .map(|s| s.trim())
                .any(|p| p == OCPP_SUBPROTOCOL);

            if supports_ocpp16 {
                response.headers_mut().insert(
                    "Sec-WebSocket-Protocol",
                    HeaderValue::from_static(OCPP_SUBPROTOCOL),
                );
            } else if !requested_protocols.is_empty() {
                warn!(
                    "Client does not support ocpp1.6, requested: {}",
                    requested_protocols
                );
            }

            Ok(response)
        },
    )
    .await?;

    let charge_point_id = charger_id_from_path(&request_path);
    info!(
        charge_point_id = charge_point_id.as_str(),
        remote_addr = %addr,
        path = request_path.as_str(),
        "Charge point connected"
    );

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let connection = gateway.connect(&charge_point_id, tx.clone());

    // Outgoing message sender task
    let cp_id_send = charge_point_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            debug!("[{}] -> {}", cp_id_send, msg);
            if let Err(e) = ws_sender.send(Message::Text(msg)).await {
                error!("[{}] Send error: {}", cp_id_send, e);
                break;
            }
        }
    });

    // Incoming message receiver task. Replies go out on this connection's
    // own channel, never through a registry lookup.
    let cp_id_recv = charge_point_id.clone();
    let recv_gateway = gateway.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_receiver.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Some(response) = recv_gateway.handle_message(&cp_id_recv, &text) {
                        if tx.send(response).is_err() {
                            error!("[{}] Failed to queue response, writer gone", cp_id_recv);
                            break;
                        }
                    }
                }
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                Ok(Message::Close(frame)) => {
                    info!("[{}] Close frame received: {:?}", cp_id_recv, frame);
                    break;
                }
                Ok(Message::Binary(data)) => {
                    warn!(
                        "[{}] Binary message received ({} bytes), ignoring",
                        cp_id_recv,
                        data.len()
                    );
                }
                Ok(Message::Frame(_)) => {}
                Err(e) => {
                    error!("[{}] WebSocket error: {}", cp_id_recv, e);
                    break;
                }
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
        _ = shutdown.notified().wait() => {
            info!("[{}] Connection closing due to server shutdown", charge_point_id);
            send_task.abort();
            recv_task.abort();
        }
    }

    gateway.disconnect(&charge_point_id, connection.connection_id);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::Broadcaster;
    use crate::application::gateway::OcppGateway;
    use crate::config::Config;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::client::IntoClientRequest;
    use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

    type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

    async fn start() -> (SharedGateway, SocketAddr, ShutdownSignal) {
        let gateway = OcppGateway::shared(Config::default(), Broadcaster::shared());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let shutdown = ShutdownSignal::new();
        let server = OcppServer::new(gateway.clone()).with_shutdown(shutdown.clone());
        tokio::spawn(async move { server.serve(listener).await });
        (gateway, addr, shutdown)
    }

    async fn send(client: &mut Client, text: &str) {
        client.send(Message::Text(text.to_string())).await.unwrap();
    }

    async fn recv(client: &mut Client) -> Value {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("reply in time")
            .unwrap()
            .unwrap();
        serde_json::from_str(msg.to_text().unwrap()).unwrap()
    }

    async fn recv_nothing(client: &mut Client) {
        let got = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
        assert!(got.is_err(), "unexpected message: {got:?}");
    }

    #[test]
    fn charger_id_is_last_path_segment() {
        assert_eq!(charger_id_from_path("/ocpp/CP1"), "CP1");
        assert_eq!(charger_id_from_path("/CP2"), "CP2");
        assert_eq!(charger_id_from_path("/a/b/CP3/"), "CP3");
        assert!(charger_id_from_path("/").starts_with("client-"));
        assert!(charger_id_from_path("").starts_with("client-"));
    }

    #[tokio::test]
    async fn boot_notification_round_trip_and_subprotocol() {
        let (gateway, addr, _shutdown) = start().await;

        let mut request = format!("ws://{addr}/ocpp/CP1").into_client_request().unwrap();
        request
            .headers_mut()
            .insert("Sec-WebSocket-Protocol", HeaderValue::from_static("ocpp1.6"));
        let (mut client, response) = connect_async(request).await.unwrap();
        assert_eq!(
            response.headers().get("Sec-WebSocket-Protocol").unwrap(),
            "ocpp1.6"
        );

        send(
            &mut client,
            r#"[2,"1","BootNotification",{"chargePointVendor":"V","chargePointModel":"M"}]"#,
        )
        .await;
        let reply = recv(&mut client).await;
        assert_eq!(reply[0], 3);
        assert_eq!(reply[1], "1");
        assert_eq!(reply[2]["status"], "Accepted");
        assert_eq!(reply[2]["interval"], 30);

        assert!(gateway.get_status("CP1").ws_connected);
    }

    #[tokio::test]
    async fn malformed_input_keeps_connection_usable() {
        let (_gateway, addr, _shutdown) = start().await;
        let (mut client, _) = connect_async(format!("ws://{addr}/ocpp/CP1")).await.unwrap();

        send(&mut client, "not json").await;
        send(&mut client, r#"{"hello":"world"}"#).await;
        send(&mut client, r#"[2,"x"]"#).await;
        recv_nothing(&mut client).await;

        send(&mut client, r#"[2,"h","Heartbeat",{}]"#).await;
        let reply = recv(&mut client).await;
        assert_eq!(reply[1], "h");
        assert!(reply[2]["currentTime"].is_string());
    }

    #[tokio::test]
    async fn reconnect_routes_commands_to_newest_connection() {
        let (gateway, addr, _shutdown) = start().await;
        let url = format!("ws://{addr}/ocpp/CP1");

        let (mut first, _) = connect_async(url.as_str()).await.unwrap();
        send(&mut first, r#"[2,"1","Heartbeat",{}]"#).await;
        recv(&mut first).await;

        let (mut second, _) = connect_async(url.as_str()).await.unwrap();
        send(&mut second, r#"[2,"2","Heartbeat",{}]"#).await;
        assert_eq!(recv(&mut second).await[1], "2");

        let message_id = gateway.start_transaction("CP1", "TAG-1", Some(1)).unwrap();
        let call = recv(&mut second).await;
        assert_eq!(call[0], 2);
        assert_eq!(call[1], json!(message_id));
        assert_eq!(call[2], "RemoteStartTransaction");
        assert_eq!(call[3]["idTag"], "TAG-1");
        recv_nothing(&mut first).await;

        first.close(None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(gateway.sessions().is_connected("CP1"));
        assert!(gateway.get_status("CP1").ws_connected);

        second.close(None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(!gateway.sessions().is_connected("CP1"));
        assert!(!gateway.get_status("CP1").ws_connected);
    }

    #[tokio::test]
    async fn shutdown_clears_sessions() {
        let (gateway, addr, shutdown) = start().await;
        let (mut client, _) = connect_async(format!("ws://{addr}/ocpp/CP1")).await.unwrap();
        send(&mut client, r#"[2,"1","Heartbeat",{}]"#).await;
        recv(&mut client).await;

        shutdown.trigger();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(gateway.sessions().count(), 0);
    }
}
