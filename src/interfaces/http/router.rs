//! API router
//!
//! Everything served on the API port: the `/charging` command and query
//! routes, `/health` and the `/ws/client` observer socket.

use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::SharedGateway;
use crate::interfaces::ws::ws_observer_handler;

use super::modules::{charging, health};

pub fn create_api_router(gateway: SharedGateway) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::handlers::health_check))
        .route("/ws/client", get(ws_observer_handler))
        .nest("/charging", charging::routes())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(gateway)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::events::Broadcaster;
    use crate::application::OcppGateway;
    use crate::config::Config;
    use crate::support::ocpp_frame::OcppFrame;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use futures_util::StreamExt;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    fn gateway() -> SharedGateway {
        OcppGateway::shared(Config::default(), Broadcaster::shared())
    }

    async fn call(gateway: &SharedGateway, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let req = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = create_api_router(gateway.clone()).oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_reports_counts() {
        let gw = gateway();
        let (tx, _rx) = mpsc::unbounded_channel();
        gw.connect("CP1", tx);

        let (status, body) = call(&gw, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["connectedChargers"], 1);
    }

    #[tokio::test]
    async fn start_route_sends_remote_start() {
        let gw = gateway();
        let (tx, mut rx) = mpsc::unbounded_channel();
        gw.connect("CP1", tx);

        let (status, body) = call(
            &gw,
            "POST",
            "/charging/CP1/start",
            Some(json!({"idTag": "TAG-1", "connectorId": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let message_id = body["data"]["messageId"].as_str().unwrap().to_string();

        match OcppFrame::parse(&rx.try_recv().unwrap()).unwrap() {
            OcppFrame::Call {
                message_id: sent,
                action,
                payload,
            } => {
                assert_eq!(sent, message_id);
                assert_eq!(action, "RemoteStartTransaction");
                assert_eq!(payload["idTag"], "TAG-1");
                assert_eq!(payload["connectorId"], 1);
            }
            other => panic!("expected a call, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn commands_to_offline_chargers_are_still_accepted() {
        let gw = gateway();
        let (status, body) = call(
            &gw,
            "POST",
            "/charging/CP9/stop",
            Some(json!({"transactionId": 7})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["data"]["messageId"]
            .as_str()
            .unwrap()
            .starts_with("RemoteStopTransaction-"));
    }

    #[tokio::test]
    async fn invalid_start_body_is_unprocessable() {
        let gw = gateway();
        let (status, body) = call(&gw, "POST", "/charging/CP1/start", Some(json!({"idTag": ""}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn trigger_route_validates_message_name() {
        let gw = gateway();
        let (tx, mut rx) = mpsc::unbounded_channel();
        gw.connect("CP1", tx);

        let (status, _) = call(
            &gw,
            "POST",
            "/charging/CP1/trigger",
            Some(json!({"requestedMessage": "SelfDestruct"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(rx.try_recv().is_err());

        let (status, _) = call(
            &gw,
            "POST",
            "/charging/CP1/trigger",
            Some(json!({"requestedMessage": "MeterValues", "connectorId": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let frame: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(frame[3]["requestedMessage"], "MeterValues");
    }

    #[tokio::test]
    async fn raw_route_forwards_envelope() {
        let gw = gateway();
        let (tx, mut rx) = mpsc::unbounded_channel();
        gw.connect("CP1", tx);

        let envelope = json!([2, "custom-7", "ClearCache", {}]);
        let (status, _) = call(&gw, "POST", "/charging/CP1/raw", Some(envelope.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rx.try_recv().unwrap(), envelope.to_string());
    }

    #[tokio::test]
    async fn status_of_unknown_charger() {
        let gw = gateway();
        let (status, body) = call(&gw, "GET", "/charging/NOPE/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["wsConnected"], false);
        assert_eq!(body["data"]["chargerStatus"], "Unknown");
        assert_eq!(body["data"]["charging"], false);

        let (_, body) = call(&gw, "GET", "/charging/NOPE/meter-values", None).await;
        assert_eq!(body["data"], Value::Null);
    }

    #[tokio::test]
    async fn chargers_lists_known_records() {
        let gw = gateway();
        let (tx, _rx) = mpsc::unbounded_channel();
        gw.connect("CP2", tx);
        let (tx, _rx2) = mpsc::unbounded_channel();
        gw.connect("CP1", tx);

        let (_, body) = call(&gw, "GET", "/charging/chargers", None).await;
        let ids: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["chargerId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["CP1", "CP2"]);
    }

    #[tokio::test]
    async fn observers_receive_status_events() {
        let gw = gateway();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = create_api_router(gw.clone());
        tokio::spawn(async move { axum::serve(listener, app).await });

        let (mut client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws/client"))
            .await
            .unwrap();

        for _ in 0..50 {
            if gw.broadcaster().observer_count() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert_eq!(gw.broadcaster().observer_count(), 1);

        let (tx, _rx) = mpsc::unbounded_channel();
        gw.connect("CP1", tx);

        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let event: Value = serde_json::from_str(msg.to_text().unwrap()).unwrap();
        assert_eq!(event["type"], "status");
        assert_eq!(event["payload"]["chargerId"], "CP1");
        assert_eq!(event["payload"]["wsConnected"], true);
    }
}
