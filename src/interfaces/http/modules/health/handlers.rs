//! Health check handler

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::application::SharedGateway;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub connected_chargers: usize,
    pub observers: usize,
}

pub async fn health_check(State(gateway): State<SharedGateway>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        connected_chargers: gateway.sessions().count(),
        observers: gateway.broadcaster().observer_count(),
    })
}
