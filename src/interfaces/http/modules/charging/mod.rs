//! `/charging` routes: commands to one charger and state queries

pub mod dto;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;

use crate::application::SharedGateway;

pub fn routes() -> Router<SharedGateway> {
    Router::new()
        .route("/chargers", get(handlers::list_chargers))
        .route("/{charger_id}/start", post(handlers::start_charging))
        .route("/{charger_id}/stop", post(handlers::stop_charging))
        .route("/{charger_id}/trigger", post(handlers::trigger_message))
        .route("/{charger_id}/raw", post(handlers::send_raw))
        .route("/{charger_id}/status", get(handlers::get_status))
        .route("/{charger_id}/meter-values", get(handlers::get_meter_values))
}
