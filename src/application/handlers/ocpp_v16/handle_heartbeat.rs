//! Heartbeat handler

use chrono::Utc;
use rust_ocpp::v1_6::messages::heart_beat::HeartbeatResponse;
use serde_json::Value;
use tracing::info;

use crate::application::handlers::OcppHandlerV16;

pub fn handle_heartbeat(handler: &OcppHandlerV16) -> Value {
    info!(
        charge_point_id = handler.charge_point_id.as_str(),
        "Heartbeat"
    );

    let now = Utc::now();
    let state = handler.states.update(&handler.charge_point_id, |state| {
        state.last_heartbeat = Some(now);
    });
    handler.publish_status(state);

    let response = HeartbeatResponse { current_time: now };

    serde_json::to_value(&response).unwrap_or_default()
}
