//! StatusNotification handler

use rust_ocpp::v1_6::messages::status_notification::StatusNotificationResponse;
use serde_json::Value;
use tracing::info;

use crate::application::handlers::OcppHandlerV16;
use crate::domain::ocpp::StatusNotificationRequest;

/// Overwrites only the fields the charger actually sent.
pub fn handle_status_notification(
    handler: &OcppHandlerV16,
    req: StatusNotificationRequest,
) -> Value {
    info!(
        charge_point_id = handler.charge_point_id.as_str(),
        connector_id = ?req.connector_id,
        status = req.status.as_deref().unwrap_or("-"),
        error_code = req.error_code.as_deref().unwrap_or("-"),
        "StatusNotification"
    );

    let state = handler.states.update(&handler.charge_point_id, |state| {
        state.ws_connected = true;
        if req.status.is_some() {
            state.charger_status = req.status;
        }
        if req.connector_id.is_some() {
            state.connector_id = req.connector_id;
        }
        if req.error_code.is_some() {
            state.error_code = req.error_code;
        }
    });
    handler.publish_status(state);

    serde_json::to_value(StatusNotificationResponse {}).unwrap_or_default()
}
