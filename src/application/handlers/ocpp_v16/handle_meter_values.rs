//! MeterValues handler

use rust_ocpp::v1_6::messages::meter_values::MeterValuesResponse;
use serde_json::Value;
use tracing::info;

use crate::application::handlers::OcppHandlerV16;
use crate::domain::ObserverEvent;

/// Stores the payload verbatim and forwards it to observers untouched.
pub fn handle_meter_values(handler: &OcppHandlerV16, payload: Value) -> Value {
    info!(
        charge_point_id = handler.charge_point_id.as_str(),
        connector_id = ?payload.get("connectorId"),
        "MeterValues"
    );

    handler.states.update(&handler.charge_point_id, |state| {
        state.last_meter_values = Some(payload.clone());
    });
    handler.broadcaster.broadcast(&ObserverEvent::Meter(payload));

    serde_json::to_value(MeterValuesResponse {}).unwrap_or_default()
}
