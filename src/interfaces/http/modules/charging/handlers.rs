//! Charging handlers
//!
//! Command routes answer 200 as soon as the frame is queued, or dropped
//! because the charger is offline. Nothing waits for the charger's reply.

use axum::extract::{Path, State};
use axum::Json;
use serde_json::Value;

use super::dto::{CommandAccepted, StartChargingRequest, StopChargingRequest, TriggerMessageRequest};
use crate::application::{Delivery, SharedGateway};
use crate::domain::{ChargerSnapshot, ChargerState};
use crate::interfaces::http::common::{ApiError, ApiResponse, ValidatedJson};

type CommandResult = Result<Json<ApiResponse<CommandAccepted>>, ApiError>;

pub async fn start_charging(
    State(gateway): State<SharedGateway>,
    Path(charger_id): Path<String>,
    ValidatedJson(req): ValidatedJson<StartChargingRequest>,
) -> CommandResult {
    let message_id = gateway.start_transaction(&charger_id, &req.id_tag, req.connector_id)?;
    Ok(Json(ApiResponse::success(CommandAccepted::sent(
        "RemoteStartTransaction",
        &charger_id,
        message_id,
    ))))
}

pub async fn stop_charging(
    State(gateway): State<SharedGateway>,
    Path(charger_id): Path<String>,
    ValidatedJson(req): ValidatedJson<StopChargingRequest>,
) -> CommandResult {
    let message_id = gateway.stop_transaction(&charger_id, req.transaction_id)?;
    Ok(Json(ApiResponse::success(CommandAccepted::sent(
        "RemoteStopTransaction",
        &charger_id,
        message_id,
    ))))
}

pub async fn trigger_message(
    State(gateway): State<SharedGateway>,
    Path(charger_id): Path<String>,
    ValidatedJson(req): ValidatedJson<TriggerMessageRequest>,
) -> CommandResult {
    let message_id =
        gateway.trigger_message(&charger_id, &req.requested_message, req.connector_id)?;
    Ok(Json(ApiResponse::success(CommandAccepted::sent(
        "TriggerMessage",
        &charger_id,
        message_id,
    ))))
}

/// A JSON string body is sent as-is; any other JSON value is sent as its
/// compact text.
pub async fn send_raw(
    State(gateway): State<SharedGateway>,
    Path(charger_id): Path<String>,
    Json(envelope): Json<Value>,
) -> CommandResult {
    let text = match envelope {
        Value::String(text) => text,
        other => other.to_string(),
    };

    let message = match gateway.send_raw(&charger_id, text) {
        Delivery::Queued => format!("Raw message sent to {}", charger_id),
        Delivery::NotConnected => format!("Charger {} is not connected", charger_id),
    };
    Ok(Json(ApiResponse::success(CommandAccepted {
        message,
        message_id: None,
    })))
}

pub async fn get_status(
    State(gateway): State<SharedGateway>,
    Path(charger_id): Path<String>,
) -> Json<ApiResponse<ChargerState>> {
    Json(ApiResponse::success(gateway.get_status(&charger_id)))
}

pub async fn get_meter_values(
    State(gateway): State<SharedGateway>,
    Path(charger_id): Path<String>,
) -> Json<ApiResponse<Value>> {
    let meter_values = gateway
        .get_last_meter_values(&charger_id)
        .unwrap_or(Value::Null);
    Json(ApiResponse::success(meter_values))
}

pub async fn list_chargers(
    State(gateway): State<SharedGateway>,
) -> Json<ApiResponse<Vec<ChargerSnapshot>>> {
    Json(ApiResponse::success(gateway.chargers()))
}
