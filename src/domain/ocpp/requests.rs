//! Inbound OCPP 1.6 requests
//!
//! Each recognized action decodes into its own variant. Every field is
//! optional and decoded on its own: a field that is absent or carries the
//! wrong type becomes `None` and the remaining fields are kept. Only a
//! payload that is not an object at all falls back to the empty request.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BootNotificationRequest {
    #[serde(deserialize_with = "field")]
    pub charge_point_vendor: Option<String>,
    #[serde(deserialize_with = "field")]
    pub charge_point_model: Option<String>,
    #[serde(deserialize_with = "field")]
    pub charge_point_serial_number: Option<String>,
    #[serde(deserialize_with = "field")]
    pub firmware_version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatusNotificationRequest {
    #[serde(deserialize_with = "field")]
    pub connector_id: Option<u32>,
    #[serde(deserialize_with = "field")]
    pub status: Option<String>,
    #[serde(deserialize_with = "field")]
    pub error_code: Option<String>,
    #[serde(deserialize_with = "field")]
    pub info: Option<String>,
    #[serde(deserialize_with = "field")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthorizeRequest {
    #[serde(deserialize_with = "field")]
    pub id_tag: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartTransactionRequest {
    #[serde(deserialize_with = "field")]
    pub connector_id: Option<u32>,
    #[serde(deserialize_with = "field")]
    pub id_tag: Option<String>,
    #[serde(deserialize_with = "field")]
    pub meter_start: Option<f64>,
    #[serde(deserialize_with = "field")]
    pub reservation_id: Option<i32>,
    #[serde(deserialize_with = "field")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopTransactionRequest {
    #[serde(deserialize_with = "field")]
    pub transaction_id: Option<i32>,
    #[serde(deserialize_with = "field")]
    pub id_tag: Option<String>,
    #[serde(deserialize_with = "field")]
    pub meter_stop: Option<f64>,
    #[serde(deserialize_with = "field")]
    pub reason: Option<String>,
    #[serde(deserialize_with = "field")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// A decoded inbound call payload.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundRequest {
    BootNotification(BootNotificationRequest),
    Heartbeat,
    StatusNotification(StatusNotificationRequest),
    Authorize(AuthorizeRequest),
    StartTransaction(StartTransactionRequest),
    StopTransaction(StopTransactionRequest),
    /// Kept opaque: stored and broadcast verbatim
    MeterValues(Value),
    /// Any action without a dedicated handler
    Raw { action: String, payload: Value },
}

impl InboundRequest {
    pub fn decode(action: &str, payload: Value) -> Self {
        match action {
            "BootNotification" => Self::BootNotification(lenient(action, payload)),
            "Heartbeat" => Self::Heartbeat,
            "StatusNotification" => Self::StatusNotification(lenient(action, payload)),
            "Authorize" => Self::Authorize(lenient(action, payload)),
            "StartTransaction" => Self::StartTransaction(lenient(action, payload)),
            "StopTransaction" => Self::StopTransaction(lenient(action, payload)),
            "MeterValues" => Self::MeterValues(payload),
            _ => Self::Raw {
                action: action.to_string(),
                payload,
            },
        }
    }

}

fn lenient<T: DeserializeOwned + Default>(action: &str, payload: Value) -> T {
    if payload.is_null() {
        return T::default();
    }
    serde_json::from_value(payload).unwrap_or_else(|e| {
        warn!(action, error = %e, "Payload is not an object, continuing with defaults");
        T::default()
    })
}

/// Decode one optional field, mapping a value of the wrong type to `None`.
fn field<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed field");
            Ok(None)
        }
    }
}

/// Actions only a central system sends. Receiving one from a charger is a
/// protocol misuse, still acknowledged.
pub fn is_cs_to_cp_action(action: &str) -> bool {
    matches!(
        action,
        "CancelReservation"
            | "ChangeAvailability"
            | "ChangeConfiguration"
            | "ClearCache"
            | "ClearChargingProfile"
            | "GetCompositeSchedule"
            | "GetConfiguration"
            | "GetDiagnostics"
            | "GetLocalListVersion"
            | "RemoteStartTransaction"
            | "RemoteStopTransaction"
            | "ReserveNow"
            | "Reset"
            | "SendLocalList"
            | "SetChargingProfile"
            | "TriggerMessage"
            | "UnlockConnector"
            | "UpdateFirmware"
    )
}
