//! Charging DTOs

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartChargingRequest {
    #[validate(length(min = 1, max = 20, message = "idTag must be 1-20 characters"))]
    pub id_tag: String,
    #[validate(range(min = 1, message = "connectorId must be >= 1"))]
    pub connector_id: Option<u32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StopChargingRequest {
    pub transaction_id: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TriggerMessageRequest {
    #[validate(length(min = 1, message = "requestedMessage is required"))]
    pub requested_message: String,
    pub connector_id: Option<u32>,
}

/// Acknowledgment of a fire-and-forget command
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandAccepted {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

impl CommandAccepted {
    pub fn sent(action: &str, charger_id: &str, message_id: String) -> Self {
        Self {
            message: format!("{} sent to {}", action, charger_id),
            message_id: Some(message_id),
        }
    }
}
