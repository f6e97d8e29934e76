//! StartTransaction handler

use chrono::Utc;
use rust_ocpp::v1_6::messages::start_transaction::StartTransactionResponse;
use rust_ocpp::v1_6::types::{AuthorizationStatus, IdTagInfo};
use serde_json::Value;
use tracing::info;

use crate::application::handlers::OcppHandlerV16;
use crate::domain::ocpp::StartTransactionRequest;

pub fn handle_start_transaction(handler: &OcppHandlerV16, req: StartTransactionRequest) -> Value {
    let transaction_id = handler.transaction_ids.next();
    let started_at = req.timestamp.unwrap_or_else(Utc::now);

    info!(
        charge_point_id = handler.charge_point_id.as_str(),
        transaction_id,
        connector_id = ?req.connector_id,
        id_tag = req.id_tag.as_deref().unwrap_or("-"),
        meter_start = ?req.meter_start,
        "StartTransaction"
    );

    let state = handler.states.update(&handler.charge_point_id, |state| {
        state.start_transaction(
            transaction_id,
            req.connector_id,
            req.id_tag,
            req.meter_start,
            started_at,
        );
    });
    handler.publish_status(state);

    let response = StartTransactionResponse {
        transaction_id,
        id_tag_info: IdTagInfo {
            status: AuthorizationStatus::Accepted,
            expiry_date: None,
            parent_id_tag: None,
        },
    };

    serde_json::to_value(&response).unwrap_or_default()
}
