//! StopTransaction handler

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::application::handlers::OcppHandlerV16;
use crate::domain::ocpp::StopTransactionRequest;

pub fn handle_stop_transaction(handler: &OcppHandlerV16, req: StopTransactionRequest) -> Value {
    info!(
        charge_point_id = handler.charge_point_id.as_str(),
        transaction_id = ?req.transaction_id,
        meter_stop = ?req.meter_stop,
        reason = req.reason.as_deref().unwrap_or("-"),
        "StopTransaction"
    );

    let stopped_at = req.timestamp.unwrap_or_else(Utc::now);
    let state = handler.states.update(&handler.charge_point_id, |state| {
        if let (Some(open), Some(reported)) = (state.transaction_id, req.transaction_id) {
            if open != reported {
                warn!(
                    charge_point_id = handler.charge_point_id.as_str(),
                    open_transaction_id = open,
                    reported_transaction_id = reported,
                    "StopTransaction for a different transaction, closing the open one"
                );
            }
        }
        state.stop_transaction(req.meter_stop, stopped_at);
    });
    handler.publish_status(state);

    // idTagInfo is optional in the reply and omitted here
    json!({})
}
