//! OCPP 1.6 action handlers
//!
//! Routes a decoded [`InboundRequest`] to its handler. Each handler applies
//! its state effect, notifies observers where relevant and returns the
//! reply payload.

use serde_json::{json, Value};
use tracing::warn;

use crate::application::handlers::OcppHandlerV16;
use crate::domain::ocpp::{is_cs_to_cp_action, InboundRequest};

mod handle_authorize;
mod handle_boot_notification;
mod handle_heartbeat;
mod handle_meter_values;
mod handle_start_transaction;
mod handle_status_notification;
mod handle_stop_transaction;

pub use handle_authorize::handle_authorize;
pub use handle_boot_notification::handle_boot_notification;
pub use handle_heartbeat::handle_heartbeat;
pub use handle_meter_values::handle_meter_values;
pub use handle_start_transaction::handle_start_transaction;
pub use handle_status_notification::handle_status_notification;
pub use handle_stop_transaction::handle_stop_transaction;

pub fn action_matcher(handler: &OcppHandlerV16, request: InboundRequest) -> Value {
    match request {
        InboundRequest::BootNotification(req) => handle_boot_notification(handler, req),
        InboundRequest::Heartbeat => handle_heartbeat(handler),
        InboundRequest::StatusNotification(req) => handle_status_notification(handler, req),
        InboundRequest::Authorize(req) => handle_authorize(handler, req),
        InboundRequest::StartTransaction(req) => handle_start_transaction(handler, req),
        InboundRequest::StopTransaction(req) => handle_stop_transaction(handler, req),
        InboundRequest::MeterValues(payload) => handle_meter_values(handler, payload),
        InboundRequest::Raw { action, .. } => handle_unknown(handler, &action),
    }
}

/// Unknown actions are acknowledged with an empty payload.
fn handle_unknown(handler: &OcppHandlerV16, action: &str) -> Value {
    if is_cs_to_cp_action(action) {
        warn!(
            charge_point_id = handler.charge_point_id.as_str(),
            action,
            "Received CS→CP action from charge point (protocol error)"
        );
    } else {
        warn!(
            charge_point_id = handler.charge_point_id.as_str(),
            action,
            "Unhandled OCPP 1.6 action"
        );
    }
    json!({})
}
