//! BootNotification handler

use chrono::Utc;
use rust_ocpp::v1_6::messages::boot_notification::BootNotificationResponse;
use rust_ocpp::v1_6::types::RegistrationStatus;
use serde_json::Value;
use tracing::info;

use crate::application::handlers::OcppHandlerV16;
use crate::domain::ocpp::BootNotificationRequest;

pub fn handle_boot_notification(handler: &OcppHandlerV16, req: BootNotificationRequest) -> Value {
    info!(
        charge_point_id = handler.charge_point_id.as_str(),
        vendor = req.charge_point_vendor.as_deref().unwrap_or("-"),
        model = req.charge_point_model.as_deref().unwrap_or("-"),
        firmware = req.firmware_version.as_deref().unwrap_or("-"),
        "BootNotification"
    );

    handler.states.update(&handler.charge_point_id, |state| {
        state.ws_connected = true;
        if req.charge_point_vendor.is_some() {
            state.charge_point_vendor = req.charge_point_vendor;
        }
        if req.charge_point_model.is_some() {
            state.charge_point_model = req.charge_point_model;
        }
    });

    let response = BootNotificationResponse {
        current_time: Utc::now(),
        interval: handler.config.heartbeat_interval,
        status: RegistrationStatus::Accepted,
    };

    serde_json::to_value(&response).unwrap_or_default()
}
