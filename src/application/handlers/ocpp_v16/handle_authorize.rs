//! Authorize handler
//!
//! Every tag is accepted. No state is touched: a session only begins with
//! StartTransaction.

use chrono::{Duration, Utc};
use rust_ocpp::v1_6::messages::authorize::AuthorizeResponse;
use rust_ocpp::v1_6::types::{AuthorizationStatus, IdTagInfo};
use serde_json::Value;
use tracing::info;

use crate::application::handlers::OcppHandlerV16;
use crate::domain::ocpp::AuthorizeRequest;

pub fn handle_authorize(handler: &OcppHandlerV16, req: AuthorizeRequest) -> Value {
    info!(
        charge_point_id = handler.charge_point_id.as_str(),
        id_tag = req.id_tag.as_deref().unwrap_or("-"),
        "Authorize"
    );

    let expiry = Utc::now() + Duration::hours(handler.config.authorize_expiry_hours);
    let response = AuthorizeResponse {
        id_tag_info: IdTagInfo {
            status: AuthorizationStatus::Accepted,
            expiry_date: Some(expiry),
            parent_id_tag: None,
        },
    };

    serde_json::to_value(&response).unwrap_or_default()
}
