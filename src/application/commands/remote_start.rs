//! Remote Start Transaction command

use rust_ocpp::v1_6::messages::remote_start_transaction::RemoteStartTransactionRequest;
use tracing::info;

use super::CommandSender;
use crate::support::errors::CommandError;

/// Ask the charger to start a session for `id_tag`. Returns the message id.
pub fn remote_start_transaction(
    command_sender: &CommandSender,
    charge_point_id: &str,
    id_tag: &str,
    connector_id: Option<u32>,
) -> Result<String, CommandError> {
    info!(charge_point_id, id_tag, ?connector_id, "RemoteStartTransaction");

    let request = RemoteStartTransactionRequest {
        connector_id,
        id_tag: id_tag.to_string(),
        charging_profile: None,
    };
    let payload = serde_json::to_value(&request)?;

    Ok(command_sender.send_call(charge_point_id, "RemoteStartTransaction", payload))
}
