//! Remote Stop Transaction command

use rust_ocpp::v1_6::messages::remote_stop_transaction::RemoteStopTransactionRequest;
use tracing::info;

use super::CommandSender;
use crate::support::errors::CommandError;

pub fn remote_stop_transaction(
    command_sender: &CommandSender,
    charge_point_id: &str,
    transaction_id: i32,
) -> Result<String, CommandError> {
    info!(charge_point_id, transaction_id, "RemoteStopTransaction");

    let request = RemoteStopTransactionRequest { transaction_id };
    let payload = serde_json::to_value(&request)?;

    Ok(command_sender.send_call(charge_point_id, "RemoteStopTransaction", payload))
}
