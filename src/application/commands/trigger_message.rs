//! Trigger Message command

use std::str::FromStr;

use rust_ocpp::v1_6::messages::trigger_message::TriggerMessageRequest;
use rust_ocpp::v1_6::types::MessageTrigger;
use tracing::info;

use super::CommandSender;
use crate::support::errors::CommandError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerType {
    BootNotification,
    DiagnosticsStatusNotification,
    FirmwareStatusNotification,
    Heartbeat,
    MeterValues,
    StatusNotification,
}

impl TriggerType {
    fn to_message_trigger(self) -> MessageTrigger {
        match self {
            TriggerType::BootNotification => MessageTrigger::BootNotification,
            TriggerType::DiagnosticsStatusNotification => {
                MessageTrigger::DiagnosticsStatusNotification
            }
            TriggerType::FirmwareStatusNotification => MessageTrigger::FirmwareStatusNotification,
            TriggerType::Heartbeat => MessageTrigger::Heartbeat,
            TriggerType::MeterValues => MessageTrigger::MeterValues,
            TriggerType::StatusNotification => MessageTrigger::StatusNotification,
        }
    }
}

impl FromStr for TriggerType {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BootNotification" => Ok(Self::BootNotification),
            "DiagnosticsStatusNotification" => Ok(Self::DiagnosticsStatusNotification),
            "FirmwareStatusNotification" => Ok(Self::FirmwareStatusNotification),
            "Heartbeat" => Ok(Self::Heartbeat),
            "MeterValues" => Ok(Self::MeterValues),
            "StatusNotification" => Ok(Self::StatusNotification),
            other => Err(CommandError::UnknownTrigger(other.to_string())),
        }
    }
}

pub fn trigger_message(
    command_sender: &CommandSender,
    charge_point_id: &str,
    requested_message: TriggerType,
    connector_id: Option<u32>,
) -> Result<String, CommandError> {
    info!(charge_point_id, ?requested_message, ?connector_id, "TriggerMessage");

    let request = TriggerMessageRequest {
        requested_message: requested_message.to_message_trigger(),
        connector_id,
    };
    let payload = serde_json::to_value(&request)?;

    Ok(command_sender.send_call(charge_point_id, "TriggerMessage", payload))
}
