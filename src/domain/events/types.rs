//! Observer events
//!
//! Serialized as `{"type": "status" | "meter", "payload": ...}`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::charger::ChargerSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "lowercase")]
pub enum ObserverEvent {
    /// A charger's status record changed
    Status(ChargerSnapshot),
    /// Raw MeterValues payload as received from the charger
    Meter(Value),
}

impl ObserverEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            ObserverEvent::Status(_) => "status",
            ObserverEvent::Meter(_) => "meter",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::charger::ChargerState;
    use serde_json::json;

    #[test]
    fn meter_event_wire_shape() {
        let event = ObserverEvent::Meter(json!({"connectorId": 1, "meterValue": []}));
        assert_eq!(
            serde_json::to_value(&event).unwrap(),
            json!({"type": "meter", "payload": {"connectorId": 1, "meterValue": []}})
        );
    }

    #[test]
    fn status_event_wire_shape() {
        let event = ObserverEvent::Status(ChargerSnapshot::new("CP1", ChargerState::connected()));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "status");
        assert_eq!(value["payload"]["chargerId"], "CP1");
        assert_eq!(value["payload"]["wsConnected"], true);
        assert_eq!(event.event_type(), "status");
    }
}
