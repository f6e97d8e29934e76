//! Charger status record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status reported for chargers the gateway has never heard from.
pub const UNKNOWN_STATUS: &str = "Unknown";

/// Per-charger status record, kept in memory for the process lifetime.
///
/// `transaction_id` is `Some` exactly while `charging` is true.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargerState {
    pub ws_connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charger_status: Option<String>,
    pub charging: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_heartbeat: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_start: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_stop: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_start: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_stop: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_meter_values: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_point_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_point_model: Option<String>,
}

impl ChargerState {
    /// Fresh record for a charger that just produced its first event.
    pub fn connected() -> Self {
        Self {
            ws_connected: true,
            ..Self::default()
        }
    }

    /// Sentinel returned for identifiers that never connected.
    pub fn unknown() -> Self {
        Self {
            ws_connected: false,
            charger_status: Some(UNKNOWN_STATUS.to_string()),
            ..Self::default()
        }
    }

    /// Open a transaction. Clears the readings of the previous one.
    pub fn start_transaction(
        &mut self,
        transaction_id: i32,
        connector_id: Option<u32>,
        id_tag: Option<String>,
        meter_start: Option<f64>,
        started_at: DateTime<Utc>,
    ) {
        self.charging = true;
        self.transaction_id = Some(transaction_id);
        if connector_id.is_some() {
            self.connector_id = connector_id;
        }
        self.id_tag = id_tag;
        self.meter_start = meter_start;
        self.timestamp_start = Some(started_at);
        self.meter_stop = None;
        self.timestamp_stop = None;
    }

    pub fn stop_transaction(&mut self, meter_stop: Option<f64>, stopped_at: DateTime<Utc>) {
        self.charging = false;
        self.transaction_id = None;
        self.meter_stop = meter_stop;
        self.timestamp_stop = Some(stopped_at);
    }
}

/// A charger's state tagged with its identifier, as pushed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargerSnapshot {
    pub charger_id: String,
    #[serde(flatten)]
    pub state: ChargerState,
}

impl ChargerSnapshot {
    pub fn new(charger_id: impl Into<String>, state: ChargerState) -> Self {
        Self {
            charger_id: charger_id.into(),
            state,
        }
    }
}
