//! OCPP 1.6 message handler
//!
//! Parses raw OCPP-J frames, dispatches calls to action handlers and
//! serializes the replies. CallResults answering our own commands are only
//! logged: outbound commands are not correlated.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::events::SharedBroadcaster;
use crate::application::handlers::ocpp_v16::action_matcher;
use crate::config::Config;
use crate::domain::{ChargerSnapshot, ChargerState, InboundRequest, ObserverEvent};
use crate::infrastructure::storage::SharedChargerStateStore;
use crate::support::id::TransactionIdGenerator;
use crate::support::ocpp_frame::OcppFrame;

/// Handler for messages arriving from one charge point
pub struct OcppHandlerV16 {
    pub charge_point_id: String,
    pub states: SharedChargerStateStore,
    pub broadcaster: SharedBroadcaster,
    pub config: Arc<Config>,
    pub transaction_ids: Arc<TransactionIdGenerator>,
}

impl OcppHandlerV16 {
    pub fn new(
        charge_point_id: impl Into<String>,
        states: SharedChargerStateStore,
        broadcaster: SharedBroadcaster,
        config: Arc<Config>,
        transaction_ids: Arc<TransactionIdGenerator>,
    ) -> Self {
        Self {
            charge_point_id: charge_point_id.into(),
            states,
            broadcaster,
            config,
            transaction_ids,
        }
    }

    /// Handle one inbound text message. Returns the reply to write back,
    /// if any. Undecodable input is logged and dropped.
    pub fn handle(&self, text: &str) -> Option<String> {
        debug!(
            charge_point_id = self.charge_point_id.as_str(),
            "Received raw message: {}", text
        );

        let frame = match OcppFrame::parse(text) {
            Ok(f) => f,
            Err(e) => {
                warn!(
                    charge_point_id = self.charge_point_id.as_str(),
                    error = %e,
                    raw = text,
                    "Dropping undecodable OCPP message"
                );
                return None;
            }
        };

        match frame {
            OcppFrame::Call {
                message_id,
                action,
                payload,
            } => Some(self.handle_call(&message_id, &action, payload)),

            OcppFrame::CallResult {
                message_id,
                payload,
            } => {
                self.handle_call_result(&message_id, &payload);
                None
            }
        }
    }

    fn handle_call(&self, message_id: &str, action: &str, payload: Value) -> String {
        info!(
            charge_point_id = self.charge_point_id.as_str(),
            action,
            message_id,
            "Received Call"
        );

        let request = InboundRequest::decode(action, payload);
        let response_payload = action_matcher(self, request);

        OcppFrame::reply(message_id, response_payload).serialize()
    }

    fn handle_call_result(&self, message_id: &str, payload: &Value) {
        info!(
            charge_point_id = self.charge_point_id.as_str(),
            message_id,
            %payload,
            "Received CallResult"
        );
    }

    /// Push the charger's current record to every observer.
    pub fn publish_status(&self, state: ChargerState) {
        let snapshot = ChargerSnapshot::new(self.charge_point_id.as_str(), state);
        self.broadcaster.broadcast(&ObserverEvent::Status(snapshot));
    }
}
