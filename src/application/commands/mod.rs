//! Command sender for gateway to charge point communication
//!
//! Outbound calls are fire-and-forget: the sender writes the frame to the
//! charger's current connection and returns. Replies arrive later as
//! CallResult frames and are only logged by the dispatcher.
//!
//! - [`CommandSender::send_raw`]: writes caller-supplied text verbatim.
//! - [`CommandSender::send_call`]: frames `[2, messageId, action, payload]`
//!   with a generated message id.
//! - `remote_start`, `remote_stop` and `trigger_message` build typed
//!   `rust_ocpp` v1.6 payloads on top of `send_call`.

pub mod remote_start;
pub mod remote_stop;
pub mod trigger_message;

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::application::session::SharedSessionRegistry;
use crate::support::id::MessageIdGenerator;
use crate::support::ocpp_frame::OcppFrame;

pub use remote_start::remote_start_transaction;
pub use remote_stop::remote_stop_transaction;
pub use trigger_message::{trigger_message, TriggerType};

/// Outcome of a delivery attempt. Informational only: callers are never
/// failed because a charger is offline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Queued,
    NotConnected,
}

pub struct CommandSender {
    session_registry: SharedSessionRegistry,
    message_ids: MessageIdGenerator,
}

impl CommandSender {
    pub fn new(session_registry: SharedSessionRegistry) -> Self {
        Self {
            session_registry,
            message_ids: MessageIdGenerator::new(),
        }
    }

    /// Write `envelope` verbatim to the charger's current connection.
    pub fn send_raw(&self, charge_point_id: &str, envelope: String) -> Delivery {
        match self.session_registry.send_to(charge_point_id, envelope) {
            Ok(()) => {
                info!(charge_point_id, "Command queued");
                Delivery::Queued
            }
            Err(e) => {
                warn!(charge_point_id, error = %e, "Cannot send to charger");
                Delivery::NotConnected
            }
        }
    }

    /// Frame and send a call. Returns the generated message id whether or
    /// not the charger was reachable.
    pub fn send_call(&self, charge_point_id: &str, action: &str, payload: Value) -> String {
        let message_id = self.message_ids.next(action);
        let frame = OcppFrame::Call {
            message_id: message_id.clone(),
            action: action.to_string(),
            payload,
        };

        info!(charge_point_id, action, message_id = message_id.as_str(), "Sending call");
        self.send_raw(charge_point_id, frame.serialize());
        message_id
    }
}

/// Thread-safe command sender
pub type SharedCommandSender = Arc<CommandSender>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::session::{Connection, SessionRegistry};
    use serde_json::json;
    use tokio::sync::mpsc;

    #[test]
    fn raw_envelope_is_written_verbatim() {
        let registry = SessionRegistry::shared();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(Connection::new("CP1", tx));
        let sender = CommandSender::new(registry);

        let envelope = r#"["2","12345","RemoteStartTransaction",{"idTag":"A"}]"#.to_string();
        assert_eq!(sender.send_raw("CP1", envelope.clone()), Delivery::Queued);
        assert_eq!(rx.try_recv().unwrap(), envelope);
    }

    #[test]
    fn missing_charger_is_not_an_error() {
        let sender = CommandSender::new(SessionRegistry::shared());
        assert_eq!(sender.send_raw("CP9", "[]".into()), Delivery::NotConnected);
        let message_id = sender.send_call("CP9", "Reset", json!({"type": "Soft"}));
        assert!(message_id.starts_with("Reset-"));
    }

    #[test]
    fn closed_connection_is_skipped() {
        let registry = SessionRegistry::shared();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(Connection::new("CP1", tx));
        drop(rx);
        let sender = CommandSender::new(registry);
        assert_eq!(sender.send_raw("CP1", "[]".into()), Delivery::NotConnected);
    }

    #[test]
    fn send_call_frames_the_payload() {
        let registry = SessionRegistry::shared();
        let (tx, mut rx) = mpsc::unbounded_channel();
        registry.register(Connection::new("CP1", tx));
        let sender = CommandSender::new(registry);

        let message_id = sender.send_call("CP1", "ClearCache", json!({}));
        let frame = OcppFrame::parse(&rx.try_recv().unwrap()).unwrap();
        assert_eq!(
            frame,
            OcppFrame::Call {
                message_id,
                action: "ClearCache".into(),
                payload: json!({}),
            }
        );
    }
}
