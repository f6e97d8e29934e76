//! Gateway service
//!
//! [`OcppGateway`] owns every piece of gateway state: the live connections,
//! the charger records, the observer fan-out and the id generators. The
//! transports feed it inbound traffic; the HTTP shell calls its command
//! methods.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use crate::application::commands::{
    self, CommandSender, Delivery, SharedCommandSender, TriggerType,
};
use crate::application::events::SharedBroadcaster;
use crate::application::handlers::OcppHandlerV16;
use crate::application::session::{Connection, SessionRegistry, SharedSessionRegistry};
use crate::config::Config;
use crate::domain::{ChargerSnapshot, ChargerState, ObserverEvent};
use crate::infrastructure::storage::{ChargerStateStore, SharedChargerStateStore};
use crate::support::errors::CommandError;
use crate::support::id::TransactionIdGenerator;

pub struct OcppGateway {
    config: Arc<Config>,
    sessions: SharedSessionRegistry,
    states: SharedChargerStateStore,
    broadcaster: SharedBroadcaster,
    command_sender: SharedCommandSender,
    transaction_ids: Arc<TransactionIdGenerator>,
}

pub type SharedGateway = Arc<OcppGateway>;

impl OcppGateway {
    pub fn new(config: Config, broadcaster: SharedBroadcaster) -> Self {
        let sessions = SessionRegistry::shared();
        Self {
            config: Arc::new(config),
            command_sender: Arc::new(CommandSender::new(sessions.clone())),
            sessions,
            states: ChargerStateStore::shared(),
            broadcaster,
            transaction_ids: Arc::new(TransactionIdGenerator::new()),
        }
    }

    pub fn shared(config: Config, broadcaster: SharedBroadcaster) -> SharedGateway {
        Arc::new(Self::new(config, broadcaster))
    }

    // ── Charge point lifecycle ─────────────────────────────

    /// Register a freshly accepted connection and mark the charger online.
    /// The returned handle identifies this connection on close.
    pub fn connect(&self, charge_point_id: &str, sender: mpsc::UnboundedSender<String>) -> Connection {
        let connection = Connection::new(charge_point_id, sender);
        self.sessions.register_with(connection.clone(), || {
            let state = self.states.update(charge_point_id, |state| {
                state.ws_connected = true;
            });
            self.publish_status(charge_point_id, state);
        });

        connection
    }

    /// Handle a closed connection. Only the charger's current connection
    /// flips it offline; a stale close is ignored. Returns whether the
    /// charger went offline.
    pub fn disconnect(&self, charge_point_id: &str, connection_id: Uuid) -> bool {
        let went_offline = self
            .sessions
            .unregister_with(charge_point_id, connection_id, || {
                if let Some(state) = self.states.mark_disconnected(charge_point_id) {
                    self.publish_status(charge_point_id, state);
                }
            })
            .is_some();

        if went_offline {
            info!(charge_point_id, %connection_id, "Charge point disconnected");
        }
        went_offline
    }

    /// Process one inbound text message and return the reply, if any.
    pub fn handle_message(&self, charge_point_id: &str, text: &str) -> Option<String> {
        self.handler_for(charge_point_id).handle(text)
    }

    fn handler_for(&self, charge_point_id: &str) -> OcppHandlerV16 {
        OcppHandlerV16::new(
            charge_point_id,
            self.states.clone(),
            self.broadcaster.clone(),
            self.config.clone(),
            self.transaction_ids.clone(),
        )
    }

    fn publish_status(&self, charge_point_id: &str, state: ChargerState) {
        self.broadcaster
            .broadcast(&ObserverEvent::Status(ChargerSnapshot::new(charge_point_id, state)));
    }

    // ── Commands ───────────────────────────────────────────

    pub fn start_transaction(
        &self,
        charge_point_id: &str,
        id_tag: &str,
        connector_id: Option<u32>,
    ) -> Result<String, CommandError> {
        commands::remote_start_transaction(&self.command_sender, charge_point_id, id_tag, connector_id)
    }

    pub fn stop_transaction(
        &self,
        charge_point_id: &str,
        transaction_id: i32,
    ) -> Result<String, CommandError> {
        commands::remote_stop_transaction(&self.command_sender, charge_point_id, transaction_id)
    }

    /// Write a caller-built envelope verbatim. Not validated.
    pub fn send_raw(&self, charge_point_id: &str, envelope: impl Into<String>) -> Delivery {
        self.command_sender.send_raw(charge_point_id, envelope.into())
    }

    pub fn trigger_message(
        &self,
        charge_point_id: &str,
        requested_message: &str,
        connector_id: Option<u32>,
    ) -> Result<String, CommandError> {
        let trigger: TriggerType = requested_message.parse()?;
        commands::trigger_message(&self.command_sender, charge_point_id, trigger, connector_id)
    }

    // ── Queries ────────────────────────────────────────────

    pub fn get_status(&self, charge_point_id: &str) -> ChargerState {
        self.states.status_of(charge_point_id)
    }

    pub fn get_last_meter_values(&self, charge_point_id: &str) -> Option<Value> {
        self.states
            .get(charge_point_id)
            .and_then(|state| state.last_meter_values)
    }

    pub fn chargers(&self) -> Vec<ChargerSnapshot> {
        self.states.snapshots()
    }

    pub fn sessions(&self) -> &SharedSessionRegistry {
        &self.sessions
    }

    pub fn broadcaster(&self) -> &SharedBroadcaster {
        &self.broadcaster
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Drop every live connection handle. Writer tasks end once their
    /// sender is gone.
    pub fn shutdown(&self) -> usize {
        let connected = self.sessions.connected_ids();
        if !connected.is_empty() {
            info!(chargers = ?connected, "📢 Closing charge point sessions");
        }
        let closed = self.sessions.clear();
        info!(closed, "Gateway sessions cleared");
        closed
    }
}
