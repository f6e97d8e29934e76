//! WebSocket interfaces
//!
//! - `ocpp_server`: charge-point listener speaking OCPP-J 1.6
//! - `observers`: status and meter fan-out to UI clients

pub mod observers;
pub mod ocpp_server;

pub use observers::ws_observer_handler;
pub use ocpp_server::OcppServer;
