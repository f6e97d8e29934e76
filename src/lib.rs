//! # Charge Gateway
//!
//! OCPP 1.6-J gateway between charge points and observer clients.
//!
//! ## Architecture
//!
//! - **domain**: charger records, observer events, typed inbound requests
//! - **application**: the [`OcppGateway`] service with its session registry,
//!   action handlers, command sender and observer broadcaster
//! - **infrastructure**: in-memory charger state store
//! - **interfaces**: charge-point WebSocket listener, HTTP API and the
//!   observer WebSocket
//! - **support**: OCPP-J framing, id generation, errors, shutdown

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod support;

pub use application::{Broadcaster, OcppGateway, SharedBroadcaster, SharedGateway};
pub use config::{default_config_path, AppConfig, Config};
pub use domain::{ChargerSnapshot, ChargerState, ObserverEvent};
pub use interfaces::http::create_api_router;
