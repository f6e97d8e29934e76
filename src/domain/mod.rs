//! Domain layer - charger state, observer events and inbound request types

pub mod charger;
pub mod events;
pub mod ocpp;

pub use charger::{ChargerSnapshot, ChargerState, UNKNOWN_STATUS};
pub use events::ObserverEvent;
pub use ocpp::InboundRequest;
