pub mod commands;
pub mod events;
pub mod gateway;
pub mod handlers;
pub mod session;

// Re-export key types for convenience
pub use commands::{CommandSender, Delivery, SharedCommandSender, TriggerType};
pub use events::{Broadcaster, ObserverEvent, SharedBroadcaster};
pub use gateway::{OcppGateway, SharedGateway};
pub use handlers::OcppHandlerV16;
pub use session::{Connection, SessionRegistry, SharedSessionRegistry};
