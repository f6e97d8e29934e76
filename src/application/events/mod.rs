pub mod broadcaster;

pub use crate::domain::events::ObserverEvent;
pub use broadcaster::{Broadcaster, SharedBroadcaster};
