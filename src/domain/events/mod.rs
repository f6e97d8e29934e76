pub mod types;

pub use types::ObserverEvent;
