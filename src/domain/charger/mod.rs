pub mod model;

pub use model::{ChargerSnapshot, ChargerState, UNKNOWN_STATUS};
