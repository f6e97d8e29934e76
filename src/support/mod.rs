pub mod errors;
pub mod id;
pub mod ocpp_frame;
pub mod shutdown;
