//! OCPP message handlers

mod ocpp_v16;
mod ocpp_v16_handler;

pub use ocpp_v16_handler::OcppHandlerV16;
