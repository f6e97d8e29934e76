//! Typed OCPP 1.6 inbound payloads

pub mod requests;

pub use requests::{
    is_cs_to_cp_action, AuthorizeRequest, BootNotificationRequest, InboundRequest,
    StartTransactionRequest, StatusNotificationRequest, StopTransactionRequest,
};
