//! Transport adapters around the gateway

pub mod http;
pub mod ws;
