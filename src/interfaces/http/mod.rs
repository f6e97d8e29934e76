//! HTTP interfaces
//!
//! - `common`: response envelope and validated JSON extractor
//! - `modules`: route handlers per resource
//! - `router`: the API router, observer WebSocket included

pub mod common;
pub mod modules;
pub mod router;

pub use router::create_api_router;
