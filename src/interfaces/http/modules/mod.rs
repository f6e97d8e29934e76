//! Route modules

pub mod charging;
pub mod health;
