//! CLI command implementations for waypost.

pub mod config;
pub mod record;
pub mod resolve;
