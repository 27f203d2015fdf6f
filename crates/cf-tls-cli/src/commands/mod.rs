//! CLI command implementations

pub mod create_service;
pub mod enable_tls;
pub mod offerings;
