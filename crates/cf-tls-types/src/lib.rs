//! Domain types for the cf-tls CLI
//!
//! This crate holds the platform-independent pieces of the TLS enabler:
//! the service instance model, the supported-offering registry, the
//! credential topology decoder, and the arbitrary-parameter builder.

pub mod credentials;
pub mod offering;
pub mod params;
pub mod service;

pub use credentials::{CredentialError, CredentialTopology};
pub use offering::{OfferingRegistry, SupportedOffering};
pub use params::update_parameters;
pub use service::{LastOperation, OperationState, ServiceInstance};
