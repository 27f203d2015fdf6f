//! Service instance types
//!
//! A ServiceInstance is the slice of the platform's service-instance record
//! the enabler needs: identity, offering, and the state of the most recent
//! lifecycle operation.

use serde::{Deserialize, Serialize};

/// A provisioned instance of a managed backing service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInstance {
    /// Instance name (unique within a space)
    pub name: String,

    /// Instance GUID
    pub guid: String,

    /// Name of the service offering this instance was provisioned from
    pub offering: String,

    /// Most recent lifecycle operation
    pub last_operation: LastOperation,
}

/// The most recent lifecycle operation on a service instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastOperation {
    /// Operation kind (create, update, delete)
    #[serde(rename = "type")]
    pub operation: String,

    /// Current operation state
    pub state: OperationState,

    /// Broker-provided description of the operation
    #[serde(default)]
    pub description: String,
}

/// Lifecycle operation state as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationState {
    /// Operation accepted but not started
    #[serde(rename = "initial")]
    Initial,

    /// Operation running
    #[serde(rename = "in progress")]
    InProgress,

    /// Operation finished successfully
    #[serde(rename = "succeeded")]
    Succeeded,

    /// Operation failed
    #[serde(rename = "failed")]
    Failed,
}

impl OperationState {
    /// Whether the operation has reached a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, OperationState::Succeeded | OperationState::Failed)
    }
}

impl std::fmt::Display for OperationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            OperationState::Initial => "initial",
            OperationState::InProgress => "in progress",
            OperationState::Succeeded => "succeeded",
            OperationState::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}
