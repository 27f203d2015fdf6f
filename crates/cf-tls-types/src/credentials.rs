//! Credential payload decoding
//!
//! Service-key payloads are untyped documents whose shape depends on the
//! cluster topology: multi-node services publish a `hostnames` list,
//! single-node services publish one `hostname` string. The decoder is
//! defensive and reports the offending field and type on mismatch instead
//! of panicking on unexpected shapes.

use serde_json::Value;
use thiserror::Error;

/// Decoded connection topology of a service key payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialTopology {
    /// Single-node service, one `hostname` field
    SingleNode { hostname: String },

    /// Clustered service, ordered `hostnames` list
    MultiNode { hostnames: Vec<String> },
}

/// Errors produced while decoding a service key payload
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("service key payload is not a JSON object")]
    NotAnObject,

    #[error("service key payload contains neither `hostname` nor `hostnames`")]
    MissingHostnames,

    #[error("service key field `hostnames` must be an array of strings, found {found}")]
    MalformedHostnames { found: &'static str },

    #[error("service key field `hostname` must be a string, found {found}")]
    MalformedHostname { found: &'static str },
}

impl CredentialTopology {
    /// Decode a raw credential payload.
    ///
    /// A `hostnames` list takes precedence over a `hostname` field when both
    /// are present.
    pub fn from_value(payload: &Value) -> Result<Self, CredentialError> {
        let fields = payload.as_object().ok_or(CredentialError::NotAnObject)?;

        if let Some(value) = fields.get("hostnames") {
            let items = value
                .as_array()
                .ok_or(CredentialError::MalformedHostnames {
                    found: json_type(value),
                })?;
            let hostnames = items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_owned)
                        .ok_or(CredentialError::MalformedHostnames {
                            found: json_type(item),
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(CredentialTopology::MultiNode { hostnames });
        }

        match fields.get("hostname") {
            Some(value) => {
                let hostname = value
                    .as_str()
                    .ok_or(CredentialError::MalformedHostname {
                        found: json_type(value),
                    })?
                    .to_owned();
                Ok(CredentialTopology::SingleNode { hostname })
            }
            None => Err(CredentialError::MissingHostnames),
        }
    }

    /// Hostnames in document order
    pub fn into_hostnames(self) -> Vec<String> {
        match self {
            CredentialTopology::SingleNode { hostname } => vec![hostname],
            CredentialTopology::MultiNode { hostnames } => hostnames,
        }
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
