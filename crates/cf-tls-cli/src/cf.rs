//! Host CLI driver
//!
//! All platform mutations go through the `cf` binary so the tool inherits
//! the operator's session, org and space targeting. Service-instance
//! introspection rides on `cf curl` against the v3 API.

use crate::error::{CliError, CliResult};
use async_trait::async_trait;
use cf_tls_types::{LastOperation, ServiceInstance};
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// Command execution and service introspection via the host CLI
#[async_trait]
pub trait CloudFoundry {
    /// Run a cf command, returning captured stdout lines
    async fn run(&self, args: &[&str]) -> CliResult<Vec<String>>;

    /// Fetch a management API path through `cf curl`
    async fn curl(&self, path: &str) -> CliResult<serde_json::Value>;

    /// Resolve a service instance by name: GUID, offering, last operation
    async fn service_instance(&self, name: &str) -> CliResult<ServiceInstance> {
        let listing: InstanceList = decode(
            self.curl(&format!("/v3/service_instances?names={}", name))
                .await?,
        )?;
        let resource = listing
            .resources
            .into_iter()
            .next()
            .ok_or_else(|| CliError::ServiceNotFound {
                name: name.to_string(),
            })?;

        let fields: InstanceFields = decode(
            self.curl(&format!(
                "/v3/service_instances/{}?fields[service_plan.service_offering]=name",
                resource.guid
            ))
            .await?,
        )?;
        let offering = fields
            .included
            .and_then(|included| included.service_offerings.into_iter().next())
            .map(|offering| offering.name)
            .ok_or_else(|| {
                CliError::NotFound(format!("service offering for instance {}", name))
            })?;

        Ok(ServiceInstance {
            name: resource.name,
            guid: resource.guid,
            offering,
            last_operation: resource.last_operation,
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> CliResult<T> {
    serde_json::from_value(value).map_err(CliError::from)
}

/// v3 list envelope for service instances
#[derive(Debug, Deserialize)]
struct InstanceList {
    resources: Vec<InstanceResource>,
}

#[derive(Debug, Deserialize)]
struct InstanceResource {
    guid: String,
    name: String,
    last_operation: LastOperation,
}

/// v3 fields response carrying the related offering name
#[derive(Debug, Deserialize)]
struct InstanceFields {
    included: Option<IncludedOfferings>,
}

#[derive(Debug, Deserialize)]
struct IncludedOfferings {
    service_offerings: Vec<OfferingRef>,
}

#[derive(Debug, Deserialize)]
struct OfferingRef {
    name: String,
}

/// Driver that spawns the cf binary
pub struct CfProcess {
    binary: String,
}

impl CfProcess {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl CloudFoundry for CfProcess {
    async fn run(&self, args: &[&str]) -> CliResult<Vec<String>> {
        debug!(binary = %self.binary, ?args, "running cf command");

        let output = Command::new(&self.binary).args(args).output().await?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = if stderr.trim().is_empty() {
                String::from_utf8_lossy(&output.stdout).trim().to_string()
            } else {
                stderr.trim().to_string()
            };
            return Err(CliError::Command {
                command: args.first().copied().unwrap_or("<none>").to_string(),
                message,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::to_owned)
            .collect())
    }

    async fn curl(&self, path: &str) -> CliResult<serde_json::Value> {
        let lines = self.run(&["curl", path]).await?;
        serde_json::from_str(&lines.join("\n")).map_err(CliError::from)
    }
}
