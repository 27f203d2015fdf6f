//! Create a service instance, then enable TLS once it is ready
//!
//! Provisioning is asynchronous on the platform side, so after
//! `create-service` the instance's last operation is polled at a fixed
//! interval until it reaches a terminal state. There is deliberately no
//! timeout: brokers take anywhere from seconds to the better part of an
//! hour, and the operator can always interrupt.

use crate::cf::CloudFoundry;
use crate::client::CredentialSource;
use crate::commands::enable_tls;
use crate::error::{CliError, CliResult};
use crate::output::print_info;
use cf_tls_types::{OfferingRegistry, OperationState, ServiceInstance};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Create the instance and chain into the enable-TLS flow
#[allow(clippy::too_many_arguments)]
pub async fn execute<C, S>(
    offering: &str,
    plan: &str,
    service_instance: &str,
    parameters: Option<&str>,
    tags: Option<&str>,
    cf: &C,
    credentials: &S,
    registry: &OfferingRegistry,
    poll_interval: Duration,
) -> CliResult<()>
where
    C: CloudFoundry + Sync,
    S: CredentialSource + Sync,
{
    print_info(&format!(
        "Creating service {} ({} {})",
        service_instance, offering, plan
    ));

    let mut args = vec!["create-service", offering, plan, service_instance];
    if let Some(parameters) = parameters {
        args.extend(["-c", parameters]);
    }
    if let Some(tags) = tags {
        args.extend(["-t", tags]);
    }
    cf.run(&args).await?;

    wait_until_created(cf, service_instance, poll_interval).await?;
    enable_tls::execute(service_instance, cf, credentials, registry).await
}

/// Poll the instance's last operation until it is terminal
async fn wait_until_created<C>(
    cf: &C,
    service_instance: &str,
    poll_interval: Duration,
) -> CliResult<ServiceInstance>
where
    C: CloudFoundry + Sync,
{
    let pb = spinner();
    pb.set_message(format!("Waiting for {} to be created...", service_instance));

    loop {
        let instance = cf.service_instance(service_instance).await?;

        match instance.last_operation.state {
            OperationState::Succeeded => {
                pb.finish_with_message(format!("Service {} created", service_instance));
                return Ok(instance);
            }
            OperationState::Failed => {
                pb.finish_with_message(format!("Service {} failed", service_instance));
                return Err(CliError::OperationFailed {
                    description: instance.last_operation.description,
                    state: instance.last_operation.state.to_string(),
                });
            }
            state => {
                pb.set_message(format!(
                    "Waiting for {} [{}] {}",
                    service_instance, state, instance.last_operation.description
                ));
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}

fn spinner() -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb
}
