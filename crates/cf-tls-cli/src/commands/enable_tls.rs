//! Enable TLS on an existing service instance
//!
//! The flow: resolve the instance, check the offering against the registry,
//! create a temporary service key, read the hostnames out of its credential
//! payload, push the offering-specific parameter body through
//! `update-service`, and delete the key. The key is disposed on every exit
//! path after creation; a failed deletion is only a warning.

use crate::cf::CloudFoundry;
use crate::client::CredentialSource;
use crate::error::{CliError, CliResult};
use crate::output::{print_info, print_success};
use cf_tls_types::{
    update_parameters, CredentialTopology, OfferingRegistry, ServiceInstance, SupportedOffering,
};
use tracing::warn;

/// Enable TLS on the named service instance
pub async fn execute<C, S>(
    service_name: &str,
    cf: &C,
    credentials: &S,
    registry: &OfferingRegistry,
) -> CliResult<()>
where
    C: CloudFoundry + Sync,
    S: CredentialSource + Sync,
{
    print_info(&format!("Enabling TLS on service {}", service_name));

    let instance = cf.service_instance(service_name).await?;
    let offering =
        registry
            .lookup(&instance.offering)
            .ok_or_else(|| CliError::UnsupportedOffering {
                offering: instance.offering.clone(),
            })?;

    let key = TempServiceKey::create(cf, &instance.name).await?;
    let outcome = apply_tls_update(cf, credentials, &instance, offering, &key).await;
    key.dispose(cf).await;
    outcome?;

    print_success(&format!("TLS update requested for {}", service_name));
    Ok(())
}

async fn apply_tls_update<C, S>(
    cf: &C,
    credentials: &S,
    instance: &ServiceInstance,
    offering: &SupportedOffering,
    key: &TempServiceKey,
) -> CliResult<()>
where
    C: CloudFoundry + Sync,
    S: CredentialSource + Sync,
{
    let payload = credentials
        .service_key_credentials(&instance.guid, &key.name)
        .await?;
    let hostnames = CredentialTopology::from_value(&payload)?.into_hostnames();

    let parameters = update_parameters(offering, &hostnames);
    cf.run(&["update-service", &instance.name, "-c", &parameters])
        .await?;
    Ok(())
}

/// A uniquely-named service key that lives for one enable-TLS run
pub(crate) struct TempServiceKey {
    pub name: String,
    instance: String,
}

impl TempServiceKey {
    pub async fn create<C: CloudFoundry + Sync>(cf: &C, instance: &str) -> CliResult<Self> {
        let name = format!(
            "tls-enabler-key-{}",
            chrono::Utc::now().timestamp_millis()
        );
        cf.run(&["create-service-key", instance, &name]).await?;
        Ok(Self {
            name,
            instance: instance.to_string(),
        })
    }

    /// Delete the key. Failure leaves an orphan behind, which is worth a
    /// warning but never fails the run.
    pub async fn dispose<C: CloudFoundry + Sync>(self, cf: &C) {
        if let Err(e) = cf
            .run(&["delete-service-key", "-f", &self.instance, &self.name])
            .await
        {
            warn!(key = %self.name, "failed to delete temporary service key: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cf_tls_types::{LastOperation, OperationState};
    use serde_json::json;
    use std::sync::Mutex;

    fn instance(offering: &str) -> ServiceInstance {
        ServiceInstance {
            name: "my-rabbit".to_string(),
            guid: "abc-123".to_string(),
            offering: offering.to_string(),
            last_operation: LastOperation {
                operation: "create".to_string(),
                state: OperationState::Succeeded,
                description: String::new(),
            },
        }
    }

    /// Driver double that records every command it is asked to run
    struct RecordingCf {
        instance: ServiceInstance,
        calls: Mutex<Vec<Vec<String>>>,
        fail_command: Option<&'static str>,
    }

    impl RecordingCf {
        fn new(instance: ServiceInstance) -> Self {
            Self {
                instance,
                calls: Mutex::new(Vec::new()),
                fail_command: None,
            }
        }

        fn failing_on(instance: ServiceInstance, command: &'static str) -> Self {
            Self {
                fail_command: Some(command),
                ..Self::new(instance)
            }
        }

        fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl CloudFoundry for RecordingCf {
        async fn run(&self, args: &[&str]) -> CliResult<Vec<String>> {
            self.calls
                .lock()
                .unwrap()
                .push(args.iter().map(|s| s.to_string()).collect());
            if self.fail_command == args.first().copied() {
                return Err(CliError::Command {
                    command: args[0].to_string(),
                    message: "boom".to_string(),
                });
            }
            Ok(Vec::new())
        }

        async fn curl(&self, _path: &str) -> CliResult<serde_json::Value> {
            unimplemented!("introspection is stubbed via service_instance")
        }

        async fn service_instance(&self, _name: &str) -> CliResult<ServiceInstance> {
            Ok(self.instance.clone())
        }
    }

    /// Credential double serving a fixed payload, or NotFound when empty
    struct StaticCredentials {
        payload: Option<serde_json::Value>,
    }

    #[async_trait]
    impl CredentialSource for StaticCredentials {
        async fn service_key_credentials(
            &self,
            _instance_guid: &str,
            _key_name: &str,
        ) -> CliResult<serde_json::Value> {
            self.payload
                .clone()
                .ok_or_else(|| CliError::NotFound("service key".to_string()))
        }
    }

    #[tokio::test]
    async fn happy_path_sequences_key_lifecycle_around_update() {
        let cf = RecordingCf::new(instance("p.rabbitmq"));
        let creds = StaticCredentials {
            payload: Some(json!({"hostname": "10.1.2.3"})),
        };

        execute("my-rabbit", &cf, &creds, &OfferingRegistry::builtin())
            .await
            .unwrap();

        let calls = cf.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0][0], "create-service-key");
        assert_eq!(calls[0][1], "my-rabbit");
        let key_name = calls[0][2].clone();
        assert!(key_name.starts_with("tls-enabler-key-"));

        assert_eq!(calls[1][..3], ["update-service", "my-rabbit", "-c"]);
        let body: serde_json::Value = serde_json::from_str(&calls[1][3]).unwrap();
        assert_eq!(body, json!({"tls": ["10.1.2.3"]}));

        assert_eq!(
            calls[2],
            vec!["delete-service-key", "-f", "my-rabbit", key_name.as_str()]
        );
    }

    #[tokio::test]
    async fn multi_node_payload_lists_every_hostname() {
        let cf = RecordingCf::new(instance("p.mysql"));
        let creds = StaticCredentials {
            payload: Some(json!({"hostnames": ["10.1.2.3", "10.1.2.4"]})),
        };

        execute("my-rabbit", &cf, &creds, &OfferingRegistry::builtin())
            .await
            .unwrap();

        let calls = cf.calls();
        let body: serde_json::Value = serde_json::from_str(&calls[1][3]).unwrap();
        assert_eq!(body, json!({"enable_tls": ["10.1.2.3", "10.1.2.4"]}));
    }

    #[tokio::test]
    async fn unsupported_offering_rejected_before_any_key_exists() {
        let cf = RecordingCf::new(instance("p.redis"));
        let creds = StaticCredentials { payload: None };

        let err = execute("my-rabbit", &cf, &creds, &OfferingRegistry::builtin())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            CliError::UnsupportedOffering { offering } if offering == "p.redis"
        ));
        assert!(cf.calls().is_empty());
    }

    #[tokio::test]
    async fn key_is_deleted_when_credential_fetch_fails() {
        let cf = RecordingCf::new(instance("p.rabbitmq"));
        let creds = StaticCredentials { payload: None };

        let err = execute("my-rabbit", &cf, &creds, &OfferingRegistry::builtin())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::NotFound(_)));

        let calls = cf.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0][0], "create-service-key");
        assert_eq!(calls[1][0], "delete-service-key");
    }

    #[tokio::test]
    async fn key_is_deleted_when_update_fails() {
        let cf = RecordingCf::failing_on(instance("p.rabbitmq"), "update-service");
        let creds = StaticCredentials {
            payload: Some(json!({"hostname": "10.1.2.3"})),
        };

        let err = execute("my-rabbit", &cf, &creds, &OfferingRegistry::builtin())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Command { .. }));

        let commands: Vec<String> = cf.calls().iter().map(|c| c[0].clone()).collect();
        assert_eq!(
            commands,
            vec!["create-service-key", "update-service", "delete-service-key"]
        );
    }

    #[tokio::test]
    async fn malformed_payload_is_a_credentials_error() {
        let cf = RecordingCf::new(instance("p.rabbitmq"));
        let creds = StaticCredentials {
            payload: Some(json!({"username": "admin"})),
        };

        let err = execute("my-rabbit", &cf, &creds, &OfferingRegistry::builtin())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Credentials(_)));

        // the key still gets cleaned up
        assert_eq!(cf.calls().last().unwrap()[0], "delete-service-key");
    }
}
