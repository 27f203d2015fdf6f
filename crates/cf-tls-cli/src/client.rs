//! HTTP client for the management API
//!
//! The CLI surface never prints service-key credentials structurally, so the
//! payload is fetched straight from the Cloud Controller with the endpoint
//! and bearer token of the stored session.

use crate::config::CfSession;
use crate::error::{CliError, CliResult};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

/// Source of service-key credential payloads
#[async_trait]
pub trait CredentialSource {
    /// Fetch the raw credential payload of a named service key
    async fn service_key_credentials(
        &self,
        instance_guid: &str,
        key_name: &str,
    ) -> CliResult<serde_json::Value>;
}

/// Management API client authenticated with the stored session
pub struct ApiClient {
    client: Client,
    base_url: String,
}

/// v3 list envelope for credential bindings
#[derive(Debug, Deserialize)]
struct BindingList {
    resources: Vec<BindingResource>,
}

#[derive(Debug, Deserialize)]
struct BindingResource {
    guid: String,
}

/// v3 credential binding details
#[derive(Debug, Deserialize)]
struct BindingDetails {
    credentials: serde_json::Value,
}

impl ApiClient {
    /// Create a client from the stored session
    pub fn from_session(session: &CfSession) -> CliResult<Self> {
        let mut token = HeaderValue::from_str(&session.access_token)
            .map_err(|_| CliError::config("stored access token is not a valid header value"))?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, token);

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .default_headers(headers)
            .danger_accept_invalid_certs(session.ssl_disabled)
            .build()?;

        Ok(Self {
            client,
            base_url: session.target.trim_end_matches('/').to_string(),
        })
    }

    /// Probe the API root, used by the status command
    pub async fn ping(&self) -> CliResult<serde_json::Value> {
        self.get("/").await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> CliResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> CliResult<T> {
        let status = response.status();

        if status.is_success() {
            Ok(response.json().await?)
        } else if status == StatusCode::NOT_FOUND {
            Err(CliError::NotFound("resource not found".into()))
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(CliError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}

#[async_trait]
impl CredentialSource for ApiClient {
    async fn service_key_credentials(
        &self,
        instance_guid: &str,
        key_name: &str,
    ) -> CliResult<serde_json::Value> {
        let listing: BindingList = self
            .get(&format!(
                "/v3/service_credential_bindings?names={}&service_instance_guids={}",
                key_name, instance_guid
            ))
            .await?;
        let binding = listing
            .resources
            .into_iter()
            .next()
            .ok_or_else(|| CliError::NotFound(format!("service key {}", key_name)))?;

        let details: BindingDetails = self
            .get(&format!(
                "/v3/service_credential_bindings/{}/details",
                binding.guid
            ))
            .await?;
        Ok(details.credentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(target: &str) -> CfSession {
        CfSession {
            target: target.to_string(),
            access_token: "bearer test-token".to_string(),
            ssl_disabled: false,
        }
    }

    #[test]
    fn test_client_creation() {
        let client = ApiClient::from_session(&session("https://api.example.com")).unwrap();
        assert_eq!(client.base_url, "https://api.example.com");
    }

    #[test]
    fn test_client_endpoint_normalization() {
        let client = ApiClient::from_session(&session("https://api.example.com/")).unwrap();
        assert_eq!(client.base_url, "https://api.example.com");
    }

    #[test]
    fn newline_in_token_is_rejected() {
        let mut s = session("https://api.example.com");
        s.access_token = "bearer bad\ntoken".to_string();
        assert!(matches!(
            ApiClient::from_session(&s),
            Err(CliError::Config(_))
        ));
    }
}
