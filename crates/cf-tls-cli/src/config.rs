//! Session and tool configuration
//!
//! Two sources feed the CLI: the host CLI's stored session
//! (`$CF_HOME/.cf/config.json`), which supplies the management API endpoint
//! and bearer token, and an optional tool config file for the poll interval,
//! the cf binary path, and extra offering entries.

use crate::error::{CliError, CliResult};
use cf_tls_types::SupportedOffering;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

/// Credentials and target parsed from the host CLI's stored session
#[derive(Debug, Clone)]
pub struct CfSession {
    /// Management API endpoint URL
    pub target: String,

    /// Bearer token, including the `bearer ` prefix
    pub access_token: String,

    /// Whether the session was established with TLS validation disabled
    pub ssl_disabled: bool,
}

/// On-disk shape of the host CLI session file
#[derive(Debug, Deserialize)]
struct StoredSession {
    #[serde(rename = "Target")]
    target: String,

    #[serde(rename = "AccessToken", default)]
    access_token: String,

    #[serde(rename = "SSLDisabled", default)]
    ssl_disabled: bool,
}

impl CfSession {
    /// Load the session from the default location
    pub fn load() -> CliResult<Self> {
        Self::load_from(Self::session_path()?)
    }

    /// Load the session from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> CliResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CliError::NotLoggedIn(format!(
                "no stored session at {}; run `cf login` first",
                path.display()
            )));
        }

        let contents = std::fs::read_to_string(path)?;
        let stored: StoredSession = serde_json::from_str(&contents)?;

        if stored.access_token.trim().is_empty() {
            return Err(CliError::NotLoggedIn(
                "stored session has no access token; run `cf login` first".into(),
            ));
        }
        if stored.target.trim().is_empty() {
            return Err(CliError::NotLoggedIn(
                "stored session has no API target; run `cf api` first".into(),
            ));
        }

        Ok(Self {
            target: stored.target,
            access_token: normalize_token(stored.access_token),
            ssl_disabled: stored.ssl_disabled,
        })
    }

    /// Session file location: `$CF_HOME/.cf/config.json`, falling back to `$HOME`
    fn session_path() -> CliResult<PathBuf> {
        if let Ok(cf_home) = std::env::var("CF_HOME") {
            return Ok(PathBuf::from(cf_home).join(".cf").join("config.json"));
        }
        dirs::home_dir()
            .map(|home| home.join(".cf").join("config.json"))
            .ok_or_else(|| CliError::config("cannot determine home directory"))
    }
}

fn normalize_token(token: String) -> String {
    if token.to_lowercase().starts_with("bearer ") {
        token
    } else {
        format!("bearer {}", token)
    }
}

/// Tool configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CliConfig {
    /// Path to the cf binary (defaults to `cf` on $PATH)
    pub cf_binary: Option<String>,

    /// Poll interval for service-creation state, in milliseconds
    pub poll_interval_ms: Option<u64>,

    /// Additional supported offerings
    #[serde(default)]
    pub offerings: Vec<SupportedOffering>,
}

impl CliConfig {
    /// Load configuration from file
    pub fn load(path: Option<&str>) -> CliResult<Self> {
        let config_path = match path {
            Some(p) => PathBuf::from(p),
            None => Self::default_config_path()?,
        };

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config: CliConfig =
                toml::from_str(&contents).map_err(|e| CliError::Config(e.to_string()))?;
            Ok(config)
        } else {
            Ok(CliConfig::default())
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> CliResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| CliError::config("cannot find config directory"))?;
        Ok(config_dir.join("cf-tls").join("config.toml"))
    }

    pub fn cf_binary(&self) -> &str {
        self.cf_binary.as_deref().unwrap_or("cf")
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.unwrap_or(DEFAULT_POLL_INTERVAL_MS))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = CliConfig::default();
        assert_eq!(config.cf_binary(), "cf");
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert!(config.offerings.is_empty());
    }

    #[test]
    fn load_missing_config_returns_default() {
        let config = CliConfig::load(Some("/nonexistent/path/config.toml")).unwrap();
        assert!(config.cf_binary.is_none());
    }

    #[test]
    fn config_file_with_offerings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
poll_interval_ms = 250

[[offerings]]
name = "p.redis"
parameter = "tls_enabled"
"#,
        )
        .unwrap();

        let config = CliConfig::load(path.to_str()).unwrap();
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.offerings.len(), 1);
        assert_eq!(config.offerings[0].name, "p.redis");
    }

    #[test]
    fn session_parses_stored_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"Target":"https://api.example.com","AccessToken":"bearer abc123","SSLDisabled":true}"#,
        )
        .unwrap();

        let session = CfSession::load_from(&path).unwrap();
        assert_eq!(session.target, "https://api.example.com");
        assert_eq!(session.access_token, "bearer abc123");
        assert!(session.ssl_disabled);
    }

    #[test]
    fn session_token_gets_bearer_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"Target":"https://api.example.com","AccessToken":"abc123"}"#,
        )
        .unwrap();

        let session = CfSession::load_from(&path).unwrap();
        assert_eq!(session.access_token, "bearer abc123");
        assert!(!session.ssl_disabled);
    }

    #[test]
    fn missing_session_is_not_logged_in() {
        let err = CfSession::load_from("/nonexistent/.cf/config.json").unwrap_err();
        assert!(matches!(err, CliError::NotLoggedIn(_)));
    }

    #[test]
    fn empty_token_is_not_logged_in() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"Target":"https://api.example.com","AccessToken":""}"#).unwrap();

        let err = CfSession::load_from(&path).unwrap_err();
        assert!(matches!(err, CliError::NotLoggedIn(_)));
    }
}
