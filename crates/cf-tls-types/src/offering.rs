//! Supported-offering registry
//!
//! Each supported offering pairs an offering name with the arbitrary-parameter
//! key its broker expects for the TLS-enable update. The registry is built
//! once at startup and passed by reference; there is no global state.

use serde::{Deserialize, Serialize};

/// A service offering the enabler knows how to configure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedOffering {
    /// Offering name as reported by the platform
    pub name: String,

    /// Arbitrary-parameter key the broker expects for the TLS update
    pub parameter: String,
}

impl SupportedOffering {
    pub fn new(name: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameter: parameter.into(),
        }
    }
}

/// Registry of supported offerings, resolved at startup
#[derive(Debug, Clone, Default)]
pub struct OfferingRegistry {
    entries: Vec<SupportedOffering>,
}

impl OfferingRegistry {
    /// The built-in offering table
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                SupportedOffering::new("p.rabbitmq", "tls"),
                SupportedOffering::new("p.mysql", "enable_tls"),
                SupportedOffering::new("rabbitmq-odb-bosh-lite", "tls"),
            ],
        }
    }

    /// Add configuration-supplied entries. Built-ins win on name collision.
    pub fn extend<I>(&mut self, extra: I)
    where
        I: IntoIterator<Item = SupportedOffering>,
    {
        for offering in extra {
            if self.lookup(&offering.name).is_none() {
                self.entries.push(offering);
            }
        }
    }

    /// Exact-match lookup by offering name
    pub fn lookup(&self, name: &str) -> Option<&SupportedOffering> {
        self.entries.iter().find(|o| o.name == name)
    }

    pub fn entries(&self) -> &[SupportedOffering] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_offerings_resolve() {
        let registry = OfferingRegistry::builtin();
        assert_eq!(registry.lookup("p.rabbitmq").unwrap().parameter, "tls");
        assert_eq!(registry.lookup("p.mysql").unwrap().parameter, "enable_tls");
        assert_eq!(
            registry.lookup("rabbitmq-odb-bosh-lite").unwrap().parameter,
            "tls"
        );
    }

    #[test]
    fn unknown_offering_is_rejected() {
        let registry = OfferingRegistry::builtin();
        assert!(registry.lookup("p.redis").is_none());
        assert!(registry.lookup("").is_none());
    }

    #[test]
    fn lookup_is_exact_match() {
        let registry = OfferingRegistry::builtin();
        assert!(registry.lookup("p.rabbitmq-extra").is_none());
        assert!(registry.lookup("P.RABBITMQ").is_none());
    }

    #[test]
    fn extend_adds_new_entries() {
        let mut registry = OfferingRegistry::builtin();
        registry.extend([SupportedOffering::new("p.redis", "tls_enabled")]);
        assert_eq!(registry.lookup("p.redis").unwrap().parameter, "tls_enabled");
    }

    #[test]
    fn extend_does_not_override_builtins() {
        let mut registry = OfferingRegistry::builtin();
        registry.extend([SupportedOffering::new("p.mysql", "something_else")]);
        assert_eq!(registry.lookup("p.mysql").unwrap().parameter, "enable_tls");
    }
}
