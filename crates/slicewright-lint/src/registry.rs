//! Domain registry: the path mapping the linter runs against.
//!
//! Supplied by the surrounding tooling (usually as a YAML document) and
//! passed by value into the graph builder and linter; nothing in this crate
//! reads it from ambient state.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The owning tag of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DomainTag {
    /// Owned by a named business domain.
    Domain(String),
    /// Shared infrastructure, importable from anywhere.
    SharedInfra,
    /// Capped legacy code, never a valid import target outside the bridge
    /// exemption.
    FrozenLegacy,
    /// Outside the mapped tree (stdlib, third-party); exempt from the rules.
    External,
}

/// Mapping of domains, shared infrastructure, and frozen legacy code to
/// module path prefixes, plus the bridge-adapter exemption list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainRegistry {
    /// Domain name -> module path prefixes it owns.
    pub domains: IndexMap<String, Vec<String>>,
    /// Prefixes of shared infrastructure modules.
    #[serde(default)]
    pub shared_infra: Vec<String>,
    /// Prefixes of frozen legacy modules.
    #[serde(default)]
    pub frozen_legacy: Vec<String>,
    /// Modules (themselves shared infrastructure) allowed to import legacy
    /// internals.
    #[serde(default)]
    pub bridge_adapters: Vec<String>,
}

impl DomainRegistry {
    /// Parse a registry from its YAML representation.
    pub fn from_yaml(source: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(source)
    }

    /// Resolve a dotted module path to its owning tag. Longest prefix wins
    /// so a legacy subtree nested under a domain prefix still resolves as
    /// legacy.
    pub fn resolve(&self, module: &str) -> DomainTag {
        let mut best: Option<(usize, DomainTag)> = None;

        let mut consider = |prefix: &str, tag: DomainTag| {
            if prefix_matches(prefix, module) {
                let len = prefix.len();
                if best.as_ref().map(|(l, _)| len > *l).unwrap_or(true) {
                    best = Some((len, tag));
                }
            }
        };

        for (domain, prefixes) in &self.domains {
            for prefix in prefixes {
                consider(prefix, DomainTag::Domain(domain.clone()));
            }
        }
        for prefix in &self.shared_infra {
            consider(prefix, DomainTag::SharedInfra);
        }
        for prefix in &self.frozen_legacy {
            consider(prefix, DomainTag::FrozenLegacy);
        }

        best.map(|(_, tag)| tag).unwrap_or(DomainTag::External)
    }

    /// Whether a module is on the bridge-adapter exemption list.
    pub fn is_bridge_adapter(&self, module: &str) -> bool {
        self.bridge_adapters.iter().any(|b| b == module)
    }
}

fn prefix_matches(prefix: &str, module: &str) -> bool {
    module == prefix || module.starts_with(&format!("{}.", prefix))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> DomainRegistry {
        let yaml = r#"
domains:
  auth:
    - app.auth
  billing:
    - app.billing
shared_infra:
  - app.shared
frozen_legacy:
  - app.legacy
bridge_adapters:
  - app.shared.legacy_bridge
"#;
        DomainRegistry::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_resolve_domain() {
        let reg = registry();
        assert_eq!(
            reg.resolve("app.auth.login.service"),
            DomainTag::Domain("auth".to_string())
        );
        assert_eq!(
            reg.resolve("app.billing.invoice.handler"),
            DomainTag::Domain("billing".to_string())
        );
    }

    #[test]
    fn test_resolve_sentinels() {
        let reg = registry();
        assert_eq!(reg.resolve("app.shared.tokens"), DomainTag::SharedInfra);
        assert_eq!(reg.resolve("app.legacy.billing_v1"), DomainTag::FrozenLegacy);
        assert_eq!(reg.resolve("fastapi"), DomainTag::External);
    }

    #[test]
    fn test_prefix_requires_dot_boundary() {
        let reg = registry();
        // `app.authx` is not under the `app.auth` prefix.
        assert_eq!(reg.resolve("app.authx.thing"), DomainTag::External);
    }

    #[test]
    fn test_longest_prefix_wins() {
        let mut reg = registry();
        reg.frozen_legacy.push("app.auth.v1".to_string());
        assert_eq!(reg.resolve("app.auth.v1.users"), DomainTag::FrozenLegacy);
        assert_eq!(
            reg.resolve("app.auth.login"),
            DomainTag::Domain("auth".to_string())
        );
    }

    #[test]
    fn test_bridge_adapter_list() {
        let reg = registry();
        assert!(reg.is_bridge_adapter("app.shared.legacy_bridge"));
        assert!(!reg.is_bridge_adapter("app.auth.login.service"));
    }
}
