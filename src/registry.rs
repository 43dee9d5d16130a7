use crate::constants::{DEFAULT_REGISTRY, DEFAULT_REGISTRY_ALIASES};
use std::fmt;

/// A normalized registry hostname.
///
/// Normalization lowercases the input, strips any URL scheme the user pasted
/// in, trims trailing slashes and resolves the well-known aliases of the
/// default registry to its canonical name. Normalizing a value that is
/// already normalized leaves it unchanged.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistryHost(String);

impl RegistryHost {
    pub fn parse(raw: &str) -> Self {
        let lowered = raw.trim().to_lowercase();
        let mut host = lowered.as_str();
        for scheme in &["https://", "http://", "docker://"] {
            if host.starts_with(scheme) {
                host = &host[scheme.len()..];
                break;
            }
        }
        let host = host.trim_end_matches('/');
        if DEFAULT_REGISTRY_ALIASES.contains(&host) {
            return RegistryHost(DEFAULT_REGISTRY.to_string());
        }
        RegistryHost(host.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistryHost {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
