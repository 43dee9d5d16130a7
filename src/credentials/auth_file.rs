use super::{CredentialEntry, CredentialStore, StoreError};
use crate::registry::RegistryHost;
use base64::prelude::BASE64_STANDARD;
use base64::Engine;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk document shared by the managed auth file and the docker-style
/// fallback config: `{"auths": {"<host>": {"auth": base64("user:secret")}}}`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct AuthDocument {
    #[serde(default)]
    auths: BTreeMap<String, AuthConfig>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct AuthConfig {
    auth: String,
}

impl AuthConfig {
    fn encode(entry: &CredentialEntry) -> Self {
        AuthConfig {
            auth: BASE64_STANDARD.encode(format!("{}:{}", entry.username, entry.secret)),
        }
    }

    /// An entry whose `auth` field does not decode to `user:secret` reads as
    /// absent rather than failing the whole lookup.
    fn decode(&self) -> Option<CredentialEntry> {
        let decoded = BASE64_STANDARD.decode(self.auth.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let mut parts = decoded.splitn(2, ':');
        let username = parts.next()?.to_string();
        let secret = parts.next()?.to_string();
        Some(CredentialEntry { username, secret })
    }
}

/// File-backed credential store.
///
/// Writes go to the managed auth file only. `read_one` additionally consults
/// an optional fallback file recorded by other docker-compatible clients;
/// entries found there are visible but never removable through this store.
#[derive(Debug)]
pub struct AuthFileStore {
    path: PathBuf,
    fallback: Option<PathBuf>,
}

impl AuthFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        AuthFileStore {
            path: path.into(),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, path: Option<PathBuf>) -> Self {
        self.fallback = path;
        self
    }

    fn load(path: &Path) -> Result<AuthDocument, StoreError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            // a store that was never written to is an empty store
            Err(ref e) if e.kind() == io::ErrorKind::NotFound => {
                return Ok(AuthDocument::default())
            }
            Err(e) => return Err(StoreError::Io(e)),
        };
        Ok(serde_json::from_str(&contents)?)
    }

    /// Rewrites the whole file through a rename so a concurrent reader never
    /// sees a partially written store.
    fn save(&self, document: &AuthDocument) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let serialized = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, serialized)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl CredentialStore for AuthFileStore {
    fn remove_one(&mut self, host: &RegistryHost) -> Result<(), StoreError> {
        let mut document = Self::load(&self.path)?;
        if document.auths.remove(host.as_str()).is_none() {
            return Err(StoreError::NotLoggedIn);
        }
        self.save(&document)
    }

    fn remove_all(&mut self) -> Result<(), StoreError> {
        let mut document = Self::load(&self.path)?;
        document.auths.clear();
        self.save(&document)
    }

    fn read_one(&self, host: &RegistryHost) -> Result<Option<CredentialEntry>, StoreError> {
        let document = Self::load(&self.path)?;
        if let Some(config) = document.auths.get(host.as_str()) {
            return Ok(config.decode());
        }
        if let Some(fallback) = &self.fallback {
            let document = Self::load(fallback)?;
            if let Some(config) = document.auths.get(host.as_str()) {
                return Ok(config.decode());
            }
        }
        Ok(None)
    }

    fn store_one(&mut self, host: &RegistryHost, entry: CredentialEntry) -> Result<(), StoreError> {
        let mut document = Self::load(&self.path)?;
        document
            .auths
            .insert(host.as_str().to_string(), AuthConfig::encode(&entry));
        self.save(&document)
    }
}
