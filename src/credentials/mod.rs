//! Credential storage for registry logins.

mod auth_file;

pub use auth_file::AuthFileStore;

use crate::registry::RegistryHost;
use thiserror::Error;

/// A saved username/secret pair for one registry.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CredentialEntry {
    pub username: String,
    pub secret: String,
}

impl CredentialEntry {
    /// A pair with an empty username or secret cannot authenticate anywhere;
    /// callers treat such an entry the same as an absent one.
    pub fn is_complete(&self) -> bool {
        !self.username.is_empty() && !self.secret.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not logged in")]
    NotLoggedIn,
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("malformed auth file: {0}")]
    Format(#[from] serde_json::Error),
}

/// Persisted mapping from registry host to credential entry.
///
/// `remove_one` and `remove_all` must not interleave with each other;
/// implementations rewrite the backing file as a whole so a reader never
/// observes a partially modified store.
pub trait CredentialStore {
    /// Remove the managed entry for `host`. Returns
    /// `StoreError::NotLoggedIn` when the store holds no removable entry
    /// for it.
    fn remove_one(&mut self, host: &RegistryHost) -> Result<(), StoreError>;

    /// Remove every managed entry. Succeeds when there are none.
    fn remove_all(&mut self) -> Result<(), StoreError>;

    /// Look up any entry recorded for `host`, removable or not.
    fn read_one(&self, host: &RegistryHost) -> Result<Option<CredentialEntry>, StoreError>;

    /// Save an entry for `host`, replacing any previous one.
    fn store_one(&mut self, host: &RegistryHost, entry: CredentialEntry) -> Result<(), StoreError>;
}
