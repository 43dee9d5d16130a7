//! The logout decision procedure.
//!
//! Removing a login is ambiguous when the store holds nothing removable: the
//! user may never have logged in, or may hold a live credential recorded by a
//! different docker-compatible client that this tool cannot manage. This
//! module reconciles the credential store with a live authentication check
//! and reports each case distinctly instead of collapsing them into one
//! message.

use crate::credentials::{CredentialStore, StoreError};
use crate::probe::{AuthProbe, CancelToken, ProbeError};
use crate::registry::RegistryHost;
use thiserror::Error;

/// What the caller asked to log out of.
///
/// Mirrors the raw CLI shape so the invalid combinations (a registry and
/// `--all` together, or neither) stay representable; `execute` rejects them
/// before touching the store.
#[derive(Clone, Debug, Default)]
pub struct LogoutRequest {
    pub registry: Option<RegistryHost>,
    pub all: bool,
}

impl LogoutRequest {
    pub fn single(host: RegistryHost) -> Self {
        LogoutRequest {
            registry: Some(host),
            all: false,
        }
    }

    pub fn all() -> Self {
        LogoutRequest {
            registry: None,
            all: true,
        }
    }

    fn scope(&self) -> Result<Scope, LogoutError> {
        match (&self.registry, self.all) {
            (Some(host), false) => Ok(Scope::Single(host)),
            (None, true) => Ok(Scope::All),
            _ => Err(LogoutError::InvalidRequest),
        }
    }
}

enum Scope<'a> {
    Single(&'a RegistryHost),
    All,
}

/// Outcome of a well-formed logout. Every variant maps to exit code 0; hard
/// failures travel as [`LogoutError`] instead.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LogoutOutcome {
    /// The cached credentials for this registry were removed.
    RemovedOne(RegistryHost),
    /// The cached credentials for every registry were removed.
    RemovedAll,
    /// No credentials are recorded for this registry.
    NotLoggedIn(RegistryHost),
    /// A live credential for this registry exists but was recorded by a
    /// different client; its logout has to happen through that client.
    ForeignLogin(RegistryHost),
}

#[derive(Debug, Error)]
pub enum LogoutError {
    #[error("either a registry name or --all must be given, but not both")]
    InvalidRequest,
    #[error("error logging out of {host}: {source}")]
    Remove {
        host: RegistryHost,
        source: StoreError,
    },
    #[error("error removing credentials for all registries: {source}")]
    RemoveAll { source: StoreError },
    #[error("error reading saved credentials for {host}: {source}")]
    Read {
        host: RegistryHost,
        source: StoreError,
    },
    #[error("the authentication check against {host} was cancelled")]
    Cancelled { host: RegistryHost },
}

/// Runs the logout policy over the supplied collaborators.
///
/// Single-shot: no operation is retried, and store or probe failures are
/// wrapped with the host and operation they came from, never reported as a
/// semantic outcome.
pub fn execute(
    request: &LogoutRequest,
    store: &mut dyn CredentialStore,
    probe: &dyn AuthProbe,
    cancel: &CancelToken,
) -> Result<LogoutOutcome, LogoutError> {
    match request.scope()? {
        // bulk removal is unconditional and never consults the probe
        Scope::All => {
            store
                .remove_all()
                .map_err(|source| LogoutError::RemoveAll { source })?;
            Ok(LogoutOutcome::RemovedAll)
        }
        Scope::Single(host) => match store.remove_one(host) {
            Ok(()) => Ok(LogoutOutcome::RemovedOne(host.clone())),
            Err(StoreError::NotLoggedIn) => disambiguate(host, store, probe, cancel),
            Err(source) => Err(LogoutError::Remove {
                host: host.clone(),
                source,
            }),
        },
    }
}

/// The store had nothing removable for `host`: distinguish "never logged in"
/// from "holds a live credential recorded by another client".
fn disambiguate(
    host: &RegistryHost,
    store: &mut dyn CredentialStore,
    probe: &dyn AuthProbe,
    cancel: &CancelToken,
) -> Result<LogoutOutcome, LogoutError> {
    let entry = store.read_one(host).map_err(|source| LogoutError::Read {
        host: host.clone(),
        source,
    })?;
    let entry = match entry {
        Some(entry) if entry.is_complete() => entry,
        _ => return Ok(LogoutOutcome::NotLoggedIn(host.clone())),
    };
    match probe.check(cancel, host, &entry.username, &entry.secret) {
        Ok(()) => Ok(LogoutOutcome::ForeignLogin(host.clone())),
        Err(ProbeError::Cancelled) => Err(LogoutError::Cancelled { host: host.clone() }),
        // a stale or unverifiable entry reads the same as no entry
        Err(_) => Ok(LogoutOutcome::NotLoggedIn(host.clone())),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::credentials::CredentialEntry;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;
    use std::io;

    #[derive(Default)]
    struct MemoryStore {
        managed: HashMap<String, CredentialEntry>,
        foreign: HashMap<String, CredentialEntry>,
        fail_removes_with: Option<io::ErrorKind>,
        fail_reads_with: Option<io::ErrorKind>,
        calls: RefCell<Vec<String>>,
    }

    impl MemoryStore {
        fn with_managed(host: &str, username: &str, secret: &str) -> Self {
            let mut store = MemoryStore::default();
            store.managed.insert(host.to_string(), entry(username, secret));
            store
        }

        fn with_foreign(host: &str, username: &str, secret: &str) -> Self {
            let mut store = MemoryStore::default();
            store.foreign.insert(host.to_string(), entry(username, secret));
            store
        }
    }

    impl CredentialStore for MemoryStore {
        fn remove_one(&mut self, host: &RegistryHost) -> Result<(), StoreError> {
            self.calls.borrow_mut().push(format!("remove_one {}", host));
            if let Some(kind) = self.fail_removes_with {
                return Err(StoreError::Io(io::Error::new(kind, "store unavailable")));
            }
            if self.managed.remove(host.as_str()).is_some() {
                Ok(())
            } else {
                Err(StoreError::NotLoggedIn)
            }
        }

        fn remove_all(&mut self) -> Result<(), StoreError> {
            self.calls.borrow_mut().push("remove_all".to_string());
            if let Some(kind) = self.fail_removes_with {
                return Err(StoreError::Io(io::Error::new(kind, "store unavailable")));
            }
            self.managed.clear();
            Ok(())
        }

        fn read_one(&self, host: &RegistryHost) -> Result<Option<CredentialEntry>, StoreError> {
            self.calls.borrow_mut().push(format!("read_one {}", host));
            if let Some(kind) = self.fail_reads_with {
                return Err(StoreError::Io(io::Error::new(kind, "store unavailable")));
            }
            Ok(self
                .managed
                .get(host.as_str())
                .or_else(|| self.foreign.get(host.as_str()))
                .cloned())
        }

        fn store_one(
            &mut self,
            host: &RegistryHost,
            entry: CredentialEntry,
        ) -> Result<(), StoreError> {
            self.managed.insert(host.as_str().to_string(), entry);
            Ok(())
        }
    }

    enum ProbeBehavior {
        Accept,
        Deny,
        Unreachable,
        Cancelled,
    }

    struct StaticProbe {
        behavior: ProbeBehavior,
        checks: Cell<usize>,
    }

    impl StaticProbe {
        fn new(behavior: ProbeBehavior) -> Self {
            StaticProbe {
                behavior,
                checks: Cell::new(0),
            }
        }
    }

    impl AuthProbe for StaticProbe {
        fn check(
            &self,
            _cancel: &CancelToken,
            _host: &RegistryHost,
            _username: &str,
            _secret: &str,
        ) -> Result<(), ProbeError> {
            self.checks.set(self.checks.get() + 1);
            match self.behavior {
                ProbeBehavior::Accept => Ok(()),
                ProbeBehavior::Deny => Err(ProbeError::Denied),
                ProbeBehavior::Unreachable => {
                    Err(ProbeError::Transport("connection refused".to_string()))
                }
                ProbeBehavior::Cancelled => Err(ProbeError::Cancelled),
            }
        }
    }

    fn entry(username: &str, secret: &str) -> CredentialEntry {
        CredentialEntry {
            username: username.to_string(),
            secret: secret.to_string(),
        }
    }

    fn host(raw: &str) -> RegistryHost {
        RegistryHost::parse(raw)
    }

    fn run(
        request: &LogoutRequest,
        store: &mut MemoryStore,
        probe: &StaticProbe,
    ) -> Result<LogoutOutcome, LogoutError> {
        execute(request, store, probe, &CancelToken::new())
    }

    #[test]
    fn empty_store_reports_not_logged_in() {
        let mut store = MemoryStore::default();
        let probe = StaticProbe::new(ProbeBehavior::Deny);
        let outcome = run(&LogoutRequest::single(host("x.test")), &mut store, &probe).unwrap();
        assert_eq!(outcome, LogoutOutcome::NotLoggedIn(host("x.test")));
    }

    #[test]
    fn live_foreign_credential_is_reported_distinctly() {
        let mut store = MemoryStore::with_foreign("quay.io", "carol", "sekrit");
        let probe = StaticProbe::new(ProbeBehavior::Accept);
        let outcome = run(&LogoutRequest::single(host("quay.io")), &mut store, &probe).unwrap();
        assert_eq!(outcome, LogoutOutcome::ForeignLogin(host("quay.io")));
    }

    #[test]
    fn stale_foreign_credential_reads_as_not_logged_in() {
        for behavior in [ProbeBehavior::Deny, ProbeBehavior::Unreachable] {
            let mut store = MemoryStore::with_foreign("quay.io", "carol", "sekrit");
            let probe = StaticProbe::new(behavior);
            let outcome =
                run(&LogoutRequest::single(host("quay.io")), &mut store, &probe).unwrap();
            assert_eq!(outcome, LogoutOutcome::NotLoggedIn(host("quay.io")));
        }
    }

    #[test]
    fn managed_entry_is_removed_and_a_second_logout_is_not_logged_in() {
        let mut store = MemoryStore::with_managed("registry.example.com", "alice", "pw");
        let probe = StaticProbe::new(ProbeBehavior::Deny);
        let request = LogoutRequest::single(host("registry.example.com"));

        let outcome = run(&request, &mut store, &probe).unwrap();
        assert_eq!(
            outcome,
            LogoutOutcome::RemovedOne(host("registry.example.com"))
        );
        assert!(store.managed.is_empty());

        let outcome = run(&request, &mut store, &probe).unwrap();
        assert_eq!(
            outcome,
            LogoutOutcome::NotLoggedIn(host("registry.example.com"))
        );
    }

    #[test]
    fn all_scope_empties_the_store() {
        let mut store = MemoryStore::default();
        store.managed.insert("quay.io".to_string(), entry("a", "1"));
        store
            .managed
            .insert("registry.example.com".to_string(), entry("b", "2"));
        let probe = StaticProbe::new(ProbeBehavior::Accept);

        let outcome = run(&LogoutRequest::all(), &mut store, &probe).unwrap();
        assert_eq!(outcome, LogoutOutcome::RemovedAll);
        assert!(store.managed.is_empty());
        // bulk removal never disambiguates per entry
        assert_eq!(probe.checks.get(), 0);
    }

    #[test]
    fn all_scope_succeeds_on_an_empty_store() {
        let mut store = MemoryStore::default();
        let probe = StaticProbe::new(ProbeBehavior::Accept);
        let outcome = run(&LogoutRequest::all(), &mut store, &probe).unwrap();
        assert_eq!(outcome, LogoutOutcome::RemovedAll);
    }

    #[test]
    fn conflicting_request_is_rejected_without_store_io() {
        let mut store = MemoryStore::with_managed("quay.io", "alice", "pw");
        let probe = StaticProbe::new(ProbeBehavior::Accept);
        let request = LogoutRequest {
            registry: Some(host("quay.io")),
            all: true,
        };

        let err = run(&request, &mut store, &probe).unwrap_err();
        assert!(matches!(err, LogoutError::InvalidRequest));
        assert!(store.calls.borrow().is_empty());
        assert_eq!(store.managed.len(), 1);
    }

    #[test]
    fn empty_request_is_rejected() {
        let mut store = MemoryStore::default();
        let probe = StaticProbe::new(ProbeBehavior::Accept);
        let err = run(&LogoutRequest::default(), &mut store, &probe).unwrap_err();
        assert!(matches!(err, LogoutError::InvalidRequest));
        assert!(store.calls.borrow().is_empty());
    }

    #[test]
    fn store_io_error_is_a_failure_not_a_not_logged_in() {
        let mut store = MemoryStore::with_managed("quay.io", "alice", "pw");
        store.fail_removes_with = Some(io::ErrorKind::PermissionDenied);
        let probe = StaticProbe::new(ProbeBehavior::Deny);

        let err = run(&LogoutRequest::single(host("quay.io")), &mut store, &probe).unwrap_err();
        match err {
            LogoutError::Remove { host: h, source } => {
                assert_eq!(h, host("quay.io"));
                assert!(matches!(source, StoreError::Io(_)));
            }
            other => panic!("expected a remove failure, got {:?}", other),
        }
    }

    #[test]
    fn read_error_during_disambiguation_is_a_failure() {
        let mut store = MemoryStore::with_foreign("quay.io", "carol", "sekrit");
        store.fail_reads_with = Some(io::ErrorKind::PermissionDenied);
        let probe = StaticProbe::new(ProbeBehavior::Accept);

        let err = run(&LogoutRequest::single(host("quay.io")), &mut store, &probe).unwrap_err();
        assert!(matches!(err, LogoutError::Read { .. }));
    }

    #[test]
    fn cancelled_probe_is_a_failure_not_an_outcome() {
        let mut store = MemoryStore::with_foreign("quay.io", "carol", "sekrit");
        let probe = StaticProbe::new(ProbeBehavior::Cancelled);

        let err = run(&LogoutRequest::single(host("quay.io")), &mut store, &probe).unwrap_err();
        assert!(matches!(err, LogoutError::Cancelled { .. }));
    }

    #[test]
    fn incomplete_residual_entry_skips_the_probe() {
        let mut store = MemoryStore::with_foreign("quay.io", "carol", "");
        let probe = StaticProbe::new(ProbeBehavior::Accept);

        let outcome = run(&LogoutRequest::single(host("quay.io")), &mut store, &probe).unwrap();
        assert_eq!(outcome, LogoutOutcome::NotLoggedIn(host("quay.io")));
        assert_eq!(probe.checks.get(), 0);
    }
}
