//! Live verification of saved credentials against a registry.

use crate::registry::RegistryHost;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Cooperative cancellation flag handed down from the caller.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("the registry rejected the supplied credentials")]
    Denied,
    #[error("the authentication check was cancelled")]
    Cancelled,
    #[error("could not verify the credentials against the registry: {0}")]
    Transport(String),
}

/// Attempts a live authentication handshake with a registry.
pub trait AuthProbe {
    fn check(
        &self,
        cancel: &CancelToken,
        host: &RegistryHost,
        username: &str,
        secret: &str,
    ) -> Result<(), ProbeError>;
}

/// Probes the registry's v2 ping endpoint with HTTP basic auth.
#[derive(Debug)]
pub struct RegistryProbe {
    timeout: Duration,
}

impl RegistryProbe {
    pub fn new() -> Self {
        RegistryProbe {
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        RegistryProbe { timeout }
    }
}

impl Default for RegistryProbe {
    fn default() -> Self {
        RegistryProbe::new()
    }
}

impl AuthProbe for RegistryProbe {
    fn check(
        &self,
        cancel: &CancelToken,
        host: &RegistryHost,
        username: &str,
        secret: &str,
    ) -> Result<(), ProbeError> {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ProbeError::Transport(e.to_string()))?;
        let url = format!("https://{}/v2/", host);
        let response = client.get(&url).basic_auth(username, Some(secret)).send();
        // a request aborted by cancellation must not read as a network error
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled);
        }
        let response = response.map_err(|e| ProbeError::Transport(e.to_string()))?;
        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ProbeError::Denied),
            status if status.is_success() => Ok(()),
            status => Err(ProbeError::Transport(format!(
                "unexpected status {} from {}",
                status, url
            ))),
        }
    }
}
