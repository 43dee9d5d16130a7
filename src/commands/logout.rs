use crate::config;
use crate::credentials::AuthFileStore;
use crate::logout::{self, LogoutOutcome, LogoutRequest};
use crate::probe::{CancelToken, RegistryProbe};
use crate::registry::RegistryHost;
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
pub struct LogoutOpt {
    /// Registry to remove the cached credentials for, e.g. "quay.io"
    registry: Option<String>,
    /// Remove the cached credentials for all registries in the auth file
    #[structopt(short = "a", long = "all")]
    all: bool,
    /// Path of the authentication file. Defaults to the per-user config
    /// directory; use the REGAUTH_AUTH_FILE environment variable to override
    #[structopt(long = "authfile", parse(from_os_str))]
    authfile: Option<PathBuf>,
    /// Seconds to wait for the live credential check
    #[structopt(long = "timeout", default_value = "30")]
    timeout: u64,
}

pub fn logout(options: LogoutOpt) -> anyhow::Result<()> {
    let authfile = match options.authfile {
        Some(path) => path,
        None => config::auth_file_location()?,
    };
    let mut store =
        AuthFileStore::new(authfile).with_fallback(config::fallback_config_location());
    let probe = RegistryProbe::with_timeout(Duration::from_secs(options.timeout));
    let cancel = CancelToken::new();

    let request = LogoutRequest {
        registry: options.registry.as_deref().map(RegistryHost::parse),
        all: options.all,
    };

    match logout::execute(&request, &mut store, &probe, &cancel)? {
        LogoutOutcome::RemovedOne(host) => {
            info!("Removed login credentials for {}", host);
        }
        LogoutOutcome::RemovedAll => {
            info!("Removed login credentials for all registries");
        }
        LogoutOutcome::NotLoggedIn(host) => {
            info!("Not logged into {}", host);
        }
        LogoutOutcome::ForeignLogin(host) => {
            info!(
                "Not logged into {} with regauth. Existing credentials were established by a different client; use that client to log out.",
                host
            );
        }
    }
    Ok(())
}
