use crate::config;
use crate::credentials::{AuthFileStore, CredentialEntry, CredentialStore};
use crate::probe::{AuthProbe, CancelToken, ProbeError, RegistryProbe};
use crate::registry::RegistryHost;
use anyhow::bail;
use std::io::prelude::*;
use std::io::{stdin, stdout};
use std::path::PathBuf;
use std::time::Duration;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
pub struct LoginOpt {
    /// Registry to log into, e.g. "quay.io"
    registry: String,
    /// Username
    #[structopt(short = "u", long = "username")]
    username: Option<String>,
    /// Password
    #[structopt(short = "p", long = "password")]
    password: Option<String>,
    /// Path of the authentication file. Defaults to the per-user config
    /// directory; use the REGAUTH_AUTH_FILE environment variable to override
    #[structopt(long = "authfile", parse(from_os_str))]
    authfile: Option<PathBuf>,
    /// Seconds to wait for the registry to answer
    #[structopt(long = "timeout", default_value = "30")]
    timeout: u64,
}

pub fn login(options: LoginOpt) -> anyhow::Result<()> {
    let host = RegistryHost::parse(&options.registry);

    let username = match options.username {
        Some(username) => username,
        None => {
            print!("Username: ");
            stdout().flush()?;
            let buffer = &mut String::new();
            stdin().read_line(buffer)?;
            buffer.trim_end().to_string()
        }
    };
    let password = match options.password {
        Some(password) => password,
        None => rpassword::prompt_password_stdout("Password: ")?,
    };

    let probe = RegistryProbe::with_timeout(Duration::from_secs(options.timeout));
    match probe.check(&CancelToken::new(), &host, &username, &password) {
        Ok(()) => {}
        Err(ProbeError::Denied) => bail!("invalid username or password for {}", host),
        Err(e) => return Err(e.into()),
    }

    let authfile = match options.authfile {
        Some(path) => path,
        None => config::auth_file_location()?,
    };
    let mut store = AuthFileStore::new(authfile);
    store.store_one(
        &host,
        CredentialEntry {
            username: username.clone(),
            secret: password,
        },
    )?;
    info!("Login succeeded for {} as {}", host, username);
    Ok(())
}
