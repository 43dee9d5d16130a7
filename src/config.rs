//! Locations of the managed auth file, the foreign fallback config and the
//! data directory.

use crate::constants::AUTH_FILE_NAME;
use std::env;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;

pub const AUTH_FILE_ENV: &str = "REGAUTH_AUTH_FILE";
pub const FALLBACK_CONFIG_ENV: &str = "DOCKER_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no per-user configuration directory was found; set REGAUTH_AUTH_FILE to choose the auth file location")]
    MissingConfigDir,
    #[error("no per-user data directory was found")]
    MissingDataDir,
    #[error("could not create the data directory: {0}")]
    CreateDataDir(std::io::Error),
}

/// Location of the managed auth file, overridable with `REGAUTH_AUTH_FILE`.
pub fn auth_file_location() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::var_os(AUTH_FILE_ENV) {
        return Ok(PathBuf::from(path));
    }
    dirs::config_dir()
        .map(|dir| dir.join("regauth").join(AUTH_FILE_NAME))
        .ok_or(ConfigError::MissingConfigDir)
}

/// Docker-style config recorded by other clients, consulted read-only when
/// the managed auth file has no entry for a registry.
pub fn fallback_config_location() -> Option<PathBuf> {
    if let Some(dir) = env::var_os(FALLBACK_CONFIG_ENV) {
        return Some(PathBuf::from(dir).join("config.json"));
    }
    dirs::home_dir().map(|home| home.join(".docker").join("config.json"))
}

/// Directory holding the verbose log file, created on first use.
pub fn data_folder() -> Result<PathBuf, ConfigError> {
    let folder = dirs::data_dir()
        .ok_or(ConfigError::MissingDataDir)?
        .join("regauth");
    fs::create_dir_all(&folder).map_err(ConfigError::CreateDataDir)?;
    Ok(folder)
}

#[cfg(test)]
mod test {
    use super::*;

    // env vars are process-wide; restore them so other tests see a clean state
    fn with_env<F: FnOnce()>(key: &str, value: &str, f: F) {
        let previous = env::var_os(key);
        env::set_var(key, value);
        f();
        match previous {
            Some(v) => env::set_var(key, v),
            None => env::remove_var(key),
        }
    }

    #[test]
    fn auth_file_env_var_wins() {
        with_env(AUTH_FILE_ENV, "/tmp/other-auth.json", || {
            assert_eq!(
                auth_file_location().unwrap(),
                PathBuf::from("/tmp/other-auth.json")
            );
        });
    }

    #[test]
    fn fallback_config_env_var_points_at_a_directory() {
        with_env(FALLBACK_CONFIG_ENV, "/tmp/dockerconf", || {
            assert_eq!(
                fallback_config_location(),
                Some(PathBuf::from("/tmp/dockerconf").join("config.json"))
            );
        });
    }
}
