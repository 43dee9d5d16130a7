/// Canonical name of the default registry.
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Hostnames that are aliases of the default registry.
pub const DEFAULT_REGISTRY_ALIASES: [&str; 2] = ["index.docker.io", "registry-1.docker.io"];

pub const AUTH_FILE_NAME: &str = "auth.json";
