//! Layered configuration loading.
//!
//! Sources, applied in order (later sources override earlier ones):
//!  1. `/etc/line-relay/service.yaml`: system-wide defaults
//!  2. `./config/service.yaml`: deployment-local override
//!  3. the file given by `--config` / `LINE_RELAY_CONFIG`
//!  4. environment variables prefixed `LINE_RELAY__` (double-underscore
//!     separator), e.g. `LINE_RELAY__SERVER__PORT=9090`
//!  5. `LINE_CHANNEL_SECRET`, `LINE_CHANNEL_ACCESS_TOKEN` and
//!     `PUBLIC_BASE_URL`, the variable names the platform's own tooling uses
//!  6. `--port`
//!
//! Every field has a default, so missing files are fine. A malformed file or
//! a value that cannot be coerced to its field type is an error.

use std::path::Path;

use line_relay_api::{ConfigError, ServiceConfig};
use tracing::info;

pub const SYSTEM_CONFIG_FILE: &str = "/etc/line-relay/service";
pub const LOCAL_CONFIG_FILE: &str = "config/service";
pub const ENV_PREFIX: &str = "LINE_RELAY";

/// Conventional variable names and the keys they set.
pub const ENV_ALIASES: [(&str, &str); 3] = [
    ("LINE_CHANNEL_SECRET", "channel.secret"),
    ("LINE_CHANNEL_ACCESS_TOKEN", "channel.access_token"),
    ("PUBLIC_BASE_URL", "public_base_url"),
];

/// Load the service configuration from every source.
///
/// Does not validate; call [`ServiceConfig::validate`] on the result.
pub fn load_config(
    explicit_file: Option<&Path>,
    port_override: Option<u16>,
) -> Result<ServiceConfig, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(
            config::File::with_name(SYSTEM_CONFIG_FILE)
                .required(false)
                .format(config::FileFormat::Yaml),
        )
        .add_source(
            config::File::with_name(LOCAL_CONFIG_FILE)
                .required(false)
                .format(config::FileFormat::Yaml),
        );

    if let Some(path) = explicit_file {
        info!(path = %path.display(), "Loading configuration from explicit path");
        builder = builder.add_source(config::File::from(path).required(true));
    }

    builder = builder.add_source(
        config::Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    for (variable, key) in ENV_ALIASES {
        let value = std::env::var(variable).ok().filter(|v| !v.is_empty());
        builder = builder
            .set_override_option(key, value)
            .map_err(load_error)?;
    }

    builder = builder
        .set_override_option("server.port", port_override.map(i64::from))
        .map_err(load_error)?;

    builder
        .build()
        .map_err(load_error)?
        .try_deserialize()
        .map_err(load_error)
}

fn load_error(e: config::ConfigError) -> ConfigError {
    ConfigError::Load {
        message: e.to_string(),
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
