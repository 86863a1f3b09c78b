//! Probe configuration.
//!
//! Loaded via the `config` crate from `ZCODE__`-prefixed environment
//! variables, with `__` separating nested keys:
//!
//! ```text
//! ZCODE__API_BASE_URL=http://localhost:8101/api
//! ZCODE__ACCESS__RESOLVE_TIMEOUT_MS=1500
//! ```
//!
//! See [`AccessConfig`] for the guard settings and their defaults.

use config::Environment;
use serde::Deserialize;
use zcode_access::AccessConfig;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "ZCODE";

/// Probe configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ProbeConfig {
    /// Root URL of the user API, including any context path.
    pub api_base_url: String,

    /// Guard configuration.
    #[serde(default)]
    pub access: AccessConfig,
}

impl ProbeConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(Self::environment())
    }

    fn environment() -> Environment {
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true)
    }

    fn from_environment(environment: Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}
