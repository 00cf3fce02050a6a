//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod password;
pub mod session;
pub mod store;

use serde::{Deserialize, Serialize};

use self::password::PasswordPolicyConfig;
use self::session::SessionConfig;
use self::store::StoreConfig;

use crate::error::AppError;

/// Root configuration for the auth core.
///
/// This struct is the top-level deserialization target for the merged TOML
/// configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Session store backend settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Session lifecycle settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Password policy settings.
    #[serde(default)]
    pub password: PasswordPolicyConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `CLASSHUB_`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CLASSHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_complete() {
        let config = AppConfig::default();
        assert_eq!(config.store.provider, "memory");
        assert_eq!(config.session.max_sessions_per_user, 5);
        assert_eq!(config.password.min_length, 8);
        assert_eq!(config.password.max_changes_per_day, 5);
        assert_eq!(config.password.history_depth, 5);
    }
}
