use std::net::SocketAddr;

/// Application-level constants
pub const APP_NAME: &str = "Medisight";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum accepted claim upload size (bytes). Claims are held in memory.
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Rendering DPI for page previews. Matches the preview panel's display
/// size; higher values only slow rendering down.
pub const PREVIEW_DPI: u32 = 150;

/// Default bind address when `MEDISIGHT_BIND` is unset.
pub const DEFAULT_BIND: &str = "127.0.0.1:8787";

pub fn default_log_filter() -> String {
    format!("info,{}=debug", env!("CARGO_PKG_NAME"))
}

/// Errors loading startup configuration. All of these are fatal: the
/// process must halt before the server binds.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingVar(&'static str),
    #[error("invalid bind address '{0}'")]
    InvalidBindAddr(String),
}

/// Startup configuration: AWS credentials, the Bedrock agent identity,
/// and the local bind address.
#[derive(Debug, Clone)]
pub struct Settings {
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_region: String,
    pub agent_id: String,
    pub agent_alias_id: String,
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// The five AWS/Bedrock values are required; a missing or empty one is
    /// a fatal `ConfigError`. `MEDISIGHT_BIND` is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind = std::env::var("MEDISIGHT_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse::<SocketAddr>()
            .map_err(|_| ConfigError::InvalidBindAddr(bind))?;

        Ok(Self {
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            aws_region: require("AWS_REGION")?,
            agent_id: require("BEDROCK_AGENT_ID")?,
            agent_alias_id: require("BEDROCK_AGENT_ALIAS_ID")?,
            bind_addr,
        })
    }
}

fn require(name: &'static str) -> Result<String, ConfigError> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_missing_var_errors() {
        let err = require("MEDISIGHT_TEST_UNSET_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("MEDISIGHT_TEST_UNSET_VAR")));
    }

    #[test]
    fn require_empty_var_errors() {
        std::env::set_var("MEDISIGHT_TEST_EMPTY_VAR", "  ");
        let err = require("MEDISIGHT_TEST_EMPTY_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(_)));
    }

    #[test]
    fn require_present_var_returns_value() {
        std::env::set_var("MEDISIGHT_TEST_PRESENT_VAR", "value");
        assert_eq!(require("MEDISIGHT_TEST_PRESENT_VAR").unwrap(), "value");
    }

    #[test]
    fn default_bind_parses() {
        let addr: SocketAddr = DEFAULT_BIND.parse().unwrap();
        assert_eq!(addr.port(), 8787);
    }

    #[test]
    fn app_name_is_medisight() {
        assert_eq!(APP_NAME, "Medisight");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, "0.1.0");
    }
}
