//! Server configuration.
//!
//! Loaded from a TOML file. String values may reference environment
//! variables as `$VAR` or `${VAR}`; references are expanded before parsing.
//!
//! # Example Configuration
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//!
//! [processor]
//! api_login_id = "$ANET_API_LOGIN_ID"
//! transaction_key = "${ANET_TRANSACTION_KEY}"
//! environment = "sandbox"
//! timeout_secs = 20
//!
//! [limits]
//! amount_ceiling = "50000"
//! submit_timeout_secs = 30
//! ```
//!
//! # Environment Variables
//!
//! - `CONFIG` - Path to the configuration file (default: `config.toml`)
//! - `HOST` - Overrides the bind address
//! - `PORT` - Overrides the port
//! - Credentials referenced by `$VAR` in the file

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use cardgate::GatewaySettings;
use cardgate_anet::AnetConfig;
use regex::{Captures, Regex};
use secrecy::ExposeSecret;
use serde::Deserialize;

static ENV_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("static regex")
});

/// Errors raised while loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// The path that was tried.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A credential is empty or still an unexpanded `$VAR` reference.
    #[error("{0} is not set (missing environment variable?)")]
    UnresolvedCredential(&'static str),
}

/// Top-level server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port (default: `8080`).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Processor credentials and connection settings.
    pub processor: AnetConfig,

    /// Validation and timeout limits.
    #[serde(default)]
    pub limits: GatewaySettings,
}

const fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

const fn default_port() -> u16 {
    8080
}

impl ServerConfig {
    /// Loads configuration from `path`, expanding variables from the process
    /// environment. `HOST` and `PORT` override the file values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed, or a
    /// credential did not resolve.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Self::parse(&content, |name| std::env::var(name).ok())
    }

    /// Parses `content`, resolving `$VAR` references and `HOST` / `PORT`
    /// overrides through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if parsing fails or a credential did not
    /// resolve.
    pub fn parse(
        content: &str,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(content, &lookup);
        let mut config: Self = toml::from_str(&expanded)?;

        if let Some(host) = lookup("HOST").and_then(|h| h.parse().ok()) {
            config.host = host;
        }
        if let Some(port) = lookup("PORT").and_then(|p| p.parse().ok()) {
            config.port = port;
        }

        check_credential("processor.api_login_id", &config.processor.api_login_id)?;
        check_credential(
            "processor.transaction_key",
            config.processor.transaction_key.expose_secret(),
        )?;
        Ok(config)
    }

    /// The processor settings, consumed by the client constructor.
    #[must_use]
    pub fn processor(&self) -> AnetConfig {
        self.processor.clone()
    }
}

fn check_credential(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let value = value.trim();
    if value.is_empty() || value.starts_with('$') {
        return Err(ConfigError::UnresolvedCredential(name));
    }
    Ok(())
}

/// Replaces `$VAR` and `${VAR}` with the value `lookup` returns.
///
/// References `lookup` cannot resolve are left untouched.
fn expand_env_vars(input: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    ENV_REFERENCE
        .replace_all(input, |caps: &Captures<'_>| {
            let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
            lookup(name).unwrap_or_else(|| caps[0].to_owned())
        })
        .into_owned()
}
