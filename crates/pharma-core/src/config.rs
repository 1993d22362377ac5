//! Configuration management for PharmaChain.
//!
//! Loads configuration from ${PHARMA_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Env var overriding `[api] base_url`.
pub const API_URL_ENV: &str = "PHARMA_API_URL";
/// Env var overriding `[identity] token_url`.
pub const TOKEN_URL_ENV: &str = "PHARMA_TOKEN_URL";
/// Env var overriding `[identity] client_id`.
pub const CLIENT_ID_ENV: &str = "PHARMA_CLIENT_ID";
/// Env var overriding `[identity] client_secret`.
pub const CLIENT_SECRET_ENV: &str = "PHARMA_CLIENT_SECRET";

fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for PharmaChain configuration and data directories.
    //!
    //! PHARMA_HOME resolution order:
    //! 1. PHARMA_HOME environment variable (if set)
    //! 2. ~/.config/pharma (default)

    use std::path::PathBuf;

    /// Returns the PharmaChain home directory.
    pub fn pharma_home() -> PathBuf {
        if let Ok(home) = std::env::var("PHARMA_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("pharma")
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        pharma_home().join("config.toml")
    }

    /// Returns the path to the persisted session file.
    pub fn session_path() -> PathBuf {
        pharma_home().join("session.json")
    }

    /// Returns the directory for log files.
    pub fn logs_dir() -> PathBuf {
        pharma_home().join("logs")
    }
}

/// Backend REST API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base address every relative resource path is joined to.
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: ApiConfig::DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ApiConfig {
    pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

    /// Returns the base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the resolved value is not a valid URL.
    pub fn effective_base_url(&self) -> Result<String> {
        resolve_url(
            std::env::var(API_URL_ENV).ok().as_deref(),
            Some(&self.base_url),
            Self::DEFAULT_BASE_URL,
            "API",
        )
    }
}

/// Identity provider settings used by the password grant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub token_url: Option<String>,
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    pub scope: String,
    /// Fail logins whose access token payload cannot be decoded.
    pub strict_claims: bool,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            token_url: None,
            client_id: None,
            client_secret: None,
            scope: IdentityConfig::DEFAULT_SCOPE.to_string(),
            strict_claims: false,
        }
    }
}

/// Identity settings after env overrides, ready to build a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentitySettings {
    pub token_url: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub scope: String,
    pub strict_claims: bool,
}

impl IdentityConfig {
    pub const DEFAULT_SCOPE: &str = "openid profile email";

    /// Resolves identity settings, letting environment variables win.
    ///
    /// # Errors
    /// Returns an error if no token URL or client id is configured.
    pub fn resolve(&self) -> Result<IdentitySettings> {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    fn resolve_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<IdentitySettings> {
        let pick = |var: &str, configured: Option<&String>| {
            env(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .or_else(|| {
                    configured
                        .map(|v| v.trim().to_string())
                        .filter(|v| !v.is_empty())
                })
        };

        let token_url = pick(TOKEN_URL_ENV, self.token_url.as_ref()).with_context(|| {
            format!("No token endpoint configured. Set {TOKEN_URL_ENV} or token_url in [identity].")
        })?;
        url::Url::parse(&token_url)
            .with_context(|| format!("Invalid identity token URL: {token_url}"))?;
        let client_id = pick(CLIENT_ID_ENV, self.client_id.as_ref()).with_context(|| {
            format!("No client id configured. Set {CLIENT_ID_ENV} or client_id in [identity].")
        })?;
        let client_secret = pick(CLIENT_SECRET_ENV, self.client_secret.as_ref());
        let scope = if self.scope.trim().is_empty() {
            Self::DEFAULT_SCOPE.to_string()
        } else {
            self.scope.trim().to_string()
        };

        Ok(IdentitySettings {
            token_url,
            client_id,
            client_secret,
            scope,
            strict_claims: self.strict_claims,
        })
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence.
    pub filter: String,
    /// Also write logs to `<PHARMA_HOME>/logs/pharma.log`.
    pub file: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
            file: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub identity: IdentityConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    /// Returns an error if the file already exists.
    ///
    /// # Errors
    /// Returns an error if the file exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Serializes the Rust defaults as TOML.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn generate() -> Result<String> {
        toml::to_string_pretty(&Config::default()).context("Failed to serialize default config")
    }

    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

/// Resolves a URL setting with precedence: env > config > default.
fn resolve_url(
    env_value: Option<&str>,
    config_value: Option<&str>,
    default_url: &str,
    label: &str,
) -> Result<String> {
    for candidate in [env_value, config_value].into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            url::Url::parse(trimmed)
                .with_context(|| format!("Invalid {label} base URL: {trimmed}"))?;
            return Ok(trimmed.to_string());
        }
    }

    Ok(default_url.to_string())
}
