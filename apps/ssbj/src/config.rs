//! # Server Configuration
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config <path>`, or `ssbj.toml` in the working directory)
//! 3. Environment variables
//! 4. Command-line flags (applied by the CLI)
//!
//! ## Environment Variables
//!
//! - `SSBJ_API_KEY`: If set, requires Bearer token authentication
//! - `SSBJ_RATE_LIMIT`: Requests per second (default: 100, 0 to disable)
//! - `SSBJ_CORS_ORIGINS`: Comma-separated list of allowed origins, or "*" for all
//!
//! ## Example File
//!
//! ```toml
//! host = "0.0.0.0"
//! port = 8080
//! database = "/var/lib/ssbj/ssbj.db"
//! api_key = "change-me"
//! rate_limit = 50
//! cors_origins = ["https://readiness.example.com"]
//! ```

use serde::Deserialize;
use ssbj_core::SsbjError;
use std::path::{Path, PathBuf};

/// File picked up from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "ssbj.toml";

/// Default database path.
pub const DEFAULT_DATABASE: &str = "ssbj.db";

/// Default request budget per second.
pub const DEFAULT_RATE_LIMIT: u32 = 100;

/// Maximum accepted request body size.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
    /// Bearer key required on every route except `/health`. `None` disables auth.
    pub api_key: Option<String>,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Allowed CORS origins. `None` means localhost only, `["*"]` means any.
    pub cors_origins: Option<Vec<String>>,
    pub body_limit_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from(DEFAULT_DATABASE),
            api_key: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
            body_limit_bytes: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, SsbjError> {
        let mut config: Self = toml::from_str(source)
            .map_err(|e| SsbjError::InvalidInput(format!("config: {}", e)))?;
        config.api_key = config.api_key.filter(|k| !k.is_empty());
        Ok(config)
    }

    /// Load defaults, then the config file, then the environment.
    ///
    /// An explicit `path` must exist; the implicit `ssbj.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, SsbjError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let implicit = Path::new(DEFAULT_CONFIG_FILE);
                if implicit.exists() {
                    Self::from_file(implicit)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, SsbjError> {
        let source = std::fs::read_to_string(path).map_err(|e| {
            SsbjError::InvalidInput(format!("cannot read config {}: {}", path.display(), e))
        })?;
        tracing::info!(path = %path.display(), "Loaded configuration file");
        Self::from_toml_str(&source)
    }

    /// Override fields from environment variables resolved through `lookup`.
    ///
    /// Unparseable values are logged and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup("SSBJ_API_KEY") {
            self.api_key = Some(key).filter(|k| !k.is_empty());
        }
        if let Some(raw) = lookup("SSBJ_RATE_LIMIT") {
            match raw.trim().parse() {
                Ok(limit) => self.rate_limit = limit,
                Err(_) => tracing::warn!(value = %raw, "Ignoring invalid SSBJ_RATE_LIMIT"),
            }
        }
        if let Some(raw) = lookup("SSBJ_CORS_ORIGINS") {
            let origins: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
            self.cors_origins = Some(origins);
        }
    }

    /// `host:port` for the listener.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
