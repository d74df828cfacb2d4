//! Layered application settings.
//!
//! Sources, lowest precedence first: `.env` (exported into the process
//! environment), `config/base.toml`, `config/{env}.toml`, then `PRIMER_*`
//! variables with `__` between nested keys (`PRIMER_SERVER__PORT=9000`).
//! `PRIMER_ENV` picks the overlay file and `PRIMER_CONFIG_DIR` the directory.

use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{bail, ensure, Context};
use serde::Deserialize;

const ENV_SELECTOR: &str = "PRIMER_ENV";
const CONFIG_DIR_SELECTOR: &str = "PRIMER_CONFIG_DIR";
const ENV_PREFIX: &str = "PRIMER";
const DEV_JWT_SECRET: &str = "change-me";

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Local,
    Staging,
    Production,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Local => "local",
            Environment::Staging => "staging",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Ok(match value {
            "local" => Environment::Local,
            "staging" => Environment::Staging,
            "production" => Environment::Production,
            other => bail!(
                "unsupported environment '{}'; expected local, staging or production",
                other
            ),
        })
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub environment: Environment,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub telemetry: TelemetrySettings,
    pub auth: AuthSettings,
}

impl Settings {
    /// Resolve the environment and config directory from the process
    /// environment, then load.
    pub fn load() -> anyhow::Result<Self> {
        // A missing `.env` is normal outside development.
        dotenvy::dotenv().ok();

        let environment = std::env::var(ENV_SELECTOR).unwrap_or_else(|_| "local".to_string());
        let config_dir = match std::env::var_os(CONFIG_DIR_SELECTOR) {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()
                .context("unable to resolve current directory")?
                .join("config"),
        };

        Self::load_from(&config_dir, &environment)
    }

    pub fn load_from(config_dir: &Path, environment: &str) -> anyhow::Result<Self> {
        let selected: Environment = environment.parse()?;

        let layered = config::Config::builder()
            .add_source(config::File::from(config_dir.join("base.toml")).required(false))
            .add_source(
                config::File::from(config_dir.join(format!("{}.toml", selected))).required(false),
            )
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("failed to read configuration from {}", config_dir.display()))?;

        let mut settings: Settings = layered
            .try_deserialize()
            .context("configuration does not match the expected shape")?;
        settings.environment = selected;
        settings.validate()?;

        Ok(settings)
    }

    /// Reject values the server cannot start with.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.server.request_timeout_ms > 0, "server.request_timeout_ms must be > 0");
        ensure!(self.database.max_connections > 0, "database.max_connections must be > 0");
        ensure!(!self.auth.jwt_secret.is_empty(), "auth.jwt_secret must not be empty");
        ensure!(self.auth.token_ttl_minutes > 0, "auth.token_ttl_minutes must be > 0");
        ensure!(
            self.environment != Environment::Production || self.auth.jwt_secret != DEV_JWT_SECRET,
            "auth.jwt_secret must be overridden in production"
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub request_timeout_ms: u64,
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            request_timeout_ms: 15_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// sqlx connection URL; `mode=rwc` creates the file on first use
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            url: "sqlite://primer.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TelemetrySettings {
    pub log_format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub filter: String,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Pretty,
            filter: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    /// HMAC secret for signing access tokens
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    /// Static value expected in the `X-Token` header
    pub api_token: String,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
            token_ttl_minutes: 30,
            api_token: "secret".to_string(),
        }
    }
}
