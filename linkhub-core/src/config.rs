use std::env;

use crate::errors::{ConfigError, LinkHubError};

/// Runtime environment used by the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_str(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "staging" | "stage" => Environment::Staging,
            _ => Environment::Development,
        }
    }
}

/// Configuração global do serviço carregada a partir das variáveis de
/// ambiente.
#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub database_url: String,
    pub environment: Environment,
    pub http_bind: Option<String>,
    pub jwt_secret: Option<String>,
    /// Path to an offline MaxMind country dataset. Absent means every
    /// visitor resolves to an unknown country.
    pub geoip_db: Option<String>,
    /// Whether the first `x-forwarded-for` entry is trusted for the client
    /// IP. Defaults to true for compatibility; disable when the service is
    /// not behind a trusted proxy.
    pub trust_forwarded: bool,
}

impl CoreConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".into()))?;

        let environment = env::var("HUB_ENV")
            .map(|raw| Environment::from_str(&raw))
            .unwrap_or_default();

        let http_bind = env::var("HUB_HTTP_BIND").ok();
        let jwt_secret = env::var("HUB_JWT_SECRET").ok();
        let geoip_db = env::var("HUB_GEOIP_DB").ok();
        let trust_forwarded = match env::var("HUB_TRUST_FORWARDED") {
            Ok(raw) => parse_bool("HUB_TRUST_FORWARDED", &raw)?,
            Err(_) => true,
        };

        Ok(Self {
            database_url,
            environment,
            http_bind,
            jwt_secret,
            geoip_db,
            trust_forwarded,
        })
    }

    /// Returns the base Postgres URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Whether the service is running in production.
    pub fn is_production(&self) -> bool {
        matches!(self.environment, Environment::Production)
    }
}

fn parse_bool(key: &'static str, raw: &str) -> Result<bool, ConfigError> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvVar {
            key,
            value: raw.to_string(),
        }),
    }
}

/// Helper that loads config and converts to the canonical LinkHub error type.
pub fn load_core_config() -> Result<CoreConfig, LinkHubError> {
    Ok(CoreConfig::from_env()?)
}
