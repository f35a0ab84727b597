use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("JWT_SECRET must not be empty")]
    EmptySecret,
    #[error("invalid value {value:?} for {var}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Password of the demo account created by `--seed`.
    pub seed_password: String,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup. The secret is checked here so a
    /// blank `JWT_SECRET` stops the process before a listener is bound.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let secret = lookup("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        if secret.trim().is_empty() {
            return Err(ConfigError::EmptySecret);
        }

        let ttl_minutes = parse_or(&lookup, "JWT_TTL_MINUTES", 15i64)?;
        if ttl_minutes <= 0 {
            return Err(ConfigError::Invalid {
                var: "JWT_TTL_MINUTES",
                value: ttl_minutes.to_string(),
            });
        }

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "bankapi".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "bankapi-clients".into()),
            ttl_minutes,
        };

        Ok(Self {
            database_url,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080u16)?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10u32)?,
            seed_password: lookup("SEED_PASSWORD").unwrap_or_else(|| "changeme".into()),
            jwt,
        })
    }
}

fn parse_or<F, T>(lookup: &F, var: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { var, value }),
        None => Ok(default),
    }
}
