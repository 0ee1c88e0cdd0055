use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;

/// Upper bound for `JWT_EXPIRATION`: one year.
pub const MAX_JWT_EXPIRATION_SECS: u64 = 366 * 24 * 3600;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub db_host: String,
    pub db_port: u16,
    pub db_user: String,
    pub db_password: String,
    pub db_name: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_expiration_secs: u64,
    pub bcrypt_cost: u32,
    pub server_host: String,
    pub server_port: u16,
    pub public_host: String,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. Empty values
    /// count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;
        let jwt_expiration_secs = match get("JWT_EXPIRATION") {
            Some(raw) => parse_duration_secs(&raw).ok_or(ConfigError::Invalid {
                key: "JWT_EXPIRATION",
                value: raw,
            })?,
            None => 3600,
        };
        let server_port = parse_or(get("PORT"), "PORT", 5000)?;

        Ok(Config {
            database_url: get("DATABASE_URL"),
            db_host: get("DB_HOST").unwrap_or_else(|| "localhost".into()),
            db_port: parse_or(get("DB_PORT"), "DB_PORT", 5432)?,
            db_user: get("DB_USER").unwrap_or_else(|| "postgres".into()),
            db_password: get("DB_PASSWORD").unwrap_or_default(),
            db_name: get("DB_NAME").unwrap_or_else(|| "properties".into()),
            db_max_connections: parse_or(get("DB_MAX_CONNECTIONS"), "DB_MAX_CONNECTIONS", 10)?,
            jwt_secret,
            jwt_expiration_secs,
            bcrypt_cost: parse_or(get("BCRYPT_COST"), "BCRYPT_COST", 10)?,
            server_host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            server_port,
            public_host: get("PUBLIC_HOST").unwrap_or_else(|| format!("localhost:{server_port}")),
            upload_dir: get("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("uploads")),
            max_upload_bytes: parse_or(get("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }

    /// Token lifetime as a signed duration. Fails for values that
    /// `from_lookup` would have rejected.
    pub fn jwt_ttl(&self) -> Result<chrono::Duration, ConfigError> {
        Some(self.jwt_expiration_secs)
            .filter(|secs| (1..=MAX_JWT_EXPIRATION_SECS).contains(secs))
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| ConfigError::Invalid {
                key: "JWT_EXPIRATION",
                value: self.jwt_expiration_secs.to_string(),
            })
    }

    pub fn connect_options(&self) -> Result<PgConnectOptions, sqlx::Error> {
        if let Some(url) = &self.database_url {
            return PgConnectOptions::from_str(url);
        }
        Ok(PgConnectOptions::new()
            .host(&self.db_host)
            .port(self.db_port)
            .username(&self.db_user)
            .password(&self.db_password)
            .database(&self.db_name))
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        None => Ok(default),
    }
}

/// Accepts `1h`, `30m`, `90s` or a bare number of seconds, up to
/// [`MAX_JWT_EXPIRATION_SECS`].
fn parse_duration_secs(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    let (digits, unit) = match raw.char_indices().last()? {
        (i, 'h') => (&raw[..i], 3600),
        (i, 'm') => (&raw[..i], 60),
        (i, 's') => (&raw[..i], 1),
        _ => (raw, 1),
    };
    digits
        .parse::<u64>()
        .ok()?
        .checked_mul(unit)
        .filter(|secs| (1..=MAX_JWT_EXPIRATION_SECS).contains(secs))
}
