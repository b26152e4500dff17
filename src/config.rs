use std::env;
use std::time::Duration;

use thiserror::Error;

/// Per store call deadline unless `DB_QUERY_TIMEOUT_SECS` says otherwise.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{var} has an invalid value: {value:?}")]
    Invalid { var: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_open_conns: u32,
    pub max_idle_time: Duration,
    pub query_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    /// Used for both the `iss` and `aud` claims.
    pub issuer: String,
    pub ttl: Duration,
}

/// Credentials guarding `/api/v1/debug/vars`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuthConfig {
    pub user: String,
    pub pass: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: String,
    pub db: DbConfig,
    pub token: TokenConfig,
    pub basic: BasicAuthConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |var: &'static str| -> Result<String, ConfigError> {
            lookup(var)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(var))
        };
        let or_default =
            |var: &str, default: &str| lookup(var).unwrap_or_else(|| default.to_string());

        let server_port = parse_number::<u16>("SERVER_PORT", or_default("SERVER_PORT", "8080"))?;
        let max_open_conns =
            parse_number::<u32>("DB_MAX_OPEN_CONNS", or_default("DB_MAX_OPEN_CONNS", "30"))?;
        if max_open_conns == 0 {
            return Err(ConfigError::Invalid {
                var: "DB_MAX_OPEN_CONNS",
                value: "0".into(),
            });
        }

        let idle = or_default("DB_MAX_IDLE_TIME", "15m");
        let max_idle_time = parse_duration(&idle).ok_or(ConfigError::Invalid {
            var: "DB_MAX_IDLE_TIME",
            value: idle,
        })?;

        let query_timeout = match lookup("DB_QUERY_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number::<u64>("DB_QUERY_TIMEOUT_SECS", raw)?),
            None => DEFAULT_QUERY_TIMEOUT,
        };

        let ttl_hours = parse_number::<u64>(
            "AUTH_TOKEN_TTL_HOURS",
            or_default("AUTH_TOKEN_TTL_HOURS", "72"),
        )?;
        let ttl_secs = ttl_hours
            .checked_mul(60 * 60)
            .ok_or_else(|| ConfigError::Invalid {
                var: "AUTH_TOKEN_TTL_HOURS",
                value: ttl_hours.to_string(),
            })?;

        Ok(Self {
            server_host: or_default("SERVER_HOST", "127.0.0.1"),
            server_port,
            cors_allowed_origin: or_default("CORS_ALLOWED_ORIGIN", "http://localhost:5174"),
            db: DbConfig {
                url: required("DATABASE_URL")?,
                max_open_conns,
                max_idle_time,
                query_timeout,
            },
            token: TokenConfig {
                secret: required("AUTH_TOKEN_SECRET")?,
                issuer: or_default("AUTH_TOKEN_ISSUER", "open-todo"),
                ttl: Duration::from_secs(ttl_secs),
            },
            basic: BasicAuthConfig {
                user: or_default("AUTH_BASIC_USER", "admin"),
                pass: or_default("AUTH_BASIC_PASS", "admin"),
            },
        })
    }

    pub fn server_url(&self) -> String {
        format!("http://{}:{}", self.server_host, self.server_port)
    }
}

fn parse_number<T: std::str::FromStr>(var: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value: raw })
}

/// Parses `90s`, `15m`, `2h` or a bare number of seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let (digits, unit) = match raw.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => raw.split_at(idx),
        None => (raw, "s"),
    };
    let value: u64 = digits.parse().ok()?;
    let secs = match unit {
        "s" => value,
        "m" => value.checked_mul(60)?,
        "h" => value.checked_mul(60 * 60)?,
        _ => return None,
    };
    Some(Duration::from_secs(secs))
}
