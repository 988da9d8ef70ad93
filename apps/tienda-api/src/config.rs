//! API configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use std::env;
use std::fmt;
use std::str::FromStr;

use tienda_core::{Jurisdiction, Money, TaxRate};

/// Deployment environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    /// Whether error responses may carry debug detail.
    pub fn exposes_error_details(&self) -> bool {
        *self != Environment::Production
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" | "test" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(ConfigError::InvalidValue("APP_ENV".to_string())),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => f.write_str("development"),
            Environment::Production => f.write_str("production"),
        }
    }
}

/// API configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listen port
    pub http_port: u16,

    /// Address to bind
    pub bind_addr: String,

    /// SQLite database file
    pub database_path: String,

    /// Pool size
    pub db_max_connections: u32,

    pub environment: Environment,

    /// Tax and shipping policy applied to every order
    pub jurisdiction: Jurisdiction,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            http_port: 3000,
            bind_addr: "0.0.0.0".to_string(),
            database_path: "./data/tienda.db".to_string(),
            db_max_connections: 5,
            environment: Environment::Development,
            jurisdiction: Jurisdiction::mexico(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ApiConfig::default();
        let mexico = defaults.jurisdiction;

        let parse = |key: &str, default: String| -> String { lookup(key).unwrap_or(default) };

        let config = ApiConfig {
            http_port: parse("HTTP_PORT", defaults.http_port.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("HTTP_PORT".to_string()))?,

            bind_addr: parse("BIND_ADDR", defaults.bind_addr),

            database_path: parse("DATABASE_PATH", defaults.database_path),

            db_max_connections: parse("DB_MAX_CONNECTIONS", defaults.db_max_connections.to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()))?,

            environment: parse("APP_ENV", defaults.environment.to_string()).parse()?,

            jurisdiction: Jurisdiction {
                code: parse("JURISDICTION_CODE", mexico.code),

                tax_rate: TaxRate::from_bps(
                    parse("TAX_RATE_BPS", mexico.tax_rate.bps().to_string())
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("TAX_RATE_BPS".to_string()))?,
                ),

                free_shipping_threshold: Money::from_cents(
                    parse(
                        "FREE_SHIPPING_THRESHOLD_CENTS",
                        mexico.free_shipping_threshold.cents().to_string(),
                    )
                    .parse()
                    .map_err(|_| {
                        ConfigError::InvalidValue("FREE_SHIPPING_THRESHOLD_CENTS".to_string())
                    })?,
                ),

                flat_shipping: Money::from_cents(
                    parse("FLAT_SHIPPING_CENTS", mexico.flat_shipping.cents().to_string())
                        .parse()
                        .map_err(|_| ConfigError::InvalidValue("FLAT_SHIPPING_CENTS".to_string()))?,
                ),
            },
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }
        if config.jurisdiction.free_shipping_threshold.cents() < 0
            || config.jurisdiction.flat_shipping.cents() < 0
        {
            return Err(ConfigError::NegativeAmount);
        }

        Ok(config)
    }

    /// `bind_addr:http_port`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_addr, self.http_port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Shipping amounts must not be negative")]
    NegativeAmount,
}
