//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;

use crate::game::board::DEFAULT_BOARD_RADIUS;
use crate::game::state::{MAX_PLAYERS, MIN_PLAYERS};
use crate::util::rate_limit::INPUT_RATE_LIMIT;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Board radius for new matches
    pub board_radius: i32,
    /// Roster size when neither the directory nor the join names one
    pub default_max_players: usize,

    /// Allowed client origins for CORS; empty allows any origin
    pub client_origins: Vec<String>,
    /// Inbound WebSocket frames allowed per connection per second
    pub input_rate_limit: u32,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        // Hosting platforms provide PORT; fall back to SERVER_ADDR or default
        let server_addr = if let Ok(port) = env::var("PORT") {
            format!("0.0.0.0:{}", port)
        } else {
            env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        };

        let config = Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),

            board_radius: parse_var("BOARD_RADIUS", DEFAULT_BOARD_RADIUS)?,
            default_max_players: parse_var("DEFAULT_MAX_PLAYERS", MIN_PLAYERS)?,

            client_origins: env::var("CLIENT_ORIGIN")
                .map(|v| parse_origins(&v))
                .unwrap_or_default(),
            input_rate_limit: parse_var("INPUT_RATE_LIMIT", INPUT_RATE_LIMIT)?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.board_radius < 1 {
            return Err(ConfigError::OutOfRange {
                name: "BOARD_RADIUS",
                reason: "must be at least 1",
            });
        }
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&self.default_max_players) {
            return Err(ConfigError::OutOfRange {
                name: "DEFAULT_MAX_PLAYERS",
                reason: "must be between 2 and 6",
            });
        }
        if self.input_rate_limit == 0 {
            return Err(ConfigError::OutOfRange {
                name: "INPUT_RATE_LIMIT",
                reason: "must be positive",
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            log_level: "info".to_string(),
            board_radius: DEFAULT_BOARD_RADIUS,
            default_max_players: MIN_PLAYERS,
            client_origins: Vec::new(),
            input_rate_limit: INPUT_RATE_LIMIT,
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Split a comma-separated origin list
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string)
        .collect()
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("{name} {reason}")]
    OutOfRange {
        name: &'static str,
        reason: &'static str,
    },

    #[error("Invalid server address format")]
    InvalidAddress,
}
