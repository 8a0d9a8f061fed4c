use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_PURCHASES_PATH: &str = "data/achats_clients_500.json";
const DEFAULT_LOYALTY_PATH: &str = "data/loyalty_points.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub purchases_path: PathBuf,
    pub loyalty_path: PathBuf,
    pub loyalty_seed: Option<u64>,
    pub log_level: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

impl AppConfig {
    /// Reads the process environment, after loading a `.env` file if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = match lookup("HOST") {
            Some(value) if value.eq_ignore_ascii_case("localhost") => IpAddr::from([127, 0, 0, 1]),
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "HOST",
                expected: "an IPv4 or IPv6 address",
                value,
            })?,
            None => IpAddr::from([0, 0, 0, 0]),
        };

        let port = match lookup("PORT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a valid u16",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let loyalty_seed = match lookup("LOYALTY_SEED").filter(|value| !value.trim().is_empty()) {
            Some(value) => Some(value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "LOYALTY_SEED",
                expected: "an unsigned integer",
                value,
            })?),
            None => None,
        };

        Ok(Self {
            host,
            port,
            purchases_path: lookup("PURCHASES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_PURCHASES_PATH)),
            loyalty_path: lookup("LOYALTY_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOYALTY_PATH)),
            loyalty_seed,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:3000");
        assert_eq!(config.purchases_path, PathBuf::from(DEFAULT_PURCHASES_PATH));
        assert_eq!(config.loyalty_path, PathBuf::from(DEFAULT_LOYALTY_PATH));
        assert_eq!(config.loyalty_seed, None);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn overrides_are_read() {
        let config = config(&[
            ("HOST", "localhost"),
            ("PORT", "8081"),
            ("LOYALTY_SEED", "42"),
            ("LOYALTY_PATH", "/tmp/ledger.json"),
        ])
        .unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8081");
        assert_eq!(config.loyalty_seed, Some(42));
        assert_eq!(config.loyalty_path, PathBuf::from("/tmp/ledger.json"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            config(&[("PORT", "eighty")]),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
        assert!(matches!(
            config(&[("LOYALTY_SEED", "-1")]),
            Err(ConfigError::Invalid { name: "LOYALTY_SEED", .. })
        ));
        assert!(matches!(
            config(&[("HOST", "not-an-ip")]),
            Err(ConfigError::Invalid { name: "HOST", .. })
        ));
    }
}
