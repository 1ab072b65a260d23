//! Process configuration.
//!
//! The stop, route and display timezone are fixed for this deployment.
//! Everything else comes from the environment.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use chrono_tz::Tz;

use crate::mbta::MbtaConfig;

/// Porter Square.
pub const STOP_ID: &str = "place-portr";

/// Red Line; used to filter predictions and to list stops.
pub const ROUTE_ID: &str = "Red";

/// Timezone for every displayed time.
pub const TIMEZONE: Tz = chrono_tz::America::New_York;

const DEFAULT_BIND_ADDR: SocketAddr = SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 3000);
const DEFAULT_STATIC_DIR: &str = "arrivals-server/static";

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {var} {value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Optional MBTA API key (`MBTA_API_KEY`).
    pub api_key: Option<String>,
    /// Override for the MBTA API base URL (`MBTA_BASE_URL`).
    pub base_url: Option<String>,
    /// Listen address (`BIND_ADDR`).
    pub bind_addr: SocketAddr,
    /// Directory served under `/static` (`STATIC_DIR`).
    pub static_dir: String,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let bind_addr = match get("BIND_ADDR") {
            Some(value) => value.parse().map_err(|e: std::net::AddrParseError| {
                ConfigError::Invalid {
                    var: "BIND_ADDR",
                    value: value.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => DEFAULT_BIND_ADDR,
        };

        Ok(Self {
            api_key: get("MBTA_API_KEY"),
            base_url: get("MBTA_BASE_URL"),
            bind_addr,
            static_dir: get("STATIC_DIR").unwrap_or_else(|| DEFAULT_STATIC_DIR.to_string()),
        })
    }

    /// Client configuration for the fixed stop and route.
    pub fn mbta_config(&self) -> MbtaConfig {
        let config = MbtaConfig::new(STOP_ID, ROUTE_ID).with_api_key(self.api_key.clone());
        match &self.base_url {
            Some(url) => config.with_base_url(url),
            None => config,
        }
    }
}
