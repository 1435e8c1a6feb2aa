//! Runtime configuration.
//!
//! Configuration is resolved once at process startup and passed into the relay and the client
//! drivers. Nothing reads environment variables while handling connections; the binaries read
//! them and hand the raw values to the `*_from_env_value` helpers below.

use std::time::Duration;

use crate::constants::{
    CORS_ANY_ORIGIN, DEFAULT_SOCKET_HOST, DEFAULT_SOCKET_PORT, DEFAULT_SOCKET_URL,
    IDLE_POLL_INTERVAL, INACTIVITY_TIMEOUT, RECONNECT_DELAY,
};
use crate::{IntakeError, IntakeResult};

/// Origins allowed to make cross-origin requests to the relay.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Any origin (`*`).
    Any,
    /// An explicit list of origins.
    List(Vec<String>),
}

/// Relay server configuration.
#[derive(Clone, Debug)]
pub struct RelayConfig {
    host: String,
    port: u16,
    cors_origins: CorsOrigins,
}

impl RelayConfig {
    /// Create a relay configuration.
    ///
    /// # Arguments
    ///
    /// * `host` - Interface to listen on, e.g. `0.0.0.0`.
    /// * `port` - TCP port for both the WebSocket and `/health`.
    /// * `cors_origins` - Origins allowed to call the relay from a browser.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidInput` if `host` is empty or whitespace.
    pub fn new(host: String, port: u16, cors_origins: CorsOrigins) -> IntakeResult<Self> {
        if host.trim().is_empty() {
            return Err(IntakeError::InvalidInput("listen host cannot be empty".into()));
        }

        Ok(Self {
            host,
            port,
            cors_origins,
        })
    }

    /// Listen host.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Listen port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Allowed CORS origins.
    pub fn cors_origins(&self) -> &CorsOrigins {
        &self.cors_origins
    }

    /// `host:port` string suitable for binding a listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_SOCKET_HOST.into(),
            port: DEFAULT_SOCKET_PORT,
            cors_origins: CorsOrigins::Any,
        }
    }
}

/// Configuration shared by the submitter and observer clients.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    socket_url: String,
    idle_timeout: Duration,
    idle_poll_interval: Duration,
    reconnect_delay: Duration,
}

impl ClientConfig {
    /// Create a client configuration with the default reconnect delay.
    ///
    /// # Arguments
    ///
    /// * `socket_url` - Relay WebSocket URL, e.g. `ws://localhost:3001/ws`.
    /// * `idle_timeout` - Inactivity after which a filling session is marked `inactive`.
    /// * `idle_poll_interval` - How often the idle monitor checks.
    ///
    /// # Errors
    ///
    /// Returns `IntakeError::InvalidInput` if `idle_poll_interval` is zero.
    pub fn new(
        socket_url: String,
        idle_timeout: Duration,
        idle_poll_interval: Duration,
    ) -> IntakeResult<Self> {
        if idle_poll_interval.is_zero() {
            return Err(IntakeError::InvalidInput(
                "idle poll interval must be greater than zero".into(),
            ));
        }

        Ok(Self {
            socket_url,
            idle_timeout,
            idle_poll_interval,
            reconnect_delay: RECONNECT_DELAY,
        })
    }

    /// Override the delay between reconnection attempts.
    pub fn with_reconnect_delay(mut self, delay: Duration) -> Self {
        self.reconnect_delay = delay;
        self
    }

    /// Relay WebSocket URL.
    pub fn socket_url(&self) -> &str {
        &self.socket_url
    }

    /// Inactivity threshold for the submitter.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Idle monitor period.
    pub fn idle_poll_interval(&self) -> Duration {
        self.idle_poll_interval
    }

    /// Delay between reconnection attempts.
    pub fn reconnect_delay(&self) -> Duration {
        self.reconnect_delay
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            socket_url: DEFAULT_SOCKET_URL.into(),
            idle_timeout: INACTIVITY_TIMEOUT,
            idle_poll_interval: IDLE_POLL_INTERVAL,
            reconnect_delay: RECONNECT_DELAY,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the listen port. Missing or blank values fall back to the default port.
pub fn port_from_env_value(value: Option<String>) -> IntakeResult<u16> {
    non_blank(value)
        .map(|v| v.parse::<u16>().map_err(IntakeError::InvalidPort))
        .transpose()
        .map(|port| port.unwrap_or(DEFAULT_SOCKET_PORT))
}

/// Parse the allowed CORS origins.
///
/// `*`, a missing value or a blank value mean any origin; otherwise the value is a
/// comma-separated list and empty entries are dropped.
pub fn cors_origins_from_env_value(value: Option<String>) -> CorsOrigins {
    let Some(value) = non_blank(value) else {
        return CorsOrigins::Any;
    };
    if value == CORS_ANY_ORIGIN {
        return CorsOrigins::Any;
    }

    let origins: Vec<String> = value
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect();

    if origins.is_empty() {
        CorsOrigins::Any
    } else {
        CorsOrigins::List(origins)
    }
}

/// Parse the relay URL used by clients. Only `ws://` and `wss://` URLs are accepted.
pub fn socket_url_from_env_value(value: Option<String>) -> IntakeResult<String> {
    let url = non_blank(value).unwrap_or_else(|| DEFAULT_SOCKET_URL.into());
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(url)
    } else {
        Err(IntakeError::InvalidInput(format!(
            "socket URL must start with ws:// or wss://: {url}"
        )))
    }
}

/// Parse a duration given in whole milliseconds, falling back to `default`.
pub fn millis_from_env_value(value: Option<String>, default: Duration) -> IntakeResult<Duration> {
    non_blank(value)
        .map(|v| v.parse::<u64>().map_err(IntakeError::InvalidDuration))
        .transpose()
        .map(|ms| ms.map(Duration::from_millis).unwrap_or(default))
}
