use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Connection settings for the remote key/value backend.
///
/// Passed by reference at construction; nothing here is global state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteStoreConfig {
    /// Backing-store host name or address.
    pub host: String,
    /// Backing-store port.
    pub port: u16,
    /// Bound on establishing the initial connection.
    pub connect_timeout_ms: u64,
    /// Bound on each individual store round trip.
    pub operation_timeout_ms: u64,
}

impl Default for RemoteStoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            connect_timeout_ms: 1500,
            operation_timeout_ms: 5000,
        }
    }
}

impl RemoteStoreConfig {
    /// `host:port`, for diagnostics.
    pub fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = RemoteStoreConfig::default();
        assert_eq!(c.endpoint(), "127.0.0.1:6379");
        assert_eq!(c.connect_timeout(), Duration::from_millis(1500));
        assert_eq!(c.operation_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn endpoint_renders_host_and_port() {
        let c = RemoteStoreConfig {
            host: "store.internal".into(),
            port: 7000,
            ..Default::default()
        };
        assert_eq!(c.endpoint(), "store.internal:7000");
    }
}
