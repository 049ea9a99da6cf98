//! Relay configuration.

use std::{path::PathBuf, time::Duration};

use crate::domain::RoomRetention;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_OUTBOUND_BUFFER: usize = 64;
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_millis(1000);

/// Runtime configuration of the relay server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Capacity of each connection's outbound queue (at least 1)
    pub outbound_buffer: usize,
    /// Refuse new connections once this many are open
    pub max_connections: Option<usize>,
    /// What to do with rooms that become empty
    pub room_retention: RoomRetention,
    /// Directory of static reference documents served under `/static`
    pub static_dir: Option<PathBuf>,
    /// How long a closing connection may keep flushing queued frames
    pub drain_timeout: Duration,
}

impl RelayConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            outbound_buffer: DEFAULT_OUTBOUND_BUFFER,
            max_connections: None,
            room_retention: RoomRetention::default(),
            static_dir: None,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }
}
