//! WebSocket broadcast relay server.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin roomcast-server
//! cargo run --bin roomcast-server -- --host 0.0.0.0 --port 8080 --static-dir ./public
//! ```

use std::{path::PathBuf, time::Duration};

use clap::{Parser, ValueEnum};
use roomcast_server::{
    config::{DEFAULT_HOST, DEFAULT_OUTBOUND_BUFFER, DEFAULT_PORT, RelayConfig},
    domain::RoomRetention,
    ui::Server,
};
use roomcast_shared::logger::setup_logger;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RetentionArg {
    /// Delete a room once its last member leaves
    Collect,
    /// Keep empty rooms around
    Retain,
}

impl From<RetentionArg> for RoomRetention {
    fn from(arg: RetentionArg) -> Self {
        match arg {
            RetentionArg::Collect => RoomRetention::Collect,
            RetentionArg::Retain => RoomRetention::Retain,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "roomcast-server")]
#[command(about = "Room-based WebSocket broadcast relay", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Capacity of each connection's outbound queue
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_BUFFER, value_parser = parse_buffer)]
    outbound_buffer: usize,

    /// Refuse new connections once this many are open
    #[arg(long)]
    max_connections: Option<usize>,

    /// What to do with rooms that become empty
    #[arg(long, value_enum, default_value_t = RetentionArg::Collect)]
    room_retention: RetentionArg,

    /// Serve static reference documents from this directory under /static
    #[arg(long)]
    static_dir: Option<PathBuf>,

    /// How long a closing connection may flush queued frames (milliseconds)
    #[arg(long, default_value_t = 1000)]
    drain_timeout_ms: u64,
}

fn parse_buffer(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("outbound buffer must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl From<Args> for RelayConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            outbound_buffer: args.outbound_buffer,
            max_connections: args.max_connections,
            room_retention: args.room_retention.into(),
            static_dir: args.static_dir,
            drain_timeout: Duration::from_millis(args.drain_timeout_ms),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_PKG_NAME"), "debug");

    let config = RelayConfig::from(Args::parse());
    tracing::debug!("Starting with {:?}", config);

    if let Err(e) = Server::from_config(config).run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
