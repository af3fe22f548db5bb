use clap::Parser;
use std::net::SocketAddr;
use std::time::Duration;

/// Default request body limit: 200 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;
/// Default number of rows in a session preview.
pub const DEFAULT_PREVIEW_ROWS: usize = 100;
/// Default idle time before a session is dropped: one hour.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

/// sweeper-server - clean CSV and Excel uploads over HTTP
#[derive(Debug, Clone, Parser)]
#[command(name = "sweeper-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "SWEEPER_ADDR", default_value = "0.0.0.0:3000")]
    pub addr: SocketAddr,

    /// Largest accepted upload in bytes
    #[arg(long, env = "SWEEPER_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Rows returned by a session preview when no limit is given
    #[arg(long, env = "SWEEPER_PREVIEW_ROWS", default_value_t = DEFAULT_PREVIEW_ROWS)]
    pub preview_rows: usize,

    /// Seconds a session may stay idle before it is dropped (0 keeps it)
    #[arg(
        long = "session-ttl",
        env = "SWEEPER_SESSION_TTL",
        default_value_t = DEFAULT_SESSION_TTL_SECS
    )]
    pub session_ttl_secs: u64,
}

impl Config {
    pub fn session_ttl(&self) -> Option<Duration> {
        (self.session_ttl_secs > 0).then(|| Duration::from_secs(self.session_ttl_secs))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            preview_rows: DEFAULT_PREVIEW_ROWS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}
