//! Server configuration from flags and environment.

use clap::Parser;
use leylines_core::{default_log_level, LogTarget, StoreLocation};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Post-it board HTTP API", long_about = None)]
pub struct ServerConfig {
    /// SQLite database file, created on first use
    #[arg(long, env = "LEYLINES_DB_PATH", default_value = "leylines.db")]
    pub db_path: PathBuf,

    /// Address to bind
    #[arg(long, env = "LEYLINES_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// trace|debug|info|warn|error (defaults by build mode)
    #[arg(long, env = "LEYLINES_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Absolute directory for rolling log files; logs go to stderr when unset
    #[arg(long, env = "LEYLINES_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Keep all data in memory (lost on exit)
    #[arg(long)]
    pub memory: bool,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn store_location(&self) -> StoreLocation {
        if self.memory {
            StoreLocation::Memory
        } else {
            StoreLocation::File(self.db_path.clone())
        }
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(default_log_level())
    }

    pub fn log_target(&self) -> Result<LogTarget, String> {
        match self.log_dir.as_deref() {
            Some(dir) => LogTarget::directory(dir),
            None => Ok(LogTarget::Stderr),
        }
    }
}
