use clap::{Parser, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Which key-value backend holds the records
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    Redis,
    Memory,
}

/// Server configuration, read from the command line with environment fallbacks
#[derive(Debug, Clone, Parser)]
#[command(name = "student-records", version, about = "Student records server")]
pub struct Config {
    /// Address to bind the HTTP server to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 5000)]
    pub port: u16,

    /// Storage backend
    #[arg(long, env = "STUDENT_STORE", value_enum, default_value_t = StoreKind::Redis)]
    pub store: StoreKind,

    /// Redis connection URL (redis backend only)
    #[arg(long, env = "REDIS_URL", default_value = "redis://127.0.0.1:6379")]
    pub redis_url: String,

    /// Snapshot file for the memory backend; without it data is not persisted
    #[arg(long, env = "STUDENT_SNAPSHOT")]
    pub snapshot: Option<PathBuf>,

    /// Username accepted by the login endpoint
    #[arg(long, env = "ADMIN_USERNAME", default_value = "admin")]
    pub admin_username: String,

    /// Password accepted by the login endpoint
    #[arg(long, env = "ADMIN_PASSWORD", default_value = "password123", hide_env_values = true)]
    pub admin_password: String,
}

impl Config {
    /// Socket address built from `host` and `port`
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let config = Config::parse_from([
            "student-records",
            "--port",
            "8080",
            "--store",
            "memory",
            "--snapshot",
            "data/students.bin.gz",
        ]);

        assert_eq!(config.port, 8080);
        assert_eq!(config.store, StoreKind::Memory);
        assert_eq!(config.snapshot, Some(PathBuf::from("data/students.bin.gz")));
        assert_eq!(config.bind_addr().unwrap().port(), 8080);
    }

    #[test]
    fn bad_host_is_reported() {
        let config = Config::parse_from(["student-records", "--host", "not a host"]);
        assert!(config.bind_addr().is_err());
    }
}
