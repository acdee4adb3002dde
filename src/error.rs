use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for startup operations that may fail with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or starting the service.
///
/// Address resolution itself never fails; these are all fatal at startup.
#[derive(Error, Debug)]
pub enum Error {
    /// Port 0 or otherwise unusable.
    #[error("invalid port: {0}")]
    InvalidPort(u16),

    /// Bind host is not an IP address.
    #[error("invalid host: {0}")]
    InvalidHost(String),

    /// Config file could not be read.
    #[error("failed to read config file {}: {source}", path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid JSON or has unexpected fields.
    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Listener could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    /// Server loop terminated with an I/O error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}
