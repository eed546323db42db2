//! Error types for student-records

use thiserror::Error;

/// Result type alias for student-records operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur below the HTTP layer
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error talking to Redis
    #[cfg(feature = "web")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be encoded or decoded
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] bincode::Error),

    /// Malformed CSV input or failed CSV output
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// XLSX export failed
    #[cfg(feature = "web")]
    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    /// Chart rendering failed
    #[error("Chart error: {0}")]
    Chart(String),

    /// Uploaded file is not in an accepted format
    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
}
