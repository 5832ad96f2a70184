/// Error types for the proxydb library
use thiserror::Error;

/// Result type alias for database operations
pub type Result<T> = std::result::Result<T, ProxyError>;

/// Main error type for opening and querying a BIN database
///
/// Conditions that the lookup API reports through sentinel records
/// (invalid address, IPv6 query against an IPv4-only file, field absent
/// from the schema, query on a closed handle) are not represented here.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Header or structural check failed; the file cannot be used
    #[error("Format error: {0}")]
    Format(String),

    /// Open, map or positioned read failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// `close()` on a handle that was never opened
    #[error("database handle was never opened")]
    NotOpen,

    /// `close()` on a handle that is already closed
    #[error("database handle is already closed")]
    AlreadyClosed,
}

impl ProxyError {
    /// Read past the end of the file at a 0-based offset
    pub(crate) fn out_of_bounds(offset: u64, len: usize, file_len: usize) -> Self {
        ProxyError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!(
                "read of {} bytes at offset {} exceeds file size {}",
                len, offset, file_len
            ),
        ))
    }
}

impl From<&str> for ProxyError {
    fn from(msg: &str) -> Self {
        ProxyError::Format(msg.to_string())
    }
}
