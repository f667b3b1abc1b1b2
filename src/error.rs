//! Error types
//!
//! Only I/O-bearing operations (binding the listener, building the worker
//! pool, reading replies from a connection) and message construction can
//! fail. Dispatch through the router never returns an error.

use std::fmt;
use std::io;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for listener and connection operations
#[derive(Debug)]
pub enum Error {
    /// Underlying socket or runtime I/O failure
    Io(io::Error),
    /// A secondary announced a reply larger than the configured maximum
    ResponseTooLarge { size: usize, max: usize },
    /// A command payload does not fit the header's `u32` size field
    PayloadTooLarge { size: usize },
    /// Worker pool is not usable (already stopped)
    Runtime(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::ResponseTooLarge { size, max } => {
                write!(f, "Response too large: {} bytes (max {})", size, max)
            }
            Error::PayloadTooLarge { size } => {
                write!(f, "Command payload too large: {} bytes", size)
            }
            Error::Runtime(msg) => write!(f, "Runtime error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = Error::ResponseTooLarge { size: 10, max: 4 };
        assert_eq!(err.to_string(), "Response too large: 10 bytes (max 4)");
    }

    #[test]
    fn test_from_io() {
        let err: Error = io::Error::new(io::ErrorKind::AddrInUse, "busy").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }
}
