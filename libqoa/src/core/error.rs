use std::fmt;
use std::io;

/// everything that can go wrong inside the codec
#[derive(Debug)]
pub enum QoaError {
    /// the bitstream is not a valid qoa stream
    Format(String),
    /// the encode-time descriptor is out of bounds
    Validation(String),
    /// short read/write against the underlying stream
    Io(io::Error),
}

impl fmt::Display for QoaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QoaError::Format(s) => write!(f, "invalid qoa data: {s}"),
            QoaError::Validation(s) => write!(f, "invalid audio description: {s}"),
            QoaError::Io(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for QoaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            QoaError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for QoaError {
    fn from(e: io::Error) -> Self {
        QoaError::Io(e)
    }
}

/// result type for qoa stuff
pub type QoaResult<T> = Result<T, QoaError>;
