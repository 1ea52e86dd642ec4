use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RespError {
    #[error("connect to {endpoint} failed: {reason}")]
    Connect { endpoint: String, reason: String },

    #[error("operation timed out")]
    Timeout,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("server error: {0}")]
    Server(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl RespError {
    /// Normalize socket-timeout I/O errors into [`RespError::Timeout`].
    ///
    /// Blocking sockets report an expired read/write timeout as either
    /// `WouldBlock` (Unix) or `TimedOut` (Windows).
    pub(crate) fn from_io(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => Self::Timeout,
            _ => Self::Io(e),
        }
    }
}

pub type RespResult<T> = Result<T, RespError>;
