//! Error taxonomy shared across the connection boundary.

use thiserror::Error;

/// Convenience alias for results carrying [`Error`].
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors surfaced by connections and the pool facade built on them.
///
/// [`Error::BadConn`] is the distinguished sentinel: it means the physical
/// connection is unusable and must be discarded. The facade layer recovers
/// from it by retrying on a fresh connection; every other kind propagates
/// to the caller unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The physical connection is unusable; evict and retry on a fresh one.
    #[error("bad connection")]
    BadConn,

    /// The transaction has already been committed or rolled back.
    #[error("transaction has already been committed or rolled back")]
    TxDone,

    /// Establishing a fresh connection failed.
    #[error("connect failed: {0}")]
    Connect(String),

    /// The server rejected a command.
    #[error("server error {code}: {message}")]
    Server {
        /// MySQL error code.
        code: u16,
        /// Server-provided error message.
        message: String,
    },

    /// The peer did not speak the protocol correctly.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Invalid client-side configuration.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl Error {
    /// Check whether this is the bad-connection sentinel.
    #[must_use]
    pub const fn is_bad_conn(&self) -> bool {
        matches!(self, Error::BadConn)
    }

    /// Check whether this marks use of a finished transaction.
    #[must_use]
    pub const fn is_tx_done(&self) -> bool {
        matches!(self, Error::TxDone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_predicates() {
        assert!(Error::BadConn.is_bad_conn());
        assert!(!Error::BadConn.is_tx_done());
        assert!(Error::TxDone.is_tx_done());
        assert!(!Error::Connect("refused".into()).is_bad_conn());
    }

    #[test]
    fn test_display() {
        let err = Error::Server {
            code: 1064,
            message: "syntax error".into(),
        };
        assert_eq!(err.to_string(), "server error 1064: syntax error");
        assert_eq!(Error::BadConn.to_string(), "bad connection");
    }
}
