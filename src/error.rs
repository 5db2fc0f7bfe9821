//! Crate-wide error taxonomy.
//!
//! One `thiserror` enum covers the whole surface: configuration faults that
//! fail fast before any network I/O, the executor phases (connection, bind,
//! query, protocol), the state-machine discipline, and the drain supplements
//! (timeout and cancellation). [`Result`] is the crate-level alias used
//! throughout.

use std::time::Duration;

use thiserror::Error;

/// The error type returned across the crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or inconsistent configuration, detected before any network I/O.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure establishing the transport to the directory server.
    #[error("connection error: {0}")]
    Connection(String),

    /// The directory rejected the bind (authentication) request.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// The search request or its result signalled a failure.
    #[error("query error: {0}")]
    Query(String),

    /// A protocol-level violation in the server's response.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// An operation was attempted while the connection was busy with another.
    #[error("connection busy: {0}")]
    ConnectionBusy(String),

    /// A state-machine transition was requested that is not permitted.
    #[error("invalid state: expected {expected}, got {actual}")]
    InvalidState {
        /// The state (or transition) that would have been valid.
        expected: String,
        /// The state (or transition) that was actually requested.
        actual: String,
    },

    /// The drain exceeded its configured deadline.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The drain was cancelled cooperatively.
    #[error("operation cancelled")]
    Cancelled,
}

/// The crate-level result alias.
pub type Result<T> = std::result::Result<T, Error>;
