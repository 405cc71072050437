//! Error types for the RCON transport core.
//!
//! Every failure a caller can observe travels through a job's completion
//! handle as an [`RconError`]. The set is closed so the layer above can map
//! each variant to a user-facing message or status code.

use std::time::Duration;

use thiserror::Error;

use crate::transport::ConnectionState;

/// The canonical error type for command execution.
#[derive(Debug, Error)]
pub enum RconError {
    /// A packet could not be built from the given fields.
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodeError),

    /// Bytes received from the server do not form a valid packet.
    #[error("decoding error: {0}")]
    Decoding(#[from] DecodeError),

    /// The TCP connection could not be established.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// The server rejected the configured password.
    #[error("authentication rejected by server")]
    Authentication,

    /// The connection failed mid-exchange or could not be re-established.
    #[error("connection lost: {0}")]
    ConnectionLost(String),

    /// No response arrived within the deadline.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The job queue is full.
    #[error("job queue is full")]
    Overloaded,

    /// The pool was shut down before the job completed.
    #[error("worker pool is shut down")]
    Shutdown,

    /// An operation was called in the wrong connection state.
    #[error("connection is {actual}, expected {expected}")]
    InvalidState {
        actual: ConnectionState,
        expected: ConnectionState,
    },
}

impl RconError {
    /// Whether this error leaves the connection unusable.
    pub const fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            Self::Decoding(_)
                | Self::Connect { .. }
                | Self::Authentication
                | Self::ConnectionLost(_)
                | Self::Timeout(_)
        )
    }
}

/// Why a packet could not be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodeError {
    /// The body is longer than the protocol allows.
    #[error("body too large: {size} bytes (max {max})")]
    BodyTooLarge { size: usize, max: usize },

    /// The body contains a zero byte, which would end it early on the wire.
    #[error("body contains a zero byte at offset {0}")]
    InteriorNul(usize),
}

/// Why received bytes could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The declared size is outside the protocol's bounds.
    #[error("declared packet size {0} is out of range")]
    InvalidSize(i32),

    /// The declared size does not match the bytes available.
    #[error("declared size {declared} does not match {actual} available bytes")]
    LengthMismatch { declared: usize, actual: usize },

    /// The body terminator or trailing pad byte is not zero.
    #[error("missing body terminator or pad byte")]
    MissingTerminator,

    /// The body is not valid UTF-8.
    #[error("body is not valid utf-8")]
    InvalidUtf8,

    /// A reply did not echo the id of the request it answers.
    #[error("expected reply to request {expected}, got {actual}")]
    UnexpectedRequestId { expected: i32, actual: i32 },
}
