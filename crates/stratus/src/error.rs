//! Error types for the stratus client.
//!
//! A single unified [`Error`] enum with explicit variants so callers can
//! branch on the failure mode (prompt for a new login on
//! [`Error::AuthenticationFailed`], report a friendly message on
//! [`Error::NotFound`], and so on).

use thiserror::Error;

/// The unified error type for stratus operations.
///
/// The enum is `Clone`: the one-time session verification caches its outcome
/// and replays it to later callers, so failure variants carry owned message
/// strings rather than wrapped source errors.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// No access token is configured on the session.
    #[error("auth: access token not present")]
    MissingToken,

    /// The identity server rejected a password or refresh-token grant.
    #[error("authentication failed: {description}")]
    AuthenticationFailed { description: String },

    /// The identity server refused to revoke the token pair.
    #[error("token revocation failed (HTTP {status})")]
    RevocationFailed { status: u16 },

    /// A get or find request returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server answered with a status code the client has no handling for.
    #[error("unexpected status code (HTTP {status})")]
    UnexpectedStatus { status: u16 },

    /// A bounded poll exhausted its budget before the condition held.
    #[error("timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The server reported a state string the client does not recognize.
    #[error("unknown service state {state:?}")]
    UnknownState { state: String },

    /// The record was built by hand rather than fetched, so it carries no
    /// client handle. Re-fetch it through a live facade.
    #[error("record is not attached to a client")]
    Detached,

    /// A record is missing a field the operation needs (usually its URL).
    #[error("record has no {name} URL")]
    MissingField { name: &'static str },

    /// A URL string could not be parsed or failed validation.
    #[error("invalid URL {value:?}: {reason}")]
    InvalidUrl { value: String, reason: String },

    /// The response body was not the JSON shape the client expected.
    #[error("failed to decode response body: {message}")]
    Decode { message: String },

    /// Network-level failure (DNS, TLS, connection, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out at the transport layer.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Any other HTTP-level error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                message: err.to_string(),
            }
        } else if err.is_connect() {
            TransportError::Connection {
                message: err.to_string(),
            }
        } else {
            TransportError::Http {
                message: err.to_string(),
            }
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Error::Decode {
                message: err.to_string(),
            }
        } else {
            Error::Transport(TransportError::from(err))
        }
    }
}
