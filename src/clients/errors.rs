//! HTTP-specific error types.
//!
//! This module contains the error values that can appear in a response
//! envelope or a classified outcome.
//!
//! # Error Handling
//!
//! Nothing in the request pipeline is raised across the task boundary. Every
//! terminal state reaches the caller as a value:
//!
//! - [`TransportError`]: connection, timeout or cancellation failures reported
//!   by the transport. Stored on the [`ResponseEnvelope`](crate::ResponseEnvelope).
//! - [`RequestError`]: the error carried by [`Outcome::Failure`](crate::Outcome::Failure).
//!   Either the transport error, or a generic `Unknown` error for a non-2xx
//!   response without one.
//! - [`OutcomeError`]: the error side of [`Outcome::into_result`](crate::Outcome::into_result).
//!
//! # Example
//!
//! ```rust,ignore
//! use http_relay::{Outcome, RequestError};
//!
//! match outcome {
//!     Outcome::Success(user) => println!("Hello {}", user.name),
//!     Outcome::CustomError(api_error) => println!("API said: {}", api_error.message),
//!     Outcome::Failure(RequestError::Transport(e)) => println!("Network: {e}"),
//!     Outcome::Failure(RequestError::Unknown { status }) => println!("HTTP {status}"),
//! }
//! ```

use std::sync::Arc;

use thiserror::Error;

/// A failure reported by the transport before a complete response arrived.
///
/// `Clone` so that the same error can live on the envelope and in the
/// classified outcome.
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The request was cancelled before it completed.
    #[error("request was cancelled")]
    Cancelled,

    /// A connection to the host could not be established.
    #[error("connection failed: {message}")]
    Connection {
        /// Description of the connection failure.
        message: String,
    },

    /// Any other error raised by reqwest.
    #[error("network error: {0}")]
    Network(#[source] Arc<reqwest::Error>),

    /// An error raised by a custom transport.
    #[error("transport error: {message}")]
    Other {
        /// Description of the failure.
        message: String,
    },
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Connection {
                message: e.to_string(),
            }
        } else {
            Self::Network(Arc::new(e))
        }
    }
}

/// Error carried by a failed [`Outcome`](crate::Outcome).
#[derive(Debug, Error, Clone)]
pub enum RequestError {
    /// The transport failed; no (complete) HTTP exchange happened.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The exchange completed but could not be classified as a success.
    ///
    /// `status` is the HTTP status code, or `-1` if there was none.
    #[error("request failed with unknown error (status {status})")]
    Unknown {
        /// The HTTP status code, or `-1`.
        status: i32,
    },
}

/// Error side of [`Outcome::into_result`](crate::Outcome::into_result).
#[derive(Debug, Error, Clone)]
pub enum OutcomeError<E> {
    /// The response body decoded as the caller's custom error shape.
    #[error("server returned a custom error")]
    Custom(E),

    /// The request failed.
    #[error(transparent)]
    Failure(#[from] RequestError),
}

/// Error returned when parsing an unknown HTTP method name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid HTTP method '{method}'. Expected an uppercase method name such as 'GET'.")]
pub struct InvalidMethodError {
    /// The method name that was provided.
    pub method: String,
}

/// Error returned when parsing an unknown URL scheme.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid scheme '{scheme}'. Expected 'http' or 'https'.")]
pub struct InvalidSchemeError {
    /// The scheme that was provided.
    pub scheme: String,
}
