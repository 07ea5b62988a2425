//! Error types for client configuration.
//!
//! This module contains the error type returned while building a
//! [`ClientConfig`](crate::ClientConfig) or one of its validated values.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` to enable
//! fail-fast validation. Request construction problems are *not* errors: they
//! surface as an absent task (see [`CallBuilder`](crate::CallBuilder)).
//!
//! # Example
//!
//! ```rust
//! use http_relay::{ConfigError, Host};
//!
//! let result = Host::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyHost)));
//! ```

use thiserror::Error;

/// Errors that can occur while configuring a client.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Host cannot be empty.
    #[error("Host cannot be empty. Please provide a host name such as 'api.example.com'.")]
    EmptyHost,

    /// Host is not a valid URL authority.
    #[error("Invalid host '{host}'. Expected a bare host name such as 'api.example.com', without scheme or path.")]
    InvalidHost {
        /// The invalid host that was provided.
        host: String,
    },

    /// A required field is missing.
    #[error("Missing required field: '{field}'. This field must be set before building the configuration.")]
    MissingRequiredField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// The underlying HTTP transport could not be initialized.
    #[error("Failed to initialize HTTP transport: {reason}")]
    TransportInit {
        /// Description of the initialization failure.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_host_error_message() {
        let message = ConfigError::EmptyHost.to_string();
        assert!(message.contains("Host cannot be empty"));
    }

    #[test]
    fn test_invalid_host_error_message() {
        let error = ConfigError::InvalidHost {
            host: "https://api.example.com".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("https://api.example.com"));
        assert!(message.contains("without scheme"));
    }

    #[test]
    fn test_missing_required_field_error_message() {
        let error = ConfigError::MissingRequiredField { field: "host" };
        let message = error.to_string();
        assert!(message.contains("host"));
        assert!(message.contains("must be set"));
    }

    #[test]
    fn test_error_implements_std_error() {
        let error = ConfigError::EmptyHost;
        let _: &dyn std::error::Error = &error;
    }
}
