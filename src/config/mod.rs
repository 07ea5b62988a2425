//! Client configuration.
//!
//! This module provides the configuration set once per [`Client`](crate::Client):
//!
//! - [`ClientConfig`]: scheme, host, port, base path and behaviour flags
//! - [`ClientConfigBuilder`]: a builder for constructing [`ClientConfig`] instances
//! - [`Host`]: a validated host name newtype
//! - [`RetryPolicy`]: retry budget and backoff between attempts
//!
//! # Example
//!
//! ```rust
//! use http_relay::{ClientConfig, Host, RetryPolicy, Scheme};
//!
//! let config = ClientConfig::builder()
//!     .scheme(Scheme::Https)
//!     .host(Host::new("api.github.com").unwrap())
//!     .base_path("v3")
//!     .retry_policy(RetryPolicy::new(2))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.base_path().to_string(), "/v3");
//! ```

mod newtypes;
mod retry;

pub use newtypes::Host;
pub use retry::RetryPolicy;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::clients::{Path, Scheme};
use crate::error::ConfigError;

/// Library version from Cargo.toml.
pub const LIBRARY_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for a [`Client`](crate::Client).
///
/// # Thread Safety
///
/// `ClientConfig` is `Clone`, `Send`, and `Sync`, making it safe to share
/// across threads and async tasks.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    scheme: Scheme,
    host: Host,
    port: Option<u16>,
    base_path: Path,
    debug: bool,
    auto_resume: bool,
    retry_policy: RetryPolicy,
    timeout: Option<Duration>,
    user_agent: String,
    default_headers: HeaderMap,
}

impl ClientConfig {
    /// Creates a new builder for constructing a `ClientConfig`.
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Returns the URL scheme.
    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Returns the host.
    #[must_use]
    pub const fn host(&self) -> &Host {
        &self.host
    }

    /// Returns the explicit port, if configured.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the path prefix prepended to every call's path.
    #[must_use]
    pub const fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Returns whether request/response debug logging is enabled.
    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    /// Returns whether tasks start as soon as they are created.
    #[must_use]
    pub const fn auto_resume(&self) -> bool {
        self.auto_resume
    }

    /// Returns the default retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        self.retry_policy
    }

    /// Returns the per-request timeout, if configured.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Returns the User-Agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Returns the headers added to every request before interceptors run.
    #[must_use]
    pub const fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }
}

// Verify ClientConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ClientConfig>();
};

/// Builder for constructing [`ClientConfig`] instances.
///
/// `host` is the only required field.
///
/// # Defaults
///
/// - `scheme`: `https`
/// - `port`: `None`
/// - `base_path`: empty
/// - `debug`: `false`
/// - `auto_resume`: `true`
/// - `retry_policy`: no retries
/// - `timeout`: `None`
/// - `user_agent`: `http-relay/<version>`
/// - `default_headers`: empty
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    scheme: Option<Scheme>,
    host: Option<Host>,
    port: Option<u16>,
    base_path: Option<Path>,
    debug: Option<bool>,
    auto_resume: Option<bool>,
    retry_policy: Option<RetryPolicy>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
    default_headers: HeaderMap,
}

impl ClientConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the URL scheme.
    #[must_use]
    pub const fn scheme(mut self, scheme: Scheme) -> Self {
        self.scheme = Some(scheme);
        self
    }

    /// Sets the host (required).
    #[must_use]
    pub fn host(mut self, host: Host) -> Self {
        self.host = Some(host);
        self
    }

    /// Sets an explicit port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the path prefix prepended to every call's path.
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<Path>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    /// Enables or disables request/response debug logging.
    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Sets whether tasks start as soon as they are created.
    ///
    /// When `false`, callers must call [`Task::resume`](crate::Task::resume).
    #[must_use]
    pub const fn auto_resume(mut self, auto_resume: bool) -> Self {
        self.auto_resume = Some(auto_resume);
        self
    }

    /// Sets the default retry policy.
    #[must_use]
    pub const fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets the per-request timeout of the default transport.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the User-Agent of the default transport.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a header sent with every request.
    ///
    /// Invalid header names or values are ignored.
    #[must_use]
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.default_headers.insert(name, value);
        }
        self
    }

    /// Builds the [`ClientConfig`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] if `host` is not set.
    pub fn build(self) -> Result<ClientConfig, ConfigError> {
        let host = self
            .host
            .ok_or(ConfigError::MissingRequiredField { field: "host" })?;

        Ok(ClientConfig {
            scheme: self.scheme.unwrap_or_default(),
            host,
            port: self.port,
            base_path: self.base_path.unwrap_or_default(),
            debug: self.debug.unwrap_or(false),
            auto_resume: self.auto_resume.unwrap_or(true),
            retry_policy: self.retry_policy.unwrap_or_default(),
            timeout: self.timeout,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| format!("http-relay/{LIBRARY_VERSION}")),
            default_headers: self.default_headers,
        })
    }
}
