//! Request interceptors.
//!
//! An [`Interceptor`] rewrites a [`Request`] after its routing, query and body
//! have been fixed. Interceptors compose left to right through
//! [`InterceptorGroup`]: each one receives the previous one's output.
//!
//! The client always runs the content-type interceptor of the call's format
//! first, followed by the caller's interceptor:
//!
//! ```text
//! [JsonInterceptor | FormDataInterceptor | FormUrlEncodedInterceptor, caller interceptor]
//! ```
//!
//! # Example
//!
//! ```rust
//! use http_relay::interceptors::{HeaderInterceptor, Interceptor, InterceptorGroup, JsonInterceptor};
//! use http_relay::{Method, Request, RequestBuilder, Scheme};
//!
//! let chain = InterceptorGroup::new()
//!     .with(JsonInterceptor)
//!     .with(HeaderInterceptor::bearer("token"))
//!     .with(|request: Request| request.with_header("X-Client", "docs"));
//!
//! let request = RequestBuilder::new(Scheme::Https, Method::Post, "api.example.com")
//!     .interceptor(Some(&chain))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(request.header("content-type"), Some("application/json; charset=utf-8"));
//! assert_eq!(request.header("authorization"), Some("Bearer token"));
//! assert_eq!(request.header("x-client"), Some("docs"));
//! ```

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use crate::clients::Request;

/// Content type set by [`JsonInterceptor`].
pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Content type set by [`FormUrlEncodedInterceptor`].
pub const FORM_URL_ENCODED_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A single request-mutation step.
///
/// Any `Fn(Request) -> Request` closure is an interceptor.
pub trait Interceptor: Send + Sync {
    /// Returns the adapted request.
    fn adapt(&self, request: Request) -> Request;
}

impl<F> Interceptor for F
where
    F: Fn(Request) -> Request + Send + Sync,
{
    fn adapt(&self, request: Request) -> Request {
        self(request)
    }
}

/// An ordered list of interceptors applied as a left fold.
#[derive(Clone, Default)]
pub struct InterceptorGroup {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl InterceptorGroup {
    /// Creates an empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor.
    #[must_use]
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends a shared interceptor.
    #[must_use]
    pub fn with_shared(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Returns the number of interceptors in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if the group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }
}

impl Interceptor for InterceptorGroup {
    fn adapt(&self, request: Request) -> Request {
        self.interceptors
            .iter()
            .fold(request, |request, interceptor| interceptor.adapt(request))
    }
}

impl fmt::Debug for InterceptorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptorGroup")
            .field("len", &self.interceptors.len())
            .finish()
    }
}

/// Sets `Content-Type: application/json; charset=utf-8`.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonInterceptor;

impl Interceptor for JsonInterceptor {
    fn adapt(&self, request: Request) -> Request {
        request.with_header(CONTENT_TYPE, JSON_CONTENT_TYPE)
    }
}

/// Sets `Content-Type: multipart/form-data; boundary={boundary}`.
#[derive(Clone, Debug)]
pub struct FormDataInterceptor {
    boundary: String,
}

impl FormDataInterceptor {
    /// Creates the interceptor for a multipart boundary.
    #[must_use]
    pub fn new(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
        }
    }

    /// Returns the boundary.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }
}

impl Interceptor for FormDataInterceptor {
    fn adapt(&self, request: Request) -> Request {
        request.with_header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", self.boundary),
        )
    }
}

/// Sets `Content-Type: application/x-www-form-urlencoded`.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormUrlEncodedInterceptor;

impl Interceptor for FormUrlEncodedInterceptor {
    fn adapt(&self, request: Request) -> Request {
        request.with_header(CONTENT_TYPE, FORM_URL_ENCODED_CONTENT_TYPE)
    }
}

/// Sets a fixed header, typically for authentication.
#[derive(Clone, Debug)]
pub struct HeaderInterceptor {
    name: String,
    value: String,
}

impl HeaderInterceptor {
    /// Creates an interceptor that sets `name: value`.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates an interceptor that sets `Authorization: Bearer {token}`.
    #[must_use]
    pub fn bearer(token: impl AsRef<str>) -> Self {
        Self::new(AUTHORIZATION.as_str(), format!("Bearer {}", token.as_ref()))
    }
}

impl Interceptor for HeaderInterceptor {
    fn adapt(&self, request: Request) -> Request {
        request.with_header(&self.name, &self.value)
    }
}
