//! HTTP request types.
//!
//! This module provides the value types that describe an outbound call
//! ([`Method`], [`Scheme`], [`Path`]), the immutable [`Request`] descriptor,
//! and the [`RequestBuilder`] that assembles one.
//!
//! # Routing vs. adaptable parts
//!
//! A [`Request`] is split into two halves. Routing (scheme, host, port, path
//! and query) is fixed by [`RequestBuilder::build`] before any interceptor
//! runs and cannot be changed afterwards. Method, headers and body remain
//! adaptable so that interceptors can rewrite them.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::clients::errors::{InvalidMethodError, InvalidSchemeError};
use crate::interceptors::Interceptor;

/// A query item: a `(name, value)` pair. Duplicate names are allowed.
pub type QueryItem = (String, String);

/// HTTP methods understood by the client.
///
/// Each method has a canonical uppercase name. Methods are split into two
/// disjoint sets: *query-eligible* methods (`GET`, `HEAD`, `DELETE`) carry
/// their parameters in the query string, every other method is
/// *body-eligible* and carries them in the request body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP CONNECT.
    Connect,
    /// HTTP DELETE.
    Delete,
    /// HTTP GET.
    Get,
    /// HTTP HEAD.
    Head,
    /// HTTP OPTIONS.
    Options,
    /// HTTP PATCH.
    Patch,
    /// HTTP POST.
    Post,
    /// HTTP PUT.
    Put,
    /// HTTP TRACE.
    Trace,
}

impl Method {
    /// All supported methods.
    pub const ALL: [Self; 9] = [
        Self::Connect,
        Self::Delete,
        Self::Get,
        Self::Head,
        Self::Options,
        Self::Patch,
        Self::Post,
        Self::Put,
        Self::Trace,
    ];

    /// Returns the canonical uppercase name of the method.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Connect => "CONNECT",
            Self::Delete => "DELETE",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Patch => "PATCH",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Trace => "TRACE",
        }
    }

    /// Returns `true` for methods whose parameters travel in the query string.
    #[must_use]
    pub const fn is_query_eligible(&self) -> bool {
        matches!(self, Self::Get | Self::Head | Self::Delete)
    }

    /// Returns `true` for methods whose parameters travel in the body.
    #[must_use]
    pub const fn is_body_eligible(&self) -> bool {
        !self.is_query_eligible()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = InvalidMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| InvalidMethodError {
                method: s.to_string(),
            })
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Connect => Self::CONNECT,
            Method::Delete => Self::DELETE,
            Method::Get => Self::GET,
            Method::Head => Self::HEAD,
            Method::Options => Self::OPTIONS,
            Method::Patch => Self::PATCH,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Trace => Self::TRACE,
        }
    }
}

/// URL scheme of the target host.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Scheme {
    /// Plain `http`.
    Http,
    /// `https` (default).
    #[default]
    Https,
}

impl Scheme {
    /// Returns the scheme name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scheme {
    type Err = InvalidSchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(Self::Http),
            "https" => Ok(Self::Https),
            other => Err(InvalidSchemeError {
                scheme: other.to_string(),
            }),
        }
    }
}

/// A URL path as an ordered sequence of opaque segments.
///
/// Rendered as the segments joined with `/` and prefixed with `/`.
///
/// ```rust
/// use http_relay::Path;
///
/// assert_eq!(Path::new(["users", "42"]).to_string(), "/users/42");
/// assert_eq!(Path::from("/users/42/").to_string(), "/users/42");
/// assert_eq!(Path::default().to_string(), "/");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Creates a path from its segments, taken verbatim.
    #[must_use]
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Splits a `/`-separated string into segments, dropping empty ones.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        Self::new(path.split('/').filter(|segment| !segment.is_empty()))
    }

    /// Returns the segments of this path.
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Returns `true` if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a new path with `other`'s segments appended to this one's.
    #[must_use]
    pub fn join(&self, other: &Self) -> Self {
        Self {
            segments: self
                .segments
                .iter()
                .chain(other.segments.iter())
                .cloned()
                .collect(),
        }
    }

    /// Appends a single segment.
    #[must_use]
    pub fn push(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.segments.join("/"))
    }
}

impl From<&str> for Path {
    fn from(path: &str) -> Self {
        Self::parse(path)
    }
}

impl From<String> for Path {
    fn from(path: String) -> Self {
        Self::parse(&path)
    }
}

impl From<Vec<String>> for Path {
    fn from(segments: Vec<String>) -> Self {
        Self { segments }
    }
}

impl<const N: usize> From<[&str; N]> for Path {
    fn from(segments: [&str; N]) -> Self {
        Self::new(segments)
    }
}

/// An outbound HTTP request descriptor.
///
/// Built by [`RequestBuilder`]; only a request with a syntactically valid URL
/// can exist. Interceptors receive and return requests by value and may change
/// the method, headers and body through the `with_*` adapters, but the URL is
/// read-only.
#[derive(Clone, Debug)]
pub struct Request {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Request {
    /// Returns the HTTP method.
    #[must_use]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns the full URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Returns the scheme of the URL.
    #[must_use]
    pub fn scheme(&self) -> Scheme {
        if self.url.scheme() == "http" {
            Scheme::Http
        } else {
            Scheme::Https
        }
    }

    /// Returns the host of the URL.
    #[must_use]
    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }

    /// Returns the explicit port, if one was given.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.url.port()
    }

    /// Returns the (percent-encoded) path of the URL.
    #[must_use]
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Returns the decoded query items in their original order.
    #[must_use]
    pub fn query_items(&self) -> Vec<QueryItem> {
        self.url
            .query_pairs()
            .map(|(name, value)| (name.into_owned(), value.into_owned()))
            .collect()
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value as a string, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    /// Returns a mutable reference to the headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the body bytes, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Replaces the HTTP method.
    #[must_use]
    pub const fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Sets a header, replacing any previous value.
    ///
    /// Invalid header names or values are ignored.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Removes a header.
    #[must_use]
    pub fn without_header(mut self, name: impl AsRef<str>) -> Self {
        self.headers.remove(name.as_ref());
        self
    }

    /// Replaces the body.
    #[must_use]
    pub fn with_body(mut self, body: Option<Bytes>) -> Self {
        self.body = body;
        self
    }
}

/// Assembles a [`Request`] from its routing parts, body and interceptor.
///
/// The URL is composed first; if it cannot be formed (for example an empty
/// host), [`build`](Self::build) returns `None` and no request exists.
/// Otherwise method, headers and body are set and the interceptor runs last.
///
/// # Example
///
/// ```rust
/// use http_relay::{Method, RequestBuilder, Scheme};
///
/// let request = RequestBuilder::new(Scheme::Https, Method::Get, "api.example.com")
///     .path("users/42")
///     .query(vec![("fields".to_string(), "name".to_string())])
///     .build()
///     .unwrap();
///
/// assert_eq!(request.url().as_str(), "https://api.example.com/users/42?fields=name");
///
/// let missing_host = RequestBuilder::new(Scheme::Https, Method::Get, "").path("x").build();
/// assert!(missing_host.is_none());
/// ```
pub struct RequestBuilder<'a> {
    scheme: Scheme,
    method: Method,
    host: String,
    path: Path,
    port: Option<u16>,
    query: Option<Vec<QueryItem>>,
    headers: HeaderMap,
    body: Option<Bytes>,
    interceptor: Option<&'a dyn Interceptor>,
}

impl<'a> RequestBuilder<'a> {
    /// Creates a builder for the given scheme, method and host.
    #[must_use]
    pub fn new(scheme: Scheme, method: Method, host: impl Into<String>) -> Self {
        Self {
            scheme,
            method,
            host: host.into(),
            path: Path::default(),
            port: None,
            query: None,
            headers: HeaderMap::new(),
            body: None,
            interceptor: None,
        }
    }

    /// Sets the path.
    #[must_use]
    pub fn path(mut self, path: impl Into<Path>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets an explicit port.
    #[must_use]
    pub const fn port(mut self, port: Option<u16>) -> Self {
        self.port = port;
        self
    }

    /// Sets the query items.
    #[must_use]
    pub fn query(mut self, items: impl Into<Option<Vec<QueryItem>>>) -> Self {
        self.query = items.into();
        self
    }

    /// Sets headers applied before the interceptor runs.
    #[must_use]
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Sets the body bytes.
    #[must_use]
    pub fn body(mut self, body: impl Into<Option<Bytes>>) -> Self {
        self.body = body.into();
        self
    }

    /// Sets the interceptor applied as the final step.
    #[must_use]
    pub fn interceptor(mut self, interceptor: Option<&'a dyn Interceptor>) -> Self {
        self.interceptor = interceptor;
        self
    }

    /// Builds the request, or `None` if no valid URL can be formed.
    #[must_use]
    pub fn build(self) -> Option<Request> {
        let url = self.compose_url()?;
        let request = Request {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
        };
        Some(match self.interceptor {
            Some(interceptor) => interceptor.adapt(request),
            None => request,
        })
    }

    fn compose_url(&self) -> Option<Url> {
        if self.host.is_empty() {
            return None;
        }

        let mut url = Url::parse(&format!("{}://{}", self.scheme, self.host)).ok()?;

        // The host must be a bare authority, not a smuggled path or query.
        if url.host_str().map_or(true, str::is_empty)
            || url.path() != "/"
            || url.query().is_some()
            || url.fragment().is_some()
        {
            return None;
        }

        if self.port.is_some() {
            url.set_port(self.port).ok()?;
        }
        url.set_path(&self.path.to_string());

        if let Some(items) = self.query.as_deref().filter(|items| !items.is_empty()) {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in items {
                pairs.append_pair(name, value);
            }
        }

        Some(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptors::HeaderInterceptor;

    #[test]
    fn test_method_canonical_names() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Patch.as_str(), "PATCH");
        assert_eq!("OPTIONS".parse::<Method>().unwrap(), Method::Options);
        assert!("get".parse::<Method>().is_err());
    }

    #[test]
    fn test_method_eligibility_sets_are_disjoint() {
        for method in Method::ALL {
            assert_ne!(method.is_query_eligible(), method.is_body_eligible());
        }
        let query: Vec<_> = Method::ALL
            .into_iter()
            .filter(Method::is_query_eligible)
            .collect();
        assert_eq!(query, vec![Method::Delete, Method::Get, Method::Head]);
    }

    #[test]
    fn test_scheme_parse_and_default() {
        assert_eq!(Scheme::default(), Scheme::Https);
        assert_eq!("http".parse::<Scheme>().unwrap(), Scheme::Http);
        assert!("ftp".parse::<Scheme>().is_err());
    }

    #[test]
    fn test_path_rendering() {
        assert_eq!(Path::from("x").to_string(), "/x");
        assert_eq!(Path::from(["a", "b"]).to_string(), "/a/b");
        let joined = Path::from("api/v1").join(&Path::from("users"));
        assert_eq!(joined.to_string(), "/api/v1/users");
        assert_eq!(Path::default().push("health").to_string(), "/health");
    }

    #[test]
    fn test_build_composes_url() {
        let request = RequestBuilder::new(Scheme::Http, Method::Get, "localhost")
            .port(Some(8080))
            .path(["search", "repositories"])
            .query(vec![
                ("q".to_string(), "rust lang".to_string()),
                ("q".to_string(), "tokio".to_string()),
            ])
            .build()
            .unwrap();

        assert_eq!(request.scheme(), Scheme::Http);
        assert_eq!(request.host(), "localhost");
        assert_eq!(request.port(), Some(8080));
        assert_eq!(request.path(), "/search/repositories");
        assert_eq!(
            request.query_items(),
            vec![
                ("q".to_string(), "rust lang".to_string()),
                ("q".to_string(), "tokio".to_string()),
            ]
        );
    }

    #[test]
    fn test_build_fails_on_empty_host() {
        let request = RequestBuilder::new(Scheme::Https, Method::Get, "")
            .path("x")
            .build();
        assert!(request.is_none());
    }

    #[test]
    fn test_build_fails_on_host_with_path_or_spaces() {
        assert!(RequestBuilder::new(Scheme::Https, Method::Get, "example.com/evil")
            .build()
            .is_none());
        assert!(RequestBuilder::new(Scheme::Https, Method::Get, "exa mple.com")
            .build()
            .is_none());
    }

    #[test]
    fn test_empty_query_leaves_no_question_mark() {
        let request = RequestBuilder::new(Scheme::Https, Method::Get, "example.com")
            .query(Vec::new())
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "https://example.com/");
    }

    #[test]
    fn test_interceptor_runs_last_and_sees_body() {
        let interceptor = HeaderInterceptor::new("X-Trace", "abc");
        let request = RequestBuilder::new(Scheme::Https, Method::Post, "example.com")
            .body(Bytes::from_static(b"{}"))
            .interceptor(Some(&interceptor))
            .build()
            .unwrap();

        assert_eq!(request.header("x-trace"), Some("abc"));
        assert_eq!(request.body().map(|b| b.as_ref()), Some(&b"{}"[..]));
    }

    #[test]
    fn test_request_adapters() {
        let request = RequestBuilder::new(Scheme::Https, Method::Get, "example.com")
            .build()
            .unwrap()
            .with_method(Method::Put)
            .with_header("Authorization", "Bearer t")
            .with_header("bad header", "ignored")
            .with_body(Some(Bytes::from_static(b"raw")));

        assert_eq!(request.method(), Method::Put);
        assert_eq!(request.header("authorization"), Some("Bearer t"));
        assert_eq!(request.headers().len(), 1);
        assert!(request.body().is_some());

        let request = request.without_header("authorization");
        assert!(request.header("authorization").is_none());
    }
}
