//! HTTP response envelope.
//!
//! This module provides the [`ResponseEnvelope`] handed to completion
//! callbacks, and its value accessors.
//!
//! # Validity
//!
//! A response is *valid* when no transport error is present and the status
//! code is in `200..300`. Transport failures without any HTTP response carry
//! the status sentinel [`NO_STATUS`] (`-1`).
//!
//! # Value accessors
//!
//! [`string_value`](ResponseEnvelope::string_value),
//! [`int_value`](ResponseEnvelope::int_value),
//! [`double_value`](ResponseEnvelope::double_value),
//! [`decodable_value`](ResponseEnvelope::decodable_value),
//! [`dictionary_value`](ResponseEnvelope::dictionary_value) and
//! [`array_value`](ResponseEnvelope::array_value) are pure functions of the
//! body bytes: each returns `None` when there is no body or the conversion
//! fails, and can be called any number of times.

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::clients::errors::TransportError;
use crate::clients::http_request::Request;

/// Status code of an envelope for which no HTTP response was received.
pub const NO_STATUS: i32 = -1;

/// Text encodings understood by [`ResponseEnvelope::string_value`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextEncoding {
    /// UTF-8 (default). Invalid sequences fail the conversion.
    #[default]
    Utf8,
    /// 7-bit ASCII. Any byte above `0x7F` fails the conversion.
    Ascii,
    /// ISO-8859-1. Every byte maps to the code point of the same value.
    Latin1,
}

impl TextEncoding {
    /// Decodes `bytes`, or returns `None` if they are not valid in this encoding.
    #[must_use]
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        match self {
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            Self::Ascii => bytes
                .is_ascii()
                .then(|| bytes.iter().map(|&b| char::from(b)).collect()),
            Self::Latin1 => Some(bytes.iter().map(|&b| char::from(b)).collect()),
        }
    }
}

/// A completed exchange: body, originating request, status, headers and
/// transport error.
///
/// Envelopes are immutable once handed out.
///
/// # Example
///
/// ```rust
/// use http_relay::{ResponseEnvelope, TextEncoding};
///
/// let response = ResponseEnvelope::new(200, None, Some("42".into()));
///
/// assert!(response.is_valid());
/// assert_eq!(response.int_value(), Some(42));
/// assert_eq!(response.string_value(TextEncoding::Utf8).as_deref(), Some("42"));
/// ```
#[derive(Clone, Debug)]
pub struct ResponseEnvelope {
    body: Option<Bytes>,
    request: Option<Request>,
    status_code: i32,
    headers: Option<HeaderMap>,
    error: Option<TransportError>,
}

impl ResponseEnvelope {
    /// Creates an envelope for a received HTTP response.
    #[must_use]
    pub fn new(status_code: i32, headers: Option<HeaderMap>, body: Option<Bytes>) -> Self {
        Self {
            body,
            request: None,
            status_code,
            headers,
            error: None,
        }
    }

    /// Creates an envelope for a transport failure with no HTTP response.
    #[must_use]
    pub fn from_error(error: TransportError) -> Self {
        Self {
            body: None,
            request: None,
            status_code: NO_STATUS,
            headers: None,
            error: Some(error),
        }
    }

    /// Attaches the originating request.
    #[must_use]
    pub fn with_request(mut self, request: Request) -> Self {
        self.request = Some(request);
        self
    }

    /// Attaches a transport error to a (possibly partial) response.
    #[must_use]
    pub fn with_error(mut self, error: TransportError) -> Self {
        self.error = Some(error);
        self
    }

    /// Returns the body bytes, if any.
    #[must_use]
    pub const fn body(&self) -> Option<&Bytes> {
        self.body.as_ref()
    }

    /// Returns the request that produced this response, if known.
    #[must_use]
    pub const fn request(&self) -> Option<&Request> {
        self.request.as_ref()
    }

    /// Returns the HTTP status code, or [`NO_STATUS`].
    #[must_use]
    pub const fn status_code(&self) -> i32 {
        self.status_code
    }

    /// Returns the HTTP status, if a response was received.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        u16::try_from(self.status_code)
            .ok()
            .and_then(|code| StatusCode::from_u16(code).ok())
    }

    /// Returns the response headers, if a response was received.
    #[must_use]
    pub const fn headers(&self) -> Option<&HeaderMap> {
        self.headers.as_ref()
    }

    /// Returns a header value as a string, if present and visible ASCII.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .as_ref()?
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    /// Returns the transport error, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&TransportError> {
        self.error.as_ref()
    }

    /// Returns `true` if there is no transport error and the status is 2xx.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.error.is_none() && (200..300).contains(&self.status_code)
    }

    /// Returns the delay requested by a numeric `Retry-After` header.
    ///
    /// The HTTP-date form is not supported and yields `None`.
    #[must_use]
    pub fn retry_after(&self) -> Option<Duration> {
        let seconds: f64 = self.header(RETRY_AFTER.as_str())?.trim().parse().ok()?;
        (seconds.is_finite() && seconds >= 0.0).then(|| Duration::from_secs_f64(seconds))
    }

    /// Decodes the body as text.
    #[must_use]
    pub fn string_value(&self, encoding: TextEncoding) -> Option<String> {
        encoding.decode(self.body.as_deref()?)
    }

    /// Parses the UTF-8 body as an integer, ignoring surrounding whitespace.
    #[must_use]
    pub fn int_value(&self) -> Option<i64> {
        self.string_value(TextEncoding::Utf8)?.trim().parse().ok()
    }

    /// Parses the UTF-8 body as a floating point number, ignoring surrounding whitespace.
    #[must_use]
    pub fn double_value(&self) -> Option<f64> {
        self.string_value(TextEncoding::Utf8)?.trim().parse().ok()
    }

    /// Decodes the JSON body as `T`.
    #[must_use]
    pub fn decodable_value<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_slice(self.body.as_deref()?).ok()
    }

    /// Decodes the JSON body as an object.
    #[must_use]
    pub fn dictionary_value(&self) -> Option<Map<String, Value>> {
        self.decodable_value()
    }

    /// Decodes the JSON body as an array.
    #[must_use]
    pub fn array_value(&self) -> Option<Vec<Value>> {
        self.decodable_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use serde::Deserialize;

    fn response(status: i32, body: &'static str) -> ResponseEnvelope {
        ResponseEnvelope::new(status, Some(HeaderMap::new()), Some(Bytes::from_static(body.as_bytes())))
    }

    #[test]
    fn test_validity_requires_2xx_and_no_error() {
        assert!(response(200, "").is_valid());
        assert!(response(299, "").is_valid());
        assert!(!response(300, "").is_valid());
        assert!(!response(199, "").is_valid());
        assert!(!response(200, "").with_error(TransportError::Cancelled).is_valid());
        assert!(!ResponseEnvelope::from_error(TransportError::Timeout).is_valid());
    }

    #[test]
    fn test_transport_failure_has_sentinel_status() {
        let envelope = ResponseEnvelope::from_error(TransportError::Timeout);
        assert_eq!(envelope.status_code(), NO_STATUS);
        assert!(envelope.status().is_none());
        assert!(envelope.body().is_none());
        assert!(envelope.string_value(TextEncoding::Utf8).is_none());
    }

    #[test]
    fn test_string_value_is_repeatable() {
        let envelope = response(200, "héllo");
        let first = envelope.string_value(TextEncoding::Utf8);
        let second = envelope.string_value(TextEncoding::Utf8);
        assert_eq!(first.as_deref(), Some("héllo"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_encodings() {
        let envelope = ResponseEnvelope::new(200, None, Some(Bytes::from_static(&[0x63, 0xE9])));
        assert!(envelope.string_value(TextEncoding::Utf8).is_none());
        assert!(envelope.string_value(TextEncoding::Ascii).is_none());
        assert_eq!(envelope.string_value(TextEncoding::Latin1).as_deref(), Some("cé"));
        assert_eq!(response(200, "ok").string_value(TextEncoding::Ascii).as_deref(), Some("ok"));
    }

    #[test]
    fn test_numeric_accessors() {
        assert_eq!(response(200, " 17\n").int_value(), Some(17));
        assert_eq!(response(200, "3.25").double_value(), Some(3.25));
        assert_eq!(response(200, "3.25").int_value(), None);
        assert_eq!(response(200, "abc").double_value(), None);
    }

    #[test]
    fn test_json_accessors() {
        #[derive(Deserialize, Debug, PartialEq)]
        struct Status {
            string: String,
        }

        let object = response(200, r#"{"string":"completed"}"#);
        assert_eq!(
            object.decodable_value::<Status>(),
            Some(Status {
                string: "completed".to_string()
            })
        );
        assert_eq!(object.dictionary_value().unwrap()["string"], "completed");
        assert!(object.array_value().is_none());

        let array = response(200, "[1,2]");
        assert_eq!(array.array_value().unwrap().len(), 2);
        assert!(array.dictionary_value().is_none());
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2.5"));
        let envelope = ResponseEnvelope::new(429, Some(headers), None);
        assert_eq!(envelope.retry_after(), Some(Duration::from_millis(2500)));

        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert!(ResponseEnvelope::new(429, Some(headers), None)
            .retry_after()
            .is_none());
    }
}
