//! Caller-facing HTTP client.
//!
//! This module provides the [`Client`] type, which turns a method, a path and
//! parameters into a running [`Task`] whose completion callback receives a
//! classified [`Outcome`].

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::clients::classifier::{
    classify, classify_custom_error, classify_data, classify_data_and_custom_error,
};
use crate::clients::http_request::{Method, Path, Request, RequestBuilder};
use crate::clients::http_response::ResponseEnvelope;
use crate::clients::outcome::Outcome;
use crate::clients::task::{Prepare, RetryAdapter, Task};
use crate::clients::transport::{ProgressHandler, ReqwestTransport, Transport};
use crate::config::{ClientConfig, RetryPolicy};
use crate::encoding::{generate_boundary, BodyBuilder, FormDataParameter, Parameters, QueryBuilder};
use crate::error::ConfigError;
use crate::interceptors::{
    FormDataInterceptor, FormUrlEncodedInterceptor, Interceptor, InterceptorGroup,
    JsonInterceptor,
};

/// How a call encodes its parameters.
#[derive(Clone, Debug)]
pub enum Flavor {
    /// JSON body, or query items for `GET`, `HEAD` and `DELETE`.
    Json,
    /// `key=value&...` body, or query items for `GET`, `HEAD` and `DELETE`.
    FormUrlEncoded,
    /// Multipart body built from the given fields under a fresh boundary.
    FormData(Vec<FormDataParameter>),
    /// The given body, sent verbatim without a content-type interceptor.
    Raw(Bytes),
}

/// HTTP client bound to one host.
///
/// The client handles:
/// - URL construction from the configured scheme, host, port and base path
/// - Parameter encoding per call [`Flavor`]
/// - Content-type interceptors ahead of caller interceptors
/// - Task creation with the configured retry policy and auto-resume flag
///
/// # Thread Safety
///
/// `Client` is `Clone`, `Send` and `Sync`. Clones share the transport.
///
/// # Example
///
/// ```rust,ignore
/// use http_relay::{Client, ClientConfig, Host, Method};
/// use serde_json::{json, Value};
///
/// let config = ClientConfig::builder()
///     .host(Host::new("api.example.com").unwrap())
///     .build()
///     .unwrap();
/// let client = Client::new(config)?;
///
/// let task = client
///     .json(Method::Get, "search")
///     .typed_parameters(&json!({"q": "rust"}))
///     .send_with_data(|outcome: http_relay::Outcome<Value>| println!("{outcome:?}"));
/// ```
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
}

// Verify Client is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

impl Client {
    /// Creates a client backed by a [`ReqwestTransport`] built from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TransportInit`] if the reqwest client cannot be
    /// built.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Creates a client that sends through `transport`.
    #[must_use]
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Starts a JSON call.
    #[must_use]
    pub fn json(&self, method: Method, path: impl Into<Path>) -> CallBuilder<'_> {
        self.call(method, path, Flavor::Json)
    }

    /// Starts a form-urlencoded call.
    #[must_use]
    pub fn form_url_encoded(&self, method: Method, path: impl Into<Path>) -> CallBuilder<'_> {
        self.call(method, path, Flavor::FormUrlEncoded)
    }

    /// Starts a multipart form-data call with the given fields.
    #[must_use]
    pub fn form_data(
        &self,
        method: Method,
        path: impl Into<Path>,
        fields: Vec<FormDataParameter>,
    ) -> CallBuilder<'_> {
        self.call(method, path, Flavor::FormData(fields))
    }

    /// Starts a call whose body is sent verbatim.
    #[must_use]
    pub fn raw(
        &self,
        method: Method,
        path: impl Into<Path>,
        body: impl Into<Bytes>,
    ) -> CallBuilder<'_> {
        self.call(method, path, Flavor::Raw(body.into()))
    }

    /// Starts a call of any flavor.
    #[must_use]
    pub fn call(&self, method: Method, path: impl Into<Path>, flavor: Flavor) -> CallBuilder<'_> {
        CallBuilder {
            client: self,
            method,
            path: path.into(),
            flavor,
            parameters: None,
            invalid_parameters: false,
            interceptor: None,
            headers: HeaderMap::new(),
            debug: None,
            retry_policy: None,
            on_progress: None,
            retry_adapter: None,
        }
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A call being configured.
///
/// Terminal `send*` methods build the request, create a [`Task`] and return
/// it, or return `None` when the request cannot be constructed (for example
/// when typed parameters fail to serialize). No callback is ever invoked for
/// a call that returned `None`.
///
/// Terminal methods must be called from within a Tokio runtime.
#[must_use = "a call does nothing until one of its send methods is invoked"]
pub struct CallBuilder<'c> {
    client: &'c Client,
    method: Method,
    path: Path,
    flavor: Flavor,
    parameters: Option<Parameters>,
    invalid_parameters: bool,
    interceptor: Option<Arc<dyn Interceptor>>,
    headers: HeaderMap,
    debug: Option<bool>,
    retry_policy: Option<RetryPolicy>,
    on_progress: Option<ProgressHandler>,
    retry_adapter: Option<RetryAdapter>,
}

impl CallBuilder<'_> {
    /// Sets the call parameters.
    pub fn parameters(mut self, parameters: impl Into<Parameters>) -> Self {
        self.parameters = Some(parameters.into());
        self.invalid_parameters = false;
        self
    }

    /// Sets typed call parameters.
    ///
    /// A value that fails to serialize makes the call unconstructible.
    pub fn typed_parameters<T: Serialize + ?Sized>(mut self, value: &T) -> Self {
        match Parameters::typed(value) {
            Ok(parameters) => {
                self.parameters = Some(parameters);
                self.invalid_parameters = false;
            }
            Err(e) => {
                tracing::debug!(error = %e, "call parameters failed to serialize");
                self.parameters = None;
                self.invalid_parameters = true;
            }
        }
        self
    }

    /// Sets the caller interceptor, run after the content-type interceptor.
    pub fn interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptor = Some(Arc::new(interceptor));
        self
    }

    /// Adds a header. Invalid header names or values are ignored.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            HeaderName::try_from(name.as_ref()),
            HeaderValue::try_from(value.as_ref()),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Overrides the client-wide debug flag for this call.
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Overrides the client-wide retry policy for this call.
    pub const fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = Some(policy);
        self
    }

    /// Sets the progress callback.
    pub fn on_progress(mut self, progress: impl Fn(f64) + Send + Sync + 'static) -> Self {
        self.on_progress = Some(Arc::new(progress));
        self
    }

    /// Sets how a request is rewritten before it is retried.
    pub fn retry_adapter(
        mut self,
        adapter: impl Fn(&Request, &ResponseEnvelope) -> Request + Send + Sync + 'static,
    ) -> Self {
        self.retry_adapter = Some(Arc::new(adapter));
        self
    }

    /// Builds the request this call would send.
    #[must_use]
    pub fn build_request(&self) -> Option<Request> {
        if self.invalid_parameters {
            return None;
        }

        let config = self.client.config();
        let method = self.method;
        let query = self
            .parameters
            .as_ref()
            .and_then(|parameters| QueryBuilder::build(method, parameters));

        let mut interceptors = InterceptorGroup::new();
        let body = match &self.flavor {
            Flavor::Json => {
                interceptors = interceptors.with(JsonInterceptor);
                self.parameters
                    .as_ref()
                    .and_then(|parameters| BodyBuilder::json(method, parameters))
            }
            Flavor::FormUrlEncoded => {
                interceptors = interceptors.with(FormUrlEncodedInterceptor);
                self.parameters
                    .as_ref()
                    .and_then(|parameters| BodyBuilder::form_url_encoded(method, parameters))
            }
            Flavor::FormData(fields) => {
                let boundary = generate_boundary();
                let body = BodyBuilder::form_data(method, &boundary, fields);
                interceptors = interceptors.with(FormDataInterceptor::new(boundary));
                body
            }
            Flavor::Raw(body) => Some(body.clone()),
        };
        if let Some(interceptor) = &self.interceptor {
            interceptors = interceptors.with_shared(Arc::clone(interceptor));
        }

        let mut headers = config.default_headers().clone();
        headers.extend(self.headers.clone());

        RequestBuilder::new(config.scheme(), method, config.host().as_ref())
            .port(config.port())
            .path(config.base_path().join(&self.path))
            .query(query)
            .headers(headers)
            .body(body)
            .interceptor(Some(&interceptors))
            .build()
    }

    /// Sends the call and reports a plain [`Outcome`].
    pub fn send(self, on_complete: impl FnOnce(Outcome) + Send + 'static) -> Option<Task> {
        self.send_raw(move |envelope| on_complete(classify(&envelope)))
    }

    /// Sends the call and reports an [`Outcome`] carrying a decoded `D`.
    pub fn send_with_data<D>(
        self,
        on_complete: impl FnOnce(Outcome<D>) + Send + 'static,
    ) -> Option<Task>
    where
        D: DeserializeOwned + 'static,
    {
        self.send_raw(move |envelope| on_complete(classify_data(&envelope)))
    }

    /// Sends the call and reports an [`Outcome`] that may carry a decoded `E`.
    pub fn send_with_custom_error<E>(
        self,
        on_complete: impl FnOnce(Outcome<(), E>) + Send + 'static,
    ) -> Option<Task>
    where
        E: DeserializeOwned,
    {
        self.send_raw(move |envelope| on_complete(classify_custom_error(&envelope)))
    }

    /// Sends the call and reports an [`Outcome`] carrying a decoded `D` or `E`.
    pub fn send_with_data_and_custom_error<D, E>(
        self,
        on_complete: impl FnOnce(Outcome<D, E>) + Send + 'static,
    ) -> Option<Task>
    where
        D: DeserializeOwned + 'static,
        E: DeserializeOwned,
    {
        self.send_raw(move |envelope| on_complete(classify_data_and_custom_error(&envelope)))
    }

    /// Sends the call and reports the unclassified envelope.
    pub fn send_raw(
        self,
        on_complete: impl FnOnce(ResponseEnvelope) + Send + 'static,
    ) -> Option<Task> {
        let request = self.build_request()?;
        let config = self.client.config();

        let task = Task::new(
            Arc::clone(&self.client.transport),
            self.retry_policy.unwrap_or_else(|| config.retry_policy()),
            self.debug.unwrap_or_else(|| config.debug()),
        );
        task.prepare(
            request,
            Prepare::new(on_complete)
                .auto_resume(config.auto_resume())
                .retry_adapter(self.retry_adapter)
                .on_progress(self.on_progress),
        );
        Some(task)
    }
}

impl fmt::Debug for CallBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallBuilder")
            .field("method", &self.method)
            .field("path", &self.path)
            .field("flavor", &self.flavor)
            .field("parameters", &self.parameters)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}
