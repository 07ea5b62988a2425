//! Transport boundary.
//!
//! The request pipeline does not talk to the network itself. It hands each
//! attempt to a [`Transport`], together with a [`TransferMonitor`] through
//! which the transport reports progress and honours suspension.
//! [`ReqwestTransport`] is the default implementation.

use std::cell::Cell;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use tokio::sync::watch;

use crate::clients::errors::TransportError;
use crate::clients::http_request::Request;
use crate::clients::http_response::{ResponseEnvelope, NO_STATUS};
use crate::config::ClientConfig;
use crate::error::ConfigError;

/// Callback receiving a progress fraction in `0.0..=1.0`.
pub type ProgressHandler = Arc<dyn Fn(f64) + Send + Sync>;

/// What a transport produced for one attempt.
///
/// Every field is optional: a transport failure before any response leaves
/// `status`, `headers` and `body` empty.
#[derive(Clone, Debug, Default)]
pub struct RawResponse {
    /// Response body.
    pub body: Option<Bytes>,
    /// HTTP status code.
    pub status: Option<u16>,
    /// Response headers.
    pub headers: Option<HeaderMap>,
    /// Transport failure.
    pub error: Option<TransportError>,
}

impl RawResponse {
    /// A complete HTTP response.
    #[must_use]
    pub fn received(status: u16, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            body: Some(body.into()),
            status: Some(status),
            headers: Some(headers),
            error: None,
        }
    }

    /// A transport failure without any HTTP response.
    #[must_use]
    pub fn failed(error: TransportError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }

    /// Builds the envelope for this attempt.
    #[must_use]
    pub fn into_envelope(self, request: Request) -> ResponseEnvelope {
        let status = self.status.map_or(NO_STATUS, i32::from);
        let envelope = ResponseEnvelope::new(status, self.headers, self.body).with_request(request);
        match self.error {
            Some(error) => envelope.with_error(error),
            None => envelope,
        }
    }
}

/// Sends requests on behalf of a [`Task`](crate::Task).
///
/// Implementations should call [`TransferMonitor::checkpoint`] before sending
/// and between body chunks, and [`TransferMonitor::report`] whenever a chunk
/// arrives.
#[async_trait]
pub trait Transport: Send + Sync + 'static {
    /// Performs one attempt.
    async fn send(&self, request: &Request, monitor: TransferMonitor) -> RawResponse;
}

thread_local! {
    /// Key of the cancellation whose progress callback runs on this thread.
    static DELIVERING: Cell<usize> = const { Cell::new(0) };
}

/// Cancellation flag of one operation.
///
/// Progress is delivered under a read lock and [`wait_idle`](Self::wait_idle)
/// takes the write lock, so once a cancel has waited no progress callback is
/// running or will run. A progress callback that cancels its own task does
/// not wait for itself.
#[derive(Debug, Default)]
pub(crate) struct Cancellation {
    cancelled: AtomicBool,
    delivery: RwLock<()>,
}

impl Cancellation {
    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Sets the flag without waiting for deliveries in flight.
    pub(crate) fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Blocks until no progress callback of this operation is running.
    pub(crate) fn wait_idle(&self) {
        if DELIVERING.with(Cell::get) == self.key() {
            return;
        }
        drop(self.delivery.write().unwrap_or_else(PoisonError::into_inner));
    }

    fn deliver(&self, callback: impl FnOnce()) {
        let _delivery = self.delivery.read().unwrap_or_else(PoisonError::into_inner);
        if self.is_cancelled() {
            return;
        }
        let previous = DELIVERING.with(|current| current.replace(self.key()));
        callback();
        DELIVERING.with(|current| current.set(previous));
    }

    fn key(&self) -> usize {
        (self as *const Self) as usize
    }
}

/// Per-operation link between a transport and its task.
#[derive(Clone)]
pub struct TransferMonitor {
    progress: Option<ProgressHandler>,
    running: watch::Receiver<bool>,
    cancellation: Arc<Cancellation>,
}

impl TransferMonitor {
    pub(crate) fn new(
        progress: Option<ProgressHandler>,
        running: watch::Receiver<bool>,
        cancellation: Arc<Cancellation>,
    ) -> Self {
        Self {
            progress,
            running,
            cancellation,
        }
    }

    /// A monitor that never parks and discards progress.
    #[must_use]
    pub fn detached() -> Self {
        let (_, running) = watch::channel(true);
        Self::new(None, running, Arc::default())
    }

    /// Returns `true` once the owning task has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Reports `completed` of `expected` bytes. Unknown totals are not reported.
    #[allow(clippy::cast_precision_loss)]
    pub fn report(&self, completed: u64, expected: Option<u64>) {
        if let Some(total) = expected.filter(|total| *total > 0) {
            self.report_fraction(completed as f64 / total as f64);
        }
    }

    /// Reports a progress fraction, clamped to `0.0..=1.0`.
    ///
    /// Reports are dropped once the owning task has been cancelled.
    pub fn report_fraction(&self, fraction: f64) {
        if let Some(progress) = &self.progress {
            self.cancellation
                .deliver(|| progress(fraction.clamp(0.0, 1.0)));
        }
    }

    /// Waits while the owning task is suspended.
    pub async fn checkpoint(&self) {
        let mut running = self.running.clone();
        // The gate only closes after every task handle is gone, and a task
        // parked at that point is aborted.
        let _ = running.wait_for(|running| *running).await;
    }
}

impl fmt::Debug for TransferMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferMonitor")
            .field("running", &*self.running.borrow())
            .field("cancelled", &self.is_cancelled())
            .finish_non_exhaustive()
    }
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds a reqwest client from the timeout and user agent in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::TransportInit`] if the client cannot be built
    /// (for example if TLS initialization fails).
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .user_agent(config.user_agent());
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| ConfigError::TransportInit {
            reason: e.to_string(),
        })?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client.
    #[must_use]
    pub const fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &Request, monitor: TransferMonitor) -> RawResponse {
        monitor.checkpoint().await;

        let mut builder = self
            .client
            .request(request.method().into(), request.url().clone())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.body(body.clone());
        }

        let mut response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %request.url(), error = %e, "transport failed before a response");
                return RawResponse::failed(e.into());
            }
        };

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let expected = response.content_length();
        let mut body = Vec::new();

        loop {
            monitor.checkpoint().await;
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    body.extend_from_slice(&chunk);
                    monitor.report(body.len() as u64, expected);
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::debug!(url = %request.url(), error = %e, "transport failed while reading body");
                    return RawResponse {
                        body: Some(Bytes::from(body)),
                        status: Some(status),
                        headers: Some(headers),
                        error: Some(e.into()),
                    };
                }
            }
        }

        monitor.report_fraction(1.0);
        RawResponse::received(status, headers, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::{Method, RequestBuilder, Scheme};
    use std::sync::Mutex;

    fn request() -> Request {
        RequestBuilder::new(Scheme::Https, Method::Get, "example.com")
            .build()
            .unwrap()
    }

    #[test]
    fn test_failed_raw_response_has_sentinel_status() {
        let envelope = RawResponse::failed(TransportError::Timeout).into_envelope(request());
        assert_eq!(envelope.status_code(), NO_STATUS);
        assert!(envelope.error().is_some());
        assert!(envelope.request().is_some());
    }

    #[test]
    fn test_received_raw_response() {
        let envelope = RawResponse::received(201, HeaderMap::new(), "ok").into_envelope(request());
        assert_eq!(envelope.status_code(), 201);
        assert!(envelope.is_valid());
    }

    #[test]
    fn test_monitor_reports_clamped_fractions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let (_tx, rx) = watch::channel(true);
        let monitor = TransferMonitor::new(
            Some(Arc::new(move |fraction: f64| {
                sink.lock().unwrap().push(fraction);
            })),
            rx,
            Arc::default(),
        );

        monitor.report(5, Some(10));
        monitor.report(5, None);
        monitor.report(5, Some(0));
        monitor.report_fraction(3.0);

        assert_eq!(*seen.lock().unwrap(), vec![0.5, 1.0]);
    }

    #[test]
    fn test_monitor_drops_reports_after_cancel() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let cancellation = Arc::new(Cancellation::default());
        let (_tx, rx) = watch::channel(true);
        let monitor = TransferMonitor::new(
            Some(Arc::new(move |fraction: f64| {
                sink.lock().unwrap().push(fraction);
            })),
            rx,
            Arc::clone(&cancellation),
        );

        cancellation.cancel();
        monitor.report_fraction(0.5);
        assert!(seen.lock().unwrap().is_empty());
        assert!(monitor.is_cancelled());
    }

    #[test]
    fn test_checkpoint_waits_for_resume() {
        tokio_test::block_on(async {
            let (tx, rx) = watch::channel(false);
            let monitor = TransferMonitor::new(None, rx, Arc::default());

            let waiter = tokio::spawn(async move { monitor.checkpoint().await });
            tokio::task::yield_now().await;
            assert!(!waiter.is_finished());

            tx.send_replace(true);
            waiter.await.unwrap();
        });
    }

    #[test]
    fn test_progress_callback_may_cancel_its_own_operation() {
        let cancellation = Arc::new(Cancellation::default());
        let inner = Arc::clone(&cancellation);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let (_tx, rx) = watch::channel(true);
        let monitor = TransferMonitor::new(
            Some(Arc::new(move |fraction: f64| {
                sink.lock().unwrap().push(fraction);
                inner.cancel();
                inner.wait_idle();
            })),
            rx,
            Arc::clone(&cancellation),
        );

        monitor.report_fraction(0.25);
        monitor.report_fraction(0.75);

        assert_eq!(*seen.lock().unwrap(), vec![0.25]);
        cancellation.wait_idle();
    }

    #[test]
    fn test_detached_monitor_never_parks() {
        tokio_test::block_on(TransferMonitor::detached().checkpoint());
    }
}
