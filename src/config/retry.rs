//! Retry policy.

use std::time::Duration;

use reqwest::StatusCode;

use crate::clients::ResponseEnvelope;

/// How a task retries attempts whose response is not valid.
///
/// A response is retried when the policy's `limit` is positive, the response
/// is not valid (transport error or non-2xx status) and retries remain. The
/// wait between attempts is `delay`, except for `429 Too Many Requests`
/// responses with a numeric `Retry-After` header, which is honoured instead.
///
/// # Example
///
/// ```rust
/// use http_relay::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::new(3).with_delay(Duration::from_millis(250));
/// assert_eq!(policy.limit(), 3);
/// assert_eq!(RetryPolicy::default().limit(), 0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    limit: u32,
    delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy allowing `limit` retries with no delay.
    #[must_use]
    pub const fn new(limit: u32) -> Self {
        Self {
            limit,
            delay: Duration::ZERO,
        }
    }

    /// A policy that never retries.
    #[must_use]
    pub const fn none() -> Self {
        Self::new(0)
    }

    /// Sets the fixed delay between attempts.
    #[must_use]
    pub const fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the retry budget.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the fixed delay between attempts.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Returns the wait before retrying after `response`.
    #[must_use]
    pub fn delay_for(&self, response: &ResponseEnvelope) -> Duration {
        if response.status() == Some(StatusCode::TOO_MANY_REQUESTS) {
            if let Some(retry_after) = response.retry_after() {
                return retry_after;
            }
        }
        self.delay
    }
}
