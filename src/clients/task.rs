//! Execution unit for a single logical request.
//!
//! A [`Task`] owns at most one in-flight operation. Its lifecycle is:
//!
//! ```text
//! Created -> Prepared -> Running <-> Suspended -> Completed
//!                \___________\___________\_____-> Cancelled
//! ```
//!
//! Preparing a task spawns one Tokio task that runs the attempt loop:
//! send, build the envelope, retry while the response is not valid and the
//! retry budget allows it, then invoke the completion callback exactly once.
//! Retries are invisible to the caller apart from the added latency.
//!
//! Completion and cancellation are decided under the task lock, so a
//! cancelled task never calls its completion callback, and progress reports
//! after cancellation are dropped.
//!
//! Dropping every handle of a task that is prepared or suspended cancels it.
//! A running task keeps running to completion without its handles.

use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::clients::http_request::Request;
use crate::clients::http_response::ResponseEnvelope;
use crate::clients::transport::{Cancellation, ProgressHandler, TransferMonitor, Transport};
use crate::config::RetryPolicy;

/// Callback invoked once with the final envelope.
pub type CompletionHandler = Box<dyn FnOnce(ResponseEnvelope) + Send>;

/// Produces the request for the next attempt from the previous request and
/// its (invalid) response.
///
/// The request passed in is the one the failed attempt sent, so adaptations
/// accumulate: the second retry sees the output of the first.
pub type RetryAdapter = Arc<dyn Fn(&Request, &ResponseEnvelope) -> Request + Send + Sync>;

static NEXT_TASK_ID: AtomicU64 = AtomicU64::new(1);

/// Lifecycle state of a [`Task`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskState {
    /// No operation has been prepared.
    Created,
    /// An operation exists but has not been started.
    Prepared,
    /// The operation is running.
    Running,
    /// The operation is parked until [`Task::resume`].
    Suspended,
    /// The completion callback has been invoked.
    Completed,
    /// The task was cancelled before completing.
    Cancelled,
}

impl TaskState {
    /// Returns `true` for [`Completed`](Self::Completed) and [`Cancelled`](Self::Cancelled).
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// Options for [`Task::prepare`].
pub struct Prepare {
    /// Start the operation immediately.
    pub auto_resume: bool,
    /// Rewrites the request between attempts. Defaults to resending it unchanged.
    pub retry_adapter: Option<RetryAdapter>,
    /// Receives progress fractions.
    pub on_progress: Option<ProgressHandler>,
    /// Receives the final envelope.
    pub on_complete: CompletionHandler,
}

impl Prepare {
    /// Options with only a completion callback, started immediately.
    #[must_use]
    pub fn new(on_complete: impl FnOnce(ResponseEnvelope) + Send + 'static) -> Self {
        Self {
            auto_resume: true,
            retry_adapter: None,
            on_progress: None,
            on_complete: Box::new(on_complete),
        }
    }

    /// Sets whether the operation starts immediately.
    #[must_use]
    pub const fn auto_resume(mut self, auto_resume: bool) -> Self {
        self.auto_resume = auto_resume;
        self
    }

    /// Sets the retry adapter.
    #[must_use]
    pub fn retry_adapter(mut self, adapter: Option<RetryAdapter>) -> Self {
        self.retry_adapter = adapter;
        self
    }

    /// Sets the progress callback.
    #[must_use]
    pub fn on_progress(mut self, progress: Option<ProgressHandler>) -> Self {
        self.on_progress = progress;
        self
    }
}

/// Handle to a request's execution.
///
/// Cloning the handle does not clone the task: all clones control the same
/// operation.
///
/// # Example
///
/// ```rust,ignore
/// use http_relay::{Prepare, RetryPolicy, Task};
///
/// let task = Task::new(transport, RetryPolicy::new(1), false);
/// task.prepare(request, Prepare::new(|response| println!("{}", response.status_code())).auto_resume(false));
/// task.resume();
/// ```
#[derive(Clone)]
pub struct Task {
    inner: Arc<TaskInner>,
}

/// Owned by the handles only. The spawned operation never holds it, so the
/// last handle going away drops the gate.
struct TaskInner {
    core: Arc<TaskCore>,
    running: watch::Sender<bool>,
}

/// State shared by the handles and the spawned operation.
struct TaskCore {
    id: u64,
    transport: Arc<dyn Transport>,
    retry_policy: RetryPolicy,
    debug: bool,
    shared: Mutex<Shared>,
}

struct Shared {
    state: TaskState,
    generation: u64,
    retries_remaining: u32,
    operation: Option<Operation>,
}

struct Operation {
    handle: JoinHandle<()>,
    cancellation: Arc<Cancellation>,
}

impl Operation {
    /// Aborts the operation. The caller waits on the returned flag once the
    /// task lock is released.
    fn cancel(self) -> Arc<Cancellation> {
        self.cancellation.cancel();
        self.handle.abort();
        self.cancellation
    }
}

impl Task {
    /// Creates a task in the [`Created`](TaskState::Created) state.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, retry_policy: RetryPolicy, debug: bool) -> Self {
        let core = TaskCore {
            id: NEXT_TASK_ID.fetch_add(1, Ordering::Relaxed),
            transport,
            retry_policy,
            debug,
            shared: Mutex::new(Shared {
                state: TaskState::Created,
                generation: 0,
                retries_remaining: retry_policy.limit(),
                operation: None,
            }),
        };
        Self {
            inner: Arc::new(TaskInner {
                core: Arc::new(core),
                running: watch::channel(false).0,
            }),
        }
    }

    /// Returns the unique identifier of this task.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.core.id
    }

    /// Returns the current lifecycle state.
    #[must_use]
    pub fn state(&self) -> TaskState {
        self.inner.core.lock().state
    }

    /// Returns the number of retries left for the current operation.
    #[must_use]
    pub fn retries_remaining(&self) -> u32 {
        self.inner.core.lock().retries_remaining
    }

    /// Returns the retry policy of this task.
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.inner.core.retry_policy
    }

    /// Attaches `request` and creates a new operation for it.
    ///
    /// Any operation this task already holds is cancelled first. The operation
    /// starts immediately when `options.auto_resume` is set, otherwise it waits
    /// for [`resume`](Self::resume).
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn prepare(&self, request: Request, options: Prepare) {
        let Prepare {
            auto_resume,
            retry_adapter,
            on_progress,
            on_complete,
        } = options;

        let previous = {
            let core = &self.inner.core;
            let mut shared = core.lock();
            let previous = shared.operation.take().map(Operation::cancel);

            shared.generation += 1;
            shared.retries_remaining = core.retry_policy.limit();
            shared.state = TaskState::Prepared;

            self.inner.running.send_replace(false);
            let cancellation = Arc::new(Cancellation::default());
            let monitor = TransferMonitor::new(
                on_progress,
                self.inner.running.subscribe(),
                Arc::clone(&cancellation),
            );

            let handle = tokio::spawn(Arc::clone(core).run(
                shared.generation,
                request,
                retry_adapter,
                monitor,
                on_complete,
            ));

            shared.operation = Some(Operation {
                handle,
                cancellation,
            });
            previous
        };

        if let Some(previous) = previous {
            previous.wait_idle();
        }
        if auto_resume {
            self.resume();
        }
    }

    /// Starts a prepared operation or resumes a suspended one.
    pub fn resume(&self) {
        let mut shared = self.inner.core.lock();
        if !matches!(shared.state, TaskState::Prepared | TaskState::Suspended)
            || shared.operation.is_none()
        {
            return;
        }
        self.inner.running.send_replace(true);
        shared.state = TaskState::Running;
    }

    /// Parks a running operation at its next checkpoint.
    pub fn suspend(&self) {
        let mut shared = self.inner.core.lock();
        if shared.state != TaskState::Running || shared.operation.is_none() {
            return;
        }
        self.inner.running.send_replace(false);
        shared.state = TaskState::Suspended;
    }

    /// Cancels the task.
    ///
    /// Cancelling a completed task has no effect. Otherwise, once this
    /// returns no progress or completion callback of the task is running or
    /// will run. Called from the task's own progress callback, it does not
    /// wait for that callback to return.
    pub fn cancel(&self) {
        let cancelled = {
            let mut shared = self.inner.core.lock();
            if shared.state != TaskState::Completed {
                shared.state = TaskState::Cancelled;
            }
            shared.operation.take().map(Operation::cancel)
        };
        if let Some(cancellation) = cancelled {
            cancellation.wait_idle();
        }
    }
}

impl Drop for TaskInner {
    fn drop(&mut self) {
        let mut shared = self.core.lock();
        if matches!(shared.state, TaskState::Prepared | TaskState::Suspended) {
            shared.state = TaskState::Cancelled;
            if let Some(operation) = shared.operation.take() {
                operation.cancel();
            }
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shared = self.inner.core.lock();
        f.debug_struct("Task")
            .field("id", &self.inner.core.id)
            .field("state", &shared.state)
            .field("retries_remaining", &shared.retries_remaining)
            .finish_non_exhaustive()
    }
}

impl TaskCore {
    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn run(
        self: Arc<Self>,
        generation: u64,
        mut request: Request,
        retry_adapter: Option<RetryAdapter>,
        monitor: TransferMonitor,
        on_complete: CompletionHandler,
    ) {
        loop {
            monitor.checkpoint().await;
            if self.debug {
                log_request(self.id, &request);
            }

            let response = self
                .transport
                .send(&request, monitor.clone())
                .await
                .into_envelope(request.clone());

            if self.debug {
                log_response(self.id, &response);
            }

            if !response.is_valid() {
                if let Some(remaining) = self.take_retry(generation) {
                    tracing::warn!(
                        task = self.id,
                        status = response.status_code(),
                        remaining,
                        "retrying request to {}",
                        request.url()
                    );
                    let delay = self.retry_policy.delay_for(&response);
                    request = retry_adapter
                        .as_ref()
                        .map_or_else(|| request.clone(), |adapt| adapt(&request, &response));
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    continue;
                }
            }

            if self.finish(generation) {
                on_complete(response);
            }
            return;
        }
    }

    /// Consumes one retry of the current operation, returning how many remain.
    fn take_retry(&self, generation: u64) -> Option<u32> {
        let mut shared = self.lock();
        if shared.generation != generation
            || shared.state == TaskState::Cancelled
            || self.retry_policy.limit() == 0
            || shared.retries_remaining == 0
        {
            return None;
        }
        shared.retries_remaining -= 1;
        Some(shared.retries_remaining)
    }

    /// Marks the operation completed unless it was cancelled or superseded.
    fn finish(&self, generation: u64) -> bool {
        let mut shared = self.lock();
        if shared.generation != generation || shared.state == TaskState::Cancelled {
            return false;
        }
        shared.state = TaskState::Completed;
        shared.operation = None;
        true
    }
}

fn describe_body(body: Option<&Bytes>) -> Cow<'_, str> {
    match body {
        None => Cow::Borrowed("<none>"),
        Some(bytes) => std::str::from_utf8(bytes)
            .map_or_else(|_| Cow::Owned(format!("<{} bytes>", bytes.len())), Cow::Borrowed),
    }
}

fn log_request(task: u64, request: &Request) {
    tracing::debug!(
        task,
        method = %request.method(),
        url = %request.url(),
        headers = ?request.headers(),
        body = %describe_body(request.body()),
        "sending request"
    );
}

fn log_response(task: u64, response: &ResponseEnvelope) {
    tracing::debug!(
        task,
        status = response.status_code(),
        headers = ?response.headers(),
        body = %describe_body(response.body()),
        error = ?response.error(),
        "received response"
    );
}
