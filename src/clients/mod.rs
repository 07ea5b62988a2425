//! Request construction, execution and response handling.
//!
//! # Overview
//!
//! The main types in this module are:
//!
//! - [`Client`]: builds calls against one configured host
//! - [`CallBuilder`]: a single call, terminated by one of its `send*` methods
//! - [`Request`] and [`RequestBuilder`]: the immutable-routing request descriptor
//! - [`Task`]: the execution unit with retry, progress, suspend and cancel
//! - [`ResponseEnvelope`]: everything known about a finished attempt
//! - [`Outcome`]: the classified result handed to completion callbacks
//! - [`Transport`]: the network boundary, with [`ReqwestTransport`] as default
//!
//! # Example
//!
//! ```rust,ignore
//! use http_relay::{Client, ClientConfig, Host, Method, Outcome};
//!
//! let config = ClientConfig::builder()
//!     .host(Host::new("api.example.com").unwrap())
//!     .build()
//!     .unwrap();
//! let client = Client::new(config)?;
//!
//! let task = client
//!     .json(Method::Get, ["users", "42"])
//!     .send(|outcome: Outcome| println!("{outcome:?}"));
//! ```
//!
//! # Retry Behavior
//!
//! A task retries any response that is not valid (a transport error, or a
//! status outside `200..300`) while its [`RetryPolicy`](crate::RetryPolicy)
//! has retries left:
//!
//! - **429 (Rate Limited)**: waits for a numeric `Retry-After` header when present
//! - **Everything else**: waits for the policy's fixed delay
//!
//! The default policy does not retry.

pub mod classifier;
mod errors;
mod http_client;
mod http_request;
mod http_response;
mod outcome;
mod task;
mod transport;

pub use classifier::{classify, classify_custom_error, classify_data, classify_data_and_custom_error};
pub use errors::{
    InvalidMethodError, InvalidSchemeError, OutcomeError, RequestError, TransportError,
};
pub use http_client::{CallBuilder, Client, Flavor};
pub use http_request::{Method, Path, QueryItem, Request, RequestBuilder, Scheme};
pub use http_response::{ResponseEnvelope, TextEncoding, NO_STATUS};
pub use outcome::Outcome;
pub use task::{CompletionHandler, Prepare, RetryAdapter, Task, TaskState};
pub use transport::{ProgressHandler, RawResponse, ReqwestTransport, TransferMonitor, Transport};
