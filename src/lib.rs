//! # http-relay
//!
//! A convenience layer over an HTTP transport: build requests from a method,
//! a path and parameters, run them as controllable tasks, and receive the
//! response classified into the shape you asked for.
//!
//! ## Overview
//!
//! This crate provides:
//! - Type-safe configuration via [`ClientConfig`] and [`ClientConfigBuilder`]
//! - JSON, multipart form-data, form-urlencoded and raw-body call flavors
//! - Query-string encoding for `GET`, `HEAD` and `DELETE`
//! - Composable request [`interceptors`]
//! - [`Task`]s with retry, progress reporting, suspend, resume and cancel
//! - Response classification into [`Outcome`] and typed body accessors
//!
//! ## Quick Start
//!
//! ```rust
//! use http_relay::{ClientConfig, Host, RetryPolicy};
//!
//! let config = ClientConfig::builder()
//!     .host(Host::new("api.example.com").unwrap())
//!     .base_path("v1")
//!     .retry_policy(RetryPolicy::new(1))
//!     .build()
//!     .unwrap();
//! ```
//!
//! ## Making Calls
//!
//! ```rust,ignore
//! use http_relay::{Client, FormDataParameter, Method, Outcome};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct User { name: String }
//!
//! #[derive(Deserialize)]
//! struct ApiError { message: String }
//!
//! let client = Client::new(config)?;
//!
//! client
//!     .json(Method::Get, ["users", "42"])
//!     .send_with_data_and_custom_error(|outcome: Outcome<User, ApiError>| match outcome {
//!         Outcome::Success(user) => println!("hello {}", user.name),
//!         Outcome::CustomError(error) => println!("api said {}", error.message),
//!         Outcome::Failure(error) => println!("request failed: {error}"),
//!     });
//!
//! client
//!     .form_data(Method::Post, "avatars", vec![FormDataParameter::file(
//!         "avatar", "me.png", "image/png", png_bytes,
//!     )])
//!     .on_progress(|fraction| println!("{:.0}%", fraction * 100.0))
//!     .send(|outcome: Outcome| println!("{outcome:?}"));
//! ```
//!
//! ## Building Requests Directly
//!
//! ```rust
//! use http_relay::{Method, RequestBuilder, Scheme};
//!
//! let request = RequestBuilder::new(Scheme::Https, Method::Get, "api.example.com")
//!     .path("search")
//!     .query(vec![("q".to_string(), "rust".to_string())])
//!     .build()
//!     .unwrap();
//! assert_eq!(request.url().as_str(), "https://api.example.com/search?q=rust");
//!
//! // An empty host cannot form a URL.
//! assert!(RequestBuilder::new(Scheme::Https, Method::Get, "").path("x").build().is_none());
//! ```
//!
//! ## Design Principles
//!
//! - **No global state**: Configuration is instance-based and passed explicitly
//! - **Absent, not thrown**: Unbuildable requests yield `None`, never a panic
//! - **Values, not errors**: Every finished task reports an [`Outcome`] value
//! - **Thread-safe**: All public types are `Send + Sync`
//! - **Async-first**: Tasks run on the Tokio runtime

pub mod clients;
pub mod config;
pub mod encoding;
pub mod error;
pub mod interceptors;

// Re-export public types at crate root for convenience
pub use config::{ClientConfig, ClientConfigBuilder, Host, RetryPolicy};
pub use error::ConfigError;

pub use clients::{
    CallBuilder, Client, Flavor, InvalidMethodError, InvalidSchemeError, Method, Outcome,
    OutcomeError, Path, Prepare, ProgressHandler, QueryItem, RawResponse, ReqwestTransport,
    Request, RequestBuilder, RequestError, ResponseEnvelope, RetryAdapter, Scheme, Task,
    TaskState, TextEncoding, TransferMonitor, Transport, TransportError, NO_STATUS,
};

pub use encoding::{BodyBuilder, FormDataParameter, Parameters, QueryBuilder};
pub use interceptors::{Interceptor, InterceptorGroup};
