//! Parameter encoding.
//!
//! This module turns call parameters into the parts of a request:
//!
//! - [`Parameters`]: typed or untyped call parameters
//! - [`QueryBuilder`]: query items for `GET`, `HEAD` and `DELETE`
//! - [`BodyBuilder`]: JSON, multipart and form-urlencoded bodies for every other method
//! - [`FormDataParameter`]: a single multipart field
//!
//! Query and body encoding are mutually exclusive for any given method.

mod body;
mod form_data;
mod parameters;
mod query;

pub use body::BodyBuilder;
pub use form_data::{closing_fragment, generate_boundary, FormDataParameter};
pub use parameters::Parameters;
pub use query::QueryBuilder;
