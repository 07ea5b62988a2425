//! Response classification.
//!
//! Turns a [`ResponseEnvelope`] into an [`Outcome`] of the shape the caller
//! asked for. Decoding is attempted before status validity is consulted, so a
//! typed error body returned with `200` still classifies as a custom error and
//! a typed success body returned with a non-2xx status still classifies as a
//! success:
//!
//! 1. [`classify`]: valid → success, otherwise failure.
//! 2. [`classify_data`]: decode `D` → success; for a valid response whose `D`
//!    is a raw type ([`Bytes`], `Vec<u8>` or `String`) wrap the body → success;
//!    otherwise failure.
//! 3. [`classify_custom_error`]: decode `E` → custom error; valid → success;
//!    otherwise failure.
//! 4. [`classify_data_and_custom_error`]: decode `D` → success; decode `E` →
//!    custom error; raw `D` on a valid response → success; otherwise failure.
//!
//! Failures carry the transport error when there is one, and
//! [`RequestError::Unknown`] otherwise.

use std::any::{Any, TypeId};

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::clients::errors::RequestError;
use crate::clients::http_response::ResponseEnvelope;
use crate::clients::outcome::Outcome;

/// Classifies a plain call.
#[must_use]
pub fn classify(envelope: &ResponseEnvelope) -> Outcome {
    if envelope.is_valid() {
        Outcome::Success(())
    } else {
        Outcome::Failure(failure(envelope))
    }
}

/// Classifies a call expecting a `D` payload.
#[must_use]
pub fn classify_data<D>(envelope: &ResponseEnvelope) -> Outcome<D>
where
    D: DeserializeOwned + 'static,
{
    if let Some(data) = envelope.decodable_value::<D>() {
        return Outcome::Success(data);
    }
    match raw_payload::<D>(envelope) {
        Some(data) => Outcome::Success(data),
        None => Outcome::Failure(failure(envelope)),
    }
}

/// Classifies a call that may return an `E` error body.
#[must_use]
pub fn classify_custom_error<E>(envelope: &ResponseEnvelope) -> Outcome<(), E>
where
    E: DeserializeOwned,
{
    if let Some(error) = envelope.decodable_value::<E>() {
        return Outcome::CustomError(error);
    }
    if envelope.is_valid() {
        Outcome::Success(())
    } else {
        Outcome::Failure(failure(envelope))
    }
}

/// Classifies a call expecting a `D` payload or an `E` error body.
#[must_use]
pub fn classify_data_and_custom_error<D, E>(envelope: &ResponseEnvelope) -> Outcome<D, E>
where
    D: DeserializeOwned + 'static,
    E: DeserializeOwned,
{
    if let Some(data) = envelope.decodable_value::<D>() {
        return Outcome::Success(data);
    }
    if let Some(error) = envelope.decodable_value::<E>() {
        return Outcome::CustomError(error);
    }
    match raw_payload::<D>(envelope) {
        Some(data) => Outcome::Success(data),
        None => Outcome::Failure(failure(envelope)),
    }
}

fn failure(envelope: &ResponseEnvelope) -> RequestError {
    envelope.error().cloned().map_or(
        RequestError::Unknown {
            status: envelope.status_code(),
        },
        RequestError::Transport,
    )
}

/// Wraps the raw body of a valid response when `D` is a byte or string type.
fn raw_payload<D: 'static>(envelope: &ResponseEnvelope) -> Option<D> {
    if !envelope.is_valid() {
        return None;
    }
    let body = envelope.body()?;
    let target = TypeId::of::<D>();

    let payload: Box<dyn Any> = if target == TypeId::of::<Bytes>() {
        Box::new(body.clone())
    } else if target == TypeId::of::<Vec<u8>>() {
        Box::new(body.to_vec())
    } else if target == TypeId::of::<String>() {
        Box::new(String::from_utf8(body.to_vec()).ok()?)
    } else {
        return None;
    };

    payload.downcast::<D>().ok().map(|data| *data)
}
