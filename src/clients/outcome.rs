//! Classified call outcomes.
//!
//! A single generic [`Outcome`] covers the four call shapes:
//!
//! | Shape                        | Type                      |
//! |------------------------------|---------------------------|
//! | plain                        | `Outcome` (= `Outcome<(), Infallible>`) |
//! | typed data                   | `Outcome<D>`              |
//! | typed custom error           | `Outcome<(), E>`          |
//! | typed data and custom error  | `Outcome<D, E>`           |
//!
//! Shapes without a custom error use [`Infallible`], so the
//! [`Outcome::CustomError`] variant cannot be constructed for them.

use std::convert::Infallible;

use crate::clients::errors::{OutcomeError, RequestError};

/// The terminal result of a call.
#[derive(Clone, Debug)]
pub enum Outcome<D = (), E = Infallible> {
    /// The call succeeded, with its decoded payload (`()` for payload-less shapes).
    Success(D),
    /// The body decoded as the caller's custom error shape.
    CustomError(E),
    /// The call failed.
    Failure(RequestError),
}

impl<D, E> Outcome<D, E> {
    /// Returns `true` for [`Outcome::Success`].
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns `true` for [`Outcome::CustomError`].
    #[must_use]
    pub const fn is_custom_error(&self) -> bool {
        matches!(self, Self::CustomError(_))
    }

    /// Returns `true` for [`Outcome::Failure`].
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Returns the success payload, if any.
    #[must_use]
    pub fn success(self) -> Option<D> {
        match self {
            Self::Success(data) => Some(data),
            _ => None,
        }
    }

    /// Returns the custom error, if any.
    #[must_use]
    pub fn custom_error(self) -> Option<E> {
        match self {
            Self::CustomError(error) => Some(error),
            _ => None,
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&RequestError> {
        match self {
            Self::Failure(error) => Some(error),
            _ => None,
        }
    }

    /// Maps the success payload.
    pub fn map<U>(self, f: impl FnOnce(D) -> U) -> Outcome<U, E> {
        match self {
            Self::Success(data) => Outcome::Success(f(data)),
            Self::CustomError(error) => Outcome::CustomError(error),
            Self::Failure(error) => Outcome::Failure(error),
        }
    }

    /// Converts the outcome into a standard `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`OutcomeError::Custom`] for a custom error and
    /// [`OutcomeError::Failure`] for a failure.
    pub fn into_result(self) -> Result<D, OutcomeError<E>> {
        match self {
            Self::Success(data) => Ok(data),
            Self::CustomError(error) => Err(OutcomeError::Custom(error)),
            Self::Failure(error) => Err(OutcomeError::Failure(error)),
        }
    }
}

impl<D, E> From<Outcome<D, E>> for Result<D, OutcomeError<E>> {
    fn from(outcome: Outcome<D, E>) -> Self {
        outcome.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_outcome_defaults() {
        let outcome: Outcome = Outcome::Success(());
        assert!(outcome.is_success());
        assert!(outcome.into_result().is_ok());
    }

    #[test]
    fn test_into_result_maps_every_variant() {
        let success: Outcome<u8, String> = Outcome::Success(7);
        assert_eq!(success.into_result().unwrap(), 7);

        let custom: Outcome<u8, String> = Outcome::CustomError("nope".to_string());
        assert!(matches!(
            custom.into_result(),
            Err(OutcomeError::Custom(message)) if message == "nope"
        ));

        let failure: Outcome<u8, String> = Outcome::Failure(RequestError::Unknown { status: 500 });
        assert!(matches!(
            failure.into_result(),
            Err(OutcomeError::Failure(RequestError::Unknown { status: 500 }))
        ));
    }

    #[test]
    fn test_map_and_accessors() {
        let outcome: Outcome<u8> = Outcome::Success(2);
        assert_eq!(outcome.map(|n| n * 10).success(), Some(20));

        let failure: Outcome<u8> = Outcome::Failure(RequestError::Unknown { status: -1 });
        assert!(failure.is_failure());
        assert!(failure.failure().is_some());
        assert!(failure.custom_error().is_none());
    }
}
