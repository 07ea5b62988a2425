//! Query string encoder.

use crate::clients::{Method, QueryItem};
use crate::encoding::parameters::Parameters;

/// Builds query items for query-eligible methods.
#[derive(Clone, Copy, Debug, Default)]
pub struct QueryBuilder;

impl QueryBuilder {
    /// Flattens `parameters` into ordered query items.
    ///
    /// Returns `None` for body-eligible methods, and for typed parameters that
    /// do not serialize to a JSON object.
    #[must_use]
    pub fn build(method: Method, parameters: &Parameters) -> Option<Vec<QueryItem>> {
        if method.is_body_eligible() {
            return None;
        }
        parameters.key_value_pairs()
    }
}
