//! Request body encoders.
//!
//! Every encoder returns `None` for query-eligible methods (`GET`, `HEAD`,
//! `DELETE`): those carry their parameters in the query string instead.

use bytes::Bytes;

use crate::clients::Method;
use crate::encoding::form_data::{closing_fragment, FormDataParameter};
use crate::encoding::parameters::Parameters;

/// Encodes request bodies for the JSON, form-data and form-urlencoded flavors.
#[derive(Clone, Copy, Debug, Default)]
pub struct BodyBuilder;

impl BodyBuilder {
    /// Serializes `parameters` as a JSON document.
    #[must_use]
    pub fn json(method: Method, parameters: &Parameters) -> Option<Bytes> {
        if method.is_query_eligible() {
            return None;
        }
        parameters.to_json_bytes().map(Bytes::from)
    }

    /// Concatenates the rendered multipart fragments and the closing boundary.
    ///
    /// Returns `None` if the boundary or the parameter list is empty. Fields
    /// that render to nothing are skipped.
    #[must_use]
    pub fn form_data(
        method: Method,
        boundary: &str,
        parameters: &[FormDataParameter],
    ) -> Option<Bytes> {
        if method.is_query_eligible() || boundary.is_empty() || parameters.is_empty() {
            return None;
        }

        let mut body: Vec<u8> = parameters
            .iter()
            .filter_map(|parameter| parameter.render(boundary))
            .flatten()
            .collect();
        body.extend_from_slice(closing_fragment(boundary).as_bytes());
        Some(Bytes::from(body))
    }

    /// Joins the flattened parameters as `key=value` pairs separated by `&`.
    ///
    /// Keys and values are inserted verbatim, without percent-encoding; a
    /// value containing `&`, `=` or non-ASCII text produces an ambiguous body.
    #[must_use]
    pub fn form_url_encoded(method: Method, parameters: &Parameters) -> Option<Bytes> {
        if method.is_query_eligible() {
            return None;
        }
        let encoded = parameters
            .key_value_pairs()?
            .into_iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("&");
        Some(Bytes::from(encoded))
    }
}
