//! Call parameters.
//!
//! Callers pass parameters either as a typed, serializable value or as an
//! untyped, insertion-ordered map of JSON values. Both shapes funnel through
//! the same query/body encoders.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::clients::QueryItem;

/// Parameters of a call.
///
/// # Example
///
/// ```rust
/// use http_relay::Parameters;
/// use serde::Serialize;
/// use serde_json::json;
///
/// #[derive(Serialize)]
/// struct Search {
///     q: String,
///     page: u32,
/// }
///
/// let typed = Parameters::typed(&Search { q: "rust".into(), page: 2 }).unwrap();
/// let untyped: Parameters = [("q", json!("rust")), ("page", json!(2))].into_iter().collect();
///
/// assert_eq!(typed.key_value_pairs(), untyped.key_value_pairs());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Parameters {
    /// A serialized typed value. Only object-shaped values yield key/value pairs.
    Typed(Value),
    /// A string-keyed map of arbitrary values, in insertion order.
    Untyped(Map<String, Value>),
}

impl Parameters {
    /// Serializes a typed value into parameters.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `value` cannot be represented as JSON.
    pub fn typed<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(value).map(Self::Typed)
    }

    /// Wraps an untyped map.
    #[must_use]
    pub const fn untyped(map: Map<String, Value>) -> Self {
        Self::Untyped(map)
    }

    /// Returns the parameters as a JSON value.
    #[must_use]
    pub fn as_value(&self) -> Value {
        match self {
            Self::Typed(value) => value.clone(),
            Self::Untyped(map) => Value::Object(map.clone()),
        }
    }

    /// Serializes the parameters as a JSON document.
    #[must_use]
    pub fn to_json_bytes(&self) -> Option<Vec<u8>> {
        match self {
            Self::Typed(value) => serde_json::to_vec(value).ok(),
            Self::Untyped(map) => serde_json::to_vec(map).ok(),
        }
    }

    /// Flattens the parameters into ordered key/value pairs.
    ///
    /// Scalars produce one pair; arrays produce one pair per element, all
    /// sharing the key, in array order. `null` values are skipped. Nested
    /// objects are rendered as their JSON text.
    ///
    /// Returns `None` for typed values that are not JSON objects.
    #[must_use]
    pub fn key_value_pairs(&self) -> Option<Vec<QueryItem>> {
        let map = match self {
            Self::Typed(Value::Object(map)) | Self::Untyped(map) => map,
            Self::Typed(_) => return None,
        };

        let mut pairs = Vec::with_capacity(map.len());
        for (key, value) in map {
            match value {
                Value::Array(elements) => pairs.extend(
                    elements
                        .iter()
                        .filter_map(scalar_string)
                        .map(|element| (key.clone(), element)),
                ),
                other => {
                    if let Some(value) = scalar_string(other) {
                        pairs.push((key.clone(), value));
                    }
                }
            }
        }
        Some(pairs)
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Self::Untyped(map)
    }
}

impl<K, V> FromIterator<(K, V)> for Parameters
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Untyped(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
