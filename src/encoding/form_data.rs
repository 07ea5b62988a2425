//! Multipart form-data fields.
//!
//! Each [`FormDataParameter`] renders into one `multipart/form-data` fragment
//! for a given boundary. Names, filenames and content types are inserted
//! verbatim: quotes and backslashes are not escaped, so callers must supply
//! safe values.

use bytes::Bytes;
use rand::Rng;
use serde::Serialize;

/// A single multipart field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormDataParameter {
    /// A plain text field.
    Text {
        /// Field name.
        name: String,
        /// Field value.
        value: String,
    },
    /// A file upload.
    File {
        /// Field name.
        name: String,
        /// File name reported to the server.
        filename: String,
        /// MIME type of the file.
        content_type: String,
        /// Raw file contents.
        data: Bytes,
    },
    /// A field whose value is a serialized JSON document.
    Json {
        /// Field name.
        name: String,
        /// The serialized JSON text.
        value: String,
    },
}

impl FormDataParameter {
    /// Creates a text field.
    #[must_use]
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Creates a file field.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self::File {
            name: name.into(),
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Creates a field holding `value` serialized as JSON text.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if `value` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(
        name: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        Ok(Self::Json {
            name: name.into(),
            value: serde_json::to_string(value)?,
        })
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } | Self::Json { name, .. } => name,
        }
    }

    /// Renders the field into its wire fragment.
    ///
    /// Returns `None` if `boundary` is empty or any of the field's string
    /// values is empty; such fields are dropped from the form.
    #[must_use]
    pub fn render(&self, boundary: &str) -> Option<Vec<u8>> {
        if boundary.is_empty() {
            return None;
        }

        match self {
            Self::Text { name, value } | Self::Json { name, value } => {
                if name.is_empty() || value.is_empty() {
                    return None;
                }
                Some(
                    format!(
                        "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                    )
                    .into_bytes(),
                )
            }
            Self::File {
                name,
                filename,
                content_type,
                data,
            } => {
                if name.is_empty() || filename.is_empty() || content_type.is_empty() {
                    return None;
                }
                let head = format!(
                    "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\nContent-Type: \"{content_type}\"\r\n\r\n"
                );
                let mut fragment = Vec::with_capacity(head.len() + data.len() + 2);
                fragment.extend_from_slice(head.as_bytes());
                fragment.extend_from_slice(data);
                fragment.extend_from_slice(b"\r\n");
                Some(fragment)
            }
        }
    }
}

/// Returns the closing fragment of a multipart body.
#[must_use]
pub fn closing_fragment(boundary: &str) -> String {
    format!("--{boundary}--\r\n")
}

/// Generates a fresh random boundary token.
#[must_use]
pub fn generate_boundary() -> String {
    let token: u128 = rand::thread_rng().gen();
    format!("Boundary-{token:032x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_fragment_format() {
        let fragment = FormDataParameter::text("n", "v").render("b").unwrap();
        assert_eq!(
            String::from_utf8(fragment).unwrap(),
            "--b\r\nContent-Disposition: form-data; name=\"n\"\r\n\r\nv\r\n"
        );
    }

    #[test]
    fn test_file_fragment_format() {
        let param = FormDataParameter::file("avatar", "me.png", "image/png", vec![0x89, 0x50]);
        let fragment = param.render("xyz").unwrap();

        let mut expected = b"--xyz\r\nContent-Disposition: form-data; name=\"avatar\"; filename=\"me.png\"\r\nContent-Type: \"image/png\"\r\n\r\n".to_vec();
        expected.extend_from_slice(&[0x89, 0x50]);
        expected.extend_from_slice(b"\r\n");
        assert_eq!(fragment, expected);
    }

    #[test]
    fn test_json_field_renders_serialized_text() {
        let param = FormDataParameter::json("meta", &serde_json::json!({"k": 1})).unwrap();
        let fragment = String::from_utf8(param.render("b").unwrap()).unwrap();
        assert!(fragment.ends_with("\r\n\r\n{\"k\":1}\r\n"));
        assert_eq!(param.name(), "meta");
    }

    #[test]
    fn test_empty_boundary_renders_nothing() {
        let params = [
            FormDataParameter::text("n", "v"),
            FormDataParameter::file("f", "a.txt", "text/plain", b"x".to_vec()),
            FormDataParameter::json("j", &1).unwrap(),
        ];
        for param in params {
            assert!(param.render("").is_none());
        }
    }

    #[test]
    fn test_empty_required_fields_render_nothing() {
        assert!(FormDataParameter::text("", "v").render("b").is_none());
        assert!(FormDataParameter::text("n", "").render("b").is_none());
        assert!(FormDataParameter::file("f", "", "text/plain", Bytes::new())
            .render("b")
            .is_none());
        assert!(FormDataParameter::file("f", "a.txt", "", Bytes::new())
            .render("b")
            .is_none());
    }

    #[test]
    fn test_file_with_empty_data_still_renders() {
        assert!(FormDataParameter::file("f", "empty.txt", "text/plain", Bytes::new())
            .render("b")
            .is_some());
    }

    #[test]
    fn test_generated_boundaries_are_unique() {
        let a = generate_boundary();
        let b = generate_boundary();
        assert!(a.starts_with("Boundary-"));
        assert_eq!(a.len(), "Boundary-".len() + 32);
        assert_ne!(a, b);
    }
}
