//! Request bodies for create and update operations

use reqwest::multipart::{Form, Part};
use serde_json::Value;

use crate::error::{Error, Result};

/// Body of a create or update call: a JSON object, or a multipart form for
/// submissions that carry files
#[derive(Debug, Clone)]
pub enum Payload {
    /// JSON document
    Json(Value),
    /// Multipart form
    Form(FormPayload),
}

/// Encoding a proxy route expects for its request body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    /// `application/json`
    Json,
    /// `multipart/form-data`
    Form,
}

impl BodyKind {
    /// Human-readable name used in validation errors
    pub fn describe(self) -> &'static str {
        match self {
            BodyKind::Json => "a JSON body",
            BodyKind::Form => "multipart form data",
        }
    }
}

impl Payload {
    /// Encoding of this payload
    pub fn kind(&self) -> BodyKind {
        match self {
            Payload::Json(_) => BodyKind::Json,
            Payload::Form(_) => BodyKind::Form,
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Json(value)
    }
}

impl From<FormPayload> for Payload {
    fn from(form: FormPayload) -> Self {
        Payload::Form(form)
    }
}

/// A single multipart field
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    /// Plain text field
    Text { name: String, value: String },
    /// Binary file field
    File {
        name: String,
        file_name: String,
        content_type: Option<String>,
        data: Vec<u8>,
    },
}

impl FormField {
    /// Name of the field
    pub fn name(&self) -> &str {
        match self {
            FormField::Text { name, .. } | FormField::File { name, .. } => name,
        }
    }
}

/// Multipart form that can be cloned and inspected before it is sent.
///
/// `reqwest::multipart::Form` is consumed on send, so the fields are kept
/// here and converted at request time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormPayload {
    fields: Vec<FormField>,
}

impl FormPayload {
    /// Create an empty form
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field
    pub fn text<N: Into<String>, V: ToString>(mut self, name: N, value: V) -> Self {
        self.fields.push(FormField::Text {
            name: name.into(),
            value: value.to_string(),
        });
        self
    }

    /// Add a text field when a value is present
    pub fn optional_text<N: Into<String>, V: ToString>(self, name: N, value: Option<V>) -> Self {
        match value {
            Some(value) => self.text(name, value),
            None => self,
        }
    }

    /// Add a file field
    pub fn file<N: Into<String>, F: Into<String>>(
        mut self,
        name: N,
        file_name: F,
        content_type: Option<&str>,
        data: Vec<u8>,
    ) -> Self {
        self.fields.push(FormField::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.map(str::to_string),
            data,
        });
        self
    }

    /// Fields in insertion order
    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    /// Value of the first text field with the given name
    pub fn text_value(&self, name: &str) -> Option<&str> {
        self.fields.iter().find_map(|field| match field {
            FormField::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    /// Whether the form has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Convert into a reqwest multipart form
    pub fn to_multipart(&self) -> Result<Form> {
        let mut form = Form::new();
        for field in &self.fields {
            form = match field {
                FormField::Text { name, value } => form.text(name.clone(), value.clone()),
                FormField::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    let mut part = Part::bytes(data.clone()).file_name(file_name.clone());
                    if let Some(content_type) = content_type {
                        part = part
                            .mime_str(content_type)
                            .map_err(|e| Error::validation(format!("invalid content type: {}", e)))?;
                    }
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_text_skips_missing_values() {
        let form = FormPayload::new()
            .text("title", "Rust 101")
            .optional_text("instructor", None::<String>)
            .optional_text("price", Some(49));

        assert_eq!(form.fields().len(), 2);
        assert_eq!(form.text_value("title"), Some("Rust 101"));
        assert_eq!(form.text_value("price"), Some("49"));
        assert_eq!(form.text_value("instructor"), None);
    }

    #[test]
    fn test_invalid_content_type_is_rejected() {
        let form = FormPayload::new().file("image", "a.png", Some("not a mime"), vec![1, 2, 3]);
        assert!(matches!(form.to_multipart(), Err(Error::Validation(_))));
    }
}
