//! Multipart bodies are rebuilt field by field rather than streamed through

use axum::extract::multipart::{Multipart, MultipartRejection};
use reqwest::multipart::{Form, Part};
use tracing::debug;

use crate::error::ProxyError;

/// Rebuild an incoming multipart body as an outbound form.
///
/// Text fields are relayed as text. Fields carrying a file name are relayed
/// as binary parts that keep their file name and content type.
pub async fn rebuild_form(
    multipart: Result<Multipart, MultipartRejection>,
    default_message: &str,
) -> Result<Form, ProxyError> {
    let mut multipart = multipart.map_err(|e| ProxyError::local(e.body_text(), default_message))?;
    let mut form = Form::new();
    let mut fields = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ProxyError::local(e.body_text(), default_message))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);

        form = match file_name {
            Some(file_name) => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ProxyError::local(e.body_text(), default_message))?;
                let mut part = Part::bytes(bytes.to_vec()).file_name(file_name);
                if let Some(content_type) = content_type {
                    part = part
                        .mime_str(&content_type)
                        .map_err(|e| ProxyError::local(e, default_message))?;
                }
                form.part(name, part)
            }
            None => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ProxyError::local(e.body_text(), default_message))?;
                form.text(name, text)
            }
        };
        fields += 1;
    }

    debug!("rebuilt multipart body with {} fields", fields);
    Ok(form)
}
