// src/utils/form.rs

use std::collections::HashMap;

use axum::{body::Bytes, extract::Multipart};

use crate::error::AppError;

/// Field names the UI uses for uploaded images.
const IMAGE_FIELDS: [&str; 3] = ["images", "images[]", "image"];

/// A file part of a multipart request, buffered in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub field: String,
    /// Client-side filename. Only its extension is ever used.
    pub file_name: Option<String>,
    pub data: Bytes,
}

/// Buffered multipart form: text fields by name plus file parts in submission order.
///
/// The whole form is read before anything is validated or written, so a
/// validation failure never leaves a file or row behind.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: Vec<UploadedFile>,
}

impl FormData {
    pub async fn from_multipart(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let data = field.bytes().await?;
                    // Browsers submit an empty part when no file was picked.
                    if data.is_empty() {
                        continue;
                    }
                    form.files.push(UploadedFile {
                        field: name,
                        file_name: Some(file_name),
                        data,
                    });
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Builds a form from text fields only.
    pub fn from_fields<'a>(fields: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        FormData {
            fields: fields
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: Vec::new(),
        }
    }

    /// Raw text value of a field, if submitted.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Trimmed value of a field, `None` when missing or blank.
    pub fn non_empty(&self, name: &str) -> Option<&str> {
        self.text(name).map(str::trim).filter(|v| !v.is_empty())
    }

    /// Untrimmed value of a field, `None` when missing or blank.
    /// For markdown, where indentation and trailing newlines matter.
    pub fn text_non_blank(&self, name: &str) -> Option<&str> {
        self.text(name).filter(|v| !v.trim().is_empty())
    }

    /// Parses an integer field. Missing or blank means absent; garbage is a 400.
    pub fn parse_i64(&self, name: &str) -> Result<Option<i64>, AppError> {
        match self.non_empty(name) {
            Some(value) => value
                .parse::<i64>()
                .map(Some)
                .map_err(|_| AppError::BadRequest(format!("Field '{}' must be an integer", name))),
            None => Ok(None),
        }
    }

    /// Uploaded images, in submission order.
    pub fn images(&self) -> Vec<&UploadedFile> {
        self.files
            .iter()
            .filter(|f| IMAGE_FIELDS.contains(&f.field.as_str()))
            .collect()
    }

    #[cfg(test)]
    pub fn with_file(mut self, field: &str, file_name: &str, data: &'static [u8]) -> Self {
        self.files.push(UploadedFile {
            field: field.to_string(),
            file_name: Some(file_name.to_string()),
            data: Bytes::from_static(data),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_and_missing_fields() {
        let form = FormData::from_fields([("title", "  "), ("notes", " dx ")]);
        assert_eq!(form.non_empty("title"), None);
        assert_eq!(form.non_empty("notes"), Some("dx"));
        assert_eq!(form.text_non_blank("notes"), Some(" dx "));
        assert_eq!(form.text_non_blank("title"), None);
        assert_eq!(form.text_non_blank("missing"), None);
        assert_eq!(form.text("title"), Some("  "));
        assert_eq!(form.non_empty("missing"), None);
    }

    #[test]
    fn images_keep_submission_order_and_ignore_other_fields() {
        let form = FormData::default()
            .with_file("images", "b.png", b"b")
            .with_file("attachment", "c.pdf", b"c")
            .with_file("images[]", "a.png", b"a");
        let names: Vec<_> = form
            .images()
            .iter()
            .map(|f| f.file_name.clone().unwrap())
            .collect();
        assert_eq!(names, vec!["b.png", "a.png"]);
    }
}
