use std::collections::HashMap;

use actix_multipart::Multipart;
use chrono::{DateTime, NaiveDate};
use futures::StreamExt;
use serde::de::DeserializeOwned;

use crate::error::{CatalogError, Result};
use crate::files::UploadedFile;

/// Text fields and files of a `multipart/form-data` request, fully buffered.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormData {
    /// Upper bound on the number of parts in one form, named or not.
    pub const MAX_PARTS: usize = 32;

    /// Reads every part of the payload. Parts without a name are skipped;
    /// file parts with no content are treated as absent. At most
    /// `MAX_PARTS` parts of `max_part_size` bytes each are buffered.
    pub async fn read(mut payload: Multipart, max_part_size: usize) -> Result<Self> {
        let mut form = FormData::default();
        let mut parts = 0;

        while let Some(field) = payload.next().await {
            parts += 1;
            if parts > Self::MAX_PARTS {
                return Err(CatalogError::validation(format!(
                    "El formulario no debe tener más de {} campos",
                    Self::MAX_PARTS
                )));
            }
            let mut field = field?;
            let disposition = field.content_disposition().clone();
            let Some(name) = disposition.get_name().map(str::to_string) else {
                continue;
            };
            let file_name = disposition.get_filename().map(str::to_string);

            let mut content = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk?;
                if content.len() + chunk.len() > max_part_size {
                    return Err(CatalogError::validation(format!(
                        "El campo {} excede el tamaño máximo de {} bytes",
                        name, max_part_size
                    )));
                }
                content.extend_from_slice(&chunk);
            }

            match file_name {
                Some(file_name) => {
                    if !content.is_empty() {
                        form.files.insert(
                            name,
                            UploadedFile {
                                file_name: Some(file_name),
                                content,
                            },
                        );
                    }
                }
                None => {
                    let text = String::from_utf8(content).map_err(|_| {
                        CatalogError::validation(format!("El campo {} no es texto UTF-8", name))
                    })?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    /// Absent or blank means `false`.
    pub fn flag(&self, name: &str) -> Result<bool> {
        match self.text(name).map(str::trim) {
            None | Some("") => Ok(false),
            Some(value) if value.eq_ignore_ascii_case("true") => Ok(true),
            Some(value) if value.eq_ignore_ascii_case("false") => Ok(false),
            Some(_) => Err(CatalogError::validation(format!(
                "El campo {} debe ser true o false",
                name
            ))),
        }
    }

    /// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
    pub fn date(&self, name: &str) -> Result<Option<NaiveDate>> {
        let Some(value) = self.text(name).map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .or_else(|_| DateTime::parse_from_rfc3339(value).map(|dt| dt.date_naive()))
            .map(Some)
            .map_err(|_| CatalogError::validation(format!("El campo {} no es una fecha válida", name)))
    }

    /// Fields carrying JSON documents, such as id lists.
    pub fn json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let Some(value) = self.text(name).map(str::trim).filter(|v| !v.is_empty()) else {
            return Ok(None);
        };
        serde_json::from_str(value)
            .map(Some)
            .map_err(|e| CatalogError::validation(format!("El campo {} no es válido: {}", name, e)))
    }
}
