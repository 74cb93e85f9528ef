//! Body and query extraction inside the dispatchers.
//!
//! The dispatchers take the raw request and only decode a body once the
//! endpoint is known, so decoding failures surface as 400s here.

use std::collections::HashMap;

use axum::{
    Json,
    extract::{FromRequest, Multipart, Query, Request},
    http::{HeaderMap, header},
};
use serde::de::DeserializeOwned;

use super::error::ApiError;
use crate::services::media::Upload;

pub async fn json_body<T: DeserializeOwned>(request: Request) -> Result<T, ApiError> {
    Json::<T>::from_request(request, &())
        .await
        .map(|Json(value)| value)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

pub fn query<T: DeserializeOwned>(request: &Request) -> Result<T, ApiError> {
    Query::<T>::try_from_uri(request.uri())
        .map(|Query(value)| value)
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))
}

/// Text fields and the file part named `file_field` of a multipart form.
#[derive(Debug, Default)]
pub struct Form {
    pub fields: HashMap<String, String>,
    pub file: Option<Upload>,
}

pub async fn multipart_form(request: Request, file_field: &str) -> Result<Form, ApiError> {
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|rejection| ApiError::Validation(rejection.body_text()))?;

    let mut form = Form::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Invalid multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == file_field {
            let original_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Validation(format!("Failed to read file: {}", e)))?;

            form.file = Some(Upload {
                original_name,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| {
                    ApiError::Validation(format!("Failed to read field {}: {}", name, e))
                })?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}
