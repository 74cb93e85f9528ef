//! Media dispatcher: `/api/media/<endpoint>`

use axum::{
    Json,
    body::Body,
    extract::{Path, Request, State},
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::error::{ApiError, ApiResult};
use super::request::{Form, multipart_form, query};
use super::routing::{MediaEndpoint, resolve};
use crate::infrastructure::AppState;
use crate::services::media::{
    self, PLACEHOLDER_SVG, Upload, UploadCategory, content_type_for, validate_relative_path,
};

const IMMUTABLE_CACHE: &str = "public, max-age=31536000, immutable";
const PROXY_CACHE: &str = "public, max-age=86400";

#[derive(Debug, Deserialize)]
pub struct ProxyQuery {
    pub url: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/media/{endpoint}",
    params(("endpoint" = String, Path, description = "upload | upload-remote | image/<path> | proxy")),
    responses(
        (status = 200, description = "Upload result or image bytes"),
        (status = 400, description = "Rejected file or path"),
        (status = 404, description = "Unknown endpoint; body lists available endpoints"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    Path(endpoint): Path<String>,
    request: Request,
) -> Response {
    let result = match resolve::<MediaEndpoint>(&method, &endpoint) {
        Ok((endpoint, rest)) => handle(&state, endpoint, rest, request).await,
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| e.into_response())
}

/// `/api/media` without an endpoint.
pub async fn index(method: Method) -> Response {
    match resolve::<MediaEndpoint>(&method, "") {
        Ok(_) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle(
    state: &AppState,
    endpoint: MediaEndpoint,
    rest: String,
    request: Request,
) -> ApiResult {
    match endpoint {
        MediaEndpoint::Upload => {
            let (category, upload) = read_upload(request).await?;
            let outcome = media::save_local(&state.local_store, category, upload)
                .await
                .map_err(|e| ApiError::from_domain("Failed to store file", e))?;
            Ok((StatusCode::OK, Json(outcome)).into_response())
        }
        MediaEndpoint::UploadRemote => {
            let (category, upload) = read_upload(request).await?;
            let outcome = media::save_remote(state.remote_store.as_ref(), category, upload)
                .await
                .map_err(|e| ApiError::from_domain("Failed to upload file", e))?;
            Ok((StatusCode::OK, Json(outcome)).into_response())
        }
        MediaEndpoint::Image => serve_image(state, &rest).await,
        MediaEndpoint::Proxy => {
            let q: ProxyQuery = query(&request)?;
            proxy(state, q).await
        }
    }
}

async fn read_upload(request: Request) -> Result<(UploadCategory, Upload), ApiError> {
    let Form { fields, file } = multipart_form(request, "file").await?;

    let category = UploadCategory::from_form(fields.get("category").map(String::as_str))?;
    let upload = file.ok_or_else(|| ApiError::Validation("No file provided".into()))?;

    Ok((category, upload))
}

async fn serve_image(state: &AppState, path: &str) -> ApiResult {
    validate_relative_path(path)?;

    match state.local_store.read(path).await {
        Ok(bytes) => Ok(image_response(bytes, content_type_for(path), IMMUTABLE_CACHE)),
        Err(e) => {
            tracing::warn!("Image {} not served: {}", path, e);
            Ok(placeholder())
        }
    }
}

async fn proxy(state: &AppState, q: ProxyQuery) -> ApiResult {
    let raw = q
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("url is required".into()))?;

    let url = url::Url::parse(raw.trim())
        .map_err(|e| ApiError::Validation(format!("Invalid url: {}", e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::Validation(
            "Only http and https urls can be proxied".into(),
        ));
    }

    let response = match state.http.get(url.clone()).send().await {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("Proxy fetch of {} failed: {}", url, e);
            return Ok(placeholder());
        }
    };

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_default();

    if !response.status().is_success() || !content_type.starts_with("image/") {
        tracing::warn!(
            "Proxy fetch of {} returned {} ({})",
            url,
            response.status(),
            content_type
        );
        return Ok(placeholder());
    }

    match response.bytes().await {
        Ok(bytes) => Ok(image_response(bytes.to_vec(), &content_type, PROXY_CACHE)),
        Err(e) => {
            tracing::warn!("Proxy body read from {} failed: {}", url, e);
            Ok(placeholder())
        }
    }
}

fn image_response(bytes: Vec<u8>, content_type: &str, cache: &'static str) -> Response {
    let mut res = Response::new(Body::from(bytes));
    let headers = res.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream")),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(cache));
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    res
}

fn placeholder() -> Response {
    image_response(
        PLACEHOLDER_SVG.as_bytes().to_vec(),
        "image/svg+xml",
        "no-cache",
    )
}
