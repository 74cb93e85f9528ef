//! Media Service - upload validation and persistence

use serde::Serialize;

use crate::domain::{DomainError, RemoteStore, StoredFile};
use crate::infrastructure::LocalStore;
use crate::utils::filename::timestamped_filename;
use crate::utils::time::now_millis;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const ALLOWED_MIME_TYPES: [&str; 6] = [
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
];

/// Served when an image is missing or an upstream fetch fails.
pub const PLACEHOLDER_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="400" height="300" viewBox="0 0 400 300"><rect width="400" height="300" fill="#e5e7eb"/><text x="200" y="155" font-family="sans-serif" font-size="18" fill="#9ca3af" text-anchor="middle">No image</text></svg>"##;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadCategory {
    Products,
    Banners,
    Avatars,
    General,
    /// Proof-of-purchase screenshots; never selectable from the upload form
    PurchaseProofs,
}

impl UploadCategory {
    /// Categories a client may pick on the upload endpoints.
    pub const SELECTABLE: [UploadCategory; 4] = [
        UploadCategory::Products,
        UploadCategory::Banners,
        UploadCategory::Avatars,
        UploadCategory::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            UploadCategory::Products => "products",
            UploadCategory::Banners => "banners",
            UploadCategory::Avatars => "avatars",
            UploadCategory::General => "general",
            UploadCategory::PurchaseProofs => "purchase-proofs",
        }
    }

    /// Parse the optional `category` form field. Missing or blank means `general`.
    pub fn from_form(value: Option<&str>) -> Result<Self, DomainError> {
        let value = match value.map(str::trim) {
            None | Some("") => return Ok(UploadCategory::General),
            Some(v) => v,
        };

        Self::SELECTABLE
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| {
                let names: Vec<&str> = Self::SELECTABLE.iter().map(|c| c.as_str()).collect();
                DomainError::Validation(format!(
                    "Invalid category '{}'. Allowed: {}",
                    value,
                    names.join(", ")
                ))
            })
    }
}

/// A file received from a multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub original_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
pub struct UploadOutcome {
    pub success: bool,
    pub url: String,
    pub filename: String,
    pub size: usize,
    #[serde(rename = "type")]
    pub content_type: String,
    pub category: String,
}

pub fn validate(upload: &Upload) -> Result<(), DomainError> {
    let content_type = upload.content_type.to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&content_type.as_str()) {
        return Err(DomainError::Validation(format!(
            "Invalid file type '{}'. Allowed: {}",
            upload.content_type,
            ALLOWED_MIME_TYPES.join(", ")
        )));
    }
    if upload.data.is_empty() {
        return Err(DomainError::Validation("File is empty".into()));
    }
    if upload.data.len() > MAX_UPLOAD_BYTES {
        return Err(DomainError::Validation(format!(
            "File too large ({} bytes). Maximum size is 10MB",
            upload.data.len()
        )));
    }
    Ok(())
}

fn outcome(
    stored: StoredFile,
    filename: String,
    upload: &Upload,
    category: UploadCategory,
) -> UploadOutcome {
    UploadOutcome {
        success: true,
        url: stored.url,
        filename,
        size: upload.data.len(),
        content_type: upload.content_type.clone(),
        category: category.as_str().to_string(),
    }
}

/// Validate, then write under `<upload root>/<category>/<millis>_<name>`.
pub async fn save_local(
    store: &LocalStore,
    category: UploadCategory,
    upload: Upload,
) -> Result<UploadOutcome, DomainError> {
    validate(&upload)?;

    let filename = timestamped_filename(&upload.original_name, now_millis());
    let stored = store.save(category.as_str(), &filename, &upload.data).await?;

    tracing::info!("Stored upload {} ({} bytes)", stored.key, upload.data.len());
    Ok(outcome(stored, filename, &upload, category))
}

/// Validate, then push to the remote media host.
pub async fn save_remote(
    store: &dyn RemoteStore,
    category: UploadCategory,
    upload: Upload,
) -> Result<UploadOutcome, DomainError> {
    validate(&upload)?;

    let filename = timestamped_filename(&upload.original_name, now_millis());
    let stored = store
        .put(category.as_str(), &filename, upload.data.clone())
        .await?;

    tracing::info!("Uploaded {} to remote store", stored.key);
    Ok(outcome(stored, filename, &upload, category))
}

/// Reject anything that could escape the upload root.
pub fn validate_relative_path(path: &str) -> Result<(), DomainError> {
    if path.trim().is_empty() {
        return Err(DomainError::Validation("Image path is required".into()));
    }
    if path.contains("..") || path.contains('\\') || path.contains('\0') {
        return Err(DomainError::Validation("Invalid image path".into()));
    }
    if path.starts_with('/') || path.contains(':') {
        return Err(DomainError::Validation("Image path must be relative".into()));
    }
    Ok(())
}

/// Content type inferred from the file extension.
pub fn content_type_for(path: &str) -> &'static str {
    let ext = path
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "avif" => "image/avif",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}
