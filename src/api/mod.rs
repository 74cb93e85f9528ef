pub mod admin;
pub mod error;
pub mod health;
pub mod media;
pub mod request;
pub mod routing;
pub mod storefront;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{any, get},
};

use crate::infrastructure::AppState;
use crate::services::media::MAX_UPLOAD_BYTES;

/// Multipart overhead allowed on top of the largest accepted file, so an
/// oversized file reaches validation instead of failing body extraction.
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 2 * 1024 * 1024;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Public storefront
        .route("/core", any(storefront::index))
        .route("/core/*endpoint", any(storefront::dispatch))
        // Admin dashboard
        .route("/admin", any(admin::index))
        .route("/admin/*endpoint", any(admin::dispatch))
        // Uploads and images
        .route("/media", any(media::index))
        .route("/media/*endpoint", any(media::dispatch))
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
