//! Admin dispatcher: `/api/admin/<endpoint>`
//!
//! When `ADMIN_TOKEN` is configured every admin request must carry it as a
//! bearer token.

use axum::{
    Json,
    extract::{Path, Request, State},
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};
use subtle::ConstantTimeEq;

use super::error::{ApiError, ApiResult};
use super::request::{bearer_token, json_body, query};
use super::routing::{AdminEndpoint, resolve};
use super::storefront::parse_action;
use crate::infrastructure::AppState;
use crate::models::product::CatalogOrderEntry;
use crate::models::purchase_request::RequestStatus;
use crate::models::site_settings::SettingsUpdate;
use crate::services::{analytics, catalog, purchase, settings};
use crate::utils::normalize::normalize;

/// Valid `type` values for `POST /api/admin/actions`.
pub const ADMIN_ACTIONS: [&str; 4] = [
    "update_request_status",
    "set_featured",
    "delete_product",
    "reset_clicks",
];

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum AdminAction {
    UpdateRequestStatus { id: i32, status: RequestStatus },
    SetFeatured { product_id: String, is_featured: bool },
    DeleteProduct { product_id: String },
    ResetClicks { product_id: String },
}

#[derive(Debug, Deserialize)]
pub struct RequestsQuery {
    pub status: Option<RequestStatus>,
}

/// Catalog order bodies come either as a bare list or wrapped in `products`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogOrderBody {
    List(Vec<CatalogOrderEntry>),
    Wrapped { products: Vec<CatalogOrderEntry> },
}

impl CatalogOrderBody {
    fn into_entries(self) -> Vec<CatalogOrderEntry> {
        match self {
            CatalogOrderBody::List(entries) | CatalogOrderBody::Wrapped { products: entries } => {
                entries
            }
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/admin/{endpoint}",
    params(("endpoint" = String, Path, description = "analytics | settings | catalog-order | purchase-requests | actions")),
    responses(
        (status = 200, description = "Endpoint response"),
        (status = 401, description = "Missing or wrong admin token"),
        (status = 404, description = "Unknown endpoint; body lists available endpoints"),
        (status = 405, description = "Endpoint does not accept this method")
    )
)]
pub async fn dispatch(
    State(state): State<AppState>,
    method: Method,
    Path(endpoint): Path<String>,
    request: Request,
) -> Response {
    let resolved = authorize(&state, request.headers())
        .and_then(|_| resolve::<AdminEndpoint>(&method, &endpoint));

    let result = match resolved {
        Ok((endpoint, _)) => handle(&state, endpoint, method, request).await,
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| e.into_response())
}

/// `/api/admin` without an endpoint.
pub async fn index(State(state): State<AppState>, method: Method, headers: HeaderMap) -> Response {
    let result = authorize(&state, &headers).and_then(|_| resolve::<AdminEndpoint>(&method, ""));
    match result {
        Ok(_) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => e.into_response(),
    }
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    let Some(expected) = state.config.admin_token.as_deref() else {
        return Ok(());
    };

    match bearer_token(headers) {
        Some(token) if tokens_match(token, expected) => Ok(()),
        _ => {
            tracing::warn!("Admin request rejected: bad or missing token");
            Err(ApiError::Unauthorized)
        }
    }
}

fn tokens_match(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

async fn handle(
    state: &AppState,
    endpoint: AdminEndpoint,
    method: Method,
    request: Request,
) -> ApiResult {
    match endpoint {
        AdminEndpoint::Analytics => {
            let report = analytics::dashboard(state.db())
                .await
                .map_err(|e| ApiError::from_domain("Failed to load analytics", e))?;
            Ok((StatusCode::OK, Json(report)).into_response())
        }
        AdminEndpoint::Settings if method == Method::GET => {
            let site = settings::load(state.db())
                .await
                .map_err(|e| ApiError::from_domain("Failed to load settings", e))?;
            Ok((StatusCode::OK, Json(site)).into_response())
        }
        AdminEndpoint::Settings => {
            let update: SettingsUpdate = json_body(request).await?;
            let site = settings::update(state.db(), update)
                .await
                .map_err(|e| ApiError::from_domain("Failed to update settings", e))?;
            let body = json!({ "success": true, "settings": site });
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        AdminEndpoint::CatalogOrder => {
            let body: CatalogOrderBody = json_body(request).await?;
            let updated = catalog::reorder(state.db(), &body.into_entries())
                .await
                .map_err(|e| ApiError::from_domain("Failed to update catalog order", e))?;
            let body = json!({ "success": true, "updated": updated });
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        AdminEndpoint::PurchaseRequests => {
            let q: RequestsQuery = query(&request)?;
            let requests = purchase::list_requests(state.db(), q.status)
                .await
                .map_err(|e| ApiError::from_domain("Failed to load purchase requests", e))?;
            let body = normalize(json!({ "requests": requests }));
            Ok((StatusCode::OK, Json(body)).into_response())
        }
        AdminEndpoint::Actions => {
            let body: Value = json_body(request).await?;
            let action: AdminAction = parse_action(body, &ADMIN_ACTIONS)?;
            run_action(state, action).await
        }
    }
}

async fn run_action(state: &AppState, action: AdminAction) -> ApiResult {
    let db = state.db();

    let body = match action {
        AdminAction::UpdateRequestStatus { id, status } => {
            let request = purchase::update_status(db, id, status)
                .await
                .map_err(|e| ApiError::from_domain("Failed to update request status", e))?;
            json!({ "success": true, "request": request })
        }
        AdminAction::SetFeatured {
            product_id,
            is_featured,
        } => {
            catalog::set_featured(db, &product_id, is_featured)
                .await
                .map_err(|e| ApiError::from_domain("Failed to update product", e))?;
            json!({ "success": true, "product_id": product_id, "is_featured": is_featured })
        }
        AdminAction::DeleteProduct { product_id } => {
            catalog::delete_product(db, &product_id)
                .await
                .map_err(|e| ApiError::from_domain("Failed to delete product", e))?;
            json!({ "success": true, "product_id": product_id })
        }
        AdminAction::ResetClicks { product_id } => {
            catalog::reset_clicks(db, &product_id)
                .await
                .map_err(|e| ApiError::from_domain("Failed to reset clicks", e))?;
            json!({ "success": true, "product_id": product_id, "clicks": 0 })
        }
    };

    Ok((StatusCode::OK, Json(normalize(body))).into_response())
}
