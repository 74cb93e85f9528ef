//! Storefront dispatcher: `/api/core/<endpoint>`

use axum::{
    Json,
    extract::{Path, Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::{ApiError, ApiResult};
use super::request::{json_body, multipart_form, query};
use super::routing::{CoreEndpoint, resolve};
use crate::infrastructure::AppState;
use crate::models::product::Placement;
use crate::services::purchase::PurchaseForm;
use crate::services::tracking::ClickInput;
use crate::services::{catalog, currency, gamification, purchase, settings, tracking};
use crate::utils::net::ClientInfo;
use crate::utils::normalize::normalize;

/// Valid `type` values for `POST /api/core/actions`.
pub const CORE_ACTIONS: [&str; 3] = ["track_click", "get_profile", "convert"];

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum CoreAction {
    TrackClick(ClickInput),
    GetProfile(ProfileQuery),
    Convert(ConvertQuery),
}

#[derive(Debug, Deserialize)]
pub struct ProductsQuery {
    pub placement: Option<Placement>,
    #[serde(rename = "type")]
    pub product_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

#[utoipa::path(
    get,
    path = "/api/core/{endpoint}",
    params(("endpoint" = String, Path, description = "products | settings | gamification | convert")),
    responses(
        (status = 200, description = "Endpoint response"),
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
    let result = match resolve::<CoreEndpoint>(&method, &endpoint) {
        Ok((endpoint, _)) => handle(&state, endpoint, request).await,
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| e.into_response())
}

/// `/api/core` without an endpoint.
pub async fn index(method: Method) -> Response {
    match resolve::<CoreEndpoint>(&method, "") {
        Ok(_) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => e.into_response(),
    }
}

async fn handle(state: &AppState, endpoint: CoreEndpoint, request: Request) -> ApiResult {
    match endpoint {
        CoreEndpoint::Products => products(state, request).await,
        CoreEndpoint::Settings => public_settings(state).await,
        CoreEndpoint::TrackClick => {
            let client = ClientInfo::from_headers(request.headers());
            let input: ClickInput = json_body(request).await?;
            track_click(state, input, client).await
        }
        CoreEndpoint::PurchaseRequest => purchase_request(state, request).await,
        CoreEndpoint::Gamification => {
            let q: ProfileQuery = query(&request)?;
            profile(state, q).await
        }
        CoreEndpoint::Convert => {
            let q: ConvertQuery = query(&request)?;
            convert(state, q).await
        }
        CoreEndpoint::Actions => actions(state, request).await,
    }
}

async fn products(state: &AppState, request: Request) -> ApiResult {
    let q: ProductsQuery = query(&request)?;
    let filter = catalog::ProductFilter {
        placement: q.placement,
        product_type: q.product_type,
    };

    let products = catalog::list_products(state.db(), filter)
        .await
        .map_err(|e| ApiError::from_domain("Failed to load products", e))?;

    Ok((StatusCode::OK, Json(normalize(json!({ "products": products })))).into_response())
}

async fn public_settings(state: &AppState) -> ApiResult {
    let mut site = settings::load(state.db())
        .await
        .map_err(|e| ApiError::from_domain("Failed to load settings", e))?;
    site.banners.retain(|b| b.is_active);

    Ok((StatusCode::OK, Json(site)).into_response())
}

async fn track_click(state: &AppState, input: ClickInput, client: ClientInfo) -> ApiResult {
    let event = tracking::track_click(state.db(), input, client)
        .await
        .map_err(|e| ApiError::from_domain("Failed to track click", e))?;

    Ok((
        StatusCode::OK,
        Json(json!({ "success": true, "event_id": event.id })),
    )
        .into_response())
}

async fn purchase_request(state: &AppState, request: Request) -> ApiResult {
    let form = multipart_form(request, "screenshot").await?;

    let mut fields = PurchaseForm::default();
    for (name, value) in form.fields {
        fields.set(&name, value);
    }

    let site = settings::load(state.db())
        .await
        .map_err(|e| ApiError::from_domain("Failed to load settings", e))?;

    let receipt = purchase::submit(
        state.db(),
        &state.local_store,
        &site.gamification,
        fields,
        form.file,
    )
    .await
    .map_err(|e| ApiError::from_domain("Failed to submit purchase request", e))?;

    Ok((StatusCode::OK, Json(receipt)).into_response())
}

async fn profile(state: &AppState, q: ProfileQuery) -> ApiResult {
    let email = q
        .email
        .ok_or_else(|| ApiError::Validation("email is required".into()))?;

    let site = settings::load(state.db())
        .await
        .map_err(|e| ApiError::from_domain("Failed to load settings", e))?;
    let profile = gamification::get_profile(state.db(), &site.gamification, &email)
        .await
        .map_err(|e| ApiError::from_domain("Failed to load profile", e))?;

    Ok((StatusCode::OK, Json(profile)).into_response())
}

async fn convert(state: &AppState, q: ConvertQuery) -> ApiResult {
    let site = settings::load(state.db())
        .await
        .map_err(|e| ApiError::from_domain("Failed to load settings", e))?;
    let conversion = currency::convert(&site.currency_rates, q.amount, &q.from, &q.to)?;

    Ok((StatusCode::OK, Json(conversion)).into_response())
}

async fn actions(state: &AppState, request: Request) -> ApiResult {
    let client = ClientInfo::from_headers(request.headers());
    let body: Value = json_body(request).await?;
    let action: CoreAction = parse_action(body, &CORE_ACTIONS)?;

    match action {
        CoreAction::TrackClick(input) => track_click(state, input, client).await,
        CoreAction::GetProfile(q) => profile(state, q).await,
        CoreAction::Convert(q) => convert(state, q).await,
    }
}

/// Decode a `{type, payload}` action, rejecting unknown types with the
/// list of valid ones.
pub fn parse_action<T: serde::de::DeserializeOwned>(
    body: Value,
    valid: &[&str],
) -> Result<T, ApiError> {
    let kind = body
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !valid.contains(&kind.as_str()) {
        return Err(ApiError::Validation(format!(
            "Unknown action type '{}'. Valid types: {}",
            kind,
            valid.join(", ")
        )));
    }

    serde_json::from_value(body)
        .map_err(|e| ApiError::Validation(format!("Invalid payload for {}: {}", kind, e)))
}
