//! Purchase Service - proof-of-purchase submissions and loyalty points

use sea_orm::*;
use serde::Serialize;

use crate::db;
use crate::domain::DomainError;
use crate::infrastructure::LocalStore;
use crate::models::purchase_request::{self, Entity as PurchaseRequest, RequestStatus};
use crate::models::site_settings::GamificationSettings;
use crate::services::gamification::{self, PURCHASE_REQUEST_POINTS, normalize_email};
use crate::services::media::{self, Upload, UploadCategory};
use crate::utils::filename::timestamped_filename;
use crate::utils::time::{now_iso, now_millis};

/// Text fields of the purchase request form.
#[derive(Debug, Clone, Default)]
pub struct PurchaseForm {
    pub full_name: Option<String>,
    pub whatsapp_number: Option<String>,
    pub provider: Option<String>,
    pub domain: Option<String>,
    pub purchase_date: Option<String>,
    pub user_email: Option<String>,
}

impl PurchaseForm {
    /// Set a field by its form name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "full_name" | "fullName" => &mut self.full_name,
            "whatsapp_number" | "whatsappNumber" => &mut self.whatsapp_number,
            "provider" => &mut self.provider,
            "domain" => &mut self.domain,
            "purchase_date" | "purchaseDate" => &mut self.purchase_date,
            "user_email" | "userEmail" | "email" => &mut self.user_email,
            _ => return,
        };
        *slot = Some(value);
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PurchaseReceipt {
    pub success: bool,
    pub request_id: i32,
    pub screenshot_url: String,
    pub points_awarded: i64,
    pub total_points: i64,
    pub level: String,
    pub badges: Vec<String>,
}

#[derive(Debug)]
struct ValidatedForm {
    full_name: String,
    whatsapp_number: String,
    provider: String,
    domain: Option<String>,
    purchase_date: String,
    user_email: String,
}

fn required(value: Option<String>, field: &str, missing: &mut Vec<String>) -> String {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => v,
        _ => {
            missing.push(field.to_string());
            String::new()
        }
    }
}

fn validate_form(form: PurchaseForm) -> Result<ValidatedForm, DomainError> {
    let mut missing = Vec::new();

    let validated = ValidatedForm {
        full_name: required(form.full_name, "full_name", &mut missing),
        whatsapp_number: required(form.whatsapp_number, "whatsapp_number", &mut missing),
        provider: required(form.provider, "provider", &mut missing),
        purchase_date: required(form.purchase_date, "purchase_date", &mut missing),
        user_email: required(form.user_email, "user_email", &mut missing),
        domain: form
            .domain
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty()),
    };

    if !missing.is_empty() {
        return Err(DomainError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    if !validated.user_email.contains('@') {
        return Err(DomainError::Validation("user_email is not a valid email".into()));
    }

    Ok(validated)
}

/// Store the screenshot, record the request and award points.
///
/// The request row and the point award commit together. If the database
/// step fails, the stored screenshot is removed again.
pub async fn submit(
    db: &DatabaseConnection,
    store: &LocalStore,
    table: &GamificationSettings,
    form: PurchaseForm,
    screenshot: Option<Upload>,
) -> Result<PurchaseReceipt, DomainError> {
    let form = validate_form(form)?;
    let screenshot =
        screenshot.ok_or_else(|| DomainError::Validation("screenshot is required".into()))?;
    media::validate(&screenshot)?;

    let filename = timestamped_filename(&screenshot.original_name, now_millis());
    let stored = store
        .save(UploadCategory::PurchaseProofs.as_str(), &filename, &screenshot.data)
        .await?;

    match record(db, table, form, &stored.url).await {
        Ok(receipt) => Ok(receipt),
        Err(e) => {
            store.remove(&stored.key).await;
            Err(e)
        }
    }
}

async fn record(
    db: &DatabaseConnection,
    table: &GamificationSettings,
    form: ValidatedForm,
    screenshot_url: &str,
) -> Result<PurchaseReceipt, DomainError> {
    let email = normalize_email(&form.user_email);
    let txn = db.begin().await?;

    let request = purchase_request::ActiveModel {
        full_name: Set(form.full_name),
        whatsapp_number: Set(form.whatsapp_number),
        provider: Set(form.provider),
        domain: Set(form.domain),
        purchase_date: Set(form.purchase_date),
        user_email: Set(email.clone()),
        screenshot_url: Set(screenshot_url.to_string()),
        status: Set(RequestStatus::Pending.as_str().to_string()),
        created_at: Set(now_iso()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let user =
        gamification::award_points(&txn, table, &email, PURCHASE_REQUEST_POINTS).await?;

    txn.commit().await?;

    tracing::info!(
        "Purchase request {} recorded for {} ({} points total)",
        request.id,
        email,
        user.points
    );

    Ok(PurchaseReceipt {
        success: true,
        request_id: request.id,
        screenshot_url: request.screenshot_url,
        points_awarded: PURCHASE_REQUEST_POINTS,
        total_points: user.points,
        badges: user.badge_list()?,
        level: user.level,
    })
}

pub async fn list_requests(
    db: &DatabaseConnection,
    status: Option<RequestStatus>,
) -> Result<Vec<purchase_request::Model>, DomainError> {
    let mut query = PurchaseRequest::find();
    if let Some(status) = status {
        query = query.filter(purchase_request::Column::Status.eq(status.as_str()));
    }
    Ok(query
        .order_by_desc(purchase_request::Column::CreatedAt)
        .order_by_desc(purchase_request::Column::Id)
        .all(db)
        .await?)
}

pub async fn update_status(
    db: &DatabaseConnection,
    id: i32,
    status: RequestStatus,
) -> Result<purchase_request::Model, DomainError> {
    let affected = db::execute(
        db,
        "UPDATE purchase_requests SET status = ? WHERE id = ?",
        vec![status.as_str().into(), id.into()],
    )
    .await?;
    if affected == 0 {
        return Err(DomainError::NotFound(format!("purchase request {}", id)));
    }

    tracing::info!("Purchase request {} marked {}", id, status.as_str());

    PurchaseRequest::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("purchase request {}", id)))
}
