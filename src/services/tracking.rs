//! Click tracking for outbound deal links

use sea_orm::sea_query::Expr;
use sea_orm::*;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::DomainError;
use crate::models::click_event;
use crate::models::product::{self, Entity as Product};
use crate::utils::net::ClientInfo;
use crate::utils::time::now_iso;

#[derive(Debug, Clone, Deserialize)]
pub struct ClickInput {
    #[serde(alias = "productId")]
    pub product_id: Option<String>,
    #[serde(default, alias = "productName")]
    pub product_name: Option<String>,
    #[serde(default, alias = "productType")]
    pub product_type: Option<String>,
}

/// Record one click and bump the product's counter.
///
/// Both writes share a transaction, so the event log and `products.clicks`
/// never disagree.
pub async fn track_click(
    db: &DatabaseConnection,
    input: ClickInput,
    client: ClientInfo,
) -> Result<click_event::Model, DomainError> {
    let product_id = input
        .product_id
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| DomainError::Validation("product_id is required".into()))?;

    let event = click_event::Model {
        id: Uuid::new_v4().to_string(),
        product_id,
        product_name: input.product_name,
        product_type: input.product_type,
        ip_address: client.ip_address,
        user_agent: client.user_agent,
        referrer: client.referrer,
        timestamp: now_iso(),
    };

    let txn = db.begin().await?;

    let res = Product::update_many()
        .col_expr(
            product::Column::Clicks,
            Expr::col(product::Column::Clicks).add(1),
        )
        .filter(product::Column::Id.eq(event.product_id.as_str()))
        .exec(&txn)
        .await?;

    if res.rows_affected == 0 {
        txn.rollback().await?;
        return Err(DomainError::NotFound(format!("product {}", event.product_id)));
    }

    let row = click_event::ActiveModel {
        id: Set(event.id.clone()),
        product_id: Set(event.product_id.clone()),
        product_name: Set(event.product_name.clone()),
        product_type: Set(event.product_type.clone()),
        ip_address: Set(event.ip_address.clone()),
        user_agent: Set(event.user_agent.clone()),
        referrer: Set(event.referrer.clone()),
        timestamp: Set(event.timestamp.clone()),
    };
    click_event::Entity::insert(row)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    tracing::debug!("Click tracked for {} from {}", event.product_id, event.ip_address);
    Ok(event)
}
