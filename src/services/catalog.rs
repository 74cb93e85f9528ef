//! Catalog Service - product listing and admin maintenance

use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::*;

use crate::domain::DomainError;
use crate::models::product::{self, CatalogOrderEntry, Entity as Product, Placement};
use crate::utils::time::now_iso;

/// Filter parameters for listing products
#[derive(Debug, Default, Clone)]
pub struct ProductFilter {
    pub placement: Option<Placement>,
    pub product_type: Option<String>,
}

pub async fn list_products(
    db: &DatabaseConnection,
    filter: ProductFilter,
) -> Result<Vec<product::Model>, DomainError> {
    let mut condition = Condition::all();

    match filter.placement {
        Some(Placement::Landing) => {
            condition = condition.add(product::Column::ShowOnLanding.eq(true));
        }
        Some(Placement::Home) => {
            condition = condition.add(product::Column::ShowOnHome.eq(true));
        }
        None => {}
    }

    if let Some(product_type) = filter.product_type
        && !product_type.is_empty()
    {
        condition = condition.add(product::Column::ProductType.eq(product_type));
    }

    Ok(Product::find()
        .filter(condition)
        .order_by_asc(product::Column::DisplayOrder)
        .order_by_desc(product::Column::IsFeatured)
        .order_by_asc(product::Column::Name)
        .all(db)
        .await?)
}

/// Apply a new display order and visibility to a batch of products.
///
/// All updates run in one transaction: either every entry is applied or,
/// on the first failure, none is.
pub async fn reorder(
    db: &DatabaseConnection,
    entries: &[CatalogOrderEntry],
) -> Result<usize, DomainError> {
    if entries.is_empty() {
        return Err(DomainError::Validation("no products to reorder".into()));
    }
    if let Some(entry) = entries.iter().find(|e| e.id.trim().is_empty()) {
        return Err(DomainError::Validation(format!(
            "invalid product id at display_order {}",
            entry.display_order
        )));
    }

    let txn = db.begin().await?;

    match apply_order(&txn, entries).await {
        Ok(count) => {
            txn.commit().await?;
            tracing::info!("Catalog reordered ({} products)", count);
            Ok(count)
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Catalog reorder rollback failed: {}", rollback_err);
            }
            tracing::warn!("Catalog reorder rolled back: {}", e);
            Err(e)
        }
    }
}

async fn apply_order(
    txn: &DatabaseTransaction,
    entries: &[CatalogOrderEntry],
) -> Result<usize, DomainError> {
    let now = now_iso();

    for entry in entries {
        let res = Product::update_many()
            .col_expr(product::Column::DisplayOrder, Expr::value(entry.display_order))
            .col_expr(product::Column::ShowOnLanding, Expr::value(entry.show_on_landing))
            .col_expr(product::Column::ShowOnHome, Expr::value(entry.show_on_home))
            .col_expr(product::Column::UpdatedAt, Expr::value(now.clone()))
            .filter(product::Column::Id.eq(entry.id.as_str()))
            .exec(txn)
            .await?;

        if res.rows_affected == 0 {
            return Err(DomainError::Validation(format!(
                "product {} does not exist",
                entry.id
            )));
        }
    }

    Ok(entries.len())
}

pub async fn set_featured(
    db: &DatabaseConnection,
    product_id: &str,
    is_featured: bool,
) -> Result<(), DomainError> {
    update_one(
        db,
        product_id,
        product::Column::IsFeatured,
        Expr::value(is_featured),
    )
    .await
}

pub async fn reset_clicks(db: &DatabaseConnection, product_id: &str) -> Result<(), DomainError> {
    update_one(db, product_id, product::Column::Clicks, Expr::value(0i64)).await
}

pub async fn delete_product(db: &DatabaseConnection, product_id: &str) -> Result<(), DomainError> {
    let res = Product::delete_by_id(product_id).exec(db).await?;
    if res.rows_affected == 0 {
        return Err(DomainError::NotFound(format!("product {}", product_id)));
    }
    tracing::info!("Product {} deleted", product_id);
    Ok(())
}

async fn update_one(
    db: &DatabaseConnection,
    product_id: &str,
    column: product::Column,
    value: SimpleExpr,
) -> Result<(), DomainError> {
    let res = Product::update_many()
        .col_expr(column, value)
        .col_expr(product::Column::UpdatedAt, Expr::value(now_iso()))
        .filter(product::Column::Id.eq(product_id))
        .exec(db)
        .await?;

    if res.rows_affected == 0 {
        return Err(DomainError::NotFound(format!("product {}", product_id)));
    }
    Ok(())
}
