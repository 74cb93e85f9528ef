//! Admin analytics - dashboard aggregates over products, clicks and requests

use std::collections::BTreeMap;

use chrono::{Duration, SecondsFormat, Utc};
use sea_orm::*;
use serde::Serialize;

use crate::db;
use crate::domain::DomainError;
use crate::models::{click_event, product, purchase_request, user_gamification};
use crate::utils::normalize::normalize_rows;

const TOP_PRODUCTS: i64 = 10;
const RECENT_CLICKS: i64 = 20;
const CLICK_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct Totals {
    pub products: u64,
    pub clicks: i64,
    pub click_events: u64,
    pub purchase_requests: u64,
    pub gamification_users: u64,
}

#[derive(Debug, Clone, Serialize, FromQueryResult)]
pub struct DailyClicks {
    pub day: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Analytics {
    pub totals: Totals,
    pub requests_by_status: BTreeMap<String, i64>,
    pub top_products: Vec<JsonValue>,
    pub recent_clicks: Vec<JsonValue>,
    pub clicks_by_day: Vec<DailyClicks>,
}

#[derive(Debug, FromQueryResult)]
struct StatusCount {
    status: String,
    count: i64,
}

#[derive(Debug, FromQueryResult)]
struct ClickSum {
    total: Option<i64>,
}

pub async fn dashboard(conn: &DatabaseConnection) -> Result<Analytics, DomainError> {
    let backend = conn.get_database_backend();

    let clicks = ClickSum::find_by_statement(Statement::from_string(
        backend,
        "SELECT SUM(clicks) AS total FROM products",
    ))
    .one(conn)
    .await?
    .and_then(|s| s.total)
    .unwrap_or(0);

    let totals = Totals {
        products: product::Entity::find().count(conn).await?,
        clicks,
        click_events: click_event::Entity::find().count(conn).await?,
        purchase_requests: purchase_request::Entity::find().count(conn).await?,
        gamification_users: user_gamification::Entity::find().count(conn).await?,
    };

    let requests_by_status = StatusCount::find_by_statement(Statement::from_string(
        backend,
        "SELECT status, COUNT(*) AS count FROM purchase_requests GROUP BY status",
    ))
    .all(conn)
    .await?
    .into_iter()
    .map(|row| (row.status, row.count))
    .collect();

    let top_products = db::query(
        conn,
        "SELECT id, name, type, provider, clicks, is_featured, updated_at \
         FROM products ORDER BY clicks DESC, name ASC LIMIT ?",
        vec![TOP_PRODUCTS.into()],
    )
    .await?;

    let recent_clicks = db::query(
        conn,
        "SELECT id, product_id, product_name, product_type, ip_address, user_agent, referrer, timestamp \
         FROM click_events ORDER BY timestamp DESC LIMIT ?",
        vec![RECENT_CLICKS.into()],
    )
    .await?;

    let since = (Utc::now() - Duration::days(CLICK_WINDOW_DAYS))
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    let clicks_by_day = DailyClicks::find_by_statement(Statement::from_sql_and_values(
        backend,
        "SELECT substr(timestamp, 1, 10) AS day, COUNT(*) AS count \
         FROM click_events WHERE timestamp >= ? GROUP BY day ORDER BY day ASC",
        [since.into()],
    ))
    .all(conn)
    .await?;

    Ok(Analytics {
        totals,
        requests_by_status,
        top_products: normalize_rows(top_products),
        recent_clicks: normalize_rows(recent_clicks),
        clicks_by_day,
    })
}
