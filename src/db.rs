use sea_orm::{
    ActiveModelTrait, ConnectionTrait, Database, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, JsonValue, RuntimeErr, Statement, Value,
};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{Column, Row, Sqlite, TypeInfo, ValueRef};

use crate::models::site_settings::{self, SETTINGS_ID, SiteSettings};
use crate::utils::time::now_iso;

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    run_migrations(&db).await?;
    seed_settings(&db).await?;

    Ok(db)
}

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// Run one parameterized statement and return its rows as JSON objects.
///
/// Every result column is kept, including aggregates and expressions that
/// carry no declared type. Values are decoded by their stored SQLite type;
/// columns declared `BOOLEAN` come back as JSON booleans.
///
/// Errors are logged and handed back to the caller, who decides what the
/// client gets to see.
pub async fn query(
    conn: &DatabaseConnection,
    sql: &str,
    values: Vec<Value>,
) -> Result<Vec<JsonValue>, DbErr> {
    if conn.get_database_backend() != DbBackend::Sqlite {
        return Err(DbErr::Custom("raw row queries need a SQLite connection".into()));
    }

    let mut stmt = sqlx::query(sql);
    for value in values {
        stmt = bind(stmt, value)?;
    }

    stmt.fetch_all(conn.get_sqlite_connection_pool())
        .await
        .and_then(|rows| rows.iter().map(row_to_json).collect::<Result<Vec<_>, _>>())
        .map_err(|e| DbErr::Query(RuntimeErr::SqlxError(e)))
        .inspect_err(|e| tracing::error!("query failed: {} ({})", e, sql))
}

fn bind(stmt: SqliteQuery<'_>, value: Value) -> Result<SqliteQuery<'_>, DbErr> {
    let stmt = match value {
        Value::Bool(v) => stmt.bind(v),
        Value::TinyInt(v) => stmt.bind(v.map(i64::from)),
        Value::SmallInt(v) => stmt.bind(v.map(i64::from)),
        Value::Int(v) => stmt.bind(v.map(i64::from)),
        Value::BigInt(v) => stmt.bind(v),
        Value::TinyUnsigned(v) => stmt.bind(v.map(i64::from)),
        Value::SmallUnsigned(v) => stmt.bind(v.map(i64::from)),
        Value::Unsigned(v) => stmt.bind(v.map(i64::from)),
        Value::Float(v) => stmt.bind(v.map(f64::from)),
        Value::Double(v) => stmt.bind(v),
        Value::String(v) => stmt.bind(v.map(|s| *s)),
        Value::Char(v) => stmt.bind(v.map(String::from)),
        Value::Bytes(v) => stmt.bind(v.map(|b| *b)),
        other => {
            return Err(DbErr::Custom(format!(
                "unsupported query parameter: {:?}",
                other
            )));
        }
    };
    Ok(stmt)
}

fn row_to_json(row: &SqliteRow) -> Result<JsonValue, sqlx::Error> {
    let mut map = serde_json::Map::new();

    for column in row.columns() {
        let idx = column.ordinal();
        let raw = row.try_get_raw(idx)?;

        let value = if raw.is_null() {
            JsonValue::Null
        } else {
            match (raw.type_info().name(), column.type_info().name()) {
                ("INTEGER", "BOOLEAN") => JsonValue::Bool(row.try_get(idx)?),
                ("INTEGER", _) => JsonValue::from(row.try_get::<i64, _>(idx)?),
                ("REAL", _) => JsonValue::from(row.try_get::<f64, _>(idx)?),
                ("TEXT", _) => JsonValue::String(row.try_get(idx)?),
                _ => JsonValue::from(row.try_get::<Vec<u8>, _>(idx)?),
            }
        };

        map.insert(column.name().to_string(), value);
    }

    Ok(JsonValue::Object(map))
}

/// Run one parameterized statement that returns no rows.
/// Returns the number of affected rows.
pub async fn execute<C>(conn: &C, sql: &str, values: Vec<Value>) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let stmt = Statement::from_sql_and_values(conn.get_database_backend(), sql, values);
    conn.execute(stmt)
        .await
        .map(|res| res.rows_affected())
        .inspect_err(|e| tracing::error!("statement failed: {} ({})", e, sql))
}

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            type TEXT NOT NULL,
            tier TEXT,
            provider TEXT,
            price REAL,
            original_price REAL,
            currency TEXT NOT NULL DEFAULT 'IDR',
            rating REAL,
            clicks INTEGER NOT NULL DEFAULT 0,
            is_featured BOOLEAN NOT NULL DEFAULT 0,
            display_order INTEGER NOT NULL DEFAULT 0,
            show_on_landing BOOLEAN NOT NULL DEFAULT 0,
            show_on_home BOOLEAN NOT NULL DEFAULT 1,
            target_url TEXT,
            image_url TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_products_display_order ON products(display_order);
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS click_events (
            id TEXT PRIMARY KEY,
            product_id TEXT NOT NULL,
            product_name TEXT,
            product_type TEXT,
            ip_address TEXT NOT NULL,
            user_agent TEXT NOT NULL,
            referrer TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE CASCADE
        );
        CREATE INDEX IF NOT EXISTS idx_click_events_product_id ON click_events(product_id);
        CREATE INDEX IF NOT EXISTS idx_click_events_timestamp ON click_events(timestamp);
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS purchase_requests (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            whatsapp_number TEXT NOT NULL,
            provider TEXT NOT NULL,
            domain TEXT,
            purchase_date TEXT NOT NULL,
            user_email TEXT NOT NULL,
            screenshot_url TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            created_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_purchase_requests_status ON purchase_requests(status);
        CREATE INDEX IF NOT EXISTS idx_purchase_requests_email ON purchase_requests(user_email);
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS user_gamification (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            points INTEGER NOT NULL DEFAULT 0,
            level TEXT NOT NULL,
            badges TEXT NOT NULL DEFAULT '[]',
            achievements TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    db.execute(Statement::from_string(
        db.get_database_backend(),
        r#"
        CREATE TABLE IF NOT EXISTS site_settings (
            id TEXT PRIMARY KEY,
            site_name TEXT NOT NULL,
            contact_whatsapp TEXT,
            banners TEXT NOT NULL DEFAULT '[]',
            popup_modal TEXT NOT NULL DEFAULT '{}',
            appearance TEXT NOT NULL DEFAULT '{}',
            currency_rates TEXT NOT NULL,
            gamification TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#
        .to_owned(),
    ))
    .await?;

    Ok(())
}

// Insert the default settings row if it doesn't exist yet
async fn seed_settings(db: &DatabaseConnection) -> Result<(), DbErr> {
    if site_settings::Entity::find_by_id(SETTINGS_ID)
        .one(db)
        .await?
        .is_some()
    {
        return Ok(());
    }

    let row = SiteSettings::default()
        .to_active_model(&now_iso())
        .map_err(|e| DbErr::Custom(e.to_string()))?;
    row.insert(db).await?;
    tracing::info!("Default site settings created");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn query_keeps_computed_columns() {
        let db = init_db("sqlite::memory:").await.unwrap();

        let rows = query(
            &db,
            "SELECT COUNT(*) AS n, 1 + 1 AS two, 0.5 AS half, id FROM site_settings",
            vec![],
        )
        .await
        .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["n"], 1);
        assert_eq!(rows[0]["two"], 2);
        assert_eq!(rows[0]["half"], 0.5);
        assert_eq!(rows[0]["id"], SETTINGS_ID);
    }

    #[tokio::test]
    async fn query_binds_parameters_and_nulls() {
        let db = init_db("sqlite::memory:").await.unwrap();

        let rows = query(
            &db,
            "SELECT ? AS label, ? AS amount, NULL AS nothing",
            vec!["promo".into(), 7i64.into()],
        )
        .await
        .unwrap();

        assert_eq!(rows[0]["label"], "promo");
        assert_eq!(rows[0]["amount"], 7);
        assert!(rows[0]["nothing"].is_null());
    }

    #[tokio::test]
    async fn execute_reports_affected_rows() {
        let db = init_db("sqlite::memory:").await.unwrap();

        let affected = execute(
            &db,
            "UPDATE site_settings SET site_name = ? WHERE id = ?",
            vec!["Renamed".into(), SETTINGS_ID.into()],
        )
        .await
        .unwrap();
        assert_eq!(affected, 1);

        let rows = query(&db, "SELECT site_name FROM site_settings", vec![])
            .await
            .unwrap();
        assert_eq!(rows[0]["site_name"], "Renamed");
    }
}
