use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use dealhub::config::Config;
use dealhub::infrastructure::AppState;
use dealhub::models::site_settings::{self, SETTINGS_ID};
use dealhub::{db, server};
use sea_orm::{DatabaseConnection, EntityTrait};
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

async fn setup(dir: &tempfile::TempDir) -> (DatabaseConnection, Router) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let app = server::build_router(AppState::new(
        db.clone(),
        Config::for_uploads("sqlite::memory:", dir.path()),
    ));
    (db, app)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn put_settings(body: Value) -> Request<Body> {
    Request::builder()
        .method("PUT")
        .uri("/api/admin/settings")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_settings_row_is_seeded_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (db, app) = setup(&dir).await;

    let row = site_settings::Entity::find_by_id(SETTINGS_ID)
        .one(&db)
        .await
        .unwrap();
    assert!(row.is_some());

    let response = app.oneshot(get("/api/admin/settings")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["currency_rates"]["base"], "IDR");
    assert_eq!(body["gamification"]["levels"][0]["name"], "Bronze");
    assert_eq!(body["gamification"]["levels"][1]["min_points"], 50_000_000);
}

#[tokio::test]
async fn test_settings_json_sub_objects_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let (db, app) = setup(&dir).await;

    let banners = json!([
        { "id": "b1", "image_url": "/api/media/image/banners/1_a.png", "link_url": "https://example.com", "title": "Promo", "is_active": true, "position": 1 },
        { "id": "b2", "image_url": "/api/media/image/banners/2_b.png", "is_active": false }
    ]);
    let popup = json!({ "enabled": true, "title": "Hi", "message": "Welcome", "delay_ms": 3000 });

    let response = app
        .clone()
        .oneshot(put_settings(json!({
            "site_name": "Deal Corner",
            "contact_whatsapp": "628111",
            "banners": banners,
            "popup_modal": popup,
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Stored columns hold JSON text
    let row = site_settings::Entity::find_by_id(SETTINGS_ID)
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    let stored: Value = serde_json::from_str(&row.banners).unwrap();
    assert_eq!(stored[0]["position"], 1);

    let body = body_json(app.clone().oneshot(get("/api/admin/settings")).await.unwrap()).await;
    assert_eq!(body["site_name"], "Deal Corner");
    assert_eq!(body["contact_whatsapp"], "628111");
    assert_eq!(body["banners"][0], banners[0]);
    assert_eq!(body["banners"][1]["is_active"], false);
    assert_eq!(body["popup_modal"]["delay_ms"], 3000);
    assert_eq!(body["popup_modal"]["enabled"], true);

    // Public view only shows active banners
    let public = body_json(app.oneshot(get("/api/core/settings")).await.unwrap()).await;
    assert_eq!(public["banners"].as_array().unwrap().len(), 1);
    assert_eq!(public["banners"][0]["id"], "b1");
}

#[tokio::test]
async fn test_invalid_settings_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (_db, app) = setup(&dir).await;

    let response = app
        .clone()
        .oneshot(put_settings(json!({
            "gamification": {
                "levels": [
                    { "name": "Gold", "min_points": 100 },
                    { "name": "Bronze", "min_points": 0 }
                ],
                "badges": []
            }
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Nothing was persisted
    let body = body_json(app.oneshot(get("/api/admin/settings")).await.unwrap()).await;
    assert_eq!(body["gamification"]["levels"][0]["name"], "Bronze");
}

#[tokio::test]
async fn test_currency_conversion_uses_stored_rates() {
    let dir = tempfile::tempdir().unwrap();
    let (_db, app) = setup(&dir).await;

    let response = app
        .clone()
        .oneshot(put_settings(json!({
            "currency_rates": { "base": "IDR", "rates": { "IDR": 1.0, "USD": 0.0001, "EUR": 0.00005 } }
        })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(get("/api/core/convert?amount=100000&from=idr&to=usd"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["from"], "IDR");
    assert_eq!(body["to"], "USD");
    assert!((body["result"].as_f64().unwrap() - 10.0).abs() < 1e-9);

    let unknown = app
        .oneshot(get("/api/core/convert?amount=1&from=IDR&to=JPY"))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::BAD_REQUEST);
}
