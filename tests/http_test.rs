//! HTTP surface: envelope shapes, auth enforcement, and error mapping.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_health_is_public() {
    let db = common::test_db().await;
    let app = common::build_app(db, 1, 2);

    let (status, body) = common::send_json(app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_hsts_header_follows_config() {
    let db = common::test_db().await;

    let with_hsts = common::build_app_with_hsts(db.clone(), 1, 2, true);
    let response = with_hsts
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("Strict-Transport-Security"));
    assert!(response.headers().contains_key("X-Content-Type-Options"));

    let without_hsts = common::build_app(db, 1, 2);
    let response = without_hsts
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(!response.headers().contains_key("Strict-Transport-Security"));
    assert!(response.headers().contains_key("X-Content-Type-Options"));
}

#[tokio::test]
async fn test_purchase_roundtrip_over_http() {
    let db = common::test_db().await;
    let buyer = common::seed_user(&db, "alice", "user").await;
    let admin = common::seed_user(&db, "organizer", "admin").await;
    let event = common::seed_event(&db, "Expo", 100.0, 10, Some(admin)).await;
    let app = common::build_app(db.clone(), buyer, admin);

    let (status, body) = common::send_json(
        app.clone(),
        "POST",
        "/api/tickets/purchase",
        Some(common::BUYER_TOKEN),
        Some(json!({ "event_id": event, "quantity": 2 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["quantity"], 2);
    assert_eq!(body["data"]["total_price"], 200.0);
    let code = body["data"]["code"].as_str().unwrap().to_string();
    assert!(code.starts_with("TKT"));
    assert!(body["data"]["code_image"]
        .as_str()
        .unwrap()
        .starts_with("data:image/svg+xml;base64,"));
    assert_eq!(common::event_stock(&db, event).await, 8);

    // Scan once: admitted. Scan again: already used.
    let (status, body) = common::send_json(
        app.clone(),
        "POST",
        "/api/tickets/scan",
        Some(common::ADMIN_TOKEN),
        Some(json!({ "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);

    let (status, body) = common::send_json(
        app,
        "POST",
        "/api/tickets/scan",
        Some(common::ADMIN_TOKEN),
        Some(json!({ "code": code })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["reason"], "already_used");
}

#[tokio::test]
async fn test_insufficient_stock_maps_to_bad_request() {
    let db = common::test_db().await;
    let buyer = common::seed_user(&db, "alice", "user").await;
    let event = common::seed_event(&db, "Tiny", 10.0, 1, None).await;
    let app = common::build_app(db, buyer, 99);

    let (status, body) = common::send_json(
        app,
        "POST",
        "/api/tickets/purchase",
        Some(common::BUYER_TOKEN),
        Some(json!({ "event_id": event, "quantity": 5 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "INSUFFICIENT_STOCK");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let db = common::test_db().await;
    let app = common::build_app(db, 1, 2);

    let (status, body) =
        common::send_json(app, "GET", "/api/tickets/my-tickets", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[tokio::test]
async fn test_buyer_token_cannot_reach_admin_surface() {
    let db = common::test_db().await;
    let app = common::build_app(db, 1, 2);

    for uri in ["/api/tickets/all", "/api/tickets/stats"] {
        let (status, body) =
            common::send_json(app.clone(), "GET", uri, Some(common::BUYER_TOKEN), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"]["code"], "FORBIDDEN");
    }
}

#[tokio::test]
async fn test_scan_without_code_is_bad_request() {
    let db = common::test_db().await;
    let app = common::build_app(db, 1, 2);

    let (status, body) = common::send_json(
        app,
        "POST",
        "/api/tickets/scan",
        Some(common::ADMIN_TOKEN),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_unknown_event_maps_to_not_found() {
    let db = common::test_db().await;
    let app = common::build_app(db, 1, 2);

    let (status, body) = common::send_json(app, "GET", "/api/events/424242", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
