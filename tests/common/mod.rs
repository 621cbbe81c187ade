//! Shared helpers for integration tests.
//!
//! Tests run against the embedded backend with an in-memory database; the
//! adapter pins the pool to a single persistent connection so every helper
//! sees the same tables.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use async_trait::async_trait;
use ticketgate::auth::{Claims, Role, StaticTokenAuthenticator};
use ticketgate::config::DatabaseConfig;
use ticketgate::db::{Backend, Db, DbError, Row, SqlParam};
use ticketgate::params;
use ticketgate::render::SvgCodeRenderer;
use ticketgate::repo::{EventRepo, TicketRepo};
use ticketgate::routes::create_routes;
use ticketgate::services::{
    EventCatalog, SystemCodeGenerator, TicketCodeGenerator, TicketIssuance, TicketReporting,
    TicketValidation,
};
use ticketgate::state::AppState;

pub const ADMIN_TOKEN: &str = "admin-token";
pub const BUYER_TOKEN: &str = "buyer-token";

pub async fn test_db() -> Db {
    Db::connect(&DatabaseConfig::Sqlite {
        path: PathBuf::from(":memory:"),
    })
    .await
    .expect("in-memory database should connect")
}

/// Insert a user row directly; identity provisioning is external in
/// production, so tests seed the table through the adapter.
pub async fn seed_user(db: &Db, username: &str, role: &str) -> i64 {
    db.insert(
        "INSERT INTO users (username, email, password_hash, role) VALUES (?, ?, ?, ?)",
        &params![
            username,
            format!("{username}@example.com"),
            "managed-externally",
            role
        ],
    )
    .await
    .expect("user insert should succeed")
}

pub async fn seed_event(
    db: &Db,
    name: &str,
    price: f64,
    stock: i64,
    owner_id: Option<i64>,
) -> i64 {
    db.insert(
        "INSERT INTO events (name, description, date, location, price, stock, image_url, owner_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        &params![
            name,
            Some("seeded".to_string()),
            "2026-09-01",
            "Main Hall",
            price,
            stock,
            "https://example.com/event.png",
            owner_id
        ],
    )
    .await
    .expect("event insert should succeed")
}

pub async fn event_stock(db: &Db, event_id: i64) -> i64 {
    db.fetch_one("SELECT stock FROM events WHERE id = ?", &params![event_id])
        .await
        .expect("stock query should succeed")
        .expect("event should exist")
        .get_i64("stock")
        .expect("stock should be an integer")
}

pub fn issuance(db: &Db) -> TicketIssuance {
    issuance_with_codes(db, Arc::new(SystemCodeGenerator))
}

pub fn issuance_with_codes(db: &Db, codes: Arc<dyn TicketCodeGenerator>) -> TicketIssuance {
    TicketIssuance::new(EventRepo::new(db.clone()), TicketRepo::new(db.clone()), codes)
}

pub fn validation(db: &Db) -> TicketValidation {
    TicketValidation::new(TicketRepo::new(db.clone()))
}

pub fn reporting(db: &Db) -> TicketReporting {
    TicketReporting::new(TicketRepo::new(db.clone()))
}

pub fn catalog(db: &Db, default_organizer_id: i64) -> EventCatalog {
    EventCatalog::new(
        EventRepo::new(db.clone()),
        TicketRepo::new(db.clone()),
        default_organizer_id,
    )
}

pub fn admin_claims(user_id: i64) -> Claims {
    Claims {
        user_id,
        role: Role::Admin,
    }
}

pub fn buyer_claims(user_id: i64) -> Claims {
    Claims {
        user_id,
        role: Role::User,
    }
}

/// Deterministic code source: hands out the configured codes in order and
/// repeats the last one when exhausted, which lets tests force collisions.
pub struct SequenceCodes {
    codes: Vec<String>,
    next: AtomicUsize,
}

impl SequenceCodes {
    pub fn new(codes: &[&str]) -> Self {
        Self {
            codes: codes.iter().map(|c| c.to_string()).collect(),
            next: AtomicUsize::new(0),
        }
    }
}

impl TicketCodeGenerator for SequenceCodes {
    fn generate(&self) -> String {
        let index = self.next.fetch_add(1, Ordering::SeqCst);
        self.codes[index.min(self.codes.len() - 1)].clone()
    }
}

/// Backend wrapper that fails single-ticket lookups while every other
/// operation goes through, simulating a connection drop between a committed
/// insert and its read-back.
pub struct TicketReadOutage {
    inner: Db,
}

impl TicketReadOutage {
    pub fn new(inner: Db) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Backend for TicketReadOutage {
    async fn fetch_one(&self, sql: &str, params: &[SqlParam]) -> Result<Option<Row>, DbError> {
        if sql.starts_with("SELECT * FROM tickets WHERE id") {
            return Err(DbError::Driver(sqlx::Error::PoolClosed));
        }
        self.inner.fetch_one(sql, params).await
    }

    async fn fetch_all(&self, sql: &str, params: &[SqlParam]) -> Result<Vec<Row>, DbError> {
        self.inner.fetch_all(sql, params).await
    }

    async fn insert(&self, sql: &str, params: &[SqlParam]) -> Result<i64, DbError> {
        self.inner.insert(sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[SqlParam]) -> Result<u64, DbError> {
        self.inner.execute(sql, params).await
    }
}

/// Full app router wired like `main.rs`, with a static token table instead
/// of the external identity service.
pub fn build_app(db: Db, buyer_id: i64, admin_id: i64) -> Router {
    build_app_with_hsts(db, buyer_id, admin_id, false)
}

pub fn build_app_with_hsts(db: Db, buyer_id: i64, admin_id: i64, hsts_enabled: bool) -> Router {
    let authenticator = StaticTokenAuthenticator::default()
        .with_token(BUYER_TOKEN, buyer_claims(buyer_id))
        .with_token(ADMIN_TOKEN, admin_claims(admin_id));

    let state = AppState::new(
        db,
        admin_id,
        Arc::new(SystemCodeGenerator),
        Arc::new(authenticator),
        Arc::new(SvgCodeRenderer),
    );
    create_routes(state, hsts_enabled)
}

pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap_or(serde_json::json!({}));
    (status, json)
}
