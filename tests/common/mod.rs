//! Test utilities and fixtures for Keymint integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use serde_json::Value;

pub use keymint::db::{init_db, queries, AppState};
pub use keymint::handlers;
pub use keymint::lifecycle::{
    evaluate_activation, evaluate_validation, ActivationDecision, ValidationDecision,
};
pub use keymint::models::*;

pub const TEST_ADMIN_KEY: &str = "test-admin-key";

static DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Create an in-memory test database with schema initialized
pub fn setup_test_db() -> Connection {
    let conn = Connection::open_in_memory().expect("Failed to create in-memory database");
    init_db(&conn).expect("Failed to initialize schema");
    conn
}

/// Create an AppState backed by a pooled in-memory database.
///
/// Uses a named shared-cache URI so every pooled connection sees the same
/// database; a unique name per call keeps tests isolated.
pub fn create_test_app_state() -> AppState {
    let n = DB_COUNTER.fetch_add(1, Ordering::Relaxed);
    let uri = format!("file:keymint_test_{}?mode=memory&cache=shared", n);
    let manager = SqliteConnectionManager::file(uri).with_flags(
        OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI,
    );
    let pool = Pool::builder().max_size(4).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        init_db(&conn).unwrap();
    }

    AppState {
        db: pool,
        admin_api_key: Some(TEST_ADMIN_KEY.to_string()),
    }
}

/// Create a Router with the public and admin endpoints
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(handlers::public::router())
        .merge(handlers::admin::router(state.clone()))
        .with_state(state)
}

/// Create a test license directly through the store
pub fn create_test_license(
    conn: &Connection,
    expires_at: Option<i64>,
    max_activations: i32,
) -> License {
    let input = CreateLicense {
        expires_at,
        max_activations: Some(max_activations),
        metadata: None,
    };
    queries::create_license(conn, &input).expect("Failed to create test license")
}

/// Create a test license with explicit metadata
pub fn create_test_license_with_metadata(
    conn: &Connection,
    expires_at: Option<i64>,
    max_activations: i32,
    metadata: Value,
) -> License {
    let input = CreateLicense {
        expires_at,
        max_activations: Some(max_activations),
        metadata: Some(metadata),
    };
    queries::create_license(conn, &input).expect("Failed to create test license")
}

/// Get the current timestamp
pub fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Get a future timestamp (days from now)
pub fn future_timestamp(days: i64) -> i64 {
    now() + (days * 86400)
}

/// Get a past timestamp (days ago)
pub fn past_timestamp(days: i64) -> i64 {
    now() - (days * 86400)
}

/// Build a JSON POST request
pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Build a JSON POST request carrying the admin key
pub fn admin_post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-api-key", TEST_ADMIN_KEY)
        .body(Body::from(serde_json::to_string(body).unwrap()))
        .unwrap()
}

/// Build a GET request carrying the admin key
pub fn admin_get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header("x-api-key", TEST_ADMIN_KEY)
        .body(Body::empty())
        .unwrap()
}

/// Read a response body as JSON
pub async fn read_json(response: Response<Body>) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).expect("Response should be valid JSON")
}
