#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{extract::Request, ServiceExt};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::json;

use tasks_service::app::{self, AppState};
use tasks_service::auth::TokenVerifier;
use tasks_service::config::AppConfig;
use tasks_service::database::{DatabaseManager, PgTaskStore, TaskStore};

pub const TEST_SECRET: &str = "ci-test-secret";

pub struct TestServer {
    pub base_url: String,
    pub pool: sqlx::PgPool,
}

/// Start the full service in-process against `DATABASE_URL`.
///
/// Returns `None` when no database is configured so the suite can run
/// without Postgres. Each test uses fresh owner identities, so tests can
/// share one database without truncating it.
pub async fn start_server() -> Result<Option<TestServer>> {
    let _ = dotenvy::dotenv();
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping database-backed test");
        return Ok(None);
    };

    let mut config = AppConfig::development();
    config.database.url = Some(url);
    config.database.max_connections = 4;

    let manager = DatabaseManager::connect_lazy(&config.database)?;
    manager.wait_until_ready(Duration::from_secs(30)).await?;

    let store = PgTaskStore::new(manager.pool().clone(), Duration::from_secs(5));
    store.bootstrap().await?;

    let state = AppState::new(Arc::new(store), TokenVerifier::new(TEST_SECRET));
    let service = app::service(state, &config.security.cors_origins);

    // Pick an unused port for isolation
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, ServiceExt::<Request>::into_make_service(service)).await;
    });

    Ok(Some(TestServer {
        base_url: format!("http://127.0.0.1:{}", port),
        pool: manager.pool().clone(),
    }))
}

/// A caller identity no other test run will use.
pub fn unique_owner() -> String {
    format!("{}@test.com", uuid::Uuid::new_v4().simple())
}

pub fn token_for(subject: &str) -> String {
    sign(subject, TEST_SECRET, 3600)
}

pub fn sign(subject: &str, secret: &str, ttl_secs: i64) -> String {
    let claims = json!({ "sub": subject, "exp": Utc::now().timestamp() + ttl_secs });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("sign test token")
}

pub async fn count_rows(pool: &sqlx::PgPool, owner: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE owner_email = $1")
        .bind(owner)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
