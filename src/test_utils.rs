//! Shared fixtures for the in-crate tests.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use tempfile::TempDir;

use crate::config::Config;
use crate::db::{init_db, run_migrations};
use crate::model::employee::{Employee, NewEmployee};
use crate::model::department::Department;
use crate::repo;

/// Fresh in-memory database with the schema applied.
///
/// A single connection that never expires keeps the in-memory database alive.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("failed to create in-memory pool");

    run_migrations(&pool).await.expect("migrations apply");
    pool
}

/// File-backed database opened the way the server opens it, with several
/// connections, so concurrent writers really contend for the lock.
///
/// Keep the returned directory alive for as long as the pool is used.
pub async fn file_pool() -> (TempDir, SqlitePool) {
    let dir = tempfile::tempdir().expect("temp dir");
    let url = format!("sqlite://{}", dir.path().join("hrms.db").display());
    let pool = init_db(&url).await.expect("file database opens");
    (dir, pool)
}

pub fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["*".to_string()],
        public_base_url: None,
        log_dir: "logs".to_string(),
        log_level: tracing::Level::INFO,
        rate_limit_per_min: 0,
        seed_sample_data: false,
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub async fn create_employee(
    pool: &SqlitePool,
    code: &str,
    email: &str,
    department: Department,
) -> Employee {
    repo::employee::create_employee(
        pool,
        &NewEmployee {
            employee_code: code.to_string(),
            full_name: format!("Employee {code}"),
            email: email.to_string(),
            department,
        },
    )
    .await
    .expect("employee created")
}
