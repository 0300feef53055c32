use anyhow::{Context, Result};
use chrono::{Datelike, Duration, Local, Utc, Weekday};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration as StdDuration;
use tracing::info;

use crate::model::{attendance::AttendanceStatus, department::Department};

/// Opens the pool and brings the schema up to date.
///
/// Foreign keys are switched on for every connection; the cascade from
/// `employees` to `attendances` depends on it.
pub async fn init_db(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("invalid DATABASE_URL {database_url:?}"))?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(StdDuration::from_secs(10));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    run_migrations(&pool).await?;

    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")
}

const SAMPLE_EMPLOYEES: [(&str, &str, &str, Department); 8] = [
    ("EMP001", "John Doe", "john.doe@company.com", Department::Engineering),
    ("EMP002", "Jane Smith", "jane.smith@company.com", Department::Marketing),
    ("EMP003", "Mike Johnson", "mike.johnson@company.com", Department::Sales),
    ("EMP004", "Sarah Wilson", "sarah.wilson@company.com", Department::Hr),
    ("EMP005", "Tom Brown", "tom.brown@company.com", Department::Finance),
    ("EMP006", "Lisa Chen", "lisa.chen@company.com", Department::Operations),
    ("EMP007", "David Kumar", "david.kumar@company.com", Department::Engineering),
    ("EMP008", "Emily Davis", "emily.davis@company.com", Department::Marketing),
];

const SAMPLE_DAYS: i64 = 30;

/// Fills an empty directory with sample employees and their weekday
/// attendance for the last 30 days. Returns the number of employees inserted.
pub async fn seed_sample_data(pool: &SqlitePool) -> Result<usize> {
    let mut tx = pool.begin().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees")
        .fetch_one(&mut *tx)
        .await?;
    if existing > 0 {
        info!(existing, "Directory not empty, skipping sample data");
        return Ok(0);
    }

    let today = Local::now().date_naive();
    let mut records = 0usize;

    for (n, (code, name, email, department)) in SAMPLE_EMPLOYEES.iter().enumerate() {
        let employee_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO employees (employee_code, full_name, email, department, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(*code)
        .bind(*name)
        .bind(*email)
        .bind(*department)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        for days_ago in 0..SAMPLE_DAYS {
            let date = today - Duration::days(days_ago);
            if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
                continue;
            }
            // Roughly one absence a week, spread differently per employee.
            let status = if (days_ago + n as i64) % 7 == 3 {
                AttendanceStatus::Absent
            } else {
                AttendanceStatus::Present
            };

            sqlx::query(
                "INSERT INTO attendances (employee_id, date, status, created_at) VALUES (?, ?, ?, ?)",
            )
            .bind(employee_id)
            .bind(date)
            .bind(status)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?;
            records += 1;
        }
    }

    tx.commit().await?;

    info!(
        employees = SAMPLE_EMPLOYEES.len(),
        records, "Sample data inserted"
    );
    Ok(SAMPLE_EMPLOYEES.len())
}
