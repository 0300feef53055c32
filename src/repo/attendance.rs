use chrono::{Datelike, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use std::collections::HashSet;
use tracing::{debug, info};

use crate::{
    error::AppError,
    model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus, NewAttendance},
    repo::{WriteTx, employee::employee_exists},
    utils::validation::ensure_not_future,
};

const RECORD_COLUMNS: &str = "id, employee_id, date, status, created_at";

const DUPLICATE_MESSAGE: &str = "Attendance already marked for this date";

/// Optional narrowing for joined ledger queries. Both date bounds are inclusive.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendanceFilter {
    pub employee_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Records one day's status for an employee.
///
/// Fails before touching the ledger if the date is after `today`, the
/// employee is unknown, or the day is already marked.
pub async fn mark_attendance(
    pool: &SqlitePool,
    new: &NewAttendance,
    today: NaiveDate,
) -> Result<AttendanceRecord, AppError> {
    ensure_not_future(new.date, today)?;

    let mut tx = WriteTx::begin(pool).await?;
    let result = mark_day(&mut tx, new).await;
    let record = tx.finish(result).await?;

    info!(
        attendance_id = record.id,
        employee_id = record.employee_id,
        date = %record.date,
        status = %record.status,
        "Attendance marked"
    );
    Ok(record)
}

/// Marks the same day and status for several employees, all or nothing.
///
/// Every problem found is reported in one `Validation` error and nothing is stored.
pub async fn mark_bulk_attendance(
    pool: &SqlitePool,
    employee_ids: &[i64],
    date: NaiveDate,
    status: AttendanceStatus,
    today: NaiveDate,
) -> Result<Vec<AttendanceRecord>, AppError> {
    if employee_ids.is_empty() {
        return Err(AppError::validation("At least one employee id is required"));
    }
    ensure_not_future(date, today)?;

    let mut tx = WriteTx::begin(pool).await?;
    let result = mark_batch(&mut tx, employee_ids, date, status).await;
    let records = tx.finish(result).await?;

    info!(date = %date, status = %status, marked = records.len(), "Bulk attendance marked");
    Ok(records)
}

async fn mark_day(
    conn: &mut SqliteConnection,
    new: &NewAttendance,
) -> Result<AttendanceRecord, AppError> {
    if !employee_exists(&mut *conn, new.employee_id).await? {
        return Err(AppError::employee_not_found());
    }
    if is_marked(&mut *conn, new.employee_id, new.date).await? {
        return Err(AppError::Conflict(DUPLICATE_MESSAGE.to_string()));
    }
    insert_record(conn, new).await
}

async fn mark_batch(
    conn: &mut SqliteConnection,
    employee_ids: &[i64],
    date: NaiveDate,
    status: AttendanceStatus,
) -> Result<Vec<AttendanceRecord>, AppError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();
    let mut records = Vec::with_capacity(employee_ids.len());

    for &employee_id in employee_ids {
        if !seen.insert(employee_id) {
            errors.push(format!("Employee ID {employee_id} listed more than once"));
            continue;
        }
        if !employee_exists(&mut *conn, employee_id).await? {
            errors.push(format!("Employee ID {employee_id} not found"));
            continue;
        }
        if is_marked(&mut *conn, employee_id, date).await? {
            errors.push(format!(
                "Attendance already marked for employee {employee_id} on {date}"
            ));
            continue;
        }
        if errors.is_empty() {
            let new = NewAttendance {
                employee_id,
                date,
                status,
            };
            records.push(insert_record(&mut *conn, &new).await?);
        }
    }

    if !errors.is_empty() {
        debug!(errors = ?errors, "Bulk attendance rejected");
        return Err(AppError::Validation(errors.join("; ")));
    }
    Ok(records)
}

/// Whole ledger, newest date first.
pub async fn list_attendance(pool: &SqlitePool) -> Result<Vec<AttendanceRecord>, AppError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM attendances ORDER BY date DESC, id DESC");
    Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
        .fetch_all(pool)
        .await?)
}

pub async fn list_attendance_for_employee(
    pool: &SqlitePool,
    employee_id: i64,
) -> Result<Vec<AttendanceRecord>, AppError> {
    let mut tx = pool.begin().await?;

    if !employee_exists(&mut *tx, employee_id).await? {
        return Err(AppError::employee_not_found());
    }
    let records = attendance_for_employee(&mut *tx, employee_id).await?;

    tx.commit().await?;
    Ok(records)
}

/// One employee's records, newest date first. Does not check that the employee exists.
pub async fn attendance_for_employee<'c>(
    conn: impl SqliteExecutor<'c>,
    employee_id: i64,
) -> Result<Vec<AttendanceRecord>, AppError> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendances WHERE employee_id = ? ORDER BY date DESC, id DESC"
    );
    Ok(sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(employee_id)
        .fetch_all(conn)
        .await?)
}

/// Records within one calendar month, joined with the employee's identity.
pub async fn monthly_attendance(
    pool: &SqlitePool,
    year: i32,
    month: u32,
    employee_id: Option<i64>,
) -> Result<Vec<AttendanceEntry>, AppError> {
    let (start, end) = month_bounds(year, month)?;
    attendance_entries(
        pool,
        &AttendanceFilter {
            employee_id,
            start_date: Some(start),
            end_date: Some(end),
        },
    )
    .await
}

/// Ledger rows joined with employee code and name, ordered by date then code.
pub async fn attendance_entries(
    pool: &SqlitePool,
    filter: &AttendanceFilter,
) -> Result<Vec<AttendanceEntry>, AppError> {
    if let (Some(start), Some(end)) = (filter.start_date, filter.end_date) {
        if start > end {
            return Err(AppError::validation("Start date cannot be after end date"));
        }
    }

    let mut conditions = Vec::new();
    if filter.employee_id.is_some() {
        conditions.push("a.employee_id = ?");
    }
    if filter.start_date.is_some() {
        conditions.push("a.date >= ?");
    }
    if filter.end_date.is_some() {
        conditions.push("a.date <= ?");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        r#"
        SELECT a.id, a.employee_id, e.employee_code, e.full_name AS employee_name, a.date, a.status
        FROM attendances a
        JOIN employees e ON e.id = a.employee_id
        {where_clause}
        ORDER BY a.date, e.employee_code
        "#
    );
    debug!(sql = %sql, filter = ?filter, "Fetching attendance entries");

    let mut query = sqlx::query_as::<_, AttendanceEntry>(&sql);
    if let Some(employee_id) = filter.employee_id {
        query = query.bind(employee_id);
    }
    if let Some(start) = filter.start_date {
        query = query.bind(start);
    }
    if let Some(end) = filter.end_date {
        query = query.bind(end);
    }

    Ok(query.fetch_all(pool).await?)
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    let invalid = || AppError::validation("Month must be between 1 and 12");

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    let end = next.pred_opt().ok_or_else(invalid)?;

    debug_assert_eq!(end.month(), start.month());
    Ok((start, end))
}

async fn is_marked<'c>(
    conn: impl SqliteExecutor<'c>,
    employee_id: i64,
    date: NaiveDate,
) -> Result<bool, AppError> {
    Ok(sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM attendances WHERE employee_id = ? AND date = ? LIMIT 1)",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_one(conn)
    .await?)
}

async fn insert_record(
    conn: &mut SqliteConnection,
    new: &NewAttendance,
) -> Result<AttendanceRecord, AppError> {
    let sql = format!(
        r#"
        INSERT INTO attendances (employee_id, date, status, created_at)
        VALUES (?, ?, ?, ?)
        RETURNING {RECORD_COLUMNS}
        "#
    );
    sqlx::query_as::<_, AttendanceRecord>(&sql)
        .bind(new.employee_id)
        .bind(new.date)
        .bind(new.status)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(|e| match AppError::from(e) {
            AppError::Conflict(_) => AppError::Conflict(DUPLICATE_MESSAGE.to_string()),
            other => other,
        })
}
