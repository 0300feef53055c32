use chrono::{Datelike, Duration, NaiveDate};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use crate::{
    error::AppError,
    model::{
        department::Department,
        summary::{
            AttendanceStats, Dashboard, DayAttendance, DepartmentSummary, EmployeeCounts,
            EmployeeStats, EmployeeSummary, WeekAttendance, percentage,
        },
    },
    repo::{
        attendance::{attendance_for_employee, month_bounds},
        employee::find_employee,
    },
};

const RECENT_RECORDS: usize = 10;

#[derive(sqlx::FromRow)]
struct EmployeeSummaryRow {
    employee_id: i64,
    employee_code: String,
    full_name: String,
    department: Department,
    present_days: i64,
    absent_days: i64,
    total_days: i64,
}

impl From<EmployeeSummaryRow> for EmployeeSummary {
    fn from(row: EmployeeSummaryRow) -> Self {
        Self {
            employee_id: row.employee_id,
            employee_code: row.employee_code,
            full_name: row.full_name,
            department: row.department,
            present_days: row.present_days,
            absent_days: row.absent_days,
            total_days: row.total_days,
            attendance_percentage: percentage(row.present_days, row.total_days),
        }
    }
}

/// Present/absent counts for every employee, including those with no records.
pub async fn summarize(pool: &SqlitePool) -> Result<Vec<EmployeeSummary>, AppError> {
    let rows = sqlx::query_as::<_, EmployeeSummaryRow>(
        r#"
        SELECT
            e.id AS employee_id,
            e.employee_code,
            e.full_name,
            e.department,
            COALESCE(SUM(CASE WHEN a.status = 'Present' THEN 1 ELSE 0 END), 0) AS present_days,
            COALESCE(SUM(CASE WHEN a.status = 'Absent' THEN 1 ELSE 0 END), 0) AS absent_days,
            COUNT(a.id) AS total_days
        FROM employees e
        LEFT JOIN attendances a ON a.employee_id = e.id
        GROUP BY e.id, e.employee_code, e.full_name, e.department
        ORDER BY e.employee_code
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(EmployeeSummary::from).collect())
}

/// The same join grouped by department. Departments without employees are left out.
pub async fn summarize_by_department(
    pool: &SqlitePool,
) -> Result<Vec<DepartmentSummary>, AppError> {
    Ok(sqlx::query_as::<_, DepartmentSummary>(
        r#"
        SELECT
            e.department,
            COUNT(DISTINCT e.id) AS employee_count,
            COALESCE(SUM(CASE WHEN a.status = 'Present' THEN 1 ELSE 0 END), 0) AS present_count,
            COALESCE(SUM(CASE WHEN a.status = 'Absent' THEN 1 ELSE 0 END), 0) AS absent_count,
            COUNT(a.id) AS total_attendance
        FROM employees e
        LEFT JOIN attendances a ON a.employee_id = e.id
        GROUP BY e.department
        ORDER BY e.department
        "#,
    )
    .fetch_all(pool)
    .await?)
}

/// Overall and current-month statistics for one employee plus its latest records.
pub async fn employee_stats(
    pool: &SqlitePool,
    employee_id: i64,
    today: NaiveDate,
) -> Result<EmployeeStats, AppError> {
    let mut tx = pool.begin().await?;

    let employee = find_employee(&mut *tx, employee_id)
        .await?
        .ok_or_else(AppError::employee_not_found)?;
    let records = attendance_for_employee(&mut *tx, employee_id).await?;

    tx.commit().await?;

    let (month_start, month_end) = month_bounds(today.year(), today.month())?;
    let overall = AttendanceStats::from_records(&records);
    let current_month = AttendanceStats::from_records(
        records
            .iter()
            .filter(|r| r.date >= month_start && r.date <= month_end),
    );

    // records are already newest first
    let recent_attendance = records.into_iter().take(RECENT_RECORDS).collect();

    Ok(EmployeeStats {
        employee,
        overall,
        current_month,
        recent_attendance,
    })
}

#[derive(sqlx::FromRow)]
struct StatusCounts {
    present: i64,
    absent: i64,
}

/// Headcount per department plus today's and this week's attendance.
///
/// The week starts on Monday and runs up to `today`.
pub async fn dashboard(pool: &SqlitePool, today: NaiveDate) -> Result<Dashboard, AppError> {
    let mut tx = pool.begin().await?;

    let per_department = sqlx::query_as::<_, (Department, i64)>(
        "SELECT department, COUNT(*) FROM employees GROUP BY department",
    )
    .fetch_all(&mut *tx)
    .await?;

    let mut by_department: BTreeMap<Department, i64> =
        Department::iter().map(|d| (d, 0)).collect();
    for (department, count) in per_department {
        by_department.insert(department, count);
    }
    let total = by_department.values().sum();

    let week_start = today - Duration::days(i64::from(today.weekday().num_days_from_monday()));

    let counts_sql = r#"
        SELECT
            COALESCE(SUM(CASE WHEN status = 'Present' THEN 1 ELSE 0 END), 0) AS present,
            COALESCE(SUM(CASE WHEN status = 'Absent' THEN 1 ELSE 0 END), 0) AS absent
        FROM attendances
        WHERE date >= ? AND date <= ?
        "#;

    let day = sqlx::query_as::<_, StatusCounts>(counts_sql)
        .bind(today)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;
    let week = sqlx::query_as::<_, StatusCounts>(counts_sql)
        .bind(week_start)
        .bind(today)
        .fetch_one(&mut *tx)
        .await?;

    tx.commit().await?;

    let week_total = week.present + week.absent;
    Ok(Dashboard {
        employees: EmployeeCounts {
            total,
            by_department,
        },
        attendance_today: DayAttendance {
            date: today,
            present: day.present,
            absent: day.absent,
            total: day.present + day.absent,
        },
        attendance_this_week: WeekAttendance {
            week_start,
            present: week.present,
            total: week_total,
            percentage: percentage(week.present, week_total),
        },
    })
}
