use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::{debug, info};

use crate::{
    error::AppError,
    model::{
        department::Department,
        employee::{Employee, EmployeeWithAttendance, NewEmployee},
    },
    repo::{WriteTx, attendance::attendance_for_employee},
};

const EMPLOYEE_COLUMNS: &str = "id, employee_code, full_name, email, department, created_at";

pub const DEFAULT_SEARCH_LIMIT: u32 = 50;
pub const MAX_SEARCH_LIMIT: u32 = 200;

/// Inserts a new employee after checking that neither the code nor the email is taken.
///
/// The check and the insert share one write transaction, so concurrent
/// creates queue behind each other and the loser sees the winner's row.
pub async fn create_employee(pool: &SqlitePool, new: &NewEmployee) -> Result<Employee, AppError> {
    let mut tx = WriteTx::begin(pool).await?;
    let result = insert_employee(&mut tx, new).await;
    let employee = tx.finish(result).await?;

    info!(
        employee_id = employee.id,
        employee_code = %employee.employee_code,
        "Employee created"
    );
    Ok(employee)
}

async fn insert_employee(
    conn: &mut SqliteConnection,
    new: &NewEmployee,
) -> Result<Employee, AppError> {
    let code_taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE employee_code = ? LIMIT 1)",
    )
    .bind(&new.employee_code)
    .fetch_one(&mut *conn)
    .await?;
    if code_taken {
        return Err(AppError::Conflict("Employee code already exists".to_string()));
    }

    let email_taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? LIMIT 1)",
    )
    .bind(&new.email)
    .fetch_one(&mut *conn)
    .await?;
    if email_taken {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let sql = format!(
        r#"
        INSERT INTO employees (employee_code, full_name, email, department, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    );
    sqlx::query_as::<_, Employee>(&sql)
        .bind(&new.employee_code)
        .bind(&new.full_name)
        .bind(&new.email)
        .bind(new.department)
        .bind(Utc::now())
        .fetch_one(conn)
        .await
        .map_err(unique_conflict)
}

/// Most recently created first.
pub async fn list_employees(pool: &SqlitePool) -> Result<Vec<Employee>, AppError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY created_at DESC, id DESC");
    Ok(sqlx::query_as::<_, Employee>(&sql).fetch_all(pool).await?)
}

pub async fn find_employee<'c>(
    conn: impl SqliteExecutor<'c>,
    employee_id: i64,
) -> Result<Option<Employee>, AppError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
    Ok(sqlx::query_as::<_, Employee>(&sql)
        .bind(employee_id)
        .fetch_optional(conn)
        .await?)
}

pub async fn employee_exists<'c>(
    conn: impl SqliteExecutor<'c>,
    employee_id: i64,
) -> Result<bool, AppError> {
    Ok(
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ? LIMIT 1)")
            .bind(employee_id)
            .fetch_one(conn)
            .await?,
    )
}

/// The employee together with all of its attendance, newest date first.
pub async fn get_employee(
    pool: &SqlitePool,
    employee_id: i64,
) -> Result<EmployeeWithAttendance, AppError> {
    let mut tx = pool.begin().await?;

    let employee = find_employee(&mut *tx, employee_id)
        .await?
        .ok_or_else(AppError::employee_not_found)?;
    let attendances = attendance_for_employee(&mut *tx, employee_id).await?;

    tx.commit().await?;

    Ok(EmployeeWithAttendance {
        employee,
        attendances,
    })
}

/// Removes the employee; the foreign key cascade removes its attendance in
/// the same transaction. Returns how many attendance records went with it.
pub async fn delete_employee(pool: &SqlitePool, employee_id: i64) -> Result<u64, AppError> {
    let mut tx = WriteTx::begin(pool).await?;
    let result = remove_employee(&mut tx, employee_id).await;
    let records = tx.finish(result).await?;

    info!(employee_id, records, "Employee deleted");
    Ok(records)
}

async fn remove_employee(conn: &mut SqliteConnection, employee_id: i64) -> Result<u64, AppError> {
    let records: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendances WHERE employee_id = ?")
        .bind(employee_id)
        .fetch_one(&mut *conn)
        .await?;

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::employee_not_found());
    }
    Ok(records as u64)
}

/// Case-insensitive substring search over code, name, email and department.
pub async fn search_employees(
    pool: &SqlitePool,
    query: &str,
    department: Option<Department>,
    limit: u32,
) -> Result<Vec<Employee>, AppError> {
    let limit = limit.clamp(1, MAX_SEARCH_LIMIT);

    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    let query = query.trim();
    if !query.is_empty() {
        conditions.push(
            "(employee_code LIKE ? ESCAPE '\\' OR full_name LIKE ? ESCAPE '\\' \
             OR email LIKE ? ESCAPE '\\' OR department LIKE ? ESCAPE '\\')",
        );
        let like = format!("%{}%", escape_like(query));
        bindings.extend(std::iter::repeat(like).take(4));
    }

    if let Some(department) = department {
        conditions.push("department = ?");
        bindings.push(department.to_string());
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees {where_clause} ORDER BY employee_code LIMIT ?"
    );
    debug!(sql = %sql, bindings = ?bindings, limit, "Searching employees");

    let mut search = sqlx::query_as::<_, Employee>(&sql);
    for b in &bindings {
        search = search.bind(b);
    }
    search = search.bind(i64::from(limit));

    Ok(search.fetch_all(pool).await?)
}

/// Every stored code beginning with `prefix`.
pub async fn codes_with_prefix(pool: &SqlitePool, prefix: &str) -> Result<Vec<String>, AppError> {
    let like = format!("{}%", escape_like(prefix));
    Ok(sqlx::query_scalar::<_, String>(
        "SELECT employee_code FROM employees WHERE employee_code LIKE ? ESCAPE '\\'",
    )
    .bind(like)
    .fetch_all(pool)
    .await?)
}

fn escape_like(raw: &str) -> String {
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn unique_conflict(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_unique_violation() {
            let message = if db_err.message().contains("employees.email") {
                "Email already exists"
            } else {
                "Employee code already exists"
            };
            return AppError::Conflict(message.to_string());
        }
    }
    e.into()
}
