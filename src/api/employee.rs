use crate::{
    error::AppError,
    model::{
        department::Department,
        employee::{Employee, EmployeeWithAttendance},
        summary::EmployeeStats,
    },
    repo,
    utils::{
        employee_code::next_employee_code,
        validation::{parse_department, validate_new_employee},
    },
};
use actix_web::{HttpResponse, web};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::SqlitePool;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(default)]
pub struct CreateEmployee {
    #[schema(example = "EMP001")]
    pub employee_code: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = "john.doe@company.com", format = "email")]
    pub email: String,
    #[schema(example = "Engineering")]
    pub department: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Matched against code, name, email and department
    pub query: Option<String>,
    /// Exact department filter
    pub department: Option<String>,
    /// Maximum results, 1 to 200
    pub limit: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct SearchResponse {
    pub query: String,
    pub department: Option<Department>,
    pub results: Vec<Employee>,
    pub total: usize,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GenerateCodeQuery {
    /// Department whose prefix to use; EMP when omitted
    pub department: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct GeneratedCode {
    #[schema(example = "ENG004")]
    pub employee_code: String,
    pub department: Option<Department>,
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 400, description = "Invalid input", body = Object, example = json!({
            "message": "Invalid email format"
        })),
        (status = 409, description = "Employee code or email already exists", body = Object, example = json!({
            "message": "Email already exists"
        }))
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<SqlitePool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, AppError> {
    let new = validate_new_employee(
        &payload.employee_code,
        &payload.full_name,
        &payload.email,
        &payload.department,
    )?;

    let employee = repo::employee::create_employee(pool.get_ref(), &new).await?;

    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    get,
    path = "/employees",
    responses(
        (status = 200, description = "All employees, newest first", body = [Employee])
    ),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let employees = repo::employee::list_employees(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(employees))
}

#[utoipa::path(
    get,
    path = "/employees/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching employees", body = SearchResponse),
        (status = 400, description = "Unknown department")
    ),
    tag = "Employee"
)]
pub async fn search_employees(
    pool: web::Data<SqlitePool>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, AppError> {
    let department = match query.department.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_department(raw)?),
        _ => None,
    };
    let text = query.query.clone().unwrap_or_default();
    let limit = query
        .limit
        .unwrap_or(repo::employee::DEFAULT_SEARCH_LIMIT);

    debug!(query = %text, department = ?department, limit, "Employee search");

    let results =
        repo::employee::search_employees(pool.get_ref(), &text, department, limit).await?;

    Ok(HttpResponse::Ok().json(SearchResponse {
        query: text,
        department,
        total: results.len(),
        results,
    }))
}

/// Suggest the next free employee code for a department
#[utoipa::path(
    post,
    path = "/employees/generate-code",
    params(GenerateCodeQuery),
    responses(
        (status = 200, description = "Next free code", body = GeneratedCode),
        (status = 400, description = "Unknown department")
    ),
    tag = "Employee"
)]
pub async fn generate_employee_code(
    pool: web::Data<SqlitePool>,
    query: web::Query<GenerateCodeQuery>,
) -> Result<HttpResponse, AppError> {
    let department = match query.department.as_deref() {
        Some(raw) if !raw.trim().is_empty() => Some(parse_department(raw)?),
        _ => None,
    };
    let prefix = department.map_or("EMP", |d| d.code_prefix());

    let existing = repo::employee::codes_with_prefix(pool.get_ref(), prefix).await?;
    let employee_code = next_employee_code(department, &existing);

    Ok(HttpResponse::Ok().json(GeneratedCode {
        employee_code,
        department,
    }))
}

/// Get Employee by ID, with attendance history
#[utoipa::path(
    get,
    path = "/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = EmployeeWithAttendance),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let employee = repo::employee::get_employee(pool.get_ref(), employee_id).await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    get,
    path = "/employees/{employee_id}/stats",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Attendance statistics", body = EmployeeStats),
        (status = 404, description = "Employee not found")
    ),
    tag = "Employee"
)]
pub async fn employee_stats(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let stats = repo::summary::employee_stats(pool.get_ref(), path.into_inner(), today).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Delete Employee and all of its attendance
#[utoipa::path(
    delete,
    path = "/employees/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Employee deleted successfully",
            "attendance_removed": 12
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        }))
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let employee_id = path.into_inner();
    let removed = repo::employee::delete_employee(pool.get_ref(), employee_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deleted successfully",
        "attendance_removed": removed
    })))
}
