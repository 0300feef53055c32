use crate::{
    error::AppError,
    model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus, NewAttendance},
    repo,
    utils::validation::parse_status,
};
use actix_web::{HttpResponse, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = 1)]
    pub employee_id: i64,
    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Present")]
    pub status: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkAttendance {
    #[schema(example = json!([1, 2, 3]))]
    pub employee_ids: Vec<i64>,
    #[schema(example = "2024-01-15", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "Present")]
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct BulkAttendanceResponse {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub marked_employees: usize,
    pub records: Vec<AttendanceRecord>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MonthlyQuery {
    pub year: i32,
    /// 1 to 12
    pub month: u32,
    pub employee_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct MonthlyAttendance {
    pub year: i32,
    pub month: u32,
    pub attendance_records: Vec<AttendanceEntry>,
    pub total_records: usize,
}

/// Mark attendance for one employee on one day
#[utoipa::path(
    post,
    path = "/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Attendance marked", body = AttendanceRecord),
        (status = 400, description = "Future date or unknown status", body = Object, example = json!({
            "message": "Status must be Present or Absent"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 409, description = "Already marked for that day", body = Object, example = json!({
            "message": "Attendance already marked for this date"
        }))
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    pool: web::Data<SqlitePool>,
    payload: web::Json<MarkAttendance>,
) -> Result<HttpResponse, AppError> {
    let status = parse_status(&payload.status)?;
    let new = NewAttendance {
        employee_id: payload.employee_id,
        date: payload.date,
        status,
    };

    let today = Local::now().date_naive();
    let record = repo::attendance::mark_attendance(pool.get_ref(), &new, today).await?;

    Ok(HttpResponse::Created().json(record))
}

#[utoipa::path(
    get,
    path = "/attendance",
    responses(
        (status = 200, description = "Every attendance record, newest date first", body = [AttendanceRecord])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let records = repo::attendance::list_attendance(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(records))
}

#[utoipa::path(
    get,
    path = "/attendance/employee/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "The employee's records, newest date first", body = [AttendanceRecord]),
        (status = 404, description = "Employee not found")
    ),
    tag = "Attendance"
)]
pub async fn list_attendance_for_employee(
    pool: web::Data<SqlitePool>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let records =
        repo::attendance::list_attendance_for_employee(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(records))
}

/// Mark the same day for several employees; nothing is stored if any entry fails
#[utoipa::path(
    post,
    path = "/attendance/bulk",
    request_body = BulkAttendance,
    responses(
        (status = 201, description = "Every employee marked", body = BulkAttendanceResponse),
        (status = 400, description = "At least one entry was rejected", body = Object, example = json!({
            "message": "Employee ID 42 not found"
        }))
    ),
    tag = "Attendance"
)]
pub async fn mark_bulk_attendance(
    pool: web::Data<SqlitePool>,
    payload: web::Json<BulkAttendance>,
) -> Result<HttpResponse, AppError> {
    let status = parse_status(&payload.status)?;
    let today = Local::now().date_naive();

    let records = repo::attendance::mark_bulk_attendance(
        pool.get_ref(),
        &payload.employee_ids,
        payload.date,
        status,
        today,
    )
    .await?;

    Ok(HttpResponse::Created().json(BulkAttendanceResponse {
        date: payload.date,
        status,
        marked_employees: records.len(),
        records,
    }))
}

#[utoipa::path(
    get,
    path = "/attendance/monthly",
    params(MonthlyQuery),
    responses(
        (status = 200, description = "Records for the month", body = MonthlyAttendance),
        (status = 400, description = "Invalid month")
    ),
    tag = "Attendance"
)]
pub async fn monthly_attendance(
    pool: web::Data<SqlitePool>,
    query: web::Query<MonthlyQuery>,
) -> Result<HttpResponse, AppError> {
    let records = repo::attendance::monthly_attendance(
        pool.get_ref(),
        query.year,
        query.month,
        query.employee_id,
    )
    .await?;

    Ok(HttpResponse::Ok().json(MonthlyAttendance {
        year: query.year,
        month: query.month,
        total_records: records.len(),
        attendance_records: records,
    }))
}
