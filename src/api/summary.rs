use crate::{
    error::AppError,
    model::summary::{Dashboard, DepartmentSummary, EmployeeSummary},
    repo,
};
use actix_web::{HttpResponse, web};
use chrono::Local;
use sqlx::SqlitePool;

#[utoipa::path(
    get,
    path = "/summary/employees",
    responses(
        (status = 200, description = "Present/absent counts per employee", body = [EmployeeSummary])
    ),
    tag = "Summary"
)]
pub async fn summarize(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let summary = repo::summary::summarize(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/summary/departments",
    responses(
        (status = 200, description = "Present/absent counts per department", body = [DepartmentSummary])
    ),
    tag = "Summary"
)]
pub async fn summarize_by_department(
    pool: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let summary = repo::summary::summarize_by_department(pool.get_ref()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Headcount and attendance for today and this week", body = Dashboard)
    ),
    tag = "Summary"
)]
pub async fn dashboard(pool: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    let dashboard = repo::summary::dashboard(pool.get_ref(), today).await?;
    Ok(HttpResponse::Ok().json(dashboard))
}
