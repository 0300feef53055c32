use crate::{
    error::AppError,
    repo::{self, attendance::AttendanceFilter},
    utils::export::attendance_to_csv,
};
use actix_web::{
    HttpResponse,
    http::header::{ContentDisposition, DispositionParam, DispositionType},
    web,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ExportRequest {
    /// `csv` or `json`
    #[serde(default = "default_format")]
    #[schema(example = "csv")]
    pub format: String,
    pub employee_id: Option<i64>,
    #[schema(value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
}

fn default_format() -> String {
    "csv".to_string()
}

/// Export attendance joined with employee code and name
#[utoipa::path(
    post,
    path = "/reports/attendance",
    request_body = ExportRequest,
    responses(
        (status = 200, description = "CSV file, or a JSON document when format is json", content_type = "text/csv"),
        (status = 400, description = "Unsupported format or inverted date range")
    ),
    tag = "Report"
)]
pub async fn export_attendance(
    pool: web::Data<SqlitePool>,
    request: web::Json<ExportRequest>,
) -> Result<HttpResponse, AppError> {
    let format = request.format.trim().to_lowercase();
    if format != "csv" && format != "json" {
        return Err(AppError::Validation(format!(
            "Unsupported export format: {}",
            request.format
        )));
    }

    let filter = AttendanceFilter {
        employee_id: request.employee_id,
        start_date: request.start_date,
        end_date: request.end_date,
    };
    let entries = repo::attendance::attendance_entries(pool.get_ref(), &filter).await?;

    if format == "csv" {
        return Ok(HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename("attendance.csv".to_string())],
            })
            .body(attendance_to_csv(&entries)));
    }

    Ok(HttpResponse::Ok().json(json!({
        "format": "json",
        "records_count": entries.len(),
        "data": entries,
        "exported_at": Utc::now().to_rfc3339(),
    })))
}
