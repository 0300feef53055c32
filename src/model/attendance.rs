use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    sqlx::Type,
    ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1,
        "date": "2024-01-15",
        "status": "Present",
        "created_at": "2024-01-15T09:00:00Z"
    })
)]
pub struct AttendanceRecord {
    pub id: i64,
    pub employee_id: i64,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// A ledger row joined with the owning employee's identity.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceEntry {
    pub id: i64,
    pub employee_id: i64,
    pub employee_code: String,
    pub employee_name: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

/// Validated input for a single ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewAttendance {
    pub employee_id: i64,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}
