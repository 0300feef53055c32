use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{attendance::AttendanceRecord, department::Department};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_code": "EMP001",
        "full_name": "John Doe",
        "email": "john.doe@company.com",
        "department": "Engineering",
        "created_at": "2024-01-01T09:00:00Z"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = "EMP001")]
    pub employee_code: String,

    #[schema(example = "John Doe")]
    pub full_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    pub department: Department,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,
}

/// Validated input for a new directory entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub employee_code: String,
    pub full_name: String,
    pub email: String,
    pub department: Department,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeWithAttendance {
    #[serde(flatten)]
    pub employee: Employee,
    pub attendances: Vec<AttendanceRecord>,
}
