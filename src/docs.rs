use crate::api::attendance::{
    BulkAttendance, BulkAttendanceResponse, MarkAttendance, MonthlyAttendance,
};
use crate::api::employee::{CreateEmployee, GeneratedCode, SearchResponse};
use crate::api::report::ExportRequest;
use crate::config::Config;
use crate::model::attendance::{AttendanceEntry, AttendanceRecord, AttendanceStatus};
use crate::model::department::Department;
use crate::model::employee::{Employee, EmployeeWithAttendance};
use crate::model::summary::{
    AttendanceStats, Dashboard, DayAttendance, DepartmentSummary, EmployeeCounts, EmployeeStats,
    EmployeeSummary, WeekAttendance,
};
use utoipa::OpenApi;
use utoipa::openapi::server::Server;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS Lite API",
        version = "1.0.0",
        description = r#"
## HRMS Lite

Record keeping for employees and their daily attendance.

### 🔹 Key Features
- **Employee Directory**
  - Create, list, view, search and delete employees
  - Employee codes and emails are unique
- **Attendance Ledger**
  - One Present/Absent record per employee per day, never in the future
  - Deleting an employee removes its attendance in the same transaction
- **Summaries**
  - Present/absent counts per employee and per department, dashboard, exports

### 📦 Response Format
- JSON everywhere except CSV exports
- Errors are `{"message": "..."}` with 400, 404 or 409

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::health::health,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::search_employees,
        crate::api::employee::generate_employee_code,
        crate::api::employee::get_employee,
        crate::api::employee::employee_stats,
        crate::api::employee::delete_employee,

        crate::api::attendance::mark_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::list_attendance_for_employee,
        crate::api::attendance::mark_bulk_attendance,
        crate::api::attendance::monthly_attendance,

        crate::api::summary::summarize,
        crate::api::summary::summarize_by_department,
        crate::api::summary::dashboard,

        crate::api::report::export_attendance
    ),
    components(
        schemas(
            Department,
            Employee,
            EmployeeWithAttendance,
            CreateEmployee,
            SearchResponse,
            GeneratedCode,
            AttendanceStatus,
            AttendanceRecord,
            AttendanceEntry,
            MarkAttendance,
            BulkAttendance,
            BulkAttendanceResponse,
            MonthlyAttendance,
            AttendanceStats,
            EmployeeStats,
            EmployeeSummary,
            DepartmentSummary,
            EmployeeCounts,
            DayAttendance,
            WeekAttendance,
            Dashboard,
            ExportRequest
        )
    ),
    tags(
        (name = "Employee", description = "Employee directory APIs"),
        (name = "Attendance", description = "Attendance ledger APIs"),
        (name = "Summary", description = "Derived attendance counts"),
        (name = "Report", description = "Attendance exports"),
        (name = "Health", description = "Liveness"),
    )
)]
pub struct ApiDoc;

/// The generated document, advertising `PUBLIC_BASE_URL` as the server when set.
pub fn openapi(config: &Config) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    if let Some(url) = &config.public_base_url {
        doc.servers = Some(vec![Server::new(url)]);
    }
    doc
}
