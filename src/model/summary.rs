use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

use super::{
    attendance::{AttendanceRecord, AttendanceStatus},
    department::Department,
    employee::Employee,
};

/// Present/absent tally for one employee. Employees without any records
/// still get a row, with every count at zero.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeSummary {
    pub employee_id: i64,
    pub employee_code: String,
    pub full_name: String,
    pub department: Department,
    pub present_days: i64,
    pub absent_days: i64,
    pub total_days: i64,
    pub attendance_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentSummary {
    pub department: Department,
    pub employee_count: i64,
    pub present_count: i64,
    pub absent_count: i64,
    pub total_attendance: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, ToSchema)]
pub struct AttendanceStats {
    pub total_days: i64,
    pub present_days: i64,
    pub absent_days: i64,
    pub attendance_percentage: f64,
}

impl AttendanceStats {
    pub fn new(present_days: i64, absent_days: i64) -> Self {
        let total_days = present_days + absent_days;
        Self {
            total_days,
            present_days,
            absent_days,
            attendance_percentage: percentage(present_days, total_days),
        }
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let (present, absent) = records.into_iter().fold((0, 0), |(p, a), r| match r.status {
            AttendanceStatus::Present => (p + 1, a),
            AttendanceStatus::Absent => (p, a + 1),
        });
        Self::new(present, absent)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeStats {
    pub employee: Employee,
    pub overall: AttendanceStats,
    pub current_month: AttendanceStats,
    pub recent_attendance: Vec<AttendanceRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EmployeeCounts {
    pub total: i64,
    pub by_department: BTreeMap<Department, i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DayAttendance {
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    pub present: i64,
    pub absent: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct WeekAttendance {
    #[schema(value_type = String, format = "date")]
    pub week_start: NaiveDate,
    pub present: i64,
    pub total: i64,
    pub percentage: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    pub employees: EmployeeCounts,
    pub attendance_today: DayAttendance,
    pub attendance_this_week: WeekAttendance,
}

/// Share of `part` in `total` as a percentage rounded to two decimals.
pub fn percentage(part: i64, total: i64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (part as f64 / total as f64 * 10_000.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_rounds_to_two_places() {
        assert_eq!(percentage(1, 3), 33.33);
        assert_eq!(percentage(2, 3), 66.67);
        assert_eq!(percentage(0, 0), 0.0);
    }

    #[test]
    fn stats_total_is_sum_of_parts() {
        let stats = AttendanceStats::new(3, 1);
        assert_eq!(stats.total_days, 4);
        assert_eq!(stats.attendance_percentage, 75.0);
    }
}
