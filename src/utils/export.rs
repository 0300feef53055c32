use crate::model::attendance::AttendanceEntry;

const CSV_HEADER: &str = "Employee ID,Employee Name,Date,Status";

/// Renders ledger entries as CSV with the header row first.
pub fn attendance_to_csv(entries: &[AttendanceEntry]) -> String {
    let mut out = String::with_capacity(CSV_HEADER.len() + entries.len() * 48);
    out.push_str(CSV_HEADER);
    out.push('\n');

    for entry in entries {
        let row = [
            csv_field(&entry.employee_code),
            csv_field(&entry.employee_name),
            entry.date.format("%Y-%m-%d").to_string(),
            entry.status.to_string(),
        ];
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
