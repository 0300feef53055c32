use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use std::str::FromStr;

use crate::{
    error::AppError,
    model::{attendance::AttendanceStatus, department::Department, employee::NewEmployee},
};

const MAX_CODE_LEN: usize = 20;
const MAX_NAME_LEN: usize = 100;
const MAX_EMAIL_LEN: usize = 100;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Trims and checks every field of a create request, reporting all problems at once.
pub fn validate_new_employee(
    employee_code: &str,
    full_name: &str,
    email: &str,
    department: &str,
) -> Result<NewEmployee, AppError> {
    let mut errors = Vec::new();

    let employee_code = employee_code.trim();
    if employee_code.is_empty() {
        errors.push("Employee code is required".to_string());
    } else if employee_code.chars().count() > MAX_CODE_LEN {
        errors.push(format!("Employee code too long (max {MAX_CODE_LEN} characters)"));
    }

    let full_name = full_name.trim();
    if full_name.is_empty() {
        errors.push("Full name is required".to_string());
    } else if full_name.chars().count() > MAX_NAME_LEN {
        errors.push(format!("Full name too long (max {MAX_NAME_LEN} characters)"));
    }

    let email = email.trim().to_lowercase();
    if email.is_empty() {
        errors.push("Email is required".to_string());
    } else if email.len() > MAX_EMAIL_LEN {
        errors.push(format!("Email too long (max {MAX_EMAIL_LEN} characters)"));
    } else if !is_valid_email(&email) {
        errors.push("Invalid email format".to_string());
    }

    let department = match parse_department(department) {
        Ok(d) => Some(d),
        Err(e) => {
            errors.push(e.to_string());
            None
        }
    };

    match department {
        Some(department) if errors.is_empty() => Ok(NewEmployee {
            employee_code: employee_code.to_string(),
            full_name: full_name.to_string(),
            email,
            department,
        }),
        _ => Err(AppError::Validation(errors.join("; "))),
    }
}

pub fn parse_department(raw: &str) -> Result<Department, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::validation("Department is required"));
    }
    Department::from_str(raw).map_err(|_| {
        AppError::validation(
            "Invalid department. Must be one of: Engineering, Sales, Marketing, HR, Finance, Operations",
        )
    })
}

pub fn parse_status(raw: &str) -> Result<AttendanceStatus, AppError> {
    AttendanceStatus::from_str(raw.trim())
        .map_err(|_| AppError::validation("Status must be Present or Absent"))
}

pub fn ensure_not_future(date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if date > today {
        return Err(AppError::validation("Attendance date cannot be in the future"));
    }
    Ok(())
}
