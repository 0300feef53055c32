pub mod employee_code;
pub mod export;
pub mod validation;
