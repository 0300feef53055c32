use crate::model::department::Department;

const DEFAULT_PREFIX: &str = "EMP";

/// Next free code for the department prefix, e.g. `ENG004` when `ENG003` is the highest.
///
/// Existing codes under the prefix whose remainder is not a number are ignored.
pub fn next_employee_code<S: AsRef<str>>(department: Option<Department>, existing: &[S]) -> String {
    let prefix = department.map_or(DEFAULT_PREFIX, |d| d.code_prefix());

    let highest = existing
        .iter()
        .filter_map(|code| code.as_ref().strip_prefix(prefix))
        .filter(|rest| !rest.is_empty() && rest.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|rest| rest.parse::<u64>().ok())
        .max()
        .unwrap_or(0);

    format!("{prefix}{:03}", highest + 1)
}
