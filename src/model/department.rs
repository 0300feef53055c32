use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use utoipa::ToSchema;

/// Departments an employee can belong to. Stored as its display name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    sqlx::Type,
    ToSchema,
)]
pub enum Department {
    Engineering,
    Sales,
    Marketing,
    #[serde(rename = "HR")]
    #[strum(serialize = "HR")]
    #[sqlx(rename = "HR")]
    Hr,
    Finance,
    Operations,
}

impl Department {
    /// Prefix used when generating employee codes for this department.
    pub fn code_prefix(&self) -> &'static str {
        match self {
            Department::Engineering => "ENG",
            Department::Sales => "SAL",
            Department::Marketing => "MKT",
            Department::Hr => "HR",
            Department::Finance => "FIN",
            Department::Operations => "OPS",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn names_round_trip_through_strum() {
        for dept in Department::iter() {
            assert_eq!(Department::from_str(dept.as_ref()).unwrap(), dept);
        }
        assert_eq!(Department::Hr.to_string(), "HR");
        assert!(Department::from_str("Legal").is_err());
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Department::Hr).unwrap();
        assert_eq!(json, "\"HR\"");
    }
}
