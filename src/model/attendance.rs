use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, IntoStaticStr, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
}

/// One row of the attendance log, keyed by `(id, date)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = "EMP-001")]
    pub id: String,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

impl AttendanceRecord {
    pub fn present(id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: id.into(),
            date,
            status: AttendanceStatus::Present,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn status_uses_lowercase_wire_form() {
        assert_eq!(<&str>::from(AttendanceStatus::Present), "present");
        assert_eq!(AttendanceStatus::Present.to_string(), "present");
        assert_eq!(
            AttendanceStatus::from_str("present").ok(),
            Some(AttendanceStatus::Present)
        );
        assert!(AttendanceStatus::from_str("absent").is_err());
    }

    #[test]
    fn present_record_serializes_iso_date() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let json = serde_json::to_value(AttendanceRecord::present("E1", date)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "id": "E1", "date": "2026-01-05", "status": "present" })
        );
    }
}
