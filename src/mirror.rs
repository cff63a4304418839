//! Best-effort replication of attendance events into the shared spreadsheet.

use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::error::MirrorError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;

/// One spreadsheet row, in column order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SheetRow {
    pub date: String,
    pub id: String,
    pub name: String,
    pub status: String,
}

impl SheetRow {
    pub fn new(record: &AttendanceRecord, employee: &Employee) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            id: employee.id.clone(),
            name: employee.name.clone(),
            status: record.status.to_string(),
        }
    }
}

#[async_trait]
pub trait SheetMirror: Send + Sync {
    /// Reflects an already committed record. Failures must never undo the
    /// record; callers only log them.
    async fn mirror(&self, record: &AttendanceRecord, employee: &Employee)
    -> Result<(), MirrorError>;
}

/// Stand-in for the spreadsheet API: logs the row it would append to
/// `sheet_url`. Without a sheet there is nowhere to mirror to.
#[derive(Debug, Clone)]
pub struct LoggingSheetMirror {
    sheet_url: Option<String>,
    delay: Duration,
}

impl LoggingSheetMirror {
    pub fn new(sheet_url: Option<String>, delay: Duration) -> Self {
        Self { sheet_url, delay }
    }
}

#[async_trait]
impl SheetMirror for LoggingSheetMirror {
    async fn mirror(
        &self,
        record: &AttendanceRecord,
        employee: &Employee,
    ) -> Result<(), MirrorError> {
        let sheet = self
            .sheet_url
            .as_deref()
            .ok_or_else(|| MirrorError::Unavailable("no spreadsheet configured".into()))?;

        let row = SheetRow::new(record, employee);
        info!(
            sheet,
            date = %row.date,
            employee_id = %row.id,
            name = %row.name,
            status = %row.status,
            "Updating spreadsheet"
        );

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn row_uses_directory_name_and_iso_date() {
        let record = AttendanceRecord::present("E1", NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
        let row = SheetRow::new(&record, &Employee::new("E1", "Alice", "Eng"));
        assert_eq!(
            row,
            SheetRow {
                date: "2026-02-09".into(),
                id: "E1".into(),
                name: "Alice".into(),
                status: "present".into(),
            }
        );
    }

    #[tokio::test]
    async fn mirror_without_sheet_is_unavailable() {
        let mirror = LoggingSheetMirror::new(None, Duration::ZERO);
        let record = AttendanceRecord::present("E1", NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
        let err = mirror
            .mirror(&record, &Employee::new("E1", "Alice", "Eng"))
            .await
            .unwrap_err();
        assert!(matches!(err, MirrorError::Unavailable(_)));
    }

    #[tokio::test]
    async fn logging_mirror_succeeds() {
        let mirror = LoggingSheetMirror::new(
            Some("https://docs.example.com/sheet".into()),
            Duration::ZERO,
        );
        let record = AttendanceRecord::present("E1", NaiveDate::from_ymd_opt(2026, 2, 9).unwrap());
        assert!(
            mirror
                .mirror(&record, &Employee::new("E1", "Alice", "Eng"))
                .await
                .is_ok()
        );
    }
}
