//! Mark-once-per-day attendance recording and the daily roster view.

use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{RecordError, StoreError};
use crate::mirror::SheetMirror;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::model::outcome::{DailyRoster, ScanOutcome};
use crate::store::{AttendanceLog, EmployeeDirectory};

/// Current calendar date in UTC, the key attendance rows are filed under.
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

#[derive(Clone)]
pub struct AttendanceRecorder {
    directory: Arc<dyn EmployeeDirectory>,
    log: Arc<dyn AttendanceLog>,
    mirror: Arc<dyn SheetMirror>,
}

impl AttendanceRecorder {
    pub fn new(
        directory: Arc<dyn EmployeeDirectory>,
        log: Arc<dyn AttendanceLog>,
        mirror: Arc<dyn SheetMirror>,
    ) -> Self {
        Self {
            directory,
            log,
            mirror,
        }
    }

    /// Records `identifier` as present on `as_of` unless it already is.
    ///
    /// The lookup and the insert are separate store calls. Two scans of the
    /// same badge racing past the lookup both try to insert; the loser's
    /// duplicate-key error is reported as [`ScanOutcome::AlreadyMarked`].
    #[instrument(skip(self), fields(date = %as_of))]
    pub async fn mark_attendance(
        &self,
        identifier: &str,
        as_of: NaiveDate,
    ) -> Result<ScanOutcome, RecordError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            debug!("Empty badge payload");
            return Ok(ScanOutcome::NotFound);
        }

        let Some(employee) = self.directory.find_employee(identifier).await? else {
            info!(employee_id = identifier, "Badge not in directory");
            return Ok(ScanOutcome::NotFound);
        };
        // Key the log by the directory's id, not the raw payload.
        let identifier = employee.id.as_str();

        if self.log.find_record(identifier, as_of).await?.is_some() {
            info!(employee_id = identifier, "Already marked present");
            return Ok(ScanOutcome::AlreadyMarked(employee));
        }

        let record = AttendanceRecord::present(identifier, as_of);
        match self.log.insert_record(&record).await {
            Ok(()) => {}
            Err(StoreError::Duplicate { .. }) => {
                info!(employee_id = identifier, "Concurrent scan already marked present");
                return Ok(ScanOutcome::AlreadyMarked(employee));
            }
            Err(e) => {
                tracing::error!(error = %e, employee_id = identifier, "Attendance insert failed");
                return Err(e.into());
            }
        }

        info!(employee_id = %record.id, name = %employee.name, "Marked present");
        self.spawn_mirror(record, employee.clone());

        Ok(ScanOutcome::NewlyMarked(employee))
    }

    /// Partitions the whole directory into present/absent for `as_of`.
    /// Reads only; recomputed on every call.
    #[instrument(skip(self), fields(date = %as_of))]
    pub async fn fetch_daily_roster(&self, as_of: NaiveDate) -> Result<DailyRoster, RecordError> {
        let directory = self.directory.list_employees().await?;
        let present_ids = self.log.present_ids(as_of).await?;

        let roster = DailyRoster::partition(
            as_of,
            directory,
            present_ids.iter().map(String::as_str),
        );
        debug!(
            present = roster.present.len(),
            absent = roster.absent.len(),
            "Roster computed"
        );
        Ok(roster)
    }

    fn spawn_mirror(&self, record: AttendanceRecord, employee: Employee) {
        let mirror = Arc::clone(&self.mirror);
        tokio::spawn(async move {
            if let Err(e) = mirror.mirror(&record, &employee).await {
                warn!(
                    error = %e,
                    employee_id = %record.id,
                    date = %record.date,
                    "Spreadsheet mirror failed"
                );
            }
        });
    }
}
