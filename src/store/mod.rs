//! Access to the two external tables: the employee directory and the
//! attendance log.
//!
//! Lookups and inserts are separate round trips. Nothing here wraps them in
//! a transaction, so the recorder's read-before-write check can race with a
//! concurrent scan of the same badge; a key conflict on insert is reported as
//! [`StoreError::Duplicate`].

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::StoreError;
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Read-only view of the employee directory.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, StoreError>;

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError>;
}

/// Append-only attendance log.
#[async_trait]
pub trait AttendanceLog: Send + Sync {
    async fn find_record(
        &self,
        id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Ids with a `present` record on `date`.
    async fn present_ids(&self, date: NaiveDate) -> Result<Vec<String>, StoreError>;

    async fn insert_record(&self, record: &AttendanceRecord) -> Result<(), StoreError>;
}
