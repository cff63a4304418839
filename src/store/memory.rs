use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use super::{AttendanceLog, EmployeeDirectory};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;

/// In-process store used in demo mode and tests.
///
/// Rejects a second record for the same `(id, date)` the way the MySQL
/// primary key does.
#[derive(Default)]
pub struct MemoryStore {
    employees: RwLock<Vec<Employee>>,
    attendance: RwLock<HashMap<(String, NaiveDate), AttendanceRecord>>,
    inserts: AtomicUsize,
}

impl MemoryStore {
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: RwLock::new(employees),
            ..Self::default()
        }
    }

    /// Seeds the directory from a JSON array of `{id, name, department}`.
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let employees: Vec<Employee> = serde_json::from_str(&raw)?;
        Ok(Self::with_employees(employees))
    }

    /// Number of successful inserts since creation.
    #[cfg(test)]
    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmployeeDirectory for MemoryStore {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .employees
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        Ok(self.employees.read().await.clone())
    }
}

#[async_trait]
impl AttendanceLog for MemoryStore {
    async fn find_record(
        &self,
        id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self
            .attendance
            .read()
            .await
            .get(&(id.to_string(), date))
            .cloned())
    }

    async fn present_ids(&self, date: NaiveDate) -> Result<Vec<String>, StoreError> {
        Ok(self
            .attendance
            .read()
            .await
            .values()
            .filter(|r| r.date == date && r.status == AttendanceStatus::Present)
            .map(|r| r.id.clone())
            .collect())
    }

    async fn insert_record(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        let mut attendance = self.attendance.write().await;
        let key = (record.id.clone(), record.date);
        if attendance.contains_key(&key) {
            return Err(StoreError::Duplicate {
                id: record.id.clone(),
                date: record.date,
            });
        }
        attendance.insert(key, record.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 4, 1).unwrap()
    }

    #[tokio::test]
    async fn second_insert_for_same_key_is_duplicate() {
        let store = MemoryStore::default();
        let record = AttendanceRecord::present("E1", day());

        store.insert_record(&record).await.unwrap();
        let err = store.insert_record(&record).await.unwrap_err();

        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.insert_count(), 1);
    }

    #[tokio::test]
    async fn present_ids_only_returns_requested_date() {
        let store = MemoryStore::default();
        let next = day().succ_opt().unwrap();
        store.insert_record(&AttendanceRecord::present("E1", day())).await.unwrap();
        store.insert_record(&AttendanceRecord::present("E2", next)).await.unwrap();

        assert_eq!(store.present_ids(day()).await.unwrap(), vec!["E1".to_string()]);
        assert!(store.find_record("E2", day()).await.unwrap().is_none());
        assert!(store.find_record("E2", next).await.unwrap().is_some());
    }

    #[test]
    fn seeds_directory_from_json() {
        let path = std::env::temp_dir().join(format!("attendance-seed-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"[{"id":"E1","name":"Alice","department":"Eng"}]"#,
        )
        .unwrap();

        let store = MemoryStore::from_json_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
        let found = rt.block_on(store.find_employee("E1")).unwrap();
        assert_eq!(found, Some(Employee::new("E1", "Alice", "Eng")));
    }
}
