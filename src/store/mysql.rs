use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use std::str::FromStr;
use tracing::{debug, error};

use super::{AttendanceLog, EmployeeDirectory};
use crate::error::StoreError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::Employee;

/// Both tables backed by one MySQL pool. See `sql/schema.sql`.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: String,
    date: NaiveDate,
    status: String,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = StoreError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status = AttendanceStatus::from_str(&row.status)
            .map_err(|_| StoreError::Malformed(format!("unknown status '{}'", row.status)))?;
        Ok(AttendanceRecord {
            id: row.id,
            date: row.date,
            status,
        })
    }
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeDirectory for MySqlStore {
    async fn find_employee(&self, id: &str) -> Result<Option<Employee>, StoreError> {
        sqlx::query_as::<_, Employee>(
            r#"
            SELECT id, name, department
            FROM employees
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = id, "Failed to fetch employee");
            StoreError::from(e)
        })
    }

    async fn list_employees(&self) -> Result<Vec<Employee>, StoreError> {
        sqlx::query_as::<_, Employee>("SELECT id, name, department FROM employees ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to list employees");
                StoreError::from(e)
            })
    }
}

#[async_trait]
impl AttendanceLog for MySqlStore {
    async fn find_record(
        &self,
        id: &str,
        date: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let row = sqlx::query_as::<_, AttendanceRow>(
            r#"
            SELECT id, date, status
            FROM attendance
            WHERE id = ?
            AND date = ?
            LIMIT 1
            "#,
        )
        .bind(id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, employee_id = id, %date, "Failed to fetch attendance");
            StoreError::from(e)
        })?;

        row.map(AttendanceRecord::try_from).transpose()
    }

    async fn present_ids(&self, date: NaiveDate) -> Result<Vec<String>, StoreError> {
        debug!(%date, "Fetching present ids");
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT id
            FROM attendance
            WHERE date = ?
            AND status = ?
            "#,
        )
        .bind(date)
        .bind(<&'static str>::from(AttendanceStatus::Present))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!(error = %e, %date, "Failed to fetch attendance for date");
            StoreError::from(e)
        })
    }

    async fn insert_record(&self, record: &AttendanceRecord) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance (id, date, status)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(record.date)
        .bind(<&'static str>::from(record.status))
        .execute(&self.pool)
        .await
        .map(|_| ())
        .map_err(|e| StoreError::from_insert(e, &record.id, record.date))
    }
}
