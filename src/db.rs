use anyhow::{Context, Result};
use sqlx::MySqlPool;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::store::{AttendanceLog, EmployeeDirectory, MemoryStore, MySqlStore};

pub async fn init_db(database_url: &str) -> Result<MySqlPool> {
    MySqlPool::connect(database_url)
        .await
        .context("Failed to connect to database")
}

/// Directory and attendance log handles.
pub struct Stores {
    pub directory: Arc<dyn EmployeeDirectory>,
    pub log: Arc<dyn AttendanceLog>,
}

/// MySQL when `DATABASE_URL` is set, otherwise an in-memory demo store.
pub async fn init_stores(config: &Config) -> Result<Stores> {
    match &config.database_url {
        Some(url) => {
            let store = Arc::new(MySqlStore::new(init_db(url).await?));
            info!("Using MySQL store");
            Ok(Stores {
                directory: store.clone(),
                log: store,
            })
        }
        None => {
            let store = match &config.demo_employees_file {
                Some(path) => Arc::new(MemoryStore::from_json_file(path).with_context(|| {
                    format!("Failed to load demo employees from {}", path.display())
                })?),
                None => Arc::new(MemoryStore::default()),
            };
            warn!("DATABASE_URL not set, running in demo mode with an in-memory store");
            Ok(Stores {
                directory: store.clone(),
                log: store,
            })
        }
    }
}
