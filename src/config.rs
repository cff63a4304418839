use anyhow::{Context, Result};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::scanner::Facing;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    /// Unset runs the service in demo mode on an in-memory store.
    pub database_url: Option<String>,
    pub demo_employees_file: Option<PathBuf>,
    pub api_prefix: String,
    pub log_dir: PathBuf,

    // Scanner
    pub scan_interval: Duration,
    pub camera_facing: Facing,
    pub camera_rear_dir: Option<PathBuf>,
    pub camera_front_dir: Option<PathBuf>,

    // Spreadsheet mirror
    pub sheet_url: Option<String>,
    pub mirror_delay: Duration,

    // Rate limiting
    pub rate_scan_per_min: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            server_addr: var("SERVER_ADDR").unwrap_or_else(|| "127.0.0.1:8080".to_string()),
            database_url: var("DATABASE_URL"),
            demo_employees_file: var("DEMO_EMPLOYEES_FILE").map(PathBuf::from),
            api_prefix: var("API_PREFIX").unwrap_or_else(|| "/api".to_string()),
            log_dir: var("LOG_DIR").map_or_else(|| PathBuf::from("logs"), PathBuf::from),

            scan_interval: Duration::from_millis(parse_or(&var, "SCAN_INTERVAL_MS", 500u64)?), // default 500 ms
            camera_facing: parse_or(&var, "CAMERA_FACING", Facing::Rear)?,
            camera_rear_dir: var("CAMERA_REAR_DIR").map(PathBuf::from),
            camera_front_dir: var("CAMERA_FRONT_DIR").map(PathBuf::from),

            sheet_url: var("SHEET_URL"),
            mirror_delay: Duration::from_millis(parse_or(&var, "MIRROR_DELAY_MS", 500u64)?),

            rate_scan_per_min: parse_or(&var, "RATE_SCAN_PER_MIN", 120u32)?,
        })
    }
}

fn parse_or<T, F>(var: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn defaults_match_reference_behavior() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.server_addr, "127.0.0.1:8080");
        assert_eq!(cfg.api_prefix, "/api");
        assert_eq!(cfg.scan_interval, Duration::from_millis(500));
        assert_eq!(cfg.mirror_delay, Duration::from_millis(500));
        assert_eq!(cfg.rate_scan_per_min, 120);
        assert_eq!(cfg.camera_facing, Facing::Rear);
        assert!(cfg.database_url.is_none());
        assert!(cfg.sheet_url.is_none());
    }

    #[test]
    fn overrides_and_blank_values() {
        let cfg = config(&[
            ("SCAN_INTERVAL_MS", "250"),
            ("DATABASE_URL", "mysql://root@localhost/attendance"),
            ("SHEET_URL", "  "),
            ("CAMERA_REAR_DIR", "/var/spool/camera/rear"),
            ("CAMERA_FACING", "front"),
        ])
        .unwrap();
        assert_eq!(cfg.camera_facing, Facing::Front);
        assert_eq!(cfg.scan_interval, Duration::from_millis(250));
        assert_eq!(
            cfg.database_url.as_deref(),
            Some("mysql://root@localhost/attendance")
        );
        assert!(cfg.sheet_url.is_none());
        assert_eq!(
            cfg.camera_rear_dir,
            Some(PathBuf::from("/var/spool/camera/rear"))
        );
    }

    #[test]
    fn malformed_number_is_an_error() {
        let err = config(&[("RATE_SCAN_PER_MIN", "lots")]).unwrap_err();
        assert!(err.to_string().contains("RATE_SCAN_PER_MIN"));

        let err = config(&[("CAMERA_FACING", "sideways")]).unwrap_err();
        assert!(err.to_string().contains("CAMERA_FACING"));
    }
}
