use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info};
use utoipa::ToSchema;

use super::controller::{ScanHit, ScanLoop, ScanPhase, StartOutcome};
use crate::error::ScanError;
use crate::model::outcome::ScanResponse;
use crate::recorder::{AttendanceRecorder, today};

/// What became of the badge a session decoded.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScanReport {
    #[schema(example = 3)]
    pub session: u64,
    #[schema(example = "EMP-001")]
    pub payload: String,
    /// Set when recording finished.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ScanResponse>,
    /// Set when recording failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ScannerStatus {
    pub phase: ScanPhase,
    /// Live session id while scanning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<u64>,
    /// A decoded badge is still being recorded.
    pub recording: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last: Option<ScanReport>,
}

struct Inner {
    scan: ScanLoop,
    ticker: Option<JoinHandle<()>>,
    recording: bool,
    last: Option<ScanReport>,
}

/// Runs a [`ScanLoop`] on a fixed polling interval and records each decoded
/// badge.
///
/// The polling task and the camera stream belong to the same session and are
/// released together by [`ScannerService::stop`] or by the decode itself.
/// The attendance write started by a decode runs on its own task and is never
/// cancelled by a later stop.
#[derive(Clone)]
pub struct ScannerService {
    inner: Arc<Mutex<Inner>>,
    recorder: AttendanceRecorder,
    interval: Duration,
}

impl ScannerService {
    pub fn new(scan: ScanLoop, recorder: AttendanceRecorder, interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                scan,
                ticker: None,
                recording: false,
                last: None,
            })),
            recorder,
            interval,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn start(&self) -> Result<StartOutcome, ScanError> {
        let mut inner = self.lock();
        let outcome = inner.scan.start()?;
        if let StartOutcome::Started(session) = outcome {
            inner.ticker = Some(tokio::spawn(self.clone().poll(session)));
        }
        Ok(outcome)
    }

    pub fn stop(&self) {
        let mut inner = self.lock();
        if let Some(ticker) = inner.ticker.take() {
            ticker.abort();
        }
        inner.scan.stop();
    }

    pub fn status(&self) -> ScannerStatus {
        let inner = self.lock();
        ScannerStatus {
            phase: inner.scan.phase(),
            session: inner.scan.session(),
            recording: inner.recording,
            last: inner.last.clone(),
        }
    }

    async fn poll(self, session: u64) {
        let mut ticks = tokio::time::interval(self.interval);
        ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; frames are polled one
        // interval after the camera starts.
        ticks.tick().await;

        loop {
            ticks.tick().await;
            // Frame reads and decoding block, so they run off the async workers.
            let service = self.clone();
            match tokio::task::spawn_blocking(move || service.poll_once(session)).await {
                Ok(true) => {}
                Ok(false) => return,
                Err(e) => {
                    error!(error = %e, session, "Scan tick failed");
                    let mut inner = self.lock();
                    if inner.scan.session() == Some(session) {
                        inner.ticker = None;
                        inner.scan.stop();
                    }
                    return;
                }
            }
        }
    }

    /// One locked tick of `session`. A hit is dispatched from here so that
    /// aborting the polling task can never drop it. Returns whether the
    /// session is still scanning.
    fn poll_once(&self, session: u64) -> bool {
        let hit = {
            let mut inner = self.lock();
            if inner.scan.session() != Some(session) {
                return false;
            }
            match inner.scan.tick() {
                Some(hit) => {
                    // The stream is already released; drop our own handle.
                    inner.ticker = None;
                    inner.recording = true;
                    hit
                }
                None => return inner.scan.session() == Some(session),
            }
        };
        self.dispatch(hit);
        false
    }

    fn dispatch(&self, hit: ScanHit) {
        let service = self.clone();
        tokio::spawn(async move {
            let ScanHit { session, decoded } = hit;
            let result = service
                .recorder
                .mark_attendance(&decoded.payload, today())
                .await;

            let report = match result {
                Ok(outcome) => ScanReport {
                    session,
                    payload: decoded.payload,
                    outcome: Some(ScanResponse::from(&outcome)),
                    error: None,
                },
                Err(e) => {
                    error!(error = %e, session, "Error marking attendance");
                    ScanReport {
                        session,
                        payload: decoded.payload,
                        outcome: None,
                        error: Some("Scan Failed".to_string()),
                    }
                }
            };

            info!(session, "Scan recorded");
            let mut inner = service.lock();
            inner.recording = false;
            inner.last = Some(report);
        });
    }
}
