use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::camera::{Camera, Facing, FrameBuffer, VideoStream};
use super::decoder::{Decoded, Decoder};
use crate::error::ScanError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScanPhase {
    Idle,
    Acquiring,
    Scanning,
    Stopping,
}

enum State {
    Idle,
    Acquiring,
    Scanning {
        session: u64,
        stream: Box<dyn VideoStream>,
    },
    Stopping,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started(u64),
    /// A session was already live; nothing new was acquired.
    AlreadyScanning(u64),
}

impl StartOutcome {
    pub fn session(&self) -> u64 {
        match self {
            StartOutcome::Started(s) | StartOutcome::AlreadyScanning(s) => *s,
        }
    }
}

/// The single decode forwarded by a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHit {
    pub session: u64,
    pub decoded: Decoded,
}

/// Camera lifecycle state machine.
///
/// `Idle -> Acquiring -> Scanning -> Stopping -> Idle`. [`ScanLoop::stop`] is
/// the only teardown path; it is idempotent and also runs on drop, so a
/// stream acquired by this loop is always released.
pub struct ScanLoop {
    camera: Arc<dyn Camera>,
    decoder: Arc<dyn Decoder>,
    facing: Facing,
    state: State,
    frame: FrameBuffer,
    sessions: u64,
}

impl ScanLoop {
    pub fn new(camera: Arc<dyn Camera>, decoder: Arc<dyn Decoder>) -> Self {
        Self {
            camera,
            decoder,
            facing: Facing::default(),
            state: State::Idle,
            frame: FrameBuffer::default(),
            sessions: 0,
        }
    }

    /// Camera direction to ask for; rear unless configured otherwise.
    pub fn with_facing(mut self, facing: Facing) -> Self {
        self.facing = facing;
        self
    }

    pub fn phase(&self) -> ScanPhase {
        match self.state {
            State::Idle => ScanPhase::Idle,
            State::Acquiring => ScanPhase::Acquiring,
            State::Scanning { .. } => ScanPhase::Scanning,
            State::Stopping => ScanPhase::Stopping,
        }
    }

    /// Id of the live session, if scanning.
    pub fn session(&self) -> Option<u64> {
        match self.state {
            State::Scanning { session, .. } => Some(session),
            _ => None,
        }
    }

    /// Acquires the camera and enters `Scanning`. A second start while a
    /// session is live collapses into that session.
    pub fn start(&mut self) -> Result<StartOutcome, ScanError> {
        if let State::Scanning { session, .. } = self.state {
            debug!(session, "Start ignored, already scanning");
            return Ok(StartOutcome::AlreadyScanning(session));
        }

        self.state = State::Acquiring;
        match self.camera.acquire(self.facing) {
            Ok(stream) => {
                self.sessions += 1;
                let session = self.sessions;
                self.state = State::Scanning { session, stream };
                info!(session, "Scanning started");
                Ok(StartOutcome::Started(session))
            }
            Err(e) => {
                warn!(error = %e, "Error starting scanner");
                self.state = State::Idle;
                Err(e)
            }
        }
    }

    /// One poll: capture the current frame and try to decode it.
    ///
    /// On a decode the session is stopped before the hit is returned, so a
    /// session yields at most one hit. Outside `Scanning`, or while the
    /// stream has no frame yet, this is a no-op.
    pub fn tick(&mut self) -> Option<ScanHit> {
        let State::Scanning { session, stream } = &mut self.state else {
            return None;
        };
        let session = *session;

        if !stream.is_live() {
            warn!(session, "Camera stream ended");
            self.stop();
            return None;
        }

        let (width, height) = stream.dimensions();
        if width == 0 || height == 0 {
            return None;
        }
        stream.capture(&mut self.frame);

        let decoded = self.decoder.decode(
            self.frame.pixels(),
            self.frame.width(),
            self.frame.height(),
        )?;

        info!(session, payload = %decoded.payload, corners = ?decoded.corners, "Code detected");
        self.stop();
        Some(ScanHit { session, decoded })
    }

    /// Releases the stream and returns to `Idle`. Safe from any state.
    pub fn stop(&mut self) {
        if let State::Scanning {
            session,
            mut stream,
        } = std::mem::replace(&mut self.state, State::Stopping)
        {
            stream.stop_tracks();
            info!(session, "Scanning stopped");
        }
        self.state = State::Idle;
    }
}

impl Drop for ScanLoop {
    fn drop(&mut self) {
        self.stop();
    }
}
