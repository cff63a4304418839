use image::RgbaImage;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use strum_macros::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::error::ScanError;

/// Which way the requested camera should point. A preference, not a
/// requirement: cameras fall back to whatever device they have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Facing {
    #[default]
    Rear,
    Front,
}

/// Off-screen RGBA bitmap that frames are drawn into before decoding.
/// Reused across ticks.
#[derive(Debug, Default)]
pub struct FrameBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl FrameBuffer {
    /// Resizes to `width` x `height` and returns the pixel storage to fill.
    pub fn prepare(&mut self, width: u32, height: u32) -> &mut [u8] {
        self.width = width;
        self.height = height;
        self.pixels.resize(width as usize * height as usize * 4, 0);
        &mut self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// A live stream from an acquired camera.
pub trait VideoStream: Send {
    /// Current frame size; `(0, 0)` while the stream is not yet producing.
    fn dimensions(&mut self) -> (u32, u32);

    /// Draws the current frame into `frame`.
    fn capture(&mut self, frame: &mut FrameBuffer);

    /// Stops every track. Must be safe to call more than once.
    fn stop_tracks(&mut self);

    fn is_live(&self) -> bool;
}

pub trait Camera: Send + Sync {
    fn acquire(&self, facing: Facing) -> Result<Box<dyn VideoStream>, ScanError>;
}

/// Camera fed by a capture daemon that drops still frames (PNG or JPEG)
/// into a spool directory per device. The newest file written after the
/// stream was acquired is the current frame.
#[derive(Debug, Clone, Default)]
pub struct SpoolCamera {
    rear: Option<PathBuf>,
    front: Option<PathBuf>,
}

impl SpoolCamera {
    pub fn new(rear: Option<PathBuf>, front: Option<PathBuf>) -> Self {
        Self { rear, front }
    }

    fn device_for(&self, facing: Facing) -> Option<&Path> {
        let (preferred, fallback) = match facing {
            Facing::Rear => (&self.rear, &self.front),
            Facing::Front => (&self.front, &self.rear),
        };
        preferred.as_deref().or(fallback.as_deref())
    }
}

impl Camera for SpoolCamera {
    fn acquire(&self, facing: Facing) -> Result<Box<dyn VideoStream>, ScanError> {
        let dir = self
            .device_for(facing)
            .ok_or_else(|| ScanError::camera("no camera device configured"))?;

        if !dir.is_dir() {
            return Err(ScanError::camera(format!(
                "camera device {} not available",
                dir.display()
            )));
        }

        let stale: HashSet<_> = spool_frames(dir).collect();
        info!(device = %dir.display(), ?facing, stale = stale.len(), "Camera acquired");
        Ok(Box::new(SpoolStream {
            dir: dir.to_path_buf(),
            stale,
            current: None,
            loaded: None,
            live: true,
        }))
    }
}

struct SpoolStream {
    dir: PathBuf,
    /// Frames already on disk at acquire time, keyed by path and mtime.
    stale: HashSet<(PathBuf, SystemTime)>,
    current: Option<RgbaImage>,
    loaded: Option<(PathBuf, SystemTime)>,
    live: bool,
}

impl SpoolStream {
    fn newest_frame(&self) -> Option<(PathBuf, SystemTime)> {
        spool_frames(&self.dir)
            .filter(|frame| !self.stale.contains(frame))
            .max_by_key(|(_, modified)| *modified)
    }

    fn refresh(&mut self) {
        let Some(newest) = self.newest_frame() else {
            return;
        };
        if self.loaded.as_ref() == Some(&newest) {
            return;
        }

        match image::open(&newest.0) {
            Ok(img) => {
                self.current = Some(img.to_rgba8());
                self.loaded = Some(newest);
            }
            // Usually a frame still being written; the next tick retries.
            Err(e) => debug!(error = %e, frame = %newest.0.display(), "Frame not readable yet"),
        }
    }
}

/// Image files in `dir` with their modification times.
fn spool_frames(dir: &Path) -> impl Iterator<Item = (PathBuf, SystemTime)> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => Some(entries),
        Err(e) => {
            warn!(error = %e, device = %dir.display(), "Camera device unreadable");
            None
        }
    };

    entries
        .into_iter()
        .flatten()
        .filter_map(Result::ok)
        .filter(|entry| is_frame_file(&entry.path()))
        .filter_map(|entry| {
            let modified = entry.metadata().ok()?.modified().ok()?;
            Some((entry.path(), modified))
        })
}

fn is_frame_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ext == "png" || ext == "jpg" || ext == "jpeg"
        })
        .unwrap_or(false)
}

impl VideoStream for SpoolStream {
    fn dimensions(&mut self) -> (u32, u32) {
        if !self.live {
            return (0, 0);
        }
        self.refresh();
        self.current
            .as_ref()
            .map(|img| img.dimensions())
            .unwrap_or((0, 0))
    }

    fn capture(&mut self, frame: &mut FrameBuffer) {
        if let Some(img) = &self.current {
            let (width, height) = img.dimensions();
            frame.prepare(width, height).copy_from_slice(img.as_raw());
        }
    }

    fn stop_tracks(&mut self) {
        if self.live {
            debug!(device = %self.dir.display(), "Camera released");
        }
        self.live = false;
        self.current = None;
        self.loaded = None;
    }

    fn is_live(&self) -> bool {
        self.live
    }
}
