//! Camera-driven badge scanning.
//!
//! [`ScanLoop`] is the synchronous state machine that owns the camera
//! stream; [`ScannerService`] drives it from a polling task and hands each
//! decoded badge to the attendance recorder.

pub mod camera;
pub mod controller;
pub mod decoder;
pub mod service;

pub use camera::{Facing, SpoolCamera};
pub use controller::{ScanLoop, ScanPhase, StartOutcome};
pub use decoder::QrDecoder;
pub use service::{ScanReport, ScannerService, ScannerStatus};
