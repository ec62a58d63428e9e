//! Subject presence watchdog
//!
//! While a session is active, polls a face-detection capability once per
//! period against the current video frame and raises a non-fatal
//! `SubjectNotVisible` notice when no face is found. At most one detection
//! call is in flight; a tick that finds one pending is skipped.

mod monitor;

pub use monitor::{
    Detection, FaceDetector, PresenceMonitor, PresenceMonitorHandle, PresenceSample, TickOutcome,
};
