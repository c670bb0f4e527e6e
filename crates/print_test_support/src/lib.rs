//! Shared helpers for print engine tests: TOML page fixtures, a scripted host, log capture.

pub mod fixture;
pub mod host;
pub mod logs;

pub use crate::fixture::{Fixture, load_fixture};
pub use crate::host::{PrintRecord, RecordingHost};
pub use crate::logs::{CapturedRecord, LogCapture, capture_logs};
