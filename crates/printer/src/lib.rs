//! Print orchestration: snapshot some content into an off-screen surface, wait for everything it
//! depends on, then print it.

pub mod barrier;
pub mod sequencer;
pub mod snapshot;
pub mod styles;
pub mod surface;

mod host;
mod job;
mod log;
mod options;
mod runtime;
mod trigger;

pub use crate::barrier::{Barrier, Mark};
pub use crate::host::{NativePrint, PrintHost, SurfaceRef};
pub use crate::job::PrintJob;
pub use crate::log::PrintLog;
pub use crate::options::{
    AfterPrintHook, AsyncHook, ContentRef, ContentSource, CustomPrint, ErrorHook, Font, PageStyle,
    PrintOptions,
};
pub use crate::runtime::PrintRuntime;
pub use crate::sequencer::{AbortReason, PrintState, SETTLE_DELAY};
pub use crate::styles::DEFAULT_PAGE_STYLE;
pub use crate::surface::PRINT_WINDOW_ID;
pub use crate::trigger::{PrintHandler, TriggerMode};
