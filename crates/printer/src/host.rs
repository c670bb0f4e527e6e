use bus::{ResourceCompletion, ResourceRequest, TimerWake};
use core_types::Viewport;
use html::{Document, Id};
use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NativePrint {
    Invoked,
    /// The surface's window has no print operation.
    Unsupported,
}

/// The print surface as handed to a custom print function.
#[derive(Clone, Copy, Debug)]
pub struct SurfaceRef<'a> {
    /// The `<iframe>` element in the calling document.
    pub element: Id,
    /// Its nested document, populated and ready.
    pub frame: &'a Document,
}

/// Everything the engine needs from the rendering platform.
///
/// Asynchronous results come back through the completion handles, which post onto the
/// engine's bus; a host may settle them synchronously or from another thread.
pub trait PrintHost {
    fn viewport(&self) -> Viewport;

    /// Whether a fresh surface document gets a font loading API.
    fn supports_font_loading(&self) -> bool {
        true
    }

    fn load(&mut self, request: ResourceRequest, done: ResourceCompletion);

    fn schedule(&mut self, delay: Duration, wake: TimerWake);

    fn focus_frame(&mut self, _frame: &Document) {}

    /// Open the native print dialog for `frame`. Returning does not mean the dialog closed.
    fn print_frame(&mut self, owner: &Document, frame: &Document) -> NativePrint;
}
