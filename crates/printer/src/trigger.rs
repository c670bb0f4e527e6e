use crate::host::PrintHost;
use crate::options::{ContentSource, PrintOptions};
use crate::runtime::PrintRuntime;
use core_types::JobId;
use html::Document;

/// Starts prints with a fixed set of options.
#[derive(Clone, Debug)]
pub struct PrintHandler {
    options: PrintOptions,
}

impl PrintHandler {
    pub fn new(options: PrintOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &PrintOptions {
        &self.options
    }

    pub fn handle_print<H: PrintHost>(
        &self,
        runtime: &mut PrintRuntime<H>,
        doc: &mut Document,
        lazy_content: Option<ContentSource>,
    ) -> JobId {
        runtime.print(doc, self.options.clone(), lazy_content)
    }
}

/// How a binding exposes printing, decided once when it is set up.
#[derive(Clone, Debug)]
pub enum TriggerMode {
    /// The binding owns a trigger and calls the handler itself.
    Explicit(PrintHandler),
    /// The handler is handed down for descendants to call.
    ProvidedToDescendants(PrintHandler),
}

impl TriggerMode {
    pub fn setup(options: PrintOptions, provide_to_descendants: bool) -> Self {
        let handler = PrintHandler::new(options);
        if provide_to_descendants {
            TriggerMode::ProvidedToDescendants(handler)
        } else {
            TriggerMode::Explicit(handler)
        }
    }

    pub fn handler(&self) -> &PrintHandler {
        match self {
            TriggerMode::Explicit(h) | TriggerMode::ProvidedToDescendants(h) => h,
        }
    }

    /// What descendants receive; `None` in explicit mode.
    pub fn provided(&self) -> Option<&PrintHandler> {
        match self {
            TriggerMode::ProvidedToDescendants(h) => Some(h),
            TriggerMode::Explicit(_) => None,
        }
    }
}
