use bus::{ResourceCompletion, ResourceRequest, TimerWake};
use core_types::Viewport;
use html::Document;
use printer::{NativePrint, PrintHost};
use std::time::Duration;

/// What the host saw when printing was invoked.
#[derive(Clone, Debug)]
pub struct PrintRecord {
    pub owner_title: String,
    pub frame_title: String,
    /// The surface document as it was at print time.
    pub frame: Document,
}

/// A `PrintHost` driven entirely by the test: loads and timers wait until the test settles
/// or fires them, in whatever order it likes.
pub struct RecordingHost {
    viewport: Viewport,
    font_loading: bool,
    native_print: bool,
    auto_load: bool,
    auto_timers: bool,
    requests: Vec<ResourceRequest>,
    pending: Vec<(ResourceRequest, ResourceCompletion)>,
    timers: Vec<(Duration, TimerWake)>,
    scheduled: Vec<Duration>,
    focused: usize,
    prints: Vec<PrintRecord>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingHost {
    pub fn new() -> Self {
        Self {
            viewport: Viewport::default(),
            font_loading: true,
            native_print: true,
            auto_load: false,
            auto_timers: false,
            requests: Vec::new(),
            pending: Vec::new(),
            timers: Vec::new(),
            scheduled: Vec::new(),
            focused: 0,
            prints: Vec::new(),
        }
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_font_loading(mut self, supported: bool) -> Self {
        self.font_loading = supported;
        self
    }

    pub fn without_native_print(mut self) -> Self {
        self.native_print = false;
        self
    }

    /// Report every load as successful the moment it is requested.
    pub fn with_auto_load(mut self) -> Self {
        self.auto_load = true;
        self
    }

    /// Fire every timer the moment it is scheduled.
    pub fn with_auto_timers(mut self) -> Self {
        self.auto_timers = true;
        self
    }

    /// Every load requested so far, settled or not.
    pub fn requests(&self) -> &[ResourceRequest] {
        &self.requests
    }

    pub fn pending_loads(&self) -> usize {
        self.pending.len()
    }

    /// Settle the oldest pending load for `url`. Returns false when there is none.
    pub fn settle(&mut self, url: &str, error: Option<&str>) -> bool {
        let Some(pos) = self.pending.iter().position(|(r, _)| r.url == url) else {
            return false;
        };
        let (_, done) = self.pending.remove(pos);
        match error {
            None => done.loaded(),
            Some(error) => done.failed(error),
        }
        true
    }

    pub fn settle_all(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let n = pending.len();
        for (_, done) in pending {
            done.loaded();
        }
        n
    }

    /// Hand the pending loads to the test to settle however it wants.
    pub fn take_pending(&mut self) -> Vec<(ResourceRequest, ResourceCompletion)> {
        std::mem::take(&mut self.pending)
    }

    /// Delays of every timer scheduled so far.
    pub fn scheduled(&self) -> &[Duration] {
        &self.scheduled
    }

    pub fn fire_timers(&mut self) -> usize {
        let timers = std::mem::take(&mut self.timers);
        let n = timers.len();
        for (_, wake) in timers {
            wake.fire();
        }
        n
    }

    pub fn focused(&self) -> usize {
        self.focused
    }

    pub fn prints(&self) -> &[PrintRecord] {
        &self.prints
    }
}

impl PrintHost for RecordingHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn supports_font_loading(&self) -> bool {
        self.font_loading
    }

    fn load(&mut self, request: ResourceRequest, done: ResourceCompletion) {
        self.requests.push(request.clone());
        if self.auto_load {
            done.loaded();
        } else {
            self.pending.push((request, done));
        }
    }

    fn schedule(&mut self, delay: Duration, wake: TimerWake) {
        self.scheduled.push(delay);
        if self.auto_timers {
            wake.fire();
        } else {
            self.timers.push((delay, wake));
        }
    }

    fn focus_frame(&mut self, _frame: &Document) {
        self.focused += 1;
    }

    fn print_frame(&mut self, owner: &Document, frame: &Document) -> NativePrint {
        if !self.native_print {
            return NativePrint::Unsupported;
        }
        self.prints.push(PrintRecord {
            owner_title: owner.title().to_string(),
            frame_title: frame.title().to_string(),
            frame: frame.clone(),
        });
        NativePrint::Invoked
    }
}
