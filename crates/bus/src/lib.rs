use core_types::{JobId, ResourceKind};
use html::Id;
use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender};

/// A failure reported by caller code (a hook or a custom print function).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HookError {
    message: String,
}

impl HookError {
    pub fn new(message: impl fmt::Display) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HookError {}

/// Something that must report loaded-or-errored exactly once before printing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKey {
    /// An element of the print surface's document.
    Element(Id),
    /// An element of the calling document that was skipped instead of copied.
    SourceElement(Id),
    /// A font descriptor, by position in the options.
    Font(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    BeforeGetContent,
    BeforePrint,
}

#[derive(Debug)]
pub enum PrintEvent {
    HookSettled {
        job: JobId,
        hook: Hook,
        result: Result<(), HookError>,
    },
    ResourceSettled {
        job: JobId,
        resource: ResourceKey,
        error: Option<String>,
    },
    SettleElapsed {
        job: JobId,
    },
    CustomPrintSettled {
        job: JobId,
        result: Result<(), HookError>,
    },
}

impl PrintEvent {
    pub fn job(&self) -> JobId {
        match self {
            PrintEvent::HookSettled { job, .. }
            | PrintEvent::ResourceSettled { job, .. }
            | PrintEvent::SettleElapsed { job }
            | PrintEvent::CustomPrintSettled { job, .. } => *job,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceRequest {
    pub kind: ResourceKind,
    pub url: String,
}

/// Work for a resource loading runtime.
#[derive(Debug)]
pub enum LoadCommand {
    Load {
        request: ResourceRequest,
        done: ResourceCompletion,
    },
    Shutdown,
}

/// Reports the outcome of one resource load back to its print job.
#[derive(Debug)]
pub struct ResourceCompletion {
    tx: Sender<PrintEvent>,
    job: JobId,
    resource: ResourceKey,
}

impl ResourceCompletion {
    pub fn new(tx: Sender<PrintEvent>, job: JobId, resource: ResourceKey) -> Self {
        Self { tx, job, resource }
    }

    pub fn resource(&self) -> ResourceKey {
        self.resource
    }

    pub fn loaded(self) {
        self.send(None);
    }

    pub fn failed(self, error: impl Into<String>) {
        self.send(Some(error.into()));
    }

    fn send(self, error: Option<String>) {
        // a closed bus means the runtime is gone; nobody is waiting any more
        let _ = self.tx.send(PrintEvent::ResourceSettled {
            job: self.job,
            resource: self.resource,
            error,
        });
    }
}

/// Settles an awaited caller hook.
#[derive(Debug)]
pub struct HookCompletion {
    tx: Sender<PrintEvent>,
    job: JobId,
    hook: Hook,
}

impl HookCompletion {
    pub fn new(tx: Sender<PrintEvent>, job: JobId, hook: Hook) -> Self {
        Self { tx, job, hook }
    }

    pub fn resolve(self) {
        self.settle(Ok(()));
    }

    pub fn reject(self, error: HookError) {
        self.settle(Err(error));
    }

    pub fn settle(self, result: Result<(), HookError>) {
        let _ = self.tx.send(PrintEvent::HookSettled {
            job: self.job,
            hook: self.hook,
            result,
        });
    }
}

/// Settles a custom print function.
#[derive(Debug)]
pub struct PrintCompletion {
    tx: Sender<PrintEvent>,
    job: JobId,
}

impl PrintCompletion {
    pub fn new(tx: Sender<PrintEvent>, job: JobId) -> Self {
        Self { tx, job }
    }

    pub fn resolve(self) {
        self.settle(Ok(()));
    }

    pub fn reject(self, error: HookError) {
        self.settle(Err(error));
    }

    pub fn settle(self, result: Result<(), HookError>) {
        let _ = self.tx.send(PrintEvent::CustomPrintSettled {
            job: self.job,
            result,
        });
    }
}

/// Fired by the host once a scheduled delay has passed.
#[derive(Debug)]
pub struct TimerWake {
    tx: Sender<PrintEvent>,
    job: JobId,
}

impl TimerWake {
    pub fn new(tx: Sender<PrintEvent>, job: JobId) -> Self {
        Self { tx, job }
    }

    pub fn job(&self) -> JobId {
        self.job
    }

    pub fn fire(self) {
        let _ = self.tx.send(PrintEvent::SettleElapsed { job: self.job });
    }
}

pub struct Bus {
    pub evt_tx: Sender<PrintEvent>, // shareable for hosts and runtimes
    pub evt_rx: Receiver<PrintEvent>,
}

impl Bus {
    pub fn new() -> Self {
        let (evt_tx, evt_rx) = mpsc::channel();
        Self { evt_tx, evt_rx }
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}
