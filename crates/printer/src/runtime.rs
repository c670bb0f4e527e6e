use crate::host::PrintHost;
use crate::job::PrintJob;
use crate::options::{ContentSource, PrintOptions};
use crate::sequencer::PrintState;
use bus::{Bus, PrintEvent};
use core_types::JobId;
use html::Document;
use std::collections::HashMap;
use std::sync::mpsc::{RecvTimeoutError, Sender};
use std::time::{Duration, Instant};

/// Entry point: owns the host and the event bus, and routes events to in-flight jobs.
///
/// Every invocation gets its own [`PrintJob`], so overlapping prints never share counters.
pub struct PrintRuntime<H: PrintHost> {
    host: H,
    bus: Bus,
    next_job: JobId,
    jobs: HashMap<JobId, PrintJob>,
    finished: HashMap<JobId, PrintState>,
}

impl<H: PrintHost> PrintRuntime<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            bus: Bus::new(),
            next_job: 1,
            jobs: HashMap::new(),
            finished: HashMap::new(),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// A handle for posting events from other threads.
    pub fn sender(&self) -> Sender<PrintEvent> {
        self.bus.evt_tx.clone()
    }

    /// Start a print. `content` overrides `options.content` for this invocation only.
    ///
    /// Never fails: problems are logged or reported through `options.on_print_error`.
    pub fn print(
        &mut self,
        doc: &mut Document,
        options: PrintOptions,
        content: Option<ContentSource>,
    ) -> JobId {
        let id = self.next_job;
        self.next_job += 1;

        let mut job = PrintJob::new(id, options, content, self.bus.evt_tx.clone());
        job.start(&mut self.host, doc);
        self.keep_or_retire(job);
        id
    }

    /// Handle every event that is ready without blocking. Returns how many were handled.
    pub fn pump(&mut self, doc: &mut Document) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.bus.evt_rx.try_recv() {
            self.dispatch(event, doc);
            handled += 1;
        }
        handled
    }

    /// Block until every job has finished.
    ///
    /// There is no timeout: a resource or hook that never settles blocks forever.
    pub fn run_blocking(&mut self, doc: &mut Document) {
        while !self.jobs.is_empty() {
            match self.bus.evt_rx.recv() {
                Ok(event) => self.dispatch(event, doc),
                Err(_) => break,
            }
        }
    }

    /// Like [`run_blocking`](Self::run_blocking) but gives up after `limit`.
    /// Returns whether every job finished.
    pub fn run_for(&mut self, doc: &mut Document, limit: Duration) -> bool {
        let deadline = Instant::now() + limit;
        while !self.jobs.is_empty() {
            let left = deadline.saturating_duration_since(Instant::now());
            match self.bus.evt_rx.recv_timeout(left) {
                Ok(event) => self.dispatch(event, doc),
                Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.jobs.is_empty()
    }

    /// Current state of a job, finished or not.
    pub fn state(&self, job: JobId) -> Option<&PrintState> {
        self.jobs
            .get(&job)
            .map(PrintJob::state)
            .or_else(|| self.finished.get(&job))
    }

    /// Terminal state of a finished job.
    pub fn outcome(&self, job: JobId) -> Option<&PrintState> {
        self.finished.get(&job)
    }

    /// Remove and return the terminal state of a finished job.
    ///
    /// Outcomes are kept until taken; long-lived runtimes should take them as jobs finish.
    pub fn take_outcome(&mut self, job: JobId) -> Option<PrintState> {
        self.finished.remove(&job)
    }

    /// Remove and return every outcome recorded so far.
    pub fn drain_outcomes(&mut self) -> Vec<(JobId, PrintState)> {
        let mut outcomes: Vec<_> = self.finished.drain().collect();
        outcomes.sort_by_key(|(job, _)| *job);
        outcomes
    }

    pub fn in_flight(&self) -> usize {
        self.jobs.len()
    }

    fn dispatch(&mut self, event: PrintEvent, doc: &mut Document) {
        let id = event.job();
        let Some(mut job) = self.jobs.remove(&id) else {
            log::debug!(target: "printer", "dropping {event:?}: job {id} is not running");
            return;
        };
        job.handle_event(event, &mut self.host, doc);
        self.keep_or_retire(job);
    }

    fn keep_or_retire(&mut self, job: PrintJob) {
        if job.is_finished() {
            self.finished.insert(job.id(), job.state().clone());
        } else {
            self.jobs.insert(job.id(), job);
        }
    }
}
