use crate::barrier::{Barrier, Mark};
use crate::host::{NativePrint, PrintHost, SurfaceRef};
use crate::log::PrintLog;
use crate::options::{ContentRef, ContentSource, PrintOptions};
use crate::sequencer::{AbortReason, Effect, Plan, PrintState, Step, transition};
use crate::snapshot::{ContentKind, Snapshot, copy_live_values, repaint_canvases, replicate_shadow_roots};
use crate::styles::{PendingLoad, ResourceCopier, count_global_style_links};
use crate::surface::{create_surface, remove_surface};
use bus::{
    Hook, HookCompletion, HookError, PrintCompletion, PrintEvent, ResourceCompletion, ResourceKey,
    TimerWake,
};
use core_types::JobId;
use html::{Document, DomError, FontFaceStatus};
use std::collections::VecDeque;
use std::sync::mpsc::Sender;

/// One print invocation: owns its barrier and surface, and executes the sequencer's effects.
pub struct PrintJob {
    id: JobId,
    options: PrintOptions,
    lazy_content: Option<ContentSource>,
    plan: Plan,
    state: PrintState,
    log: PrintLog,
    tx: Sender<PrintEvent>,
    content: Option<html::Id>,
    surface: Option<html::Id>,
    barrier: Option<Barrier>,
}

impl PrintJob {
    pub fn new(
        id: JobId,
        options: PrintOptions,
        lazy_content: Option<ContentSource>,
        tx: Sender<PrintEvent>,
    ) -> Self {
        let plan = Plan {
            before_get_content: options.on_before_get_content.is_some(),
            before_print: options.on_before_print.is_some(),
            custom_print: options.print.is_some(),
            preserve_after_print: options.preserve_after_print,
        };
        let log = PrintLog::new(options.suppress_errors);
        Self {
            id,
            options,
            lazy_content,
            plan,
            state: PrintState::Idle,
            log,
            tx,
            content: None,
            surface: None,
            barrier: None,
        }
    }

    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn state(&self) -> &PrintState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// The `<iframe>` this job created, if it got that far.
    pub fn surface(&self) -> Option<html::Id> {
        self.surface
    }

    pub fn start(&mut self, host: &mut dyn PrintHost, doc: &mut Document) {
        self.advance(Step::Start, host, doc);
    }

    pub fn handle_event(&mut self, event: PrintEvent, host: &mut dyn PrintHost, doc: &mut Document) {
        match event {
            PrintEvent::HookSettled { hook, result, .. } => {
                let step = match hook {
                    Hook::BeforeGetContent => Step::BeforeGetContentSettled(result),
                    Hook::BeforePrint => Step::BeforePrintSettled(result),
                };
                self.advance(step, host, doc);
            }
            PrintEvent::ResourceSettled {
                resource, error, ..
            } => self.resource_settled(resource, error, host, doc),
            PrintEvent::SettleElapsed { .. } => {
                let surface_present = self.surface.is_some_and(|s| doc.frame(s).is_some());
                self.advance(Step::SettleElapsed { surface_present }, host, doc);
            }
            PrintEvent::CustomPrintSettled { result, .. } => {
                self.advance(Step::CustomPrintSettled(result), host, doc);
            }
        }
    }

    fn resource_settled(
        &mut self,
        resource: ResourceKey,
        error: Option<String>,
        host: &mut dyn PrintHost,
        doc: &mut Document,
    ) {
        if let ResourceKey::Font(index) = resource {
            let status = if error.is_some() {
                FontFaceStatus::Error
            } else {
                FontFaceStatus::Loaded
            };
            if let Some(fonts) = self
                .surface
                .and_then(|s| doc.frame_mut(s))
                .and_then(Document::fonts_mut)
            {
                fonts.set_status(index, status);
            }
        }

        let Some(barrier) = self.barrier.as_mut() else {
            self.log
                .debug(format_args!("ignoring {resource:?}: nothing is being loaded"));
            return;
        };
        if barrier.mark_loaded(resource, error.as_deref()) == Mark::Released {
            self.advance(Step::ResourcesReady, host, doc);
        }
    }

    fn advance(&mut self, step: Step, host: &mut dyn PrintHost, doc: &mut Document) {
        let mut queue = VecDeque::from([step]);
        while let Some(step) = queue.pop_front() {
            let (next, effects) = transition(&self.state, step, &self.plan);
            if next != self.state {
                self.log.trace(format_args!(
                    "job {}: {:?} -> {:?}",
                    self.id, self.state, next
                ));
            }
            self.state = next;
            for effect in effects {
                if let Some(step) = self.execute(effect, host, doc) {
                    queue.push_back(step);
                }
            }
        }
    }

    fn execute(&mut self, effect: Effect, host: &mut dyn PrintHost, doc: &mut Document) -> Option<Step> {
        match effect {
            Effect::RunBeforeGetContent => match self.options.on_before_get_content.clone() {
                Some(hook) => {
                    hook(HookCompletion::new(self.tx.clone(), self.id, Hook::BeforeGetContent));
                    None
                }
                None => Some(Step::BeforeGetContentSettled(Ok(()))),
            },
            Effect::ResolveContent => Some(Step::ContentResolved(self.resolve_content(doc))),
            Effect::CloneContent => Some(match self.clone_content(host, doc) {
                Ok(()) => Step::Cloned,
                Err(reason) => Step::CloneFailed(reason),
            }),
            Effect::AwaitResources => {
                let barrier = self.barrier.as_mut()?;
                (barrier.is_released() || barrier.release_if_empty()).then_some(Step::ResourcesReady)
            }
            Effect::RunBeforePrint => match self.options.on_before_print.clone() {
                Some(hook) => {
                    hook(HookCompletion::new(self.tx.clone(), self.id, Hook::BeforePrint));
                    None
                }
                None => Some(Step::BeforePrintSettled(Ok(()))),
            },
            Effect::StartSettleTimer(delay) => {
                host.schedule(delay, TimerWake::new(self.tx.clone(), self.id));
                None
            }
            Effect::InvokeCustomPrint => self.custom_print(host, doc),
            Effect::InvokeNativePrint => {
                self.native_print(host, doc);
                Some(Step::NativePrintDone)
            }
            Effect::RunAfterPrint => {
                if let Some(hook) = &self.options.on_after_print {
                    hook();
                }
                Some(Step::AfterPrintDone)
            }
            Effect::Cleanup { remove_surface: remove } => {
                if remove {
                    if let Some(surface) = self.surface {
                        remove_surface(doc, surface);
                    }
                }
                Some(Step::CleanedUp)
            }
            Effect::ReportError { location, error } => {
                match &self.options.on_print_error {
                    Some(on_error) => on_error(location, &error),
                    None => self.log.error(format_args!(
                        "an error was thrown by \"{location}\": {error}"
                    )),
                }
                None
            }
            Effect::Abort(reason) => {
                self.log.error(reason);
                None
            }
        }
    }

    fn resolve_content(&mut self, doc: &Document) -> Result<(), AbortReason> {
        let source = match (&self.lazy_content, &self.options.content) {
            (Some(lazy), configured) => {
                if configured.is_some() {
                    self.log.warn(
                        "received a content option and a content source passed to print; \
                         the content option will be ignored",
                    );
                }
                lazy.clone()
            }
            (None, Some(configured)) => configured.clone(),
            (None, None) => return Err(AbortReason::NoContentSource),
        };

        match source(doc) {
            ContentRef::Node(id) if doc.contains(id) => {
                self.content = Some(id);
                Ok(())
            }
            ContentRef::Node(_) => Err(AbortReason::ContentNotFound),
            ContentRef::Null => Err(AbortReason::ContentNull),
            ContentRef::Undefined => Err(AbortReason::ContentUndefined),
        }
    }

    fn clone_content(&mut self, host: &mut dyn PrintHost, doc: &mut Document) -> Result<(), AbortReason> {
        let content = self.content.ok_or(AbortReason::ContentNotFound)?;
        let snapshot = Snapshot::take(doc, content).ok_or(AbortReason::ContentNotFound)?;

        // fixed before anything starts loading
        let links = if self.options.uses_global_styles() {
            count_global_style_links(doc)
        } else {
            0
        };
        let total = links + snapshot.images + snapshot.videos + self.options.fonts.len();
        let mut barrier = Barrier::new(total, self.log);
        self.log.trace(format_args!(
            "job {}: waiting on {total} resource(s)",
            self.id
        ));

        let surface = create_surface(doc, host.viewport(), host.supports_font_loading(), self.log)
            .map_err(|err| {
                self.log.error(format_args!("could not create the print surface: {err}"));
                AbortReason::SurfaceUnavailable
            })?;
        self.surface = Some(surface);

        let options = &self.options;
        let log = self.log;
        let populated = doc.with_frame_mut(surface, |outer, frame| {
            populate(options, log, &mut barrier, snapshot, outer, frame)
        });
        let pending = match populated {
            Some(Ok(pending)) => pending,
            Some(Err(err)) => {
                self.log.error(format_args!("could not populate the print surface: {err}"));
                remove_surface(doc, surface);
                return Err(AbortReason::SurfaceUnavailable);
            }
            None => return Err(AbortReason::SurfaceUnavailable),
        };
        self.barrier = Some(barrier);

        for PendingLoad { resource, request } in pending {
            host.load(request, ResourceCompletion::new(self.tx.clone(), self.id, resource));
        }
        Ok(())
    }

    fn custom_print(&mut self, host: &mut dyn PrintHost, doc: &Document) -> Option<Step> {
        let print = self.options.print.clone()?;
        let element = self.surface?;
        match doc.frame(element) {
            Some(frame) => {
                host.focus_frame(frame);
                print(
                    SurfaceRef { element, frame },
                    PrintCompletion::new(self.tx.clone(), self.id),
                );
                None
            }
            None => Some(Step::CustomPrintSettled(Err(HookError::new(
                "the print surface is gone",
            )))),
        }
    }

    fn native_print(&mut self, host: &mut dyn PrintHost, doc: &mut Document) {
        let Some(surface) = self.surface else {
            return;
        };

        // some engines take the file name from the outer title, some from the frame's
        let title = self.options.document_title.as_ref().filter(|t| !t.is_empty());
        let saved = title.map(|title| {
            let outer = doc.title().to_string();
            doc.set_title(title.clone());
            let inner = doc.frame_mut(surface).map(|frame| {
                let previous = frame.title().to_string();
                frame.set_title(title.clone());
                previous
            });
            (outer, inner)
        });

        let result = match doc.frame(surface) {
            Some(frame) => {
                host.focus_frame(frame);
                host.print_frame(doc, frame)
            }
            None => NativePrint::Unsupported,
        };

        if let Some((outer, inner)) = saved {
            doc.set_title(outer);
            if let (Some(frame), Some(inner)) = (doc.frame_mut(surface), inner) {
                frame.set_title(inner);
            }
        }

        if result == NativePrint::Unsupported {
            self.log.error(
                "printing is not possible here: the print surface has no print operation",
            );
        }
    }
}

/// Attach the clone to the surface and bring over everything it needs.
fn populate(
    options: &PrintOptions,
    log: PrintLog,
    barrier: &mut Barrier,
    snapshot: Snapshot,
    source: &mut Document,
    frame: &mut Document,
) -> Result<Vec<PendingLoad>, DomError> {
    let source: &Document = source;
    let Snapshot {
        source: source_root,
        node,
        kind,
        ..
    } = snapshot;

    let body = frame.body();
    let clone_root = frame.append_child(body, node)?;

    if options.copy_shadow_roots && kind == ContentKind::Element {
        match replicate_shadow_roots(source, source_root, frame, clone_root) {
            Ok(copied) => log.trace(format_args!("copied {copied} shadow root(s)")),
            Err(err) => log.warn(format_args!("shadow roots were not copied: {err}")),
        }
    }

    let mut copier = ResourceCopier::new(options, log, barrier);
    copier.load_fonts(source, frame);
    copier.apply_page_style(frame)?;
    copier.apply_body_class(frame)?;

    if kind == ContentKind::Element {
        repaint_canvases(source, source_root, frame, clone_root, log);
        copier.preload_images(source, frame, clone_root);
        copier.preload_videos(source, frame, clone_root)?;
        copy_live_values(source, source_root, frame, clone_root, log);
    }

    if options.uses_global_styles() {
        copier.copy_global_styles(source, frame)?;
    }
    Ok(copier.finish())
}
