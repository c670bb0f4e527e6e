use std::sync::Arc;
use std::sync::mpsc::{SendError, Sender};
use std::thread;
use std::time::Duration;

use bus::{LoadCommand, ResourceCompletion, ResourceRequest, TimerWake};
use core_types::Viewport;
use html::Document;
use net::{Fetch, FetchError, HttpFetcher};
use printer::{NativePrint, PrintHost};
use runtime_net::start_resource_runtime;

/// Receives the owner document and the populated surface each time a print is invoked.
pub type PrintSink = Box<dyn FnMut(&Document, &Document)>;

/// A `PrintHost` without a screen: resources come from the network runtime, timers are
/// sleeping threads, and "printing" hands the surface to an optional sink.
pub struct HeadlessHost {
    viewport: Viewport,
    font_loading: bool,
    native_print: bool,
    loader: Sender<LoadCommand>,
    sink: Option<PrintSink>,
    prints: usize,
}

impl HeadlessHost {
    pub fn new(fetcher: Arc<dyn Fetch>) -> Self {
        Self {
            viewport: Viewport::default(),
            font_loading: true,
            native_print: true,
            loader: start_resource_runtime(fetcher),
            sink: None,
            prints: 0,
        }
    }

    /// A host that fetches over HTTP(S).
    pub fn with_http() -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(HttpFetcher::new()?)))
    }

    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    pub fn with_font_loading(mut self, supported: bool) -> Self {
        self.font_loading = supported;
        self
    }

    /// Behave like a platform whose frames have no print operation.
    pub fn without_native_print(mut self) -> Self {
        self.native_print = false;
        self
    }

    pub fn with_print_sink(mut self, sink: impl FnMut(&Document, &Document) + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// How many times printing was invoked.
    pub fn prints(&self) -> usize {
        self.prints
    }
}

impl PrintHost for HeadlessHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn supports_font_loading(&self) -> bool {
        self.font_loading
    }

    fn load(&mut self, request: ResourceRequest, done: ResourceCompletion) {
        if let Err(SendError(cmd)) = self.loader.send(LoadCommand::Load { request, done }) {
            if let LoadCommand::Load { done, .. } = cmd {
                done.failed("resource runtime is not running");
            }
        }
    }

    fn schedule(&mut self, delay: Duration, wake: TimerWake) {
        thread::spawn(move || {
            thread::sleep(delay);
            wake.fire();
        });
    }

    fn print_frame(&mut self, owner: &Document, frame: &Document) -> NativePrint {
        if !self.native_print {
            return NativePrint::Unsupported;
        }
        self.prints += 1;
        log::debug!(target: "platform", "printing \"{}\"", owner.title());
        if let Some(sink) = self.sink.as_mut() {
            sink(owner, frame);
        }
        NativePrint::Invoked
    }
}

impl Drop for HeadlessHost {
    fn drop(&mut self) {
        let _ = self.loader.send(LoadCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::{Id, Node};
    use image::{ImageFormat, RgbaImage};
    use net::FetchResponse;
    use printer::{PrintOptions, PrintRuntime, PrintState, PRINT_WINDOW_ID};
    use std::cell::RefCell;
    use std::io::Cursor;
    use std::rc::Rc;

    struct StaticFetcher;

    impl Fetch for StaticFetcher {
        fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
            let (status, body) = if url.ends_with("logo.png") {
                let mut png = Vec::new();
                RgbaImage::new(4, 4)
                    .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
                    .map_err(|e| FetchError::Transport(e.to_string()))?;
                (200, png)
            } else {
                (404, Vec::new())
            };
            Ok(FetchResponse {
                url: url.to_string(),
                requested_url: url.to_string(),
                status,
                content_type: None,
                body,
                duration_ms: 0,
            })
        }
    }

    fn page() -> (Document, Id) {
        let mut doc = Document::new().with_base_url("https://site.test/").unwrap();
        let body = doc.body();
        let content = doc
            .append_child(
                body,
                Node::element(
                    "section",
                    &[],
                    vec![
                        Node::element("img", &[("src", "logo.png")], vec![]),
                        Node::element("img", &[("src", "gone.png")], vec![]),
                    ],
                ),
            )
            .unwrap();
        (doc, content)
    }

    #[test]
    fn prints_after_network_resources_settle() {
        let (mut doc, content) = page();
        doc.set_title("Dashboard");

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink_seen = Rc::clone(&seen);
        let host = HeadlessHost::new(Arc::new(StaticFetcher)).with_print_sink(move |owner, frame| {
            sink_seen
                .borrow_mut()
                .push((owner.title().to_string(), frame.elements_by_tag(frame.body(), "img").len()));
        });

        let mut runtime = PrintRuntime::new(host);
        let options = PrintOptions::new()
            .with_content_node(content)
            .with_document_title("invoice-42")
            .with_suppress_errors(true);
        let job = runtime.print(&mut doc, options, None);

        assert!(runtime.run_for(&mut doc, Duration::from_secs(10)));
        assert_eq!(runtime.outcome(job), Some(&PrintState::Done));
        assert_eq!(runtime.host().prints(), 1);
        assert_eq!(*seen.borrow(), vec![("invoice-42".to_string(), 2)]);
        assert_eq!(doc.title(), "Dashboard");
        assert!(doc.element_by_html_id(PRINT_WINDOW_ID).is_none());
    }

    #[test]
    fn missing_print_operation_still_finishes() {
        let (mut doc, content) = page();
        let host = HeadlessHost::new(Arc::new(StaticFetcher)).without_native_print();
        let mut runtime = PrintRuntime::new(host);
        let job = runtime.print(
            &mut doc,
            PrintOptions::new()
                .with_content_node(content)
                .with_suppress_errors(true),
            None,
        );

        assert!(runtime.run_for(&mut doc, Duration::from_secs(10)));
        assert_eq!(runtime.outcome(job), Some(&PrintState::Done));
        assert_eq!(runtime.host().prints(), 0);
    }
}
