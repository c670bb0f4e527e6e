//! Print a part of a document through an off-screen surface.
//!
//! ```no_run
//! use hardcopy::html::{Document, Node};
//! use hardcopy::platform::HeadlessHost;
//! use hardcopy::printer::{PrintOptions, PrintRuntime};
//! use std::time::Duration;
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let receipt = doc
//!     .append_child(body, Node::element("section", &[], vec![Node::text("Paid")]))
//!     .unwrap();
//!
//! let host = HeadlessHost::with_http().unwrap().with_print_sink(|_, frame| {
//!     println!("printing {:?}", frame.title());
//! });
//! let mut runtime = PrintRuntime::new(host);
//! runtime.print(&mut doc, PrintOptions::new().with_content_node(receipt), None);
//! runtime.run_for(&mut doc, Duration::from_secs(30));
//! ```

pub use html;
pub use platform;
pub use printer;
