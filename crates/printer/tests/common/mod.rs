#![allow(dead_code)]

use html::Document;
use printer::PrintRuntime;
use print_test_support::{Fixture, RecordingHost, load_fixture};

pub fn fixture(name: &str) -> Fixture {
    let path = format!("{}/tests/fixtures/{name}.toml", env!("CARGO_MANIFEST_DIR"));
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|err| panic!("failed to read fixture {path}: {err}"));
    load_fixture(&source)
}

/// Let every outstanding load succeed, then let the settle delay pass.
pub fn finish(runtime: &mut PrintRuntime<RecordingHost>, doc: &mut Document) {
    runtime.pump(doc);
    runtime.host_mut().settle_all();
    runtime.pump(doc);
    runtime.host_mut().fire_timers();
    runtime.pump(doc);
}

pub fn instant_host() -> RecordingHost {
    RecordingHost::new().with_auto_load().with_auto_timers()
}
