mod common;

use bus::PrintEvent;
use common::{finish, fixture};
use core_types::ResourceKind;
use log::Level;
use printer::{Font, PrintOptions, PrintRuntime, PrintState, SETTLE_DELAY};
use print_test_support::{RecordingHost, capture_logs};

fn invoice_fonts() -> Vec<Font> {
    vec![
        Font::new("Inter", "url(/fonts/inter.woff2)"),
        Font::new("Inter Mono", "url('/fonts/mono.woff2')")
            .weight("400")
            .style("italic"),
    ]
}

/// Settle every load of the invoice print in a rotated order, failing every `fail_every`th.
fn print_invoice_settling(rotate: usize, fail_every: usize) {
    let mut fx = fixture("invoice");
    let content = fx.id("invoice");
    let options = PrintOptions::new()
        .with_content_node(content)
        .with_fonts(invoice_fonts())
        .with_suppress_errors(true);

    let mut runtime = PrintRuntime::new(RecordingHost::new());
    let job = runtime.print(&mut fx.doc, options, None);

    // 2 stylesheet links + 3 images + 2 fonts
    let mut pending = runtime.host_mut().take_pending();
    assert_eq!(pending.len(), 7);
    let n = pending.len();
    pending.rotate_left(rotate % n);

    for (i, (request, done)) in pending.into_iter().enumerate() {
        assert!(
            runtime.host().scheduled().is_empty(),
            "released after only {i} of {n} resources"
        );
        if i % fail_every == 0 {
            done.failed(format!("{} is unreachable", request.url));
        } else {
            done.loaded();
        }
        runtime.pump(&mut fx.doc);
    }

    assert_eq!(runtime.host().scheduled(), &[SETTLE_DELAY]);
    runtime.host_mut().fire_timers();
    runtime.pump(&mut fx.doc);
    assert_eq!(runtime.host().prints().len(), 1);
    assert_eq!(runtime.outcome(job), Some(&PrintState::Done));
}

#[test]
fn barrier_releases_once_after_every_resource_in_any_order() {
    for rotate in 0..7 {
        for fail_every in [1, 2, 3, 100] {
            print_invoice_settling(rotate, fail_every);
        }
    }
}

#[test]
fn loads_are_resolved_against_the_page_url() {
    let mut fx = fixture("invoice");
    let content = fx.id("invoice");
    let mut runtime = PrintRuntime::new(RecordingHost::new());
    runtime.print(
        &mut fx.doc,
        PrintOptions::new()
            .with_content_node(content)
            .with_fonts(invoice_fonts()),
        None,
    );

    let mut requested: Vec<(ResourceKind, String)> = runtime
        .host()
        .requests()
        .iter()
        .map(|r| (r.kind, r.url.clone()))
        .collect();
    requested.sort();
    let mut expected = vec![
        (ResourceKind::Stylesheet, "https://shop.test/css/site.css".to_string()),
        (ResourceKind::Stylesheet, "https://shop.test/css/print.css".to_string()),
        (ResourceKind::Image, "https://shop.test/account/logo.png".to_string()),
        (ResourceKind::Image, "https://shop.test/img/stamp.png".to_string()),
        (ResourceKind::Image, "https://cdn.test/qr.png".to_string()),
        (ResourceKind::Font, "https://shop.test/fonts/inter.woff2".to_string()),
        (ResourceKind::Font, "https://shop.test/fonts/mono.woff2".to_string()),
    ];
    expected.sort();
    assert_eq!(requested, expected);

    finish(&mut runtime, &mut fx.doc);
    let frame = &runtime.host().prints()[0].frame;
    let fonts = frame.fonts().unwrap();
    assert_eq!(fonts.len(), 2);
    assert!(fonts.iter().all(|f| f.status == html::FontFaceStatus::Loaded));
    assert_eq!(fonts.get(1).unwrap().style.as_deref(), Some("italic"));
}

#[test]
fn duplicate_completion_counts_once() {
    let log = capture_logs();
    let mut fx = fixture("gallery");
    let content = fx.id("photos");
    let mut runtime = PrintRuntime::new(RecordingHost::new());
    let job = runtime.print(
        &mut fx.doc,
        PrintOptions::new()
            .with_content_node(content)
            .with_ignore_global_styles(true),
        None,
    );

    let mut pending = runtime.host_mut().take_pending();
    assert_eq!(pending.len(), 2);
    let (_, second) = pending.pop().unwrap();
    let (_, first) = pending.pop().unwrap();
    let first_key = first.resource();

    first.loaded();
    // an engine firing both load and error for the same element
    runtime
        .sender()
        .send(PrintEvent::ResourceSettled {
            job,
            resource: first_key,
            error: Some("late error".to_string()),
        })
        .unwrap();
    runtime.pump(&mut fx.doc);
    assert!(runtime.host().scheduled().is_empty());
    assert!(log.contains(Level::Debug, "already been handled"));

    second.loaded();
    runtime.pump(&mut fx.doc);
    assert_eq!(runtime.host().scheduled().len(), 1);
}

#[test]
fn two_images_without_style_copying_print_once_with_one_warning() {
    let log = capture_logs();
    let mut fx = fixture("gallery");
    let content = fx.id("photos");
    let mut runtime = PrintRuntime::new(RecordingHost::new());
    let job = runtime.print(
        &mut fx.doc,
        PrintOptions::new()
            .with_content_node(content)
            .with_copy_styles(false),
        None,
    );

    // the page's stylesheet link is neither counted nor requested
    let kinds: Vec<_> = runtime.host().requests().iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![ResourceKind::Image, ResourceKind::Image]);

    assert!(runtime.host_mut().settle("a.png", None));
    runtime.pump(&mut fx.doc);
    assert!(runtime.host().scheduled().is_empty());

    assert!(runtime.host_mut().settle("b.png", Some("HTTP 404 for b.png")));
    runtime.pump(&mut fx.doc);
    runtime.host_mut().fire_timers();
    runtime.pump(&mut fx.doc);

    assert_eq!(runtime.host().prints().len(), 1);
    assert_eq!(runtime.outcome(job), Some(&PrintState::Done));
    assert_eq!(log.count(Level::Warn), 1);
    assert!(log.contains(Level::Warn, "HTTP 404"));

    let frame = &runtime.host().prints()[0].frame;
    assert!(frame.elements_by_tag(frame.head(), "link").is_empty());
}

#[test]
fn empty_and_disabled_links_are_skipped_without_errors() {
    let log = capture_logs();
    let mut fx = fixture("links");
    let content = fx.id("note");
    let mut runtime = PrintRuntime::new(RecordingHost::new());
    runtime.print(&mut fx.doc, PrintOptions::new().with_content_node(content), None);

    // both links resolved on the spot: nothing to load, the settle timer is already running
    assert!(runtime.host().requests().is_empty());
    assert_eq!(runtime.host().scheduled().len(), 1);
    assert_eq!(log.count(Level::Warn), 2);
    assert!(!log.contains(Level::Warn, "unable to load a resource"));

    runtime.host_mut().fire_timers();
    runtime.pump(&mut fx.doc);
    let frame = &runtime.host().prints()[0].frame;
    assert!(frame.elements_by_tag(frame.head(), "link").is_empty());
}

#[test]
fn whitespace_references_are_still_requested() {
    let log = capture_logs();
    let mut doc = html::Document::new();
    let head = doc.head();
    doc.append_child(
        head,
        html::Node::element("link", &[("rel", "stylesheet"), ("href", " ")], vec![]),
    )
    .unwrap();
    let body = doc.body();
    let content = doc
        .append_child(
            body,
            html::Node::element("div", &[], vec![html::Node::element("img", &[("src", " ")], vec![])]),
        )
        .unwrap();

    let mut runtime = PrintRuntime::new(RecordingHost::new());
    runtime.print(&mut doc, PrintOptions::new().with_content_node(content), None);

    let mut kinds: Vec<_> = runtime.host().requests().iter().map(|r| r.kind).collect();
    kinds.sort();
    assert_eq!(kinds, vec![ResourceKind::Stylesheet, ResourceKind::Image]);
    assert!(log.messages(Level::Warn).is_empty());
}

#[test]
fn nothing_to_load_prints_right_away() {
    let mut fx = fixture("links");
    let content = fx.id("note");
    let mut runtime = PrintRuntime::new(RecordingHost::new());
    let job = runtime.print(
        &mut fx.doc,
        PrintOptions::new()
            .with_content_node(content)
            .with_ignore_global_styles(true),
        None,
    );
    assert_eq!(runtime.state(job), Some(&PrintState::Settling));
    finish(&mut runtime, &mut fx.doc);
    assert_eq!(runtime.outcome(job), Some(&PrintState::Done));
}
