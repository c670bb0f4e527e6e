//! What survives the trip into the print surface beyond plain markup.

mod common;

use common::{fixture, instant_host};
use html::dom_utils::collect_text;
use html::{Document, Id, Node, ShadowMode};
use log::Level;
use printer::{PrintOptions, PrintRuntime, PrintState};
use print_test_support::capture_logs;

fn print_once(doc: &mut Document, options: PrintOptions) -> Document {
    let mut runtime = PrintRuntime::new(instant_host());
    let job = runtime.print(doc, options, None);
    runtime.pump(doc);
    assert_eq!(runtime.outcome(job), Some(&PrintState::Done));
    runtime.host().prints()[0].frame.clone()
}

fn by_id(frame: &Document, value: &str) -> Id {
    frame
        .element_by_html_id(value)
        .unwrap_or_else(|| panic!("no #{value} in the printed frame"))
}

#[test]
fn canvas_pixels_are_carried_over() {
    let mut doc = Document::new();
    let body = doc.body();
    let chart = doc
        .append_child(
            body,
            Node::element(
                "figure",
                &[("id", "chart")],
                vec![
                    Node::element("canvas", &[("id", "bars"), ("width", "4"), ("height", "3")], vec![]),
                    Node::element("canvas", &[("id", "blank"), ("width", "2"), ("height", "2")], vec![]),
                ],
            ),
        )
        .unwrap();
    let bars = doc.element_by_html_id("bars").unwrap();
    {
        let mut ctx = doc.context_2d(bars).unwrap();
        ctx.fill_rect(0, 0, 2, 3, [200, 10, 10, 255]);
        ctx.fill_rect(2, 1, 2, 2, [10, 10, 200, 255]);
    }

    let frame = print_once(&mut doc, PrintOptions::new().with_content_node(chart));

    let copy = by_id(&frame, "bars");
    assert_eq!(frame.canvas_bitmap(copy), doc.canvas_bitmap(bars));
    assert_eq!(
        *frame.canvas_bitmap(copy).unwrap().get_pixel(3, 2),
        image::Rgba([10, 10, 200, 255])
    );
    // never drawn on, so nothing to repaint
    assert!(frame.canvas_bitmap(by_id(&frame, "blank")).is_none());
}

#[test]
fn live_form_state_wins_over_markup() {
    let mut fx = fixture("signup");
    let form = fx.id("signup");

    let frame = print_once(&mut fx.doc, PrintOptions::new().with_content_node(form));

    assert_eq!(frame.control_value(by_id(&frame, "name")), "X");
    assert!(frame.checked(by_id(&frame, "terms")));
    assert!(!frame.checked(by_id(&frame, "news")));
    assert_eq!(frame.control_value(by_id(&frame, "plan")), "pro");
    // the source keeps its own state
    assert_eq!(fx.doc.control_value(fx.id("name")), "X");
}

#[test]
fn markup_values_print_when_nothing_was_typed() {
    let mut doc = Document::new();
    let body = doc.body();
    let form = doc
        .append_child(
            body,
            Node::element(
                "form",
                &[],
                vec![Node::element("input", &[("id", "city"), ("value", "Utrecht")], vec![])],
            ),
        )
        .unwrap();

    let frame = print_once(&mut doc, PrintOptions::new().with_content_node(form));
    assert_eq!(frame.control_value(by_id(&frame, "city")), "Utrecht");
}

fn card_with_shadow(doc: &mut Document) -> Id {
    let body = doc.body();
    let card = doc
        .append_child(
            body,
            Node::element("div", &[("id", "card")], vec![Node::element("span", &[], vec![])]),
        )
        .unwrap();
    doc.attach_shadow(card, ShadowMode::Open).unwrap();
    let section = doc
        .append_to_shadow(
            card,
            Node::element("section", &[], vec![Node::text("Shadow heading")]),
        )
        .unwrap();
    doc.attach_shadow(section, ShadowMode::Closed).unwrap();
    doc.append_to_shadow(section, Node::text("Nested detail")).unwrap();
    card
}

#[test]
fn shadow_roots_are_copied_when_asked() {
    let mut doc = Document::new();
    let card = card_with_shadow(&mut doc);

    let frame = print_once(
        &mut doc,
        PrintOptions::new()
            .with_content_node(card)
            .with_copy_shadow_roots(true),
    );

    let copy = by_id(&frame, "card");
    let shadow = frame.shadow_root(copy).expect("shadow root on the copy");
    assert_eq!(shadow.mode, ShadowMode::Open);
    let mut text = String::new();
    collect_text(&shadow.children, &mut text);
    assert_eq!(text, "Shadow heading");

    let section = shadow.children[0].id();
    let nested = frame.shadow_root(section).expect("nested shadow root");
    assert_eq!(nested.mode, ShadowMode::Closed);
    let mut text = String::new();
    collect_text(&nested.children, &mut text);
    assert_eq!(text, "Nested detail");
}

#[test]
fn shadow_roots_stay_behind_by_default() {
    let log = capture_logs();
    let mut doc = Document::new();
    let card = card_with_shadow(&mut doc);

    let frame = print_once(&mut doc, PrintOptions::new().with_content_node(card));
    assert!(frame.shadow_root(by_id(&frame, "card")).is_none());
    assert!(log.messages(Level::Warn).is_empty());
}
