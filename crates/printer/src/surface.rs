//! The off-screen `<iframe>` the content is staged in. All creation and removal goes through
//! this module so there is never more than one surface in a document.

use crate::log::PrintLog;
use core_types::Viewport;
use html::{Document, DomError, Id, Node};

/// `id` attribute every print surface carries.
pub const PRINT_WINDOW_ID: &str = "printWindow";

/// Create a fresh surface sized to the viewport and positioned entirely outside it.
///
/// Any surface left over from an earlier cycle is removed first.
pub fn create_surface(
    doc: &mut Document,
    viewport: Viewport,
    font_loading: bool,
    log: PrintLog,
) -> Result<Id, DomError> {
    let stale = remove_stale_surfaces(doc);
    if stale > 0 {
        log.debug(format_args!("removed {stale} print surface(s) left by an earlier print"));
    }

    let Viewport { width, height } = viewport;
    let width_attr = format!("{width}px");
    let height_attr = format!("{height}px");
    let style = format!(
        "position: absolute; top: -{}px; left: -{}px;",
        u64::from(height) + 100,
        u64::from(width) + 100
    );
    let iframe = Node::element(
        "iframe",
        &[
            ("id", PRINT_WINDOW_ID),
            ("width", &width_attr),
            ("height", &height_attr),
            ("style", &style),
        ],
        Vec::new(),
    );

    let body = doc.body();
    let id = doc.append_child(body, iframe)?;
    let frame = if font_loading {
        Document::new()
    } else {
        Document::new().without_font_loading()
    };
    doc.attach_frame(id, frame)?;
    log.trace(format_args!("created print surface {}", id.0));
    Ok(id)
}

/// Detach one surface. Removing a surface that is already gone does nothing.
pub fn remove_surface(doc: &mut Document, id: Id) -> bool {
    if !doc.node(id).is_some_and(|n| n.is_element("iframe")) {
        return false;
    }
    doc.remove(id).is_ok()
}

/// Remove every element carrying the surface id. Returns how many were removed.
pub fn remove_stale_surfaces(doc: &mut Document) -> usize {
    doc.elements_with_html_id(PRINT_WINDOW_ID)
        .into_iter()
        .filter(|id| doc.remove(*id).is_ok())
        .count()
}

pub fn surface_count(doc: &Document) -> usize {
    doc.elements_with_html_id(PRINT_WINDOW_ID).len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_is_sized_and_placed_off_screen() {
        let mut doc = Document::new();
        let id = create_surface(&mut doc, Viewport::new(800, 600), true, PrintLog::new(true)).unwrap();

        assert_eq!(doc.attr(id, "width"), Some("800px"));
        assert_eq!(doc.attr(id, "height"), Some("600px"));
        assert_eq!(
            doc.attr(id, "style"),
            Some("position: absolute; top: -700px; left: -900px;")
        );
        assert!(doc.frame(id).unwrap().fonts().is_some());
    }

    #[test]
    fn creating_again_replaces_the_stale_surface() {
        let mut doc = Document::new();
        let first = create_surface(&mut doc, Viewport::default(), true, PrintLog::new(true)).unwrap();
        let second = create_surface(&mut doc, Viewport::default(), false, PrintLog::new(true)).unwrap();

        assert_eq!(surface_count(&doc), 1);
        assert!(!doc.contains(first));
        assert!(doc.frame(first).is_none());
        assert!(doc.frame(second).unwrap().fonts().is_none());
    }

    #[test]
    fn removal_is_idempotent() {
        let mut doc = Document::new();
        let id = create_surface(&mut doc, Viewport::default(), true, PrintLog::new(true)).unwrap();
        assert!(remove_surface(&mut doc, id));
        assert!(!remove_surface(&mut doc, id));
        assert_eq!(surface_count(&doc), 0);
    }
}
