//! Structural clone of the content node plus the repairs a structural clone cannot carry.

use crate::log::{PrintLog, describe};
use html::dom_utils::attr;
use html::forms::is_checkable;
use html::traverse::elements_by_tag;
use html::{Document, DomError, Id, Node, clone_structure};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Element,
    /// Text (or comment) content: nothing inside it can be repaired or preloaded.
    Text,
}

/// A detached copy of the content, with the counts the barrier needs fixed up front.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub source: Id,
    pub node: Node,
    pub kind: ContentKind,
    pub images: usize,
    pub videos: usize,
}

impl Snapshot {
    /// Clone `id` out of `doc`. `None` when there is no such node or it is a whole document.
    pub fn take(doc: &Document, id: Id) -> Option<Snapshot> {
        let source = doc.node(id)?;
        let kind = match source {
            Node::Element { .. } => ContentKind::Element,
            Node::Text { .. } | Node::Comment { .. } => ContentKind::Text,
            Node::Document { .. } => return None,
        };
        let node = clone_structure(source);
        let (images, videos) = match kind {
            ContentKind::Element => (
                elements_by_tag(&node, "img").len(),
                elements_by_tag(&node, "video").len(),
            ),
            ContentKind::Text => (0, 0),
        };
        Some(Snapshot {
            source: id,
            node,
            kind,
            images,
            videos,
        })
    }
}

/// Paint each source canvas onto its clone, paired in document order.
///
/// Returns how many canvases were repainted.
pub fn repaint_canvases(
    source: &Document,
    source_root: Id,
    frame: &mut Document,
    clone_root: Id,
    log: PrintLog,
) -> usize {
    let originals = source.elements_by_tag(source_root, "canvas");
    let targets = frame.elements_by_tag(clone_root, "canvas");

    let mut painted = 0;
    for (i, original) in originals.iter().enumerate() {
        let Some(&target) = targets.get(i) else {
            log.warn(format_args!(
                "a canvas element could not be copied for printing, has it loaded? {}",
                describe(source.node(*original))
            ));
            continue;
        };
        // never drawn to: the clone is already blank
        let Some(bitmap) = source.canvas_bitmap(*original) else {
            continue;
        };
        if let Some(mut ctx) = frame.context_2d(target) {
            ctx.draw_image(bitmap, 0, 0);
            painted += 1;
        }
    }
    painted
}

/// Carry runtime form state (`value`, `checked`) from the source controls to their clones.
pub fn copy_live_values(
    source: &Document,
    source_root: Id,
    frame: &mut Document,
    clone_root: Id,
    log: PrintLog,
) {
    for tag in ["input", "select"] {
        let originals = source.elements_by_tag(source_root, tag);
        let copies = frame.elements_by_tag(clone_root, tag);
        if originals.len() != copies.len() {
            log.warn(format_args!(
                "found {} <{tag}> elements in the content but {} in its copy; extra controls keep their markup values",
                originals.len(),
                copies.len()
            ));
        }

        for (&original, &copy) in originals.iter().zip(copies.iter()) {
            frame.set_control_value(copy, source.control_value(original));
            if tag == "input" && source.node(original).is_some_and(is_checkable) {
                frame.set_checked(copy, source.checked(original));
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ShadowCopyError {
    /// The two trees no longer line up element for element.
    Mismatch { source: usize, clone: usize },
    Dom(DomError),
}

impl fmt::Display for ShadowCopyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShadowCopyError::Mismatch { source, clone } => write!(
                f,
                "source has {source} elements but its copy has {clone}; \
                 was the content changed after printing started?"
            ),
            ShadowCopyError::Dom(err) => write!(f, "could not attach shadow content: {err}"),
        }
    }
}

impl std::error::Error for ShadowCopyError {}

impl From<DomError> for ShadowCopyError {
    fn from(err: DomError) -> Self {
        ShadowCopyError::Dom(err)
    }
}

/// Attach a copy of every shadow root under `source_root` to the matching clone element,
/// recursing into shadow roots nested inside shadow content.
pub fn replicate_shadow_roots(
    source: &Document,
    source_root: Id,
    frame: &mut Document,
    clone_root: Id,
) -> Result<usize, ShadowCopyError> {
    let originals = source.elements_matching(source_root, |_| true);
    let copies = frame.elements_matching(clone_root, |_| true);
    if originals.len() != copies.len() {
        return Err(ShadowCopyError::Mismatch {
            source: originals.len(),
            clone: copies.len(),
        });
    }

    let mut copied = 0;
    for (&original, &copy) in originals.iter().zip(copies.iter()) {
        let Some(shadow) = source.shadow_root(original) else {
            continue;
        };
        frame.attach_shadow(copy, shadow.mode)?;
        copied += 1;

        for child in &shadow.children {
            let child_copy = frame.append_to_shadow(copy, clone_structure(child))?;
            if matches!(child, Node::Element { .. }) {
                copied += replicate_shadow_roots(source, child.id(), frame, child_copy)?;
            }
        }
    }
    Ok(copied)
}

/// An attribute, treating an empty value as absent. Whitespace alone still counts as a value.
pub(crate) fn non_empty_attr<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    attr(node, name).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::ShadowMode;

    fn doc_with(content: Node) -> (Document, Id) {
        let mut doc = Document::new();
        let body = doc.body();
        let id = doc.append_child(body, content).unwrap();
        (doc, id)
    }

    fn adopt(snapshot: &Snapshot) -> (Document, Id) {
        let mut frame = Document::new();
        let body = frame.body();
        let id = frame.append_child(body, snapshot.node.clone()).unwrap();
        (frame, id)
    }

    #[test]
    fn take_counts_images_and_videos_in_the_clone() {
        let (doc, id) = doc_with(Node::element(
            "div",
            &[],
            vec![
                Node::element("img", &[("src", "a.png")], vec![]),
                Node::element("p", &[], vec![Node::element("img", &[("src", "b.png")], vec![])]),
                Node::element("video", &[("src", "v.mp4")], vec![]),
            ],
        ));
        let snap = Snapshot::take(&doc, id).unwrap();
        assert_eq!(snap.kind, ContentKind::Element);
        assert_eq!((snap.images, snap.videos), (2, 1));
        assert!(!snap.node.id().is_assigned());
    }

    #[test]
    fn text_content_is_not_enhanced() {
        let (doc, id) = doc_with(Node::text("just words"));
        let snap = Snapshot::take(&doc, id).unwrap();
        assert_eq!(snap.kind, ContentKind::Text);
        assert_eq!((snap.images, snap.videos), (0, 0));
    }

    #[test]
    fn whole_document_cannot_be_snapshotted() {
        let doc = Document::new();
        assert!(Snapshot::take(&doc, doc.root().id()).is_none());
    }

    #[test]
    fn missing_clone_canvas_is_skipped() {
        let (mut doc, id) = doc_with(Node::element(
            "div",
            &[],
            vec![
                Node::element("canvas", &[("width", "2"), ("height", "2")], vec![]),
                Node::element("canvas", &[("width", "2"), ("height", "2")], vec![]),
            ],
        ));
        let canvases = doc.elements_by_tag(id, "canvas");
        for c in &canvases {
            doc.context_2d(*c).unwrap().fill_rect(0, 0, 2, 2, [9, 9, 9, 255]);
        }

        let mut frame = Document::new();
        let body = frame.body();
        let clone_root = frame
            .append_child(
                body,
                Node::element(
                    "div",
                    &[],
                    vec![Node::element("canvas", &[("width", "2"), ("height", "2")], vec![])],
                ),
            )
            .unwrap();

        let painted = repaint_canvases(&doc, id, &mut frame, clone_root, PrintLog::new(true));
        assert_eq!(painted, 1);
    }

    #[test]
    fn select_value_follows_live_state() {
        let (mut doc, id) = doc_with(Node::element(
            "select",
            &[],
            vec![
                Node::element("option", &[("value", "a")], vec![]),
                Node::element("option", &[("value", "b")], vec![]),
            ],
        ));
        doc.set_control_value(id, "b");
        let snap = Snapshot::take(&doc, id).unwrap();
        let (mut frame, clone_root) = adopt(&snap);

        copy_live_values(&doc, id, &mut frame, clone_root, PrintLog::new(true));
        assert_eq!(frame.control_value(clone_root), "b");
    }

    #[test]
    fn nested_shadow_roots_are_replicated() {
        let (mut doc, id) = doc_with(Node::element(
            "div",
            &[],
            vec![Node::element("x-card", &[], vec![])],
        ));
        let host = doc.elements_by_tag(id, "x-card")[0];
        doc.attach_shadow(host, ShadowMode::Open).unwrap();
        let inner = doc
            .append_to_shadow(host, Node::element("x-badge", &[], vec![]))
            .unwrap();
        doc.attach_shadow(inner, ShadowMode::Closed).unwrap();
        doc.append_to_shadow(inner, Node::text("new")).unwrap();

        let snap = Snapshot::take(&doc, id).unwrap();
        let (mut frame, clone_root) = adopt(&snap);
        let copied = replicate_shadow_roots(&doc, id, &mut frame, clone_root).unwrap();
        assert_eq!(copied, 2);

        let clone_host = frame.elements_by_tag(clone_root, "x-card")[0];
        let shadow = frame.shadow_root(clone_host).unwrap();
        assert_eq!(shadow.mode, ShadowMode::Open);
        let clone_inner = shadow.children[0].id();
        assert_eq!(frame.shadow_root(clone_inner).unwrap().mode, ShadowMode::Closed);
    }

    #[test]
    fn shadow_copy_refuses_diverged_trees() {
        let (mut doc, id) = doc_with(Node::element("div", &[], vec![]));
        let snap = Snapshot::take(&doc, id).unwrap();
        let (mut frame, clone_root) = adopt(&snap);
        doc.append_child(id, Node::element("span", &[], vec![])).unwrap();

        let err = replicate_shadow_roots(&doc, id, &mut frame, clone_root).unwrap_err();
        assert_eq!(err, ShadowCopyError::Mismatch { source: 2, clone: 1 });
    }
}
