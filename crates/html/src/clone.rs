use crate::{Id, Node};

/// Deep structural copy of `node`, the equivalent of `cloneNode(true)`.
///
/// Only the tree travels. Anything the owning `Document` keeps beside the tree (live form
/// values, painted canvas pixels, shadow roots, stylesheet objects) stays behind, and every
/// copied node comes back unassigned so the adopting document can number it.
pub fn clone_structure(node: &Node) -> Node {
    match node {
        Node::Document {
            doctype, children, ..
        } => Node::Document {
            id: Id::UNASSIGNED,
            doctype: doctype.clone(),
            children: children.iter().map(clone_structure).collect(),
        },
        Node::Element {
            name,
            attributes,
            children,
            ..
        } => Node::Element {
            id: Id::UNASSIGNED,
            name: name.clone(),
            attributes: attributes.clone(),
            children: children.iter().map(clone_structure).collect(),
        },
        Node::Text { text, .. } => Node::Text {
            id: Id::UNASSIGNED,
            text: text.clone(),
        },
        Node::Comment { text, .. } => Node::Comment {
            id: Id::UNASSIGNED,
            text: text.clone(),
        },
    }
}
