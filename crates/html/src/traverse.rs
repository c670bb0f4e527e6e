use crate::{Id, Node, NodeId};

/// Give every unassigned node in `root` a fresh id, drawing from `next`.
pub fn assign_node_ids(root: &mut Node, next: &mut NodeId) {
    // only assign if currently unset
    if !root.id().is_assigned() {
        root.set_id(Id(*next));
        *next = next.wrapping_add(1).max(1);
    }

    if let Some(children) = root.children_mut() {
        for c in children {
            assign_node_ids(c, next);
        }
    }
}

pub fn find_node_by_id(node: &Node, id: Id) -> Option<&Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children()
        .iter()
        .find_map(|c| find_node_by_id(c, id))
}

pub fn find_node_by_id_mut(node: &mut Node, id: Id) -> Option<&mut Node> {
    if node.id() == id {
        return Some(node);
    }
    node.children_mut()?
        .iter_mut()
        .find_map(|c| find_node_by_id_mut(c, id))
}

/// Detach the node with `id` from below `root`. The root itself is never removed.
pub fn remove_node_by_id(root: &mut Node, id: Id) -> Option<Node> {
    let children = root.children_mut()?;
    if let Some(pos) = children.iter().position(|c| c.id() == id) {
        return Some(children.remove(pos));
    }
    children
        .iter_mut()
        .find_map(|c| remove_node_by_id(c, id))
}

/// All elements in `node` (inclusive) in document order: pre-order, depth first.
pub fn elements_preorder(node: &Node) -> Vec<&Node> {
    fn walk<'a>(node: &'a Node, out: &mut Vec<&'a Node>) {
        if matches!(node, Node::Element { .. }) {
            out.push(node);
        }
        for c in node.children() {
            walk(c, out);
        }
    }

    let mut out = Vec::new();
    walk(node, &mut out);
    out
}

/// Elements named `tag` in `node` (inclusive), in document order.
pub fn elements_by_tag<'a>(node: &'a Node, tag: &str) -> Vec<&'a Node> {
    elements_preorder(node)
        .into_iter()
        .filter(|n| n.is_element(tag))
        .collect()
}

/// Every id in the subtree (inclusive).
pub fn collect_ids(node: &Node, out: &mut Vec<Id>) {
    out.push(node.id());
    for c in node.children() {
        collect_ids(c, out);
    }
}
