pub type NodeId = u32;

/// Node identity within one `Document`. `Id(0)` marks a node that has not been adopted yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(pub NodeId);

impl Id {
    pub const UNASSIGNED: Id = Id(0);

    pub fn is_assigned(self) -> bool {
        self != Id::UNASSIGNED
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Document {
        id: Id,
        doctype: Option<String>,
        children: Vec<Node>,
    },
    Element {
        id: Id,
        name: String,
        attributes: Vec<(String, Option<String>)>,
        children: Vec<Node>,
    },
    Text {
        id: Id,
        text: String,
    },
    Comment {
        id: Id,
        text: String,
    },
}

impl Node {
    pub fn element(name: &str, attributes: &[(&str, &str)], children: Vec<Node>) -> Node {
        Node::Element {
            id: Id::UNASSIGNED,
            name: name.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), Some((*v).to_string())))
                .collect(),
            children,
        }
    }

    pub fn text(text: impl Into<String>) -> Node {
        Node::Text {
            id: Id::UNASSIGNED,
            text: text.into(),
        }
    }

    pub fn id(&self) -> Id {
        match self {
            Node::Document { id, .. }
            | Node::Element { id, .. }
            | Node::Text { id, .. }
            | Node::Comment { id, .. } => *id,
        }
    }

    /// Used when adopting a subtree into a document; ids are never reassigned afterwards.
    pub fn set_id(&mut self, new_id: Id) {
        let (Node::Document { id, .. }
        | Node::Element { id, .. }
        | Node::Text { id, .. }
        | Node::Comment { id, .. }) = self;
        *id = new_id;
    }

    /// Lowercase tag name for elements.
    pub fn name(&self) -> Option<&str> {
        if let Node::Element { name, .. } = self {
            Some(name)
        } else {
            None
        }
    }

    pub fn is_element(&self, tag: &str) -> bool {
        self.name().is_some_and(|n| n.eq_ignore_ascii_case(tag))
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text { .. })
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// `None` for leaves, which cannot adopt children.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => Some(children),
            Node::Text { .. } | Node::Comment { .. } => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShadowMode {
    Open,
    Closed,
}

/// Shadow content lives beside the tree, keyed by its host, so structural clones never see it.
#[derive(Clone, Debug, PartialEq)]
pub struct ShadowRoot {
    pub mode: ShadowMode,
    pub children: Vec<Node>,
}
