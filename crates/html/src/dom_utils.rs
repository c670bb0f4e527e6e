use crate::Node;

pub fn attr<'a>(node: &'a Node, name: &str) -> Option<&'a str> {
    match node {
        Node::Element { attributes, .. } => attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref()),
        _ => None,
    }
}

pub fn has_attr(node: &Node, name: &str) -> bool {
    match node {
        Node::Element { attributes, .. } => {
            attributes.iter().any(|(k, _)| k.eq_ignore_ascii_case(name))
        }
        _ => false,
    }
}

/// Set or overwrite an attribute. Returns `false` for non-element nodes.
pub fn set_attr(node: &mut Node, name: &str, value: &str) -> bool {
    let Node::Element { attributes, .. } = node else {
        return false;
    };
    match attributes
        .iter_mut()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
    {
        Some((_, v)) => *v = Some(value.to_string()),
        None => attributes.push((name.to_ascii_lowercase(), Some(value.to_string()))),
    }
    true
}

/// Add each whitespace separated class in `classes` unless already present.
pub fn add_classes(node: &mut Node, classes: &str) -> bool {
    let mut current: Vec<String> = attr(node, "class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default();
    for class in classes.split(' ').filter(|c| !c.is_empty()) {
        if !current.iter().any(|c| c == class) {
            current.push(class.to_string());
        }
    }
    set_attr(node, "class", &current.join(" "))
}

/// Does the attribute hold `token` in its whitespace separated list (`[attr~=token]`)?
pub fn attr_has_token(node: &Node, name: &str, token: &str) -> bool {
    attr(node, name).is_some_and(|v| {
        v.split_whitespace()
            .any(|t| t.eq_ignore_ascii_case(token))
    })
}

/// `link[rel~='stylesheet'], link[as='style']`
pub fn is_stylesheet_link(node: &Node) -> bool {
    node.is_element("link")
        && (attr_has_token(node, "rel", "stylesheet")
            || attr(node, "as").is_some_and(|v| v.eq_ignore_ascii_case("style")))
}

/// Concatenated text of the direct text children.
pub fn child_text(node: &Node) -> String {
    let mut out = String::new();
    for c in node.children() {
        if let Node::Text { text, .. } = c {
            out.push_str(text);
        }
    }
    out
}

/// Concatenated text of all descendant text nodes.
pub fn collect_text(nodes: &[Node], out: &mut String) {
    for n in nodes {
        match n {
            Node::Text { text, .. } => out.push_str(text),
            Node::Element { children, .. } | Node::Document { children, .. } => {
                collect_text(children, out);
            }
            Node::Comment { .. } => {}
        }
    }
}
