use html::{Document, Id, Node};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct FixtureFile {
    title: String,
    base_url: Option<String>,
    head: Vec<FixtureNode>,
    body: Vec<FixtureNode>,
}

/// One node: an element when `tag` is set, otherwise a text node.
/// An element's `text` is shorthand for a leading text child.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
struct FixtureNode {
    tag: Option<String>,
    text: Option<String>,
    attrs: BTreeMap<String, String>,
    children: Vec<FixtureNode>,
    /// Live `value`, applied after the page is built (needs an `id` attribute).
    value: Option<String>,
    /// Live `checked`, same rules as `value`.
    checked: Option<bool>,
}

impl FixtureNode {
    fn to_node(&self) -> Node {
        match &self.tag {
            Some(tag) => {
                let attrs: Vec<(&str, &str)> = self
                    .attrs
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                // `text` on an element becomes its first child
                let children = self
                    .text
                    .iter()
                    .map(|t| Node::text(t.clone()))
                    .chain(self.children.iter().map(FixtureNode::to_node))
                    .collect();
                Node::element(tag, &attrs, children)
            }
            None => Node::text(self.text.clone().unwrap_or_default()),
        }
    }

    fn live_state<'a>(&'a self, out: &mut Vec<(&'a str, &'a FixtureNode)>) {
        if self.value.is_some() || self.checked.is_some() {
            let id = self.attrs.get("id").unwrap_or_else(|| {
                panic!("fixture node {:?} has live state but no id attribute", self.tag)
            });
            out.push((id.as_str(), self));
        }
        for c in &self.children {
            c.live_state(out);
        }
    }
}

/// A page built from a TOML fixture.
pub struct Fixture {
    pub doc: Document,
}

impl Fixture {
    /// Node id of the element with `id="<html_id>"`. Panics when there is none.
    pub fn id(&self, html_id: &str) -> Id {
        self.doc
            .element_by_html_id(html_id)
            .unwrap_or_else(|| panic!("fixture has no element with id {html_id:?}"))
    }
}

pub fn load_fixture(source: &str) -> Fixture {
    let file: FixtureFile =
        toml::from_str(source).unwrap_or_else(|err| panic!("failed to parse fixture TOML: {err}"));

    let mut doc = match &file.base_url {
        Some(base) => Document::new()
            .with_base_url(base)
            .unwrap_or_else(|err| panic!("bad fixture base_url {base:?}: {err}")),
        None => Document::new(),
    };
    doc.set_title(file.title.clone());

    for (parent, nodes) in [(doc.head(), &file.head), (doc.body(), &file.body)] {
        for node in nodes {
            doc.append_child(parent, node.to_node())
                .unwrap_or_else(|err| panic!("failed to build fixture: {err}"));
        }
    }

    let mut live = Vec::new();
    for node in file.head.iter().chain(file.body.iter()) {
        node.live_state(&mut live);
    }
    for (html_id, node) in live {
        let id = doc
            .element_by_html_id(html_id)
            .unwrap_or_else(|| panic!("fixture lost element {html_id:?}"));
        if let Some(value) = &node.value {
            doc.set_control_value(id, value.clone());
        }
        if let Some(checked) = node.checked {
            doc.set_checked(id, checked);
        }
    }

    Fixture { doc }
}
