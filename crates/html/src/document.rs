use crate::canvas::{Canvas2d, canvas_size};
use crate::cssom::StyleSheet;
use crate::dom_utils::{self, child_text};
use crate::fonts::FontFaceSet;
use crate::forms::{FormState, default_value, is_checkable};
use crate::traverse::{
    assign_node_ids, collect_ids, elements_by_tag, elements_preorder, find_node_by_id,
    find_node_by_id_mut, remove_node_by_id,
};
use crate::{Id, Node, NodeId, ShadowMode, ShadowRoot};
use image::RgbaImage;
use std::collections::HashMap;
use std::fmt;
use url::Url;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomError {
    UnknownNode(Id),
    NotAContainer(Id),
    NotAnElement(Id),
    ShadowRootExists(Id),
    NoShadowRoot(Id),
    NotAStyleSheet(Id),
    RootRemoval,
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::UnknownNode(id) => write!(f, "no node with id {}", id.0),
            DomError::NotAContainer(id) => write!(f, "node {} cannot have children", id.0),
            DomError::NotAnElement(id) => write!(f, "node {} is not an element", id.0),
            DomError::ShadowRootExists(id) => {
                write!(f, "element {} already hosts a shadow root", id.0)
            }
            DomError::NoShadowRoot(id) => write!(f, "element {} hosts no shadow root", id.0),
            DomError::NotAStyleSheet(id) => write!(f, "node {} owns no stylesheet", id.0),
            DomError::RootRemoval => f.write_str("the document node cannot be removed"),
        }
    }
}

impl std::error::Error for DomError {}

/// A document tree plus the state that lives beside it.
///
/// Everything outside `root` is keyed by node id and is exactly what a structural clone loses:
/// live form values, canvas bitmaps, shadow roots, stylesheet objects, nested frames.
#[derive(Clone, Debug)]
pub struct Document {
    root: Node,
    head: Id,
    body: Id,
    title: String,
    base_url: Option<Url>,
    next_id: NodeId,
    forms: FormState,
    canvases: HashMap<Id, RgbaImage>,
    shadow_roots: HashMap<Id, ShadowRoot>,
    sheets: HashMap<Id, StyleSheet>,
    frames: HashMap<Id, Document>,
    fonts: Option<FontFaceSet>,
}

impl Document {
    /// `<!DOCTYPE html><html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut root = Node::Document {
            id: Id::UNASSIGNED,
            doctype: Some("html".to_string()),
            children: vec![Node::element(
                "html",
                &[],
                vec![Node::element("head", &[], Vec::new()), Node::element("body", &[], Vec::new())],
            )],
        };
        let mut next_id = 1;
        assign_node_ids(&mut root, &mut next_id);

        let head = elements_by_tag(&root, "head")
            .first()
            .map(|n| n.id())
            .unwrap_or(Id::UNASSIGNED);
        let body = elements_by_tag(&root, "body")
            .first()
            .map(|n| n.id())
            .unwrap_or(Id::UNASSIGNED);

        Self {
            root,
            head,
            body,
            title: String::new(),
            base_url: None,
            next_id,
            forms: FormState::default(),
            canvases: HashMap::new(),
            shadow_roots: HashMap::new(),
            sheets: HashMap::new(),
            frames: HashMap::new(),
            fonts: Some(FontFaceSet::default()),
        }
    }

    /// A document whose environment has no font loading API.
    pub fn without_font_loading(mut self) -> Self {
        self.fonts = None;
        self
    }

    pub fn with_base_url(mut self, base: &str) -> Result<Self, url::ParseError> {
        self.base_url = Some(Url::parse(base)?);
        Ok(self)
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Resolve a (possibly relative) reference against the base URL, if there is one.
    pub fn resolve_url(&self, raw: &str) -> String {
        match &self.base_url {
            Some(base) => match base.join(raw) {
                Ok(url) => url.to_string(),
                Err(err) => {
                    log::debug!(target: "html", "kept {raw:?} as is, it does not resolve against {base}: {err}");
                    raw.to_string()
                }
            },
            None => raw.to_string(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn head(&self) -> Id {
        self.head
    }

    pub fn body(&self) -> Id {
        self.body
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn node(&self, id: Id) -> Option<&Node> {
        if !id.is_assigned() {
            return None;
        }
        find_node_by_id(&self.root, id).or_else(|| {
            self.shadow_roots
                .values()
                .flat_map(|s| s.children.iter())
                .find_map(|c| find_node_by_id(c, id))
        })
    }

    fn node_mut(&mut self, id: Id) -> Option<&mut Node> {
        if !id.is_assigned() {
            return None;
        }
        if find_node_by_id(&self.root, id).is_some() {
            return find_node_by_id_mut(&mut self.root, id);
        }
        self.shadow_roots
            .values_mut()
            .flat_map(|s| s.children.iter_mut())
            .find_map(|c| find_node_by_id_mut(c, id))
    }

    pub fn contains(&self, id: Id) -> bool {
        self.node(id).is_some()
    }

    /// Adopt `node` as the last child of `parent`. Unassigned ids in the subtree are numbered
    /// and `<style>` elements get a sheet parsed from their text.
    pub fn append_child(&mut self, parent: Id, mut node: Node) -> Result<Id, DomError> {
        let parent_node = self.node(parent).ok_or(DomError::UnknownNode(parent))?;
        if !matches!(parent_node, Node::Element { .. } | Node::Document { .. }) {
            return Err(DomError::NotAContainer(parent));
        }

        assign_node_ids(&mut node, &mut self.next_id);
        let id = node.id();
        self.adopt_style_sheets(&node);

        self.node_mut(parent)
            .and_then(Node::children_mut)
            .ok_or(DomError::NotAContainer(parent))?
            .push(node);
        Ok(id)
    }

    fn adopt_style_sheets(&mut self, node: &Node) {
        for style in elements_by_tag(node, "style") {
            self.sheets
                .entry(style.id())
                .or_insert_with(|| StyleSheet::parse(&child_text(style)));
        }
    }

    /// Detach a subtree and drop all side state that belonged to it.
    pub fn remove(&mut self, id: Id) -> Result<Node, DomError> {
        if id == self.root.id() {
            return Err(DomError::RootRemoval);
        }
        let removed = match remove_node_by_id(&mut self.root, id) {
            Some(node) => node,
            None => self
                .shadow_roots
                .values_mut()
                .find_map(|s| {
                    if let Some(pos) = s.children.iter().position(|c| c.id() == id) {
                        return Some(s.children.remove(pos));
                    }
                    s.children
                        .iter_mut()
                        .find_map(|c| remove_node_by_id(c, id))
                })
                .ok_or(DomError::UnknownNode(id))?,
        };
        self.forget_subtree(&removed);
        Ok(removed)
    }

    fn forget_subtree(&mut self, node: &Node) {
        let mut ids = Vec::new();
        collect_ids(node, &mut ids);
        for id in ids {
            self.forms.forget(id);
            self.canvases.remove(&id);
            self.sheets.remove(&id);
            self.frames.remove(&id);
            if let Some(shadow) = self.shadow_roots.remove(&id) {
                for c in &shadow.children {
                    self.forget_subtree(c);
                }
            }
        }
    }

    pub fn attr(&self, id: Id, name: &str) -> Option<&str> {
        self.node(id).and_then(|n| dom_utils::attr(n, name))
    }

    pub fn has_attr(&self, id: Id, name: &str) -> bool {
        self.node(id).is_some_and(|n| dom_utils::has_attr(n, name))
    }

    pub fn set_attr(&mut self, id: Id, name: &str, value: &str) -> Result<(), DomError> {
        let node = self.node_mut(id).ok_or(DomError::UnknownNode(id))?;
        if dom_utils::set_attr(node, name, value) {
            Ok(())
        } else {
            Err(DomError::NotAnElement(id))
        }
    }

    pub fn add_classes(&mut self, id: Id, classes: &str) -> Result<(), DomError> {
        let node = self.node_mut(id).ok_or(DomError::UnknownNode(id))?;
        if dom_utils::add_classes(node, classes) {
            Ok(())
        } else {
            Err(DomError::NotAnElement(id))
        }
    }

    /// Elements named `tag` inside `scope` (inclusive), in document order.
    pub fn elements_by_tag(&self, scope: Id, tag: &str) -> Vec<Id> {
        self.node(scope)
            .map(|n| elements_by_tag(n, tag).into_iter().map(Node::id).collect())
            .unwrap_or_default()
    }

    /// Elements inside `scope` (inclusive) matching `pred`, in document order.
    pub fn elements_matching(&self, scope: Id, pred: impl Fn(&Node) -> bool) -> Vec<Id> {
        self.node(scope)
            .map(|n| {
                elements_preorder(n)
                    .into_iter()
                    .filter(|e| pred(e))
                    .map(Node::id)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every light-tree element carrying `id="<value>"`.
    pub fn elements_with_html_id(&self, value: &str) -> Vec<Id> {
        elements_preorder(&self.root)
            .into_iter()
            .filter(|n| dom_utils::attr(n, "id") == Some(value))
            .map(Node::id)
            .collect()
    }

    /// `getElementById`
    pub fn element_by_html_id(&self, value: &str) -> Option<Id> {
        self.elements_with_html_id(value).into_iter().next()
    }

    // --- form controls ---

    /// Current `value` of an input or select: live state first, then markup defaults.
    pub fn control_value(&self, id: Id) -> String {
        if let Some(v) = self.forms.value(id) {
            return v.to_string();
        }
        self.node(id).map(default_value).unwrap_or_default()
    }

    pub fn set_control_value(&mut self, id: Id, value: impl Into<String>) {
        self.forms.set_value(id, value.into());
    }

    pub fn checked(&self, id: Id) -> bool {
        if let Some(c) = self.forms.checked(id) {
            return c;
        }
        self.node(id)
            .is_some_and(|n| is_checkable(n) && dom_utils::has_attr(n, "checked"))
    }

    pub fn set_checked(&mut self, id: Id, checked: bool) {
        self.forms.set_checked(id, checked);
    }

    // --- canvas ---

    pub fn canvas_bitmap(&self, id: Id) -> Option<&RgbaImage> {
        self.canvases.get(&id)
    }

    /// `getContext("2d")`. `None` when `id` is not a canvas in this document.
    pub fn context_2d(&mut self, id: Id) -> Option<Canvas2d<'_>> {
        let node = self.node(id).filter(|n| n.is_element("canvas"))?;
        let (w, h) = canvas_size(node);
        let bitmap = self
            .canvases
            .entry(id)
            .or_insert_with(|| RgbaImage::new(w, h));
        Some(Canvas2d::new(bitmap))
    }

    // --- shadow DOM ---

    pub fn attach_shadow(&mut self, host: Id, mode: ShadowMode) -> Result<(), DomError> {
        match self.node(host) {
            Some(Node::Element { .. }) => {}
            Some(_) => return Err(DomError::NotAnElement(host)),
            None => return Err(DomError::UnknownNode(host)),
        }
        if self.shadow_roots.contains_key(&host) {
            return Err(DomError::ShadowRootExists(host));
        }
        self.shadow_roots.insert(
            host,
            ShadowRoot {
                mode,
                children: Vec::new(),
            },
        );
        Ok(())
    }

    pub fn shadow_root(&self, host: Id) -> Option<&ShadowRoot> {
        self.shadow_roots.get(&host)
    }

    pub fn append_to_shadow(&mut self, host: Id, mut node: Node) -> Result<Id, DomError> {
        if !self.shadow_roots.contains_key(&host) {
            return Err(DomError::NoShadowRoot(host));
        }
        assign_node_ids(&mut node, &mut self.next_id);
        let id = node.id();
        self.adopt_style_sheets(&node);
        self.shadow_roots
            .get_mut(&host)
            .ok_or(DomError::NoShadowRoot(host))?
            .children
            .push(node);
        Ok(id)
    }

    // --- CSSOM ---

    pub fn sheet(&self, style: Id) -> Option<&StyleSheet> {
        self.sheets.get(&style)
    }

    pub fn set_sheet(&mut self, style: Id, sheet: StyleSheet) -> Result<(), DomError> {
        if !self.node(style).is_some_and(|n| n.is_element("style")) {
            return Err(DomError::NotAStyleSheet(style));
        }
        self.sheets.insert(style, sheet);
        Ok(())
    }

    pub fn insert_rule(&mut self, style: Id, css_text: &str, index: usize) -> Result<usize, DomError> {
        self.sheets
            .get_mut(&style)
            .map(|s| s.insert_rule(css_text, index))
            .ok_or(DomError::NotAStyleSheet(style))
    }

    // --- nested browsing contexts ---

    pub fn attach_frame(&mut self, iframe: Id, frame: Document) -> Result<(), DomError> {
        if !self.node(iframe).is_some_and(|n| n.is_element("iframe")) {
            return Err(DomError::NotAnElement(iframe));
        }
        self.frames.insert(iframe, frame);
        Ok(())
    }

    pub fn frame(&self, iframe: Id) -> Option<&Document> {
        self.frames.get(&iframe)
    }

    pub fn frame_mut(&mut self, iframe: Id) -> Option<&mut Document> {
        self.frames.get_mut(&iframe)
    }

    /// Borrow this document and one of its frames mutably at the same time.
    pub fn with_frame_mut<R>(
        &mut self,
        iframe: Id,
        f: impl FnOnce(&mut Document, &mut Document) -> R,
    ) -> Option<R> {
        let mut frame = self.frames.remove(&iframe)?;
        let out = f(self, &mut frame);
        // the closure may have detached the iframe element itself
        if self.contains(iframe) {
            self.frames.insert(iframe, frame);
        }
        Some(out)
    }

    // --- fonts ---

    pub fn fonts(&self) -> Option<&FontFaceSet> {
        self.fonts.as_ref()
    }

    pub fn fonts_mut(&mut self) -> Option<&mut FontFaceSet> {
        self.fonts.as_mut()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
