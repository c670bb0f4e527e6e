//! Re-creates the calling document's styling and the clone's resources inside the surface.

use crate::barrier::{Barrier, Mark};
use crate::log::{PrintLog, describe};
use crate::options::PrintOptions;
use crate::snapshot::non_empty_attr;
use bus::{ResourceKey, ResourceRequest};
use core_types::ResourceKind;
use html::dom_utils::{has_attr, is_stylesheet_link, set_attr};
use html::{Document, DomError, FontFace, FontFaceStatus, Id, Node};

/// Injected when the caller gives no page style: no browser header/footer, print backgrounds.
pub const DEFAULT_PAGE_STYLE: &str = "
    @page {
        margin: 0;
    }
    @media print {
        body {
            color-adjust: exact;
            print-color-adjust: exact;
            -webkit-print-color-adjust: exact;
        }
    }
";

/// A load the host must perform once the surface is populated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingLoad {
    pub resource: ResourceKey,
    pub request: ResourceRequest,
}

/// `<style>` and stylesheet `<link>` elements of `doc`, in document order.
pub fn global_style_nodes(doc: &Document) -> Vec<Id> {
    doc.elements_matching(doc.root().id(), |n| {
        n.is_element("style") || is_stylesheet_link(n)
    })
}

/// The global nodes the barrier waits for. `<style>` content is copied synchronously.
pub fn count_global_style_links(doc: &Document) -> usize {
    doc.elements_matching(doc.root().id(), is_stylesheet_link).len()
}

/// Populates one surface document, marking what resolves immediately on the barrier and
/// collecting the rest as pending loads.
pub(crate) struct ResourceCopier<'a> {
    options: &'a PrintOptions,
    log: PrintLog,
    barrier: &'a mut Barrier,
    pending: Vec<PendingLoad>,
}

impl<'a> ResourceCopier<'a> {
    pub(crate) fn new(options: &'a PrintOptions, log: PrintLog, barrier: &'a mut Barrier) -> Self {
        Self {
            options,
            log,
            barrier,
            pending: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> Vec<PendingLoad> {
        self.pending
    }

    fn mark(&mut self, resource: ResourceKey, error: Option<&str>) -> Mark {
        self.barrier.mark_loaded(resource, error)
    }

    fn request(&mut self, resource: ResourceKey, kind: ResourceKind, url: String) {
        self.pending.push(PendingLoad {
            resource,
            request: ResourceRequest { kind, url },
        });
    }

    /// Register every font with the surface's font set.
    pub(crate) fn load_fonts(&mut self, source: &Document, frame: &mut Document) {
        let options = self.options;
        let fonts = &options.fonts;
        if fonts.is_empty() {
            return;
        }

        let Some(registry) = frame.fonts_mut() else {
            for i in 0..fonts.len() {
                self.mark(ResourceKey::Font(i), None);
            }
            self.log.warn(
                "unable to load custom fonts because the surface has no font loading API, \
                 will continue attempting to print the page",
            );
            return;
        };

        let mut requests = Vec::with_capacity(fonts.len());
        for (i, font) in fonts.iter().enumerate() {
            let face = FontFace::new(
                font.family.clone(),
                font.source.clone(),
                font.weight.clone(),
                font.style.clone(),
            );
            let url = face.source_url().map(|u| source.resolve_url(u));
            let index = registry.add(face);
            match url {
                Some(url) => {
                    registry.set_status(index, FontFaceStatus::Loading);
                    requests.push((i, Ok(url)));
                }
                None => {
                    registry.set_status(index, FontFaceStatus::Error);
                    requests.push((i, Err(font.family.clone())));
                }
            }
        }

        for (i, url) in requests {
            match url {
                Ok(url) => self.request(ResourceKey::Font(i), ResourceKind::Font, url),
                Err(family) => {
                    let msg = format!("failed loading the font {family:?}: it has no source");
                    self.mark(ResourceKey::Font(i), Some(&msg));
                }
            }
        }
    }

    pub(crate) fn apply_page_style(&mut self, frame: &mut Document) -> Result<(), DomError> {
        let css = match &self.options.page_style {
            None => DEFAULT_PAGE_STYLE.to_string(),
            Some(style) => match style.resolve() {
                Some(css) => css,
                None => {
                    self.log.warn(
                        "\"pageStyle\" must be a string or a function returning a string, \
                         no page style will be applied",
                    );
                    return Ok(());
                }
            },
        };

        let head = frame.head();
        let mut attributes = Vec::new();
        if let Some(nonce) = &self.options.nonce {
            attributes.push(("nonce", nonce.as_str()));
            frame.set_attr(head, "nonce", nonce)?;
        }
        frame.append_child(head, Node::element("style", &attributes, vec![Node::text(css)]))?;
        Ok(())
    }

    pub(crate) fn apply_body_class(&mut self, frame: &mut Document) -> Result<(), DomError> {
        if let Some(classes) = &self.options.body_class {
            let body = frame.body();
            frame.add_classes(body, classes)?;
        }
        Ok(())
    }

    /// Probe every `<img>` of the clone by its `src`.
    pub(crate) fn preload_images(&mut self, source: &Document, frame: &Document, clone_root: Id) {
        for img in frame.elements_by_tag(clone_root, "img") {
            let src = frame.node(img).and_then(|n| non_empty_attr(n, "src"));
            match src {
                Some(src) => {
                    let url = source.resolve_url(src);
                    self.request(ResourceKey::Element(img), ResourceKind::Image, url);
                }
                None => {
                    let msg = format!(
                        "found an <img> with an empty \"src\" attribute, it cannot be preloaded: {}",
                        describe(frame.node(img))
                    );
                    self.mark(ResourceKey::Element(img), Some(&msg));
                }
            }
        }
    }

    /// Ask every `<video>` of the clone to preload; wait on its poster when it has one.
    pub(crate) fn preload_videos(
        &mut self,
        source: &Document,
        frame: &mut Document,
        clone_root: Id,
    ) -> Result<(), DomError> {
        for video in frame.elements_by_tag(clone_root, "video") {
            frame.set_attr(video, "preload", "auto")?;
            let key = ResourceKey::Element(video);

            let Some(node) = frame.node(video) else {
                continue;
            };
            if let Some(poster) = non_empty_attr(node, "poster") {
                let url = source.resolve_url(poster);
                self.request(key, ResourceKind::VideoPoster, url);
                continue;
            }

            let src = non_empty_attr(node, "src").or_else(|| {
                node.children()
                    .iter()
                    .filter(|c| c.is_element("source"))
                    .find_map(|c| non_empty_attr(c, "src"))
            });
            match src {
                Some(src) => {
                    let url = source.resolve_url(src);
                    self.request(key, ResourceKind::Video, url);
                }
                None => {
                    let msg = format!("video has nothing to load: {}", describe(Some(node)));
                    self.mark(key, Some(&msg));
                }
            }
        }
        Ok(())
    }

    /// Copy the calling document's `<style>` rules and stylesheet links into the surface head.
    pub(crate) fn copy_global_styles(
        &mut self,
        source: &Document,
        frame: &mut Document,
    ) -> Result<(), DomError> {
        let head = frame.head();
        for (i, id) in global_style_nodes(source).into_iter().enumerate() {
            let Some(node) = source.node(id) else {
                continue;
            };

            if node.is_element("style") {
                let Some(sheet) = source.sheet(id) else {
                    continue;
                };
                let css = match sheet.css_rules() {
                    Ok(rules) => rules.iter().fold(String::new(), |mut out, rule| {
                        out.push_str(&rule.css_text);
                        out.push_str("\r\n");
                        out
                    }),
                    Err(err) => {
                        self.log.warn(format_args!(
                            "a stylesheet could not be accessed, most likely because it has \
                             cross-origin imports: {} original error: {err}",
                            describe(Some(node))
                        ));
                        String::new()
                    }
                };

                let style_id = format!("print-style-{i}");
                let mut attributes = vec![("id", style_id.as_str())];
                if let Some(nonce) = &self.options.nonce {
                    attributes.push(("nonce", nonce.as_str()));
                }
                frame.append_child(head, Node::element("style", &attributes, vec![Node::text(css)]))?;
                continue;
            }

            let Some(href) = non_empty_attr(node, "href") else {
                self.log.warn(format_args!(
                    "encountered a <link> with an empty \"href\" attribute, it was not loaded: {}",
                    describe(Some(node))
                ));
                self.mark(ResourceKey::SourceElement(id), None);
                continue;
            };
            if has_attr(node, "disabled") {
                self.log.warn(format_args!(
                    "encountered a <link> with a \"disabled\" attribute and will ignore it: {}",
                    describe(Some(node))
                ));
                self.mark(ResourceKey::SourceElement(id), None);
                continue;
            }

            let link = recreate_link(node, self.options.nonce.as_deref());
            let url = source.resolve_url(href);
            let link_id = frame.append_child(head, link)?;
            self.request(ResourceKey::Element(link_id), ResourceKind::Stylesheet, url);
        }
        Ok(())
    }
}

/// Attribute-for-attribute copy of a `<link>`, valueless attributes become empty strings.
fn recreate_link(node: &Node, nonce: Option<&str>) -> Node {
    let mut link = Node::element("link", &[], Vec::new());
    if let Node::Element { attributes, .. } = node {
        for (name, value) in attributes {
            set_attr(&mut link, name, value.as_deref().unwrap_or(""));
        }
    }
    if let Some(nonce) = nonce {
        set_attr(&mut link, "nonce", nonce);
    }
    link
}
