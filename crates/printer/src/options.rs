use crate::host::SurfaceRef;
use bus::{HookCompletion, HookError, PrintCompletion};
use core_types::ErrorLocation;
use html::{Document, Id};
use std::fmt;
use std::sync::Arc;

/// What a content source hands back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentRef {
    Node(Id),
    /// Content is legitimately absent right now.
    Null,
    /// The reference was never attached: a caller misconfiguration.
    Undefined,
}

pub type ContentSource = Arc<dyn Fn(&Document) -> ContentRef + Send + Sync>;
pub type AsyncHook = Arc<dyn Fn(HookCompletion) + Send + Sync>;
pub type AfterPrintHook = Arc<dyn Fn() + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(ErrorLocation, &HookError) + Send + Sync>;
pub type CustomPrint = Arc<dyn Fn(SurfaceRef<'_>, PrintCompletion) + Send + Sync>;

/// A font face to preload into the print surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Font {
    pub family: String,
    pub source: String,
    pub weight: Option<String>,
    pub style: Option<String>,
}

impl Font {
    pub fn new(family: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            source: source.into(),
            weight: None,
            style: None,
        }
    }

    pub fn weight(mut self, weight: impl Into<String>) -> Self {
        self.weight = Some(weight.into());
        self
    }

    pub fn style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

#[derive(Clone)]
pub enum PageStyle {
    Css(String),
    /// Evaluated at print time. `None` stands for "returned something that is not CSS".
    Computed(Arc<dyn Fn() -> Option<String> + Send + Sync>),
}

impl PageStyle {
    pub fn resolve(&self) -> Option<String> {
        match self {
            PageStyle::Css(css) => Some(css.clone()),
            PageStyle::Computed(f) => f(),
        }
    }
}

impl fmt::Debug for PageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageStyle::Css(css) => f.debug_tuple("Css").field(css).finish(),
            PageStyle::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Configuration for one print invocation.
#[derive(Clone)]
pub struct PrintOptions {
    pub content: Option<ContentSource>,
    /// Copy the calling document's `<style>` and stylesheet `<link>` nodes.
    pub copy_styles: bool,
    pub ignore_global_styles: bool,
    /// Space separated classes for the surface `<body>`.
    pub body_class: Option<String>,
    /// Title used while the dialog is open; browsers derive the PDF file name from it.
    /// An empty title leaves the existing ones in place.
    pub document_title: Option<String>,
    pub fonts: Vec<Font>,
    pub page_style: Option<PageStyle>,
    pub nonce: Option<String>,
    pub preserve_after_print: bool,
    pub suppress_errors: bool,
    /// Replaces the native print call entirely.
    pub print: Option<CustomPrint>,
    pub on_before_get_content: Option<AsyncHook>,
    pub on_before_print: Option<AsyncHook>,
    pub on_after_print: Option<AfterPrintHook>,
    pub on_print_error: Option<ErrorHook>,
    pub copy_shadow_roots: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            content: None,
            copy_styles: true,
            ignore_global_styles: false,
            body_class: None,
            document_title: None,
            fonts: Vec::new(),
            page_style: None,
            nonce: None,
            preserve_after_print: false,
            suppress_errors: false,
            print: None,
            on_before_get_content: None,
            on_before_print: None,
            on_after_print: None,
            on_print_error: None,
            copy_shadow_roots: false,
        }
    }
}

impl PrintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(
        mut self,
        f: impl Fn(&Document) -> ContentRef + Send + Sync + 'static,
    ) -> Self {
        self.content = Some(Arc::new(f));
        self
    }

    /// Print a fixed node.
    pub fn with_content_node(self, id: Id) -> Self {
        self.with_content(move |_| ContentRef::Node(id))
    }

    pub fn with_copy_styles(mut self, copy: bool) -> Self {
        self.copy_styles = copy;
        self
    }

    pub fn with_ignore_global_styles(mut self, ignore: bool) -> Self {
        self.ignore_global_styles = ignore;
        self
    }

    pub fn with_body_class(mut self, class: impl Into<String>) -> Self {
        self.body_class = Some(class.into());
        self
    }

    pub fn with_document_title(mut self, title: impl Into<String>) -> Self {
        self.document_title = Some(title.into());
        self
    }

    pub fn with_fonts(mut self, fonts: Vec<Font>) -> Self {
        self.fonts = fonts;
        self
    }

    pub fn with_page_style(mut self, css: impl Into<String>) -> Self {
        self.page_style = Some(PageStyle::Css(css.into()));
        self
    }

    pub fn with_computed_page_style(
        mut self,
        f: impl Fn() -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.page_style = Some(PageStyle::Computed(Arc::new(f)));
        self
    }

    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub fn with_preserve_after_print(mut self, preserve: bool) -> Self {
        self.preserve_after_print = preserve;
        self
    }

    pub fn with_suppress_errors(mut self, suppress: bool) -> Self {
        self.suppress_errors = suppress;
        self
    }

    pub fn with_print(
        mut self,
        f: impl Fn(SurfaceRef<'_>, PrintCompletion) + Send + Sync + 'static,
    ) -> Self {
        self.print = Some(Arc::new(f));
        self
    }

    pub fn with_on_before_get_content(
        mut self,
        f: impl Fn(HookCompletion) + Send + Sync + 'static,
    ) -> Self {
        self.on_before_get_content = Some(Arc::new(f));
        self
    }

    pub fn with_on_before_print(mut self, f: impl Fn(HookCompletion) + Send + Sync + 'static) -> Self {
        self.on_before_print = Some(Arc::new(f));
        self
    }

    pub fn with_on_after_print(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_after_print = Some(Arc::new(f));
        self
    }

    pub fn with_on_print_error(
        mut self,
        f: impl Fn(ErrorLocation, &HookError) + Send + Sync + 'static,
    ) -> Self {
        self.on_print_error = Some(Arc::new(f));
        self
    }

    pub fn with_copy_shadow_roots(mut self, copy: bool) -> Self {
        self.copy_shadow_roots = copy;
        self
    }

    /// Global `<style>`/`<link>` nodes take part in this invocation.
    pub(crate) fn uses_global_styles(&self) -> bool {
        self.copy_styles && !self.ignore_global_styles
    }
}

impl fmt::Debug for PrintOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintOptions")
            .field("content", &self.content.is_some())
            .field("copy_styles", &self.copy_styles)
            .field("ignore_global_styles", &self.ignore_global_styles)
            .field("body_class", &self.body_class)
            .field("document_title", &self.document_title)
            .field("fonts", &self.fonts)
            .field("page_style", &self.page_style)
            .field("nonce", &self.nonce)
            .field("preserve_after_print", &self.preserve_after_print)
            .field("suppress_errors", &self.suppress_errors)
            .field("print", &self.print.is_some())
            .field("on_before_get_content", &self.on_before_get_content.is_some())
            .field("on_before_print", &self.on_before_print.is_some())
            .field("on_after_print", &self.on_after_print.is_some())
            .field("on_print_error", &self.on_print_error.is_some())
            .field("copy_shadow_roots", &self.copy_shadow_roots)
            .finish()
    }
}
