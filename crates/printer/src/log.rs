use html::Node;
use html::dom_utils::attr;
use std::fmt::Display;

const TARGET: &str = "printer";

/// Per-invocation logger. Silent when the caller asked for suppressed errors.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrintLog {
    suppressed: bool,
}

impl PrintLog {
    pub fn new(suppressed: bool) -> Self {
        Self { suppressed }
    }

    pub fn error(&self, msg: impl Display) {
        if !self.suppressed {
            log::error!(target: TARGET, "{msg}");
        }
    }

    pub fn warn(&self, msg: impl Display) {
        if !self.suppressed {
            log::warn!(target: TARGET, "{msg}");
        }
    }

    pub fn debug(&self, msg: impl Display) {
        if !self.suppressed {
            log::debug!(target: TARGET, "{msg}");
        }
    }

    pub fn trace(&self, msg: impl Display) {
        if !self.suppressed {
            log::trace!(target: TARGET, "{msg}");
        }
    }
}

/// Short tag rendering for log lines: `<link rel="stylesheet" href="/a.css">`.
pub(crate) fn describe(node: Option<&Node>) -> String {
    let Some(node) = node else {
        return "<detached node>".to_string();
    };
    match node {
        Node::Element { name, .. } => {
            let mut out = format!("<{name}");
            for key in ["id", "rel", "href", "src"] {
                if let Some(v) = attr(node, key) {
                    out.push_str(&format!(" {key}=\"{v}\""));
                }
            }
            out.push('>');
            out
        }
        Node::Text { .. } => "#text".to_string(),
        Node::Comment { .. } => "#comment".to_string(),
        Node::Document { .. } => "#document".to_string(),
    }
}
