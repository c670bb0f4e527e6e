//! In-memory DOM the print engine reads from and renders into.

pub mod canvas;
pub mod cssom;
pub mod dom_utils;
pub mod fonts;
pub mod forms;
pub mod traverse;

mod clone;
mod document;
mod types;

pub use crate::canvas::Canvas2d;
pub use crate::clone::clone_structure;
pub use crate::cssom::{CssRule, SecurityError, StyleSheet};
pub use crate::document::{Document, DomError};
pub use crate::fonts::{FontFace, FontFaceSet, FontFaceStatus};
pub use crate::types::{Id, Node, NodeId, ShadowMode, ShadowRoot};
