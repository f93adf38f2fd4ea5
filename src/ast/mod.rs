//! The document tree: a closed set of [`Element`] kinds with visitor-based
//! dispatch, an attribute bag shared by every element, and the [`Document`]
//! root that owns the tree plus the id index built by the cross-reference
//! resolver.

pub mod attributes;
pub mod document;
pub mod element;

pub use attributes::{parse_attribute_list, AttributeBag};
pub use document::{Document, Header};
pub use element::{Element, ElementKind, ListKind, Visitor};
