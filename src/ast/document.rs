//! The document root and its header.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::attributes::AttributeBag;
use super::element::Element;

/// Document header: title, authors, revision, doctype, parsed from the
/// leading attribute/title/author/revision lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub revnumber: Option<String>,
    pub revdate: Option<String>,
    pub doctype: String,
}

/// The root of a parsed document tree.
///
/// Per the design notes, `CrossReference` never stores a direct reference to
/// its target (that would create ownership cycles). Instead, the
/// cross-reference resolver records each anchor id's *path* from the root
/// (a sequence of child indices) in `id_index`; [`Document::resolve`] walks
/// that path on demand. The tree itself stays a plain owned `Vec<Element>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub header: Option<Header>,
    pub attrs: AttributeBag,
    pub children: Vec<Element>,
    #[serde(skip)]
    pub id_index: HashMap<String, Vec<usize>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(&self) -> Option<&str> {
        self.header.as_ref().and_then(|h| h.title.as_deref())
    }

    /// Looks up the element carrying `id`, following the path recorded in
    /// `id_index`. Returns `None` for an id that was never indexed.
    pub fn resolve(&self, id: &str) -> Option<&Element> {
        let path = self.id_index.get(id)?;
        let mut children = &self.children;
        let mut node: Option<&Element> = None;
        for &idx in path {
            let el = children.get(idx)?;
            node = Some(el);
            children = &el.children;
        }
        node
    }
}
