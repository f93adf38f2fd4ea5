//! The element model: a closed sum type dispatched by visitor.
//!
//! Per the design notes, elements are modeled as a single tagged struct
//! (`ElementKind` + common fields) rather than one type per kind with a
//! shared trait object — a switch on the tag, not an inheritance hierarchy.

use serde::{Deserialize, Serialize};

use super::attributes::AttributeBag;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Document,
    Header,
    Section,
    Paragraph,
    Text,
    Emphasis,
    Strong,
    Highlight,
    Superscript,
    Subscript,
    InlineCode,
    CodeBlock,
    List,
    ListItem,
    DescriptionList,
    DescriptionListItem,
    Table,
    TableRow,
    TableCell,
    BlockQuote,
    Sidebar,
    Example,
    Verse,
    Open,
    Admonition,
    Image,
    Link,
    Anchor,
    CrossReference,
    Footnote,
    Macro,
    TableOfContents,
    TableOfContentsEntry,
    Comment,
    LineBreak,
    HorizontalRule,
    AttributeEntry,
}

/// What kind of list a `List` element is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ListKind {
    Unordered,
    Ordered,
}

/// A node in the document tree.
///
/// Text-bearing elements never carry a `None` where text is required:
/// construction substitutes the empty string for missing required content
/// rather than propagating a null (`Element::text` is always `Some` on
/// variants that have text; kind-specific helpers enforce this).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub kind: Option<ElementKind>,
    pub id: Option<String>,
    pub attrs: AttributeBag,
    pub children: Vec<Element>,
    /// Raw or resolved text payload: paragraph/text content, code block
    /// content, link URL, image path, footnote text, attribute value, etc.
    /// The field is reused across kinds rather than growing one optional
    /// field per kind, matching the closed-tag-set design.
    pub text: String,
    /// Level for `Header`/`Section` (1-6), depth for `TableOfContentsEntry`.
    pub level: usize,
    pub list_kind: Option<ListKind>,
    /// Resolved target id for `CrossReference`/`Link`/`Anchor`-adjacent uses.
    pub target: Option<String>,
    /// True for a footnote *reference* occurrence (`footnoteref:`), false
    /// for the owning definition.
    pub is_reference: bool,
    /// Name for block/inline macros (`kbd`, `btn`, `image`, ...).
    pub macro_name: Option<String>,
    /// 1-based source line, used only for diagnostics, never for semantics.
    pub source_line: usize,
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self { kind: Some(kind), ..Default::default() }
    }

    pub fn text_node(text: impl Into<String>) -> Self {
        Self { kind: Some(ElementKind::Text), text: text.into(), ..Default::default() }
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn kind(&self) -> ElementKind {
        self.kind.unwrap_or(ElementKind::Paragraph)
    }

    /// Dispatch this element (and recursively its children, for the default
    /// implementation of each visit method) to `visitor`.
    pub fn accept<V: Visitor>(&self, visitor: &mut V) {
        match self.kind() {
            ElementKind::Document => visitor.visit_document(self),
            ElementKind::Header => visitor.visit_header(self),
            ElementKind::Section => visitor.visit_section(self),
            ElementKind::Paragraph => visitor.visit_paragraph(self),
            ElementKind::Text => visitor.visit_text(self),
            ElementKind::Emphasis => visitor.visit_emphasis(self),
            ElementKind::Strong => visitor.visit_strong(self),
            ElementKind::Highlight => visitor.visit_highlight(self),
            ElementKind::Superscript => visitor.visit_superscript(self),
            ElementKind::Subscript => visitor.visit_subscript(self),
            ElementKind::InlineCode => visitor.visit_inline_code(self),
            ElementKind::CodeBlock => visitor.visit_code_block(self),
            ElementKind::List => visitor.visit_list(self),
            ElementKind::ListItem => visitor.visit_list_item(self),
            ElementKind::DescriptionList => visitor.visit_description_list(self),
            ElementKind::DescriptionListItem => visitor.visit_description_list_item(self),
            ElementKind::Table => visitor.visit_table(self),
            ElementKind::TableRow => visitor.visit_table_row(self),
            ElementKind::TableCell => visitor.visit_table_cell(self),
            ElementKind::BlockQuote => visitor.visit_block_quote(self),
            ElementKind::Sidebar => visitor.visit_sidebar(self),
            ElementKind::Example => visitor.visit_example(self),
            ElementKind::Verse => visitor.visit_verse(self),
            ElementKind::Open => visitor.visit_open(self),
            ElementKind::Admonition => visitor.visit_admonition(self),
            ElementKind::Image => visitor.visit_image(self),
            ElementKind::Link => visitor.visit_link(self),
            ElementKind::Anchor => visitor.visit_anchor(self),
            ElementKind::CrossReference => visitor.visit_cross_reference(self),
            ElementKind::Footnote => visitor.visit_footnote(self),
            ElementKind::Macro => visitor.visit_macro(self),
            ElementKind::TableOfContents => visitor.visit_toc(self),
            ElementKind::TableOfContentsEntry => visitor.visit_toc_entry(self),
            ElementKind::Comment => visitor.visit_comment(self),
            ElementKind::LineBreak => visitor.visit_line_break(self),
            ElementKind::HorizontalRule => visitor.visit_horizontal_rule(self),
            ElementKind::AttributeEntry => visitor.visit_attribute_entry(self),
        }
    }
}

/// One method per element kind; the default implementation simply recurses
/// into children via [`Visitor::visit_children`]. Converters override the
/// methods they care about and call `visit_children` (or nothing, for
/// leaves) to keep traversal going.
pub trait Visitor {
    fn visit_children(&mut self, element: &Element) {
        for child in &element.children {
            child.accept(self);
        }
    }

    fn visit_document(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_header(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_section(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_paragraph(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_text(&mut self, _e: &Element) {}
    fn visit_emphasis(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_strong(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_highlight(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_superscript(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_subscript(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_inline_code(&mut self, _e: &Element) {}
    fn visit_code_block(&mut self, _e: &Element) {}
    fn visit_list(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_list_item(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_description_list(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_description_list_item(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_table(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_table_row(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_table_cell(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_block_quote(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_sidebar(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_example(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_verse(&mut self, _e: &Element) {}
    fn visit_open(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_admonition(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_image(&mut self, _e: &Element) {}
    fn visit_link(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_anchor(&mut self, _e: &Element) {}
    fn visit_cross_reference(&mut self, _e: &Element) {}
    fn visit_footnote(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_macro(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_toc(&mut self, _e: &Element) {}
    fn visit_toc_entry(&mut self, e: &Element) { self.visit_children(e) }
    fn visit_comment(&mut self, _e: &Element) {}
    fn visit_line_break(&mut self, _e: &Element) {}
    fn visit_horizontal_rule(&mut self, _e: &Element) {}
    fn visit_attribute_entry(&mut self, _e: &Element) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingVisitor {
        count: usize,
    }
    impl Visitor for CountingVisitor {
        fn visit_text(&mut self, _e: &Element) {
            self.count += 1;
        }
    }

    #[test]
    fn default_visit_recurses_into_children() {
        let tree = Element::new(ElementKind::Paragraph).with_children(vec![
            Element::text_node("a"),
            Element::text_node("b"),
        ]);
        let mut v = CountingVisitor { count: 0 };
        tree.accept(&mut v);
        assert_eq!(v.count, 2);
    }
}
