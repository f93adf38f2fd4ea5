//! The reference HTML converter.
//!
//! Emits via the element model's own visitor dispatch: each visit method
//! pushes its kind onto the [`ConverterContext`] stack, writes its open
//! tag(s), recurses into children, writes its close tag(s), and pops.

use log::warn;

use crate::ast::{Document, Element, ElementKind, Visitor};

use super::{Converter, ConverterContext, ConvertOptions, PropertyValue};

const DEFAULT_ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

pub struct HtmlConverter;

impl Converter<String> for HtmlConverter {
    fn convert_with(&self, document: &Document, options: &ConvertOptions) -> String {
        let mut emitter = HtmlEmitter::new(document, options);
        for child in &document.children {
            child.accept(&mut emitter);
        }
        emitter.finish()
    }
}

struct Footnote {
    id: String,
    number: usize,
    body: String,
}

struct HtmlEmitter<'a> {
    document: &'a Document,
    ctx: ConverterContext<'a>,
    out: String,
    footnotes: Vec<Footnote>,
    indent: usize,
}

impl<'a> HtmlEmitter<'a> {
    fn new(document: &'a Document, options: &'a ConvertOptions) -> Self {
        let mut emitter = Self { document, ctx: ConverterContext::new(options), out: String::new(), footnotes: Vec::new(), indent: 0 };
        emitter.write_preamble();
        emitter
    }

    fn write_preamble(&mut self) {
        if !self.ctx.options.output_full_document {
            self.write_root_open();
            return;
        }
        let title = self.document.title().unwrap_or("Untitled");
        self.out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>");
        self.out.push_str(&escape(title));
        self.out.push_str("</title>\n</head>\n<body>\n");
        self.write_root_open();
    }

    fn write_root_open(&mut self) {
        self.newline_indent();
        if self.is_book() {
            self.out.push_str("<div class=\"book\">");
        } else {
            self.out.push_str("<article>");
        }
        self.indent += 1;
        if let Some(header) = &self.document.header {
            self.write_header(header);
        }
        if self.document.attrs.get("toc").is_some() {
            self.write_toc();
        }
    }

    fn is_book(&self) -> bool {
        self.document.header.as_ref().map(|h| h.doctype.as_str()) == Some("book")
    }

    fn write_header(&mut self, header: &crate::ast::Header) {
        self.newline_indent();
        self.out.push_str("<h1>");
        self.out.push_str(&escape(header.title.as_deref().unwrap_or("")));
        self.out.push_str("</h1>");
        if !header.authors.is_empty() || header.revnumber.is_some() {
            self.out.push_str("<div class=\"byline\">");
            self.out.push_str(&escape(&header.authors.join(", ")));
            if let Some(rev) = &header.revnumber {
                self.out.push_str(" v");
                self.out.push_str(&escape(rev));
            }
            if let Some(date) = &header.revdate {
                self.out.push_str(", ");
                self.out.push_str(&escape(date));
            }
            self.out.push_str("</div>");
        }
    }

    fn write_toc(&mut self) {
        let max_depth: usize = self
            .document
            .attrs
            .get("toclevels")
            .and_then(|v| v.parse().ok())
            .unwrap_or(2);
        self.newline_indent();
        let mut toc = String::from("<div class=\"toc\">");
        write_toc_entries(&self.document.children, 1, max_depth, &mut toc);
        toc.push_str("</div>");
        self.out.push_str(&toc);
    }

    fn finish(mut self) -> String {
        if !self.footnotes.is_empty() {
            self.write_footnotes();
        }
        self.indent = self.indent.saturating_sub(1);
        self.newline_indent();
        if self.is_book() {
            self.out.push_str("</div>");
        } else {
            self.out.push_str("</article>");
        }
        if self.ctx.options.output_full_document {
            self.out.push_str("\n</body>\n</html>\n");
        }
        self.out
    }

    fn write_footnotes(&mut self) {
        self.newline_indent();
        self.out.push_str("<div class=\"footnotes\"><hr/><ol>");
        self.indent += 1;
        for note in &self.footnotes {
            self.newline_indent();
            self.out.push_str(&format!(
                "<li id=\"fn-{id}\">{body} <a href=\"#fnref-{id}\">↩</a></li>",
                id = note.id,
                body = note.body
            ));
        }
        self.indent = self.indent.saturating_sub(1);
        self.newline_indent();
        self.out.push_str("</ol></div>");
    }

    fn render_children_to_string(&mut self, element: &Element) -> String {
        let saved = std::mem::take(&mut self.out);
        self.visit_children(element);
        std::mem::replace(&mut self.out, saved)
    }

    fn open(&mut self, kind: ElementKind, tag: &str, attrs: &str) {
        self.ctx.push(kind);
        self.out.push('<');
        self.out.push_str(tag);
        if !attrs.is_empty() {
            self.out.push(' ');
            self.out.push_str(attrs);
        }
        self.out.push('>');
    }

    fn close(&mut self, tag: &str) {
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
        self.ctx.pop();
    }

    /// Like `open`, but for structural container elements (sections, lists,
    /// tables, ...) rather than inline ones — emits a newline/indent before
    /// the tag when `pretty_print` is on. Never used for inline spans: doing
    /// so would insert whitespace into running text.
    fn open_block(&mut self, kind: ElementKind, tag: &str, attrs: &str) {
        self.newline_indent();
        self.open(kind, tag, attrs);
        self.indent += 1;
    }

    fn close_block(&mut self, tag: &str) {
        self.indent = self.indent.saturating_sub(1);
        self.newline_indent();
        self.close(tag);
    }

    fn newline_indent(&mut self) {
        if !self.ctx.options.pretty_print {
            return;
        }
        self.out.push('\n');
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
    }

    fn sanitized_href(&self, url: &str) -> String {
        if self.ctx.options.safe_mode == crate::parser::SafeMode::Unsafe {
            return escape_attr(url);
        }
        let scheme = url.split_once(':').map(|(s, _)| s);
        let mut allowed: Vec<String> = DEFAULT_ALLOWED_SCHEMES.iter().map(|s| s.to_string()).collect();
        if let Some(PropertyValue::List(extra)) = self.ctx.options.custom_properties.get("allowed-schemes") {
            for v in extra {
                if let PropertyValue::String(s) = v {
                    allowed.push(s.clone());
                }
            }
        }
        match scheme {
            Some(s) if allowed.iter().any(|a| a.eq_ignore_ascii_case(s)) => escape_attr(url),
            None => escape_attr(url),
            Some(s) => {
                warn!("disallowed link scheme rejected: {s}");
                "#".to_string()
            }
        }
    }
}

fn write_toc_entries(children: &[Element], depth: usize, max_depth: usize, out: &mut String) {
    if depth > max_depth {
        return;
    }
    let sections: Vec<&Element> = children.iter().filter(|e| e.kind() == ElementKind::Section).collect();
    if sections.is_empty() {
        return;
    }
    out.push_str("<ul>");
    for section in sections {
        out.push_str("<li><a href=\"#");
        if let Some(id) = &section.id {
            out.push_str(&escape_attr(id));
        }
        out.push_str("\">");
        out.push_str(&escape(&section_title(section)));
        out.push_str("</a>");
        write_toc_entries(&section.children, depth + 1, max_depth, out);
        out.push_str("</li>");
    }
    out.push_str("</ul>");
}

const INLINE_KINDS: &[ElementKind] = &[
    ElementKind::Text,
    ElementKind::Emphasis,
    ElementKind::Strong,
    ElementKind::Highlight,
    ElementKind::Superscript,
    ElementKind::Subscript,
    ElementKind::InlineCode,
    ElementKind::Link,
    ElementKind::Anchor,
    ElementKind::CrossReference,
    ElementKind::Footnote,
    ElementKind::Macro,
    ElementKind::LineBreak,
];

/// A Section's title lives as the leading run of inline-kind children,
/// before the body elements (Paragraph, List, nested Section, …) start.
fn section_title(section: &Element) -> String {
    let mut title = String::new();
    for child in &section.children {
        if !INLINE_KINDS.contains(&child.kind()) {
            break;
        }
        title.push_str(&plain_text(child));
    }
    title
}

fn plain_text(element: &Element) -> String {
    if element.kind() == ElementKind::Text {
        return element.text.clone();
    }
    if element.kind() == ElementKind::LineBreak {
        return " ".to_string();
    }
    element.children.iter().map(plain_text).collect::<Vec<_>>().join("")
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(s: &str) -> String {
    escape(s)
}

impl<'a> Visitor for HtmlEmitter<'a> {
    fn visit_header(&mut self, _e: &Element) {}

    fn visit_section(&mut self, e: &Element) {
        self.open_block(ElementKind::Section, "section", "");
        let heading = format!("h{}", (e.level + 1).min(6));
        let id_attr = e.id.as_deref().map(|id| format!(" id=\"{}\"", escape_attr(id))).unwrap_or_default();
        self.out.push_str(&format!("<{heading}{id_attr}>"));
        for child in &e.children {
            if !INLINE_KINDS.contains(&child.kind()) {
                break;
            }
            child.accept(self);
        }
        self.out.push_str(&format!("</{heading}>"));
        for child in &e.children {
            if INLINE_KINDS.contains(&child.kind()) {
                continue;
            }
            child.accept(self);
        }
        self.close_block("section");
    }

    fn visit_paragraph(&mut self, e: &Element) {
        self.open_block(ElementKind::Paragraph, "p", "");
        self.visit_children(e);
        self.close_block("p");
    }

    fn visit_text(&mut self, e: &Element) {
        self.out.push_str(&escape(&e.text));
    }

    fn visit_emphasis(&mut self, e: &Element) {
        self.open(ElementKind::Emphasis, "em", "");
        self.visit_children(e);
        self.close("em");
    }

    fn visit_strong(&mut self, e: &Element) {
        self.open(ElementKind::Strong, "strong", "");
        self.visit_children(e);
        self.close("strong");
    }

    fn visit_highlight(&mut self, e: &Element) {
        self.open(ElementKind::Highlight, "mark", "");
        self.visit_children(e);
        self.close("mark");
    }

    fn visit_superscript(&mut self, e: &Element) {
        self.open(ElementKind::Superscript, "sup", "");
        self.visit_children(e);
        self.close("sup");
    }

    fn visit_subscript(&mut self, e: &Element) {
        self.open(ElementKind::Subscript, "sub", "");
        self.visit_children(e);
        self.close("sub");
    }

    fn visit_inline_code(&mut self, e: &Element) {
        self.out.push_str("<code>");
        self.out.push_str(&escape(&e.text));
        self.out.push_str("</code>");
    }

    fn visit_code_block(&mut self, e: &Element) {
        // No closing newline_indent: anything before `</pre>` is still
        // inside the preformatted element and would change its text.
        self.newline_indent();
        let lang = e.attrs.get("language");
        let class_attr = lang.map(|l| format!(" class=\"language-{}\"", escape_attr(l))).unwrap_or_default();
        self.out.push_str("<pre><code");
        self.out.push_str(&class_attr);
        self.out.push('>');
        self.out.push_str(&escape(&e.text));
        self.out.push_str("</code></pre>");
    }

    fn visit_list(&mut self, e: &Element) {
        let tag = if e.list_kind == Some(crate::ast::ListKind::Ordered) { "ol" } else { "ul" };
        self.newline_indent();
        self.out.push('<');
        self.out.push_str(tag);
        self.out.push('>');
        self.indent += 1;
        self.visit_children(e);
        self.indent = self.indent.saturating_sub(1);
        self.newline_indent();
        self.out.push_str("</");
        self.out.push_str(tag);
        self.out.push('>');
    }

    fn visit_list_item(&mut self, e: &Element) {
        self.open_block(ElementKind::ListItem, "li", "");
        self.visit_children(e);
        self.close_block("li");
    }

    fn visit_description_list(&mut self, e: &Element) {
        self.open_block(ElementKind::DescriptionList, "dl", "");
        self.visit_children(e);
        self.close_block("dl");
    }

    fn visit_description_list_item(&mut self, e: &Element) {
        self.newline_indent();
        self.out.push_str("<dt>");
        self.out.push_str(&escape(&e.text));
        self.out.push_str("</dt><dd>");
        self.visit_children(e);
        self.out.push_str("</dd>");
    }

    fn visit_table(&mut self, e: &Element) {
        self.open_block(ElementKind::Table, "table", "");
        let has_header = e.children.first().is_some_and(|r| r.attrs.get("header") == Some("true"));
        if has_header {
            self.newline_indent();
            self.out.push_str("<thead>");
            self.indent += 1;
            self.write_table_row(&e.children[0], "th");
            self.indent = self.indent.saturating_sub(1);
            self.newline_indent();
            self.out.push_str("</thead>");
            self.newline_indent();
            self.out.push_str("<tbody>");
            self.indent += 1;
            for row in &e.children[1..] {
                self.write_table_row(row, "td");
            }
            self.indent = self.indent.saturating_sub(1);
            self.newline_indent();
            self.out.push_str("</tbody>");
        } else {
            self.newline_indent();
            self.out.push_str("<tbody>");
            self.indent += 1;
            for row in &e.children {
                self.write_table_row(row, "td");
            }
            self.indent = self.indent.saturating_sub(1);
            self.newline_indent();
            self.out.push_str("</tbody>");
        }
        self.close_block("table");
    }

    fn visit_table_row(&mut self, e: &Element) {
        self.write_table_row(e, "td");
    }

    fn visit_table_cell(&mut self, e: &Element) {
        self.open_block(ElementKind::TableCell, "td", "");
        self.visit_children(e);
        self.close_block("td");
    }

    fn visit_block_quote(&mut self, e: &Element) {
        self.open_block(ElementKind::BlockQuote, "blockquote", "");
        self.visit_children(e);
        if let Some(attribution) = e.attrs.get("attribution") {
            self.out.push_str("<cite>");
            self.out.push_str(&escape(attribution));
            self.out.push_str("</cite>");
        }
        self.close_block("blockquote");
    }

    fn visit_sidebar(&mut self, e: &Element) {
        self.render_div_block(e, "sidebar");
    }

    fn visit_example(&mut self, e: &Element) {
        self.render_div_block(e, "example");
    }

    fn visit_verse(&mut self, e: &Element) {
        // As in `visit_code_block`, no closing newline_indent — it would
        // land inside the preformatted element.
        self.newline_indent();
        self.out.push_str("<pre class=\"verse\">");
        self.ctx.push(ElementKind::Verse);
        self.visit_children(e);
        self.ctx.pop();
        if let Some(attribution) = e.attrs.get("attribution") {
            self.out.push_str("\n<cite>");
            self.out.push_str(&escape(attribution));
            self.out.push_str("</cite>");
        }
        self.out.push_str("</pre>");
    }

    fn visit_open(&mut self, e: &Element) {
        self.open_block(ElementKind::Open, "div", "");
        self.visit_children(e);
        self.close_block("div");
    }

    fn visit_admonition(&mut self, e: &Element) {
        let name = e.macro_name.as_deref().unwrap_or("NOTE");
        self.newline_indent();
        self.out.push_str(&format!("<div class=\"admonition {}\">", escape_attr(&name.to_ascii_lowercase())));
        self.indent += 1;
        self.out.push_str(&format!("<div class=\"title\">{}</div>", escape(name)));
        self.ctx.push(ElementKind::Admonition);
        self.out.push_str("<p>");
        self.visit_children(e);
        self.out.push_str("</p>");
        self.ctx.pop();
        self.indent = self.indent.saturating_sub(1);
        self.newline_indent();
        self.out.push_str("</div>");
    }

    fn visit_image(&mut self, e: &Element) {
        let alt = e.attrs.get("alt").unwrap_or("");
        self.out.push_str(&format!("<img src=\"{}\" alt=\"{}\">", self.sanitized_href(&e.text), escape_attr(alt)));
    }

    fn visit_link(&mut self, e: &Element) {
        self.out.push_str(&format!("<a href=\"{}\">", self.sanitized_href(&e.text)));
        self.ctx.push(ElementKind::Link);
        self.visit_children(e);
        self.ctx.pop();
        self.out.push_str("</a>");
    }

    fn visit_anchor(&mut self, e: &Element) {
        if let Some(id) = &e.id {
            self.out.push_str(&format!("<a id=\"{}\"></a>", escape_attr(id)));
        }
    }

    fn visit_cross_reference(&mut self, e: &Element) {
        let target_id = e.target.clone().unwrap_or_default();
        let label = if !e.children.is_empty() {
            e.children.iter().map(plain_text).collect::<Vec<_>>().join("")
        } else if let Some(target) = self.document.resolve(&target_id) {
            let title = section_title(target);
            if title.is_empty() { target_id.clone() } else { title }
        } else {
            target_id.clone()
        };
        self.out.push_str(&format!("<a href=\"#{}\">{}</a>", escape_attr(&target_id), escape(&label)));
    }

    fn visit_footnote(&mut self, e: &Element) {
        if e.is_reference {
            let target_id = e.id.clone().unwrap_or_default();
            if let Some(existing) = self.footnotes.iter().find(|n| n.id == target_id) {
                let number = existing.number;
                self.out.push_str(&format!("<sup><a href=\"#fn-{target_id}\">[{number}]</a></sup>"));
            } else {
                self.out.push_str(&format!("<sup><a href=\"#fn-{target_id}\">[?]</a></sup>"));
            }
            return;
        }
        let number = self.footnotes.len() + 1;
        let id = e.id.clone().unwrap_or_else(|| number.to_string());
        let body = self.render_children_to_string(e);
        self.footnotes.push(Footnote { id: id.clone(), number, body });
        self.out.push_str(&format!(
            "<sup><a href=\"#fn-{id}\" id=\"fnref-{id}\">[{number}]</a></sup>"
        ));
    }

    fn visit_macro(&mut self, e: &Element) {
        let name = e.macro_name.as_deref().unwrap_or("macro");
        if name == "pass" {
            self.out.push_str(&e.text);
            return;
        }
        self.out.push_str(&format!("<span class=\"{}\">", escape_attr(name)));
        if e.children.is_empty() {
            self.out.push_str(&escape(&e.text));
        } else {
            self.visit_children(e);
        }
        self.out.push_str("</span>");
    }

    fn visit_toc(&mut self, _e: &Element) {
        self.write_toc();
    }

    fn visit_comment(&mut self, _e: &Element) {}

    fn visit_line_break(&mut self, _e: &Element) {
        self.out.push_str("<br/>");
    }

    fn visit_horizontal_rule(&mut self, _e: &Element) {
        self.out.push_str("<hr/>");
    }

    fn visit_attribute_entry(&mut self, _e: &Element) {}
}

impl<'a> HtmlEmitter<'a> {
    fn write_table_row(&mut self, row: &Element, cell_tag: &str) {
        self.open_block(ElementKind::TableRow, "tr", "");
        for cell in &row.children {
            self.open_block(ElementKind::TableCell, cell_tag, "");
            self.visit_children(cell);
            self.close_block(cell_tag);
        }
        self.close_block("tr");
    }

    fn render_div_block(&mut self, e: &Element, class: &str) {
        self.newline_indent();
        self.out.push_str(&format!("<div class=\"{class}\">"));
        self.indent += 1;
        self.ctx.push(e.kind());
        self.visit_children(e);
        self.ctx.pop();
        self.indent = self.indent.saturating_sub(1);
        self.newline_indent();
        self.out.push_str("</div>");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Document;
    use crate::parser::Parser;

    fn render(text: &str) -> String {
        let (doc, _) = Parser::default().parse(text);
        HtmlConverter.convert(&doc)
    }

    #[test]
    fn renders_title_and_strong_paragraph() {
        let html = render("= Title\n\nHello *world*.\n");
        assert_eq!(html, "<article><h1>Title</h1><p>Hello <strong>world</strong>.</p></article>");
    }

    #[test]
    fn code_block_html_escapes_and_skips_inline_parsing() {
        let html = render("----\ncode *stays* literal\n----\n");
        assert!(html.contains("<pre><code>code *stays* literal</code></pre>"));
    }

    #[test]
    fn unresolved_cross_reference_falls_back_to_raw_id() {
        let html = render("See <<missing>>.\n");
        assert_eq!(html, "<article><p>See <a href=\"#missing\">missing</a>.</p></article>");
    }

    #[test]
    fn rejects_javascript_scheme_in_safe_mode() {
        let document = Document::new();
        let options = ConvertOptions::default();
        let emitter = HtmlEmitter::new(&document, &options);
        assert_eq!(emitter.sanitized_href("javascript:alert(1)"), "#");
    }

    #[test]
    fn unsafe_mode_allows_any_scheme() {
        let document = Document::new();
        let mut options = ConvertOptions::default();
        options.safe_mode = crate::parser::SafeMode::Unsafe;
        let emitter = HtmlEmitter::new(&document, &options);
        assert_eq!(emitter.sanitized_href("javascript:alert(1)"), "javascript:alert(1)");
    }

    #[test]
    fn escapes_angle_brackets_in_text() {
        let html = render("1 < 2 & 3 > 0\n");
        assert!(html.contains("1 &lt; 2 &amp; 3 &gt; 0"));
    }

    /// Strips every newline this emitter could have inserted for
    /// `pretty_print` (a `\n` followed by any run of spaces) back out.
    fn strip_pretty_whitespace(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars().peekable();
        while let Some(c) = chars.next() {
            if c == '\n' {
                while matches!(chars.peek(), Some(' ')) {
                    chars.next();
                }
                continue;
            }
            out.push(c);
        }
        out
    }

    #[test]
    fn pretty_print_only_adds_inter_tag_whitespace() {
        let text = "= Title\n\nHello *world*.\n\n* item one\n+\n----\ncode\n----\n* item two\n";
        let (doc, _) = Parser::default().parse(text);
        let plain = HtmlConverter.convert_with(&doc, &ConvertOptions::default());
        let mut pretty_options = ConvertOptions::default();
        pretty_options.pretty_print = true;
        let pretty = HtmlConverter.convert_with(&doc, &pretty_options);

        assert_ne!(plain, pretty, "pretty_print should change the output");
        assert_eq!(strip_pretty_whitespace(&pretty), plain);
    }

    #[test]
    fn pretty_print_does_not_disturb_code_block_text() {
        let (doc, _) = Parser::default().parse("----\nline one\n  line two\n----\n");
        let mut pretty_options = ConvertOptions::default();
        pretty_options.pretty_print = true;
        let html = HtmlConverter.convert_with(&doc, &pretty_options);
        assert!(html.contains("<code>line one\n  line two</code>"));
    }
}
