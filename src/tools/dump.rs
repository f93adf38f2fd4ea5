//! Tree-visualization dump of a parsed [`Document`] — the `--format tree`
//! CLI output. Semantics-agnostic: it prints a node's kind, id, and a short
//! content snippet, then recurses, without knowing what any kind *means*.

use crate::ast::{Document, Element, ElementKind};

pub fn dump_document(document: &Document) -> String {
    let mut out = String::new();
    if let Some(header) = &document.header {
        out.push_str(&format!("Document (title={:?})\n", header.title));
    } else {
        out.push_str("Document\n");
    }
    let count = document.children.len();
    for (i, child) in document.children.iter().enumerate() {
        dump_element(child, "", i + 1 == count, &mut out);
    }
    out
}

fn dump_element(element: &Element, prefix: &str, is_last: bool, out: &mut String) {
    let branch = if is_last { "└─ " } else { "├─ " };
    out.push_str(prefix);
    out.push_str(branch);
    out.push_str(&describe(element));
    out.push('\n');

    let child_prefix = format!("{prefix}{}", if is_last { "   " } else { "│  " });
    let count = element.children.len();
    for (i, child) in element.children.iter().enumerate() {
        dump_element(child, &child_prefix, i + 1 == count, out);
    }
}

fn describe(element: &Element) -> String {
    let mut label = format!("{:?}", element.kind());
    if let Some(id) = &element.id {
        label.push_str(&format!(" #{id}"));
    }
    if let Some(snippet) = content_snippet(element) {
        label.push_str(&format!(" {snippet:?}"));
    }
    label
}

fn content_snippet(element: &Element) -> Option<String> {
    let text = match element.kind() {
        ElementKind::Text | ElementKind::InlineCode | ElementKind::CodeBlock | ElementKind::Image | ElementKind::Link => {
            element.text.clone()
        }
        ElementKind::DescriptionListItem => element.text.clone(),
        _ => return None,
    };
    if text.is_empty() {
        return None;
    }
    let mut chars = text.chars();
    let truncated: String = chars.by_ref().take(40).collect();
    Some(if chars.next().is_some() { format!("{truncated}…") } else { truncated })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn dumps_nested_sections() {
        let (doc, _) = Parser::default().parse("= Title\n\n== A\n\ntext\n");
        let dump = dump_document(&doc);
        assert!(dump.contains("Document (title=Some(\"Title\"))"));
        assert!(dump.contains("Section"));
        assert!(dump.contains("Paragraph"));
    }
}
