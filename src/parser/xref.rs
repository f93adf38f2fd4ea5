//! Cross-reference resolution: a post-parse, two-traversal pass.
//!
//! Pass 1 builds `id -> path` for every element carrying an id. Pass 2 walks
//! every `CrossReference` element and, if its target id was indexed,
//! records that the reference is `resolved` (see [`Document::resolve`] for
//! the actual lookup — we don't store a pointer, only the fact that one
//! exists, to match the "no owning reference" design note).

use std::collections::HashMap;

use crate::ast::{Document, Element, ElementKind};
use crate::parser::diagnostics::{Diagnostic, DiagnosticCode};

pub fn resolve_cross_references(document: &mut Document, diagnostics: &mut Vec<Diagnostic>) {
    let mut index = HashMap::new();
    let mut path = Vec::new();
    index_ids(&document.children, &mut path, &mut index);
    document.id_index = index;

    let mut unresolved = Vec::new();
    collect_unresolved_xrefs(&document.children, &document.id_index, &mut unresolved);
    for (target, line) in unresolved {
        diagnostics.push(Diagnostic::warning(
            DiagnosticCode::UnresolvedCrossReference,
            format!("unresolved cross-reference: {target}"),
            line,
        ));
    }
}

fn index_ids(children: &[Element], path: &mut Vec<usize>, index: &mut HashMap<String, Vec<usize>>) {
    for (i, el) in children.iter().enumerate() {
        path.push(i);
        if let Some(id) = &el.id {
            index.entry(id.clone()).or_insert_with(|| path.clone());
        }
        index_ids(&el.children, path, index);
        path.pop();
    }
}

fn collect_unresolved_xrefs(children: &[Element], index: &HashMap<String, Vec<usize>>, out: &mut Vec<(String, usize)>) {
    for el in children {
        if el.kind() == ElementKind::CrossReference {
            if let Some(target) = &el.target {
                if !index.contains_key(target) {
                    out.push((target.clone(), el.source_line));
                }
            }
        }
        collect_unresolved_xrefs(&el.children, index, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_unresolved_target() {
        let mut doc = Document::new();
        let mut xref = Element::new(ElementKind::CrossReference);
        xref.target = Some("missing".to_string());
        doc.children.push(Element::new(ElementKind::Paragraph).with_children(vec![xref]));
        let mut diagnostics = Vec::new();
        resolve_cross_references(&mut doc, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].message.contains("missing"));
    }

    #[test]
    fn resolves_known_target() {
        let mut doc = Document::new();
        let target = Element::new(ElementKind::Section).with_id("intro");
        let mut xref = Element::new(ElementKind::CrossReference);
        xref.target = Some("intro".to_string());
        doc.children.push(target);
        doc.children.push(Element::new(ElementKind::Paragraph).with_children(vec![xref]));
        let mut diagnostics = Vec::new();
        resolve_cross_references(&mut doc, &mut diagnostics);
        assert!(diagnostics.is_empty());
        assert!(doc.resolve("intro").is_some());
    }
}
