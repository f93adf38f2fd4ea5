//! The six literal end-to-end scenarios: one input, one expected shape.

use doctree::ast::ElementKind;
use doctree::convert::html::HtmlConverter;
use doctree::convert::Converter;
use doctree::parser::Parser;

fn render(text: &str) -> String {
    let (doc, _) = Parser::default().parse(text);
    HtmlConverter.convert(&doc)
}

#[test]
fn s1_title_and_strong_paragraph() {
    let (doc, _) = Parser::default().parse("= Title\n\nHello *world*.\n");
    assert_eq!(doc.title(), Some("Title"));
    let paragraph = &doc.children[0];
    assert_eq!(paragraph.kind(), ElementKind::Paragraph);
    assert_eq!(paragraph.children[0].kind(), ElementKind::Text);
    assert_eq!(paragraph.children[0].text, "Hello ");
    assert_eq!(paragraph.children[1].kind(), ElementKind::Strong);
    assert_eq!(paragraph.children[1].children[0].text, "world");
    assert_eq!(paragraph.children[2].text, ".");

    assert_eq!(render("= Title\n\nHello *world*.\n"), "<article><h1>Title</h1><p>Hello <strong>world</strong>.</p></article>");
}

#[test]
fn s2_nested_sections_have_no_level_1() {
    let (doc, _) = Parser::default().parse("== A\n\ntext\n\n=== B\n\nmore\n\n== C\n");
    let sections: Vec<_> = doc.children.iter().filter(|e| e.kind() == ElementKind::Section).collect();
    assert_eq!(sections.len(), 2, "document should contain exactly sections A and C");
    assert_eq!(sections[0].level, 2);
    assert_eq!(sections[1].level, 2);

    let nested = sections[0].children.iter().find(|e| e.kind() == ElementKind::Section).expect("A contains B");
    assert_eq!(nested.level, 3);
}

#[test]
fn s3_code_block_skips_inline_parsing() {
    let (doc, _) = Parser::default().parse("----\ncode *stays* literal\n----\n");
    let block = &doc.children[0];
    assert_eq!(block.kind(), ElementKind::CodeBlock);
    assert_eq!(block.text, "code *stays* literal");
    assert!(block.children.is_empty());

    assert!(render("----\ncode *stays* literal\n----\n").contains("<pre><code>code *stays* literal</code></pre>"));
}

#[test]
fn s4_unresolved_cross_reference_is_diagnosed_not_fatal() {
    let (doc, diagnostics) = Parser::default().parse("See <<missing>>.\n");
    let paragraph = &doc.children[0];
    let xref = paragraph.children.iter().find(|e| e.kind() == ElementKind::CrossReference).expect("has a cross-reference");
    assert_eq!(xref.target.as_deref(), Some("missing"));
    assert!(diagnostics.iter().any(|d| d.message.contains("unresolved cross-reference: missing")));

    assert_eq!(render("See <<missing>>.\n"), "<article><p>See <a href=\"#missing\">missing</a>.</p></article>");
}

#[test]
fn s5_circular_include_emits_error_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let file_a = dir.path().join("a.adoc");
    std::fs::write(&file_a, "include::a.adoc[]\n").unwrap();

    let (_doc, diagnostics) = Parser::default().parse_file(&file_a).unwrap();
    assert!(diagnostics.iter().any(|d| d.message.contains("circular include: a.adoc")));
}

#[test]
fn s6_verse_preserves_author_and_newline() {
    let (doc, _) = Parser::default().parse("[verse, Sandburg]\n____\nline one\nline two\n____\n");
    let verse = &doc.children[0];
    assert_eq!(verse.kind(), ElementKind::Verse);
    assert_eq!(verse.text, "line one\nline two");
    assert_eq!(verse.attrs.get("attribution"), Some("Sandburg"));

    let html = render("[verse, Sandburg]\n____\nline one\nline two\n____\n");
    assert!(html.contains("<pre class=\"verse\">line one<br/>line two"));
    assert!(html.contains("<cite>Sandburg</cite>"));
}
