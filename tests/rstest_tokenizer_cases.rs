//! Parametrized lexer/parser cases using rstest.

use doctree::ast::ElementKind;
use doctree::parser::Parser;
use doctree::tokenizer::{tokenize, TokenKind};
use rstest::rstest;

#[rstest]
#[case("NOTE: remember this\n", "NOTE")]
#[case("TIP: try this\n", "TIP")]
#[case("IMPORTANT: heed this\n", "IMPORTANT")]
#[case("WARNING: careful\n", "WARNING")]
#[case("CAUTION: danger\n", "CAUTION")]
fn recognizes_every_admonition_label(#[case] input: &str, #[case] label: &str) {
    let tokens = tokenize(input);
    assert_eq!(tokens[0].kind, TokenKind::AdmonitionBlock);

    let (doc, _) = Parser::default().parse(input);
    let admonition = &doc.children[0];
    assert_eq!(admonition.kind(), ElementKind::Admonition);
    assert_eq!(admonition.macro_name.as_deref(), Some(label));
}

#[rstest]
#[case("====\n", TokenKind::ExampleDelimiter)]
#[case("----\n", TokenKind::CodeBlockDelimiter)]
#[case("____\n", TokenKind::BlockQuoteDelimiter)]
#[case("****\n", TokenKind::SidebarDelimiter)]
#[case("|===\n", TokenKind::TableDelimiter)]
fn classifies_every_delimiter_kind(#[case] input: &str, #[case] expected: TokenKind) {
    let tokens = tokenize(input);
    assert_eq!(tokens[0].kind, expected);
}

#[rstest]
#[case("* item\n", ElementKind::List)]
#[case("- item\n", ElementKind::List)]
fn unordered_markers_both_produce_a_list(#[case] input: &str, #[case] expected: ElementKind) {
    let (doc, _) = Parser::default().parse(input);
    assert_eq!(doc.children[0].kind(), expected);
}
