//! Block-structured parsing: tokenize → recursive-descent block assembly →
//! include expansion → cross-reference resolution → [`Document`].

pub mod blocks;
pub mod cursor;
pub mod diagnostics;
pub mod header;
pub mod include;
pub mod lists;
pub mod table;
pub mod xref;

use std::path::{Path, PathBuf};

use crate::ast::{AttributeBag, Document};
use crate::error::ProcessError;
use crate::tokenizer::tokenize;

pub use diagnostics::{Diagnostic, DiagnosticCode, Severity};

/// Policy bundle constraining include paths and link schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeMode {
    Unsafe,
    Safe,
    Server,
    Secure,
}

impl Default for SafeMode {
    fn default() -> Self {
        SafeMode::Safe
    }
}

#[derive(Debug, Clone)]
pub struct ParserOptions {
    pub include_directives_enabled: bool,
    pub base_directory: PathBuf,
    pub max_include_depth: usize,
    pub max_nesting_depth: usize,
    pub safe_mode: SafeMode,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            include_directives_enabled: true,
            base_directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            max_include_depth: 64,
            max_nesting_depth: 32,
            safe_mode: SafeMode::Safe,
        }
    }
}

/// The parser facade: `Parser::parse`/`parse_file` from the external
/// interface.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    pub options: ParserOptions,
}

impl Parser {
    pub fn new(options: ParserOptions) -> Self {
        Self { options }
    }

    pub fn parse(&self, text: &str) -> (Document, Vec<Diagnostic>) {
        let mut diagnostics = Vec::new();
        let mut attrs = AttributeBag::new();
        let tokens = tokenize(text);
        let mut cursor = cursor::Cursor::new(&tokens);

        let header = header::parse_header(&mut cursor, &mut attrs);

        let mut state = blocks::ParseState {
            diagnostics: &mut diagnostics,
            options: &self.options,
            base_dir: self.options.base_directory.clone(),
            include_stack: Vec::new(),
            depth: 0,
            attrs: &mut attrs,
        };
        let children = blocks::parse_body(&mut cursor, 0, &mut state);

        let mut document = Document { header, attrs, children, id_index: Default::default() };
        xref::resolve_cross_references(&mut document, &mut diagnostics);
        (document, diagnostics)
    }

    pub fn parse_file(&self, path: &Path) -> Result<(Document, Vec<Diagnostic>), ProcessError> {
        let text = std::fs::read_to_string(path).map_err(|source| ProcessError::Io { path: path.to_path_buf(), source })?;
        let mut options = self.options.clone();
        if let Some(parent) = path.parent() {
            options.base_directory = parent.to_path_buf();
        }
        Ok(Parser::new(options).parse(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ElementKind;

    #[test]
    fn parses_title_and_paragraph() {
        let parser = Parser::default();
        let (doc, diags) = parser.parse("= Title\n\nHello *world*.\n");
        assert!(diags.is_empty());
        assert_eq!(doc.title(), Some("Title"));
        assert_eq!(doc.children.len(), 1);
        assert_eq!(doc.children[0].kind(), ElementKind::Paragraph);
    }

    #[test]
    fn nested_sections_respect_levels() {
        let parser = Parser::default();
        let (doc, _) = parser.parse("== A\n\ntext\n\n=== B\n\nmore\n\n== C\n");
        assert_eq!(doc.children.len(), 2);
        assert_eq!(doc.children[0].level, 2);
        assert_eq!(doc.children[1].level, 2);
        let nested = doc.children[0].children.iter().find(|c| c.kind() == ElementKind::Section).unwrap();
        assert_eq!(nested.level, 3);
    }

    #[test]
    fn code_block_is_not_inline_parsed() {
        let parser = Parser::default();
        let (doc, _) = parser.parse("----\ncode *stays* literal\n----\n");
        assert_eq!(doc.children[0].kind(), ElementKind::CodeBlock);
        assert_eq!(doc.children[0].text, "code *stays* literal");
    }

    #[test]
    fn unresolved_cross_reference_is_diagnosed_not_fatal() {
        let parser = Parser::default();
        let (doc, diags) = parser.parse("See <<missing>>.\n");
        assert_eq!(doc.children.len(), 1);
        assert!(diags.iter().any(|d| d.code == DiagnosticCode::UnresolvedCrossReference));
    }
}
