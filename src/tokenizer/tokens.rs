//! Token definitions for the lexer.
//!
//! A [`Token`] is an immutable value carrying a classification tag plus
//! enough position information (line, column, absolute offset, length) to
//! report diagnostics and reconstruct source spans.

use serde::{Deserialize, Serialize};

/// The closed set of token kinds the tokenizer can produce.
///
/// Mirrors the enumerated list in the external interface: inline markup
/// (`Emphasis`, `Strong`, ...) is classified here only when it appears on a
/// line by itself or as the sole content of a recognized construct; general
/// inline scanning inside `Text`/`Header`/table-cell content happens later,
/// in the inline parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    EndOfFile,
    NewLine,
    Text,
    Header,
    ListItem,
    DescriptionListItem,
    EmptyLine,
    CodeBlockDelimiter,
    CodeContent,
    Emphasis,
    Strong,
    Highlight,
    Superscript,
    Subscript,
    InlineCode,
    Link,
    Image,
    TableDelimiter,
    TableRow,
    BlockQuoteDelimiter,
    SidebarDelimiter,
    ExampleDelimiter,
    AttributeLine,
    AttributeBlockLine,
    AdmonitionBlock,
    Anchor,
    CrossReference,
    BlockMacro,
    InlineMacro,
    TableOfContents,
    Footnote,
    Unknown,
}

/// A single lexical unit with full position information.
///
/// Tokens are immutable once produced: the tokenizer never mutates a
/// previously emitted token, it only appends new ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub raw: String,
    /// 1-based line number.
    pub line: usize,
    /// 1-based column number.
    pub column: usize,
    /// 0-based absolute byte offset into the source text.
    pub offset: usize,
    /// Length in bytes of `raw`.
    pub len: usize,
}

impl Token {
    pub fn new(kind: TokenKind, raw: impl Into<String>, line: usize, column: usize, offset: usize) -> Self {
        let raw = raw.into();
        let len = raw.len();
        Self { kind, raw, line, column, offset, len }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}({:?}) @{}:{}", self.kind, self.raw, self.line, self.column)
    }
}
