//! Lexical analysis: converts raw markup source into a finite token stream.
//!
//! Tokenization is line-based with a lookahead of one character. Inline
//! markup inside `Text`/`Header`/table-cell content is *not* tokenized
//! here — it is re-scanned by [`crate::inline`] once the block parser has
//! decided which element owns that text.

pub mod lexer;
pub mod tokens;

pub use lexer::{classify_delimiter, tokenize, Lexer};
pub use tokens::{Token, TokenKind};
