//! Line-based lexer.
//!
//! Classification is per-line with a lookahead of one character (to
//! distinguish, e.g., a `=` delimiter run from a header line). First-match
//! order follows the classification list: empty line, block delimiter,
//! attribute entry, attribute block, header, block macro, admonition,
//! anchor, list item, table row, else text.

use std::sync::OnceLock;

use regex::Regex;

use super::tokens::{Token, TokenKind};

fn re_header() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(={1,6})\s+(.+?)\s*$").unwrap())
}

fn re_attribute_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^:([A-Za-z0-9_][A-Za-z0-9_-]*):(?:\s+(.*))?$").unwrap())
}

fn re_attribute_block() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[([^\[\]].*)\]$").unwrap())
}

fn re_anchor() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\[\[([^\[\]]+)\]\]$").unwrap())
}

fn re_block_macro() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^([A-Za-z][A-Za-z0-9_-]*)::([^\[]*)\[(.*)\]$").unwrap())
}

fn re_admonition() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(NOTE|TIP|IMPORTANT|WARNING|CAUTION):\s+(.*)$").unwrap()
    })
}

fn re_list_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)([*\-.]+|\d+\.|[a-zA-Z]\.)\s+(.*)$").unwrap())
}

fn re_description_item() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\s*)(\S.*?)::\s+(.*)$").unwrap())
}

const TABLE_DELIM_MIN: usize = 4; // "|==="

/// Returns `Some((kind, delimiter_len))` if `line` is an exact delimiter run.
///
/// A delimiter line is a run of a single rune (`=`, `-`, `_`, `*`) of length
/// >= 4, or the literal `|===` table delimiter.
pub fn classify_delimiter(line: &str) -> Option<(TokenKind, usize)> {
    if line.len() >= TABLE_DELIM_MIN && line.starts_with("|===") && line[1..].chars().all(|c| c == '=') {
        return Some((TokenKind::TableDelimiter, line.len()));
    }
    let mut chars = line.chars();
    let first = chars.next()?;
    if !matches!(first, '=' | '-' | '_' | '*') {
        return None;
    }
    if !line.chars().all(|c| c == first) {
        return None;
    }
    if line.len() < 4 {
        return None;
    }
    let kind = match first {
        '-' => TokenKind::CodeBlockDelimiter,
        '_' => TokenKind::BlockQuoteDelimiter,
        '*' => TokenKind::SidebarDelimiter,
        '=' => TokenKind::ExampleDelimiter,
        _ => unreachable!(),
    };
    Some((kind, line.len()))
}

/// The line-oriented lexer. Produces one or more tokens per physical line
/// plus a [`TokenKind::NewLine`] separator and a trailing `EndOfFile`.
pub struct Lexer<'a> {
    text: &'a str,
    line_no: usize,
    offset: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self { text, line_no: 0, offset: 0 }
    }

    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        // Normalize CRLF -> LF and strip a leading BOM; §6 External Interfaces.
        let normalized = self.text.strip_prefix('\u{feff}').unwrap_or(self.text);
        let normalized = normalized.replace("\r\n", "\n");

        for raw_line in normalized.split('\n') {
            self.line_no += 1;
            let token = self.classify(raw_line);
            let offset = self.offset;
            self.offset += raw_line.len() + 1;
            tokens.push(self.make_token(token, raw_line, offset));
            tokens.push(Token::new(TokenKind::NewLine, "\n", self.line_no, raw_line.len() + 1, offset + raw_line.len()));
        }
        tokens.push(Token::new(TokenKind::EndOfFile, "", self.line_no + 1, 1, self.offset));
        tokens
    }

    fn make_token(&self, kind: TokenKind, raw: &str, offset: usize) -> Token {
        Token::new(kind, raw, self.line_no, 1, offset)
    }

    fn classify(&self, line: &str) -> TokenKind {
        if line.trim().is_empty() {
            return TokenKind::EmptyLine;
        }
        if let Some((kind, _)) = classify_delimiter(line) {
            return kind;
        }
        if re_attribute_line().is_match(line) {
            return TokenKind::AttributeLine;
        }
        if re_attribute_block().is_match(line) {
            return TokenKind::AttributeBlockLine;
        }
        if re_header().is_match(line) {
            return TokenKind::Header;
        }
        if let Some(caps) = re_block_macro().captures(line) {
            let name = &caps[1];
            if name == "toc" {
                return TokenKind::TableOfContents;
            }
            return TokenKind::BlockMacro;
        }
        if re_admonition().is_match(line) {
            return TokenKind::AdmonitionBlock;
        }
        if re_anchor().is_match(line) {
            return TokenKind::Anchor;
        }
        if re_description_item().is_match(line) && !re_list_item().is_match(line) {
            return TokenKind::DescriptionListItem;
        }
        if re_list_item().is_match(line) {
            return TokenKind::ListItem;
        }
        if line.trim_start().starts_with('|') {
            return TokenKind::TableRow;
        }
        TokenKind::Text
    }
}

/// Tokenize markup source text into a finite token sequence terminated by
/// [`TokenKind::EndOfFile`].
pub fn tokenize(text: &str) -> Vec<Token> {
    Lexer::new(text).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_empty_line() {
        let tokens = tokenize("\n");
        assert_eq!(tokens[0].kind, TokenKind::EmptyLine);
    }

    #[test]
    fn classifies_header() {
        let tokens = tokenize("== Title\n");
        assert_eq!(tokens[0].kind, TokenKind::Header);
    }

    #[test]
    fn classifies_code_delimiter() {
        let tokens = tokenize("----\n");
        assert_eq!(tokens[0].kind, TokenKind::CodeBlockDelimiter);
    }

    #[test]
    fn classifies_table_delimiter() {
        let tokens = tokenize("|===\n");
        assert_eq!(tokens[0].kind, TokenKind::TableDelimiter);
    }

    #[test]
    fn classifies_attribute_line() {
        let tokens = tokenize(":toc: macro\n");
        assert_eq!(tokens[0].kind, TokenKind::AttributeLine);
    }

    #[test]
    fn classifies_list_item() {
        let tokens = tokenize("* item one\n");
        assert_eq!(tokens[0].kind, TokenKind::ListItem);
    }

    #[test]
    fn classifies_description_item() {
        let tokens = tokenize("term:: definition\n");
        assert_eq!(tokens[0].kind, TokenKind::DescriptionListItem);
    }

    #[test]
    fn classifies_admonition() {
        let tokens = tokenize("NOTE: remember this\n");
        assert_eq!(tokens[0].kind, TokenKind::AdmonitionBlock);
    }

    #[test]
    fn classifies_anchor() {
        let tokens = tokenize("[[my-id]]\n");
        assert_eq!(tokens[0].kind, TokenKind::Anchor);
    }

    #[test]
    fn classifies_block_macro() {
        let tokens = tokenize("include::chapter1.adoc[]\n");
        assert_eq!(tokens[0].kind, TokenKind::BlockMacro);
    }

    #[test]
    fn classifies_table_row() {
        let tokens = tokenize("|Cell one|Cell two\n");
        assert_eq!(tokens[0].kind, TokenKind::TableRow);
    }

    #[test]
    fn falls_back_to_text() {
        let tokens = tokenize("Just a paragraph.\n");
        assert_eq!(tokens[0].kind, TokenKind::Text);
    }

    #[test]
    fn strips_bom_and_normalizes_crlf() {
        let tokens = tokenize("\u{feff}Hello\r\nWorld\r\n");
        assert_eq!(tokens[0].raw, "Hello");
        assert_eq!(tokens[0].kind, TokenKind::Text);
    }
}
