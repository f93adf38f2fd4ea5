//! Document header phase: leading attribute lines, the title, and the
//! optional author/revision lines that immediately follow it.

use crate::ast::{AttributeBag, Header};
use crate::tokenizer::TokenKind;

use super::cursor::Cursor;

/// Consumes the header phase from `cursor`, applying any attribute lines
/// seen (including ones after the title, since `:name:` lines are legal
/// document-wide) directly to `attrs`. Returns the parsed [`Header`], if a
/// level-1 title was present.
pub fn parse_header(cursor: &mut Cursor, attrs: &mut AttributeBag) -> Option<Header> {
    consume_attribute_lines(cursor, attrs);

    let is_title = matches!(cursor.peek(), Some(t) if t.kind == TokenKind::Header && header_level(t.raw.as_str()) == 1);
    if !is_title {
        return None;
    }
    let title_tok = cursor.advance().unwrap();
    let title = header_title_text(&title_tok.raw);

    let mut header = Header { title: Some(title), doctype: "article".to_string(), ..Default::default() };

    if let Some(t) = cursor.peek() {
        if t.kind == TokenKind::Text && !looks_like_revision(&t.raw) {
            header.authors = t.raw.split(',').map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect();
            cursor.advance();
        }
    }
    if let Some(t) = cursor.peek() {
        if t.kind == TokenKind::Text && looks_like_revision(&t.raw) {
            let (rev, date) = split_revision(&t.raw);
            header.revnumber = rev;
            header.revdate = date;
            cursor.advance();
        }
    }

    consume_attribute_lines(cursor, attrs);
    if let Some(doctype) = attrs.get("doctype") {
        header.doctype = doctype.to_string();
    }
    Some(header)
}

fn consume_attribute_lines(cursor: &mut Cursor, attrs: &mut AttributeBag) {
    loop {
        match cursor.peek() {
            Some(t) if t.kind == TokenKind::AttributeLine => {
                if let Some((name, value)) = super::blocks::parse_attribute_entry(&t.raw) {
                    attrs.set(&name, value);
                }
                cursor.advance();
            }
            Some(t) if t.kind == TokenKind::EmptyLine => {
                cursor.advance();
            }
            _ => break,
        }
    }
}

fn header_level(raw: &str) -> usize {
    raw.chars().take_while(|&c| c == '=').count()
}

fn header_title_text(raw: &str) -> String {
    raw.trim_start_matches('=').trim().to_string()
}

fn looks_like_revision(raw: &str) -> bool {
    let trimmed = raw.trim();
    let starts_v = trimmed.starts_with('v') && trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit());
    starts_v || (trimmed.contains(',') && trimmed.chars().next().is_some_and(|c| c.is_ascii_digit()))
}

fn split_revision(raw: &str) -> (Option<String>, Option<String>) {
    let trimmed = raw.trim().trim_start_matches('v');
    match trimmed.split_once(',') {
        Some((rev, date)) => (Some(rev.trim().to_string()), Some(date.trim().to_string())),
        None => (Some(trimmed.to_string()), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    #[test]
    fn parses_title_author_revision() {
        let text = ":toc: macro\n= My Title\nJane Doe\nv1.0, 2024-01-01\n\nBody.\n";
        let tokens = tokenize(text);
        let mut cursor = Cursor::new(&tokens);
        let mut attrs = AttributeBag::new();
        let header = parse_header(&mut cursor, &mut attrs).unwrap();
        assert_eq!(header.title.as_deref(), Some("My Title"));
        assert_eq!(header.authors, vec!["Jane Doe".to_string()]);
        assert_eq!(header.revnumber.as_deref(), Some("1.0"));
        assert_eq!(header.revdate.as_deref(), Some("2024-01-01"));
        assert_eq!(attrs.get("toc"), Some("macro"));
    }

    #[test]
    fn no_title_means_no_header() {
        let tokens = tokenize("Just a paragraph.\n");
        let mut cursor = Cursor::new(&tokens);
        let mut attrs = AttributeBag::new();
        assert!(parse_header(&mut cursor, &mut attrs).is_none());
    }
}
