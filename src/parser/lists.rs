//! Ordered/unordered and description list parsing.
//!
//! A list item at marker `M` and indentation `I` opens a list if none is
//! open at `(M, I)`; a deeper-indented item of the same or a different
//! marker opens (or continues) a nested list attached to the previous item.
//! The list closes on an empty line followed by a non-continuation line, a
//! line at indentation `< I`, or a header/delimited-block opener.

use crate::ast::{Element, ElementKind, ListKind};
use crate::inline;
use crate::parser::blocks::{line_indent, parse_attached_block, ParseState};
use crate::parser::cursor::Cursor;
use crate::tokenizer::TokenKind;

fn marker_kind(marker: &str) -> ListKind {
    if marker.chars().all(|c| c == '*' || c == '-') {
        ListKind::Unordered
    } else {
        ListKind::Ordered
    }
}

fn split_item(raw: &str) -> (usize, String, String) {
    let indent = crate::parser::cursor::indent_width(raw);
    let trimmed = raw.trim_start();
    let marker_end = trimmed
        .find(|c: char| c.is_whitespace())
        .unwrap_or(trimmed.len());
    let marker = trimmed[..marker_end].to_string();
    let text = trimmed[marker_end..].trim_start().to_string();
    (indent, marker, text)
}

pub fn parse_list(cursor: &mut Cursor, state: &mut ParseState) -> Element {
    let first = cursor.peek().expect("caller checked ListItem token");
    let (indent, marker, _) = split_item(&first.raw);
    let kind = marker_kind(&marker);
    let mut list = Element::new(ElementKind::List);
    list.list_kind = Some(kind);
    list.source_line = first.line;

    loop {
        match cursor.peek() {
            Some(t) if t.kind == TokenKind::ListItem => {
                let (item_indent, item_marker, _) = split_item(&t.raw);
                if item_indent < indent {
                    break;
                }
                if item_indent > indent {
                    // A deeper item belongs to the previous item's nested list.
                    if let Some(last) = list.children.last_mut() {
                        let nested = parse_list(cursor, state);
                        last.children.push(nested);
                        continue;
                    } else {
                        break;
                    }
                }
                if marker_kind(&item_marker) != kind && item_marker.len() != marker.len() {
                    // Different marker family at the same indent starts a
                    // sibling list instead of continuing this one.
                    break;
                }
                cursor.advance();
                let (_, _, mut text) = split_item(&t.raw);
                consume_item_continuation(cursor, indent, &mut text);
                let mut item = Element::new(ElementKind::ListItem);
                item.source_line = t.line;
                item.children = inline::parse(&text, state.attrs);
                list.children.push(item);
            }
            Some(t) if t.kind == TokenKind::Text && t.raw.trim() == "+" => {
                cursor.advance();
                if let Some(last) = list.children.last_mut() {
                    if let Some(block) = parse_attached_block(cursor, state) {
                        last.children.push(block);
                    }
                } else {
                    break;
                }
            }
            Some(t) if t.kind == TokenKind::EmptyLine => {
                if !next_is_continuation(cursor, indent) {
                    break;
                }
                cursor.advance();
            }
            _ => break,
        }
    }
    list
}

pub fn parse_description_list(cursor: &mut Cursor, state: &mut ParseState) -> Element {
    let first = cursor.peek().expect("caller checked DescriptionListItem token");
    let indent = line_indent(first);
    let mut list = Element::new(ElementKind::DescriptionList);
    list.source_line = first.line;

    loop {
        match cursor.peek() {
            Some(t) if t.kind == TokenKind::DescriptionListItem && line_indent(t) == indent => {
                cursor.advance();
                let (term, mut def) = split_description(&t.raw);
                consume_item_continuation(cursor, indent, &mut def);
                let mut item = Element::new(ElementKind::DescriptionListItem);
                item.source_line = t.line;
                item.text = term;
                item.children = inline::parse(&def, state.attrs);
                list.children.push(item);
            }
            Some(t) if t.kind == TokenKind::Text && t.raw.trim() == "+" => {
                cursor.advance();
                if let Some(last) = list.children.last_mut() {
                    if let Some(block) = parse_attached_block(cursor, state) {
                        last.children.push(block);
                    }
                } else {
                    break;
                }
            }
            Some(t) if t.kind == TokenKind::EmptyLine => {
                if !next_is_continuation(cursor, indent) {
                    break;
                }
                cursor.advance();
            }
            _ => break,
        }
    }
    list
}

fn split_description(raw: &str) -> (String, String) {
    let sep = raw.find("::").unwrap_or(raw.len());
    let term = raw[..sep].trim().to_string();
    let def = raw.get(sep + 2..).unwrap_or("").trim().to_string();
    (term, def)
}

fn next_is_continuation(cursor: &Cursor, indent: usize) -> bool {
    matches!(cursor.peek_at(1), Some(t) if matches!(t.kind, TokenKind::ListItem | TokenKind::DescriptionListItem) && crate::parser::cursor::indent_width(&t.raw) >= indent)
}

fn consume_item_continuation(cursor: &mut Cursor, indent: usize, text: &mut String) {
    loop {
        match cursor.peek() {
            Some(t) if t.kind == TokenKind::Text && crate::parser::cursor::indent_width(&t.raw) > indent => {
                cursor.advance();
                text.push(' ');
                text.push_str(t.raw.trim());
            }
            _ => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::ElementKind;
    use crate::parser::Parser;

    #[test]
    fn standalone_plus_attaches_code_block_to_list_item() {
        let (doc, _) = Parser::default().parse("* item one\n+\n----\ncode\n----\n* item two\n");
        let list = &doc.children[0];
        assert_eq!(list.kind(), ElementKind::List);
        assert_eq!(list.children.len(), 2);
        let first = &list.children[0];
        assert_eq!(first.kind(), ElementKind::ListItem);
        let attached = first.children.iter().find(|c| c.kind() == ElementKind::CodeBlock).expect("code block attached to item one");
        assert_eq!(attached.text, "code");
    }

    #[test]
    fn standalone_plus_attaches_paragraph_to_list_item() {
        let (doc, _) = Parser::default().parse("* item\n+\nattached paragraph\n");
        let list = &doc.children[0];
        let item = &list.children[0];
        let attached = item.children.iter().find(|c| c.kind() == ElementKind::Paragraph).expect("paragraph attached to item");
        assert_eq!(attached.children[0].text, "attached paragraph");
    }
}
