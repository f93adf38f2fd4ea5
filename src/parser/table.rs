//! Table parsing: `|===` delimited blocks, cell splitting on unescaped `|`.

use crate::ast::{AttributeBag, Element, ElementKind};
use crate::inline;
use crate::parser::blocks::ParseState;
use crate::parser::cursor::Cursor;
use crate::tokenizer::TokenKind;

pub fn parse_table(cursor: &mut Cursor, pending_attrs: &mut AttributeBag, state: &mut ParseState) -> Element {
    let open = cursor.advance().expect("caller checked TableDelimiter token");
    let mut table = Element::new(ElementKind::Table);
    table.source_line = open.line;

    let declared_cols: Option<usize> = pending_attrs.get("cols").map(|c| c.split(',').count());

    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut col_count = declared_cols;

    loop {
        match cursor.peek() {
            None => break,
            Some(t) if t.kind == TokenKind::TableDelimiter => {
                cursor.advance();
                break;
            }
            Some(t) if t.kind == TokenKind::TableRow => {
                cursor.advance();
                let mut cells = split_cells(&t.raw);
                if col_count.is_none() {
                    col_count = Some(cells.len());
                }
                let needed = col_count.unwrap_or(cells.len());
                // A row whose cell count is short continues onto the
                // following `|`-prefixed lines until it reaches the column
                // count.
                while cells.len() < needed {
                    match cursor.peek() {
                        Some(next) if next.kind == TokenKind::TableRow => {
                            cursor.advance();
                            cells.extend(split_cells(&next.raw));
                        }
                        _ => break,
                    }
                }
                rows.push(cells);
            }
            Some(t) if t.kind == TokenKind::EmptyLine => {
                cursor.advance();
            }
            Some(_) => {
                cursor.advance();
            }
        }
    }

    for (row_idx, cells) in rows.into_iter().enumerate() {
        let mut row = Element::new(ElementKind::TableRow);
        row.attrs.set("header", if row_idx == 0 && pending_attrs.is_set("header") { "true" } else { "false" });
        for cell_text in cells {
            let mut cell = Element::new(ElementKind::TableCell);
            cell.children = inline::parse(cell_text.trim(), state.attrs);
            row.children.push(cell);
        }
        table.children.push(row);
    }
    table
}

/// Splits a `|`-prefixed row into cell contents, honoring `\|` as an escaped
/// pipe rather than a cell separator.
fn split_cells(raw: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = raw.trim_start().chars().peekable();
    // Skip the leading '|'.
    if chars.peek() == Some(&'|') {
        chars.next();
    }
    let mut started = false;
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                current.push('|');
                chars.next();
            }
            '|' => {
                cells.push(std::mem::take(&mut current));
                started = true;
            }
            _ => current.push(c),
        }
    }
    if started || !current.trim().is_empty() {
        cells.push(current);
    }
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_simple_row() {
        assert_eq!(split_cells("|a|b|c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn honors_escaped_pipe() {
        assert_eq!(split_cells(r"|a\|b|c"), vec!["a|b", "c"]);
    }
}
