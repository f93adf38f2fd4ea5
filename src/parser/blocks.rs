//! The block-structured parser.
//!
//! Implemented as recursive descent: each open container (a `Section`, a
//! delimited block, a list) is one stack frame, which is the call stack's
//! natural realization of the "block context stack" the design calls for.
//! `ParseState` carries the parts of that conceptual stack frame that are
//! shared across calls (diagnostics, include stack, nesting depth, the
//! document's attribute bag).

use std::path::PathBuf;

use log::{debug, warn};

use crate::ast::{parse_attribute_list, AttributeBag, Element, ElementKind, ListKind};
use crate::inline;
use crate::parser::cursor::{indent_width, Cursor};
use crate::parser::diagnostics::{Diagnostic, DiagnosticCode};
use crate::parser::include::{self, IncludeOutcome};
use crate::parser::ParserOptions;
use crate::tokenizer::{Token, TokenKind};

pub struct ParseState<'a> {
    pub diagnostics: &'a mut Vec<Diagnostic>,
    pub options: &'a ParserOptions,
    pub base_dir: PathBuf,
    pub include_stack: Vec<PathBuf>,
    pub depth: usize,
    pub attrs: &'a mut AttributeBag,
}

impl<'a> ParseState<'a> {
    pub(crate) fn child_state<'b>(&'b mut self, base_dir: PathBuf, include_stack: Vec<PathBuf>) -> ParseState<'b>
    where
        'a: 'b,
    {
        ParseState {
            diagnostics: self.diagnostics,
            options: self.options,
            base_dir,
            include_stack,
            depth: self.depth + 1,
            attrs: self.attrs,
        }
    }
}

/// Parses the content between `min_level` headers (exclusive) — i.e. the
/// document root (`min_level = 0`) or the body of an enclosing section.
/// Stops without consuming when a header of level `<= min_level` is seen.
pub fn parse_body(cursor: &mut Cursor, min_level: usize, state: &mut ParseState) -> Vec<Element> {
    let mut out = Vec::new();
    let mut pending_attrs = AttributeBag::new();
    let mut pending_anchor: Option<String> = None;

    loop {
        let Some(tok) = cursor.peek() else { break };
        match tok.kind {
            TokenKind::EmptyLine => {
                cursor.advance();
            }
            TokenKind::Header => {
                let level = header_level(&tok.raw);
                if level <= min_level {
                    break;
                }
                cursor.advance();
                debug!("opening section level {level} at line {}", tok.line);
                let title = tok.raw.trim_start_matches('=').trim().to_string();
                let mut section = Element::new(ElementKind::Section);
                section.level = level;
                section.children = inline::parse(&title, state.attrs);
                apply_pending(&mut section, &mut pending_attrs, &mut pending_anchor);
                section.source_line = tok.line;
                let body = parse_body(cursor, level, state);
                section.children.extend(body);
                out.push(section);
            }
            TokenKind::AttributeBlockLine => {
                cursor.advance();
                let inner = &tok.raw[1..tok.raw.len() - 1];
                pending_attrs = parse_attribute_list(inner);
            }
            TokenKind::AttributeLine => {
                cursor.advance();
                if let Some((name, value)) = parse_attribute_entry(&tok.raw) {
                    state.attrs.set(&name, &value);
                    let mut el = Element::new(ElementKind::AttributeEntry);
                    el.id = Some(name);
                    el.text = value;
                    out.push(el);
                }
            }
            TokenKind::Anchor => {
                cursor.advance();
                let id = tok.raw.trim_start_matches("[[").trim_end_matches("]]").to_string();
                pending_anchor = Some(id);
            }
            TokenKind::CodeBlockDelimiter
            | TokenKind::BlockQuoteDelimiter
            | TokenKind::SidebarDelimiter
            | TokenKind::ExampleDelimiter => {
                let mut el = parse_delimited_block(cursor, tok, &mut pending_attrs, state);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::TableDelimiter => {
                let mut el = super::table::parse_table(cursor, &mut pending_attrs, state);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::ListItem => {
                let mut el = super::lists::parse_list(cursor, state);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::DescriptionListItem => {
                let mut el = super::lists::parse_description_list(cursor, state);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::AdmonitionBlock => {
                cursor.advance();
                let (name, rest) = split_admonition(&tok.raw);
                let mut el = Element::new(ElementKind::Admonition);
                el.macro_name = Some(name);
                el.source_line = tok.line;
                let mut text = rest;
                consume_paragraph_continuation(cursor, &mut text);
                el.children = inline::parse(&text, state.attrs);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::BlockMacro | TokenKind::TableOfContents => {
                cursor.advance();
                let mut elements = parse_block_macro(tok, &mut pending_attrs, state);
                if let Some(first) = elements.first_mut() {
                    apply_pending(first, &mut pending_attrs, &mut pending_anchor);
                }
                out.extend(elements.drain(..));
            }
            TokenKind::TableRow | TokenKind::Text => {
                let mut text = tok.raw.clone();
                cursor.advance();
                consume_paragraph_continuation(cursor, &mut text);
                let mut el = Element::new(ElementKind::Paragraph);
                el.source_line = tok.line;
                el.children = inline::parse(&text, state.attrs);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::EndOfFile | TokenKind::NewLine => {
                cursor.advance();
            }
            _ => {
                cursor.advance();
            }
        }
    }

    if !pending_attrs.pairs().is_empty() || pending_attrs.id.is_some() {
        state.diagnostics.push(Diagnostic::warning(
            DiagnosticCode::DanglingAttributeBag,
            "attribute block with nothing to attach to",
            0,
        ));
    }
    out
}

/// Folds `pending_attrs` into `el.attrs`, merging rather than replacing so
/// that named attributes a caller already set directly on `el` (e.g.
/// `parse_delimited_block`'s `language`/`attribution`) survive.
fn apply_pending(el: &mut Element, pending_attrs: &mut AttributeBag, pending_anchor: &mut Option<String>) {
    if !pending_attrs.positional.is_empty() || !pending_attrs.pairs().is_empty() || pending_attrs.id.is_some() {
        let taken = std::mem::take(pending_attrs);
        if el.id.is_none() {
            el.id = taken.id.clone();
        }
        el.attrs.merge_from(taken);
    }
    if let Some(id) = pending_anchor.take() {
        el.id = Some(id);
    }
}

/// Folds a run of following `Text` lines into `text`, honoring the `+`
/// line-break continuation marker and stopping at the first line that isn't
/// plain running text.
fn consume_paragraph_continuation(cursor: &mut Cursor, text: &mut String) {
    if let Some(stripped) = text.strip_suffix(" +") {
        text.clear();
        text.push_str(stripped);
        text.push('\u{2028}');
    }
    loop {
        match cursor.peek() {
            Some(t) if t.kind == TokenKind::Text => {
                cursor.advance();
                if !text.ends_with('\u{2028}') {
                    text.push(' ');
                }
                if let Some(stripped) = t.raw.strip_suffix(" +") {
                    text.push_str(stripped);
                    text.push('\u{2028}');
                } else {
                    text.push_str(&t.raw);
                }
            }
            _ => break,
        }
    }
}

fn header_level(raw: &str) -> usize {
    raw.chars().take_while(|&c| c == '=').count()
}

fn split_admonition(raw: &str) -> (String, String) {
    let idx = raw.find(':').unwrap_or(raw.len());
    let name = raw[..idx].to_string();
    let rest = raw.get(idx + 1..).unwrap_or("").trim_start().to_string();
    (name, rest)
}

/// Parses `:name: value` (value may be absent, meaning "set to empty").
pub fn parse_attribute_entry(raw: &str) -> Option<(String, String)> {
    let raw = raw.strip_prefix(':')?;
    let end = raw.find(':')?;
    let name = raw[..end].to_string();
    let value = raw[end + 1..].trim().to_string();
    Some((name, value))
}

fn delimiter_kind_for(tok_kind: TokenKind) -> ElementKind {
    match tok_kind {
        TokenKind::CodeBlockDelimiter => ElementKind::CodeBlock,
        TokenKind::BlockQuoteDelimiter => ElementKind::BlockQuote,
        TokenKind::SidebarDelimiter => ElementKind::Sidebar,
        TokenKind::ExampleDelimiter => ElementKind::Example,
        _ => ElementKind::Open,
    }
}

/// Parses one delimited block starting at `open`. Handles the style
/// attribute (`verse`, `quote`, `source`, `open`) overriding the structural
/// kind chosen from the delimiter rune, `--` Open-block masquerading, and
/// Open-inside-Open closing the outer block rather than nesting.
fn parse_delimited_block(cursor: &mut Cursor, open: &Token, pending_attrs: &mut AttributeBag, state: &mut ParseState) -> Element {
    let delim_raw = open.raw.clone();
    cursor.advance();

    let style = pending_attrs.positional.first().cloned();
    let mut kind = delimiter_kind_for(open.kind);
    if open.raw.starts_with("--") {
        kind = match style.as_deref() {
            Some("quote") => ElementKind::BlockQuote,
            Some("verse") => ElementKind::Verse,
            Some("sidebar") => ElementKind::Sidebar,
            Some("source") | Some("listing") => ElementKind::CodeBlock,
            _ => ElementKind::Open,
        };
    } else if let Some(style) = style.as_deref() {
        if style == "verse" && kind == ElementKind::BlockQuote {
            kind = ElementKind::Verse;
        }
    }

    let mut el = Element::new(kind);
    el.source_line = open.line;
    if let Some(second) = pending_attrs.positional.get(1) {
        let key = if kind == ElementKind::CodeBlock { "language" } else { "attribution" };
        el.attrs.set(key, second.clone());
    }

    let verbatim = matches!(kind, ElementKind::CodeBlock | ElementKind::Verse);
    let mut raw_lines: Vec<String> = Vec::new();
    let mut nested_children: Vec<Element> = Vec::new();

    loop {
        match cursor.peek() {
            None => {
                state.diagnostics.push(Diagnostic::warning(
                    DiagnosticCode::UnterminatedBlock,
                    format!("unterminated block starting with '{delim_raw}'"),
                    open.line,
                ));
                break;
            }
            Some(t) if is_matching_close(t, &delim_raw) => {
                cursor.advance();
                break;
            }
            Some(_t) if verbatim => {
                let line = cursor.advance().unwrap();
                raw_lines.push(line.raw.clone());
            }
            Some(_) => {
                let mut inner_state = state.child_state(state.base_dir.clone(), state.include_stack.clone());
                let body = parse_block_content_step(cursor, &mut inner_state, &delim_raw);
                nested_children.extend(body);
            }
        }
    }

    if verbatim {
        el.text = raw_lines.join("\n");
        if kind == ElementKind::Verse {
            el.children = inline::parse(&el.text.replace('\n', "\u{2028}"), state.attrs);
        }
    } else {
        el.children = nested_children;
    }
    el
}

fn is_matching_close(tok: &Token, open_raw: &str) -> bool {
    if open_raw.starts_with("--") {
        return tok.raw == open_raw;
    }
    matches!(
        tok.kind,
        TokenKind::CodeBlockDelimiter
            | TokenKind::BlockQuoteDelimiter
            | TokenKind::SidebarDelimiter
            | TokenKind::ExampleDelimiter
    ) && tok.raw == open_raw
}

/// One step of generic content inside a delimited block: everything
/// `parse_body` handles except section headers (blocks don't introduce new
/// sections) and without consuming the enclosing close delimiter.
fn parse_block_content_step(cursor: &mut Cursor, state: &mut ParseState, enclosing_delim: &str) -> Vec<Element> {
    let mut out = Vec::new();
    let mut pending_attrs = AttributeBag::new();
    let mut pending_anchor: Option<String> = None;
    loop {
        let Some(tok) = cursor.peek() else { break };
        if is_matching_close(tok, enclosing_delim) {
            break;
        }
        match tok.kind {
            TokenKind::EmptyLine => {
                cursor.advance();
            }
            TokenKind::AttributeBlockLine => {
                cursor.advance();
                pending_attrs = parse_attribute_list(&tok.raw[1..tok.raw.len() - 1]);
            }
            TokenKind::Anchor => {
                cursor.advance();
                pending_anchor = Some(tok.raw.trim_start_matches("[[").trim_end_matches("]]").to_string());
            }
            TokenKind::CodeBlockDelimiter
            | TokenKind::BlockQuoteDelimiter
            | TokenKind::SidebarDelimiter
            | TokenKind::ExampleDelimiter => {
                let mut el = parse_delimited_block(cursor, tok, &mut pending_attrs, state);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::TableDelimiter => {
                let mut el = super::table::parse_table(cursor, &mut pending_attrs, state);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::ListItem => {
                let mut el = super::lists::parse_list(cursor, state);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::DescriptionListItem => {
                let mut el = super::lists::parse_description_list(cursor, state);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            TokenKind::BlockMacro | TokenKind::TableOfContents => {
                cursor.advance();
                out.extend(parse_block_macro(tok, &mut pending_attrs, state));
            }
            // A nested header inside a block has no structural meaning here;
            // fall back to treating it as a paragraph line (real documents
            // don't nest sections inside delimited blocks).
            TokenKind::Header | TokenKind::TableRow | TokenKind::Text | TokenKind::AdmonitionBlock | TokenKind::AttributeLine => {
                let mut text = tok.raw.clone();
                cursor.advance();
                consume_paragraph_continuation(cursor, &mut text);
                let mut el = Element::new(ElementKind::Paragraph);
                el.source_line = tok.line;
                el.children = inline::parse(&text, state.attrs);
                apply_pending(&mut el, &mut pending_attrs, &mut pending_anchor);
                out.push(el);
            }
            _ => {
                cursor.advance();
            }
        }
    }
    out
}

fn parse_block_macro(tok: &Token, pending_attrs: &mut AttributeBag, state: &mut ParseState) -> Vec<Element> {
    if tok.kind == TokenKind::TableOfContents {
        return vec![Element::new(ElementKind::TableOfContents)];
    }
    let Some((name, target, attrs_raw)) = split_block_macro(&tok.raw) else {
        return vec![];
    };
    let attrs = parse_attribute_list(&attrs_raw);
    match name.as_str() {
        "include" => match include::resolve(&target, &attrs, state) {
            IncludeOutcome::Expanded(elements) => elements,
            IncludeOutcome::Error(message, code) => {
                warn!("include failed: {message}");
                state.diagnostics.push(Diagnostic::warning(code, message, tok.line));
                let mut el = Element::new(ElementKind::Comment);
                el.text = format!("include failed: {target}");
                vec![el]
            }
        },
        "image" => {
            let mut el = Element::new(ElementKind::Image);
            el.text = target;
            el.attrs = attrs;
            vec![el]
        }
        _ => {
            let mut el = Element::new(ElementKind::Macro);
            el.macro_name = Some(name);
            el.text = target;
            el.attrs = attrs;
            let _ = pending_attrs;
            vec![el]
        }
    }
}

fn split_block_macro(raw: &str) -> Option<(String, String, String)> {
    let sep = raw.find("::")?;
    let name = raw[..sep].to_string();
    let rest = &raw[sep + 2..];
    let bracket = rest.find('[')?;
    let target = rest[..bracket].to_string();
    let attrs_raw = rest[bracket + 1..rest.len() - 1].to_string();
    Some((name, target, attrs_raw))
}

pub(crate) fn line_indent(tok: &Token) -> usize {
    indent_width(&tok.raw)
}

/// Parses the single block attached to a preceding list item by a standalone
/// `+` continuation marker (see `lists::parse_list`). Skips leading empty
/// lines, then parses exactly one block — a delimited block, a table, a
/// nested list, or a paragraph — and returns it, or `None` if nothing
/// follows.
pub(crate) fn parse_attached_block(cursor: &mut Cursor, state: &mut ParseState) -> Option<Element> {
    while matches!(cursor.peek(), Some(t) if t.kind == TokenKind::EmptyLine) {
        cursor.advance();
    }
    let tok = cursor.peek()?;
    match tok.kind {
        TokenKind::CodeBlockDelimiter
        | TokenKind::BlockQuoteDelimiter
        | TokenKind::SidebarDelimiter
        | TokenKind::ExampleDelimiter => {
            let mut pending_attrs = AttributeBag::new();
            Some(parse_delimited_block(cursor, tok, &mut pending_attrs, state))
        }
        TokenKind::TableDelimiter => {
            let mut pending_attrs = AttributeBag::new();
            Some(super::table::parse_table(cursor, &mut pending_attrs, state))
        }
        TokenKind::ListItem => Some(super::lists::parse_list(cursor, state)),
        TokenKind::DescriptionListItem => Some(super::lists::parse_description_list(cursor, state)),
        TokenKind::TableRow | TokenKind::Text => {
            let mut text = tok.raw.clone();
            cursor.advance();
            consume_paragraph_continuation(cursor, &mut text);
            let mut el = Element::new(ElementKind::Paragraph);
            el.source_line = tok.line;
            el.children = inline::parse(&text, state.attrs);
            Some(el)
        }
        _ => None,
    }
}
