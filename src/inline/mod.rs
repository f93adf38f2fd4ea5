//! The inline parser: re-lexes the raw text carried by a Text-bearing
//! element into a nested sub-tree of formatting, links, and macros.
//!
//! A single left-to-right scan over the string. Plain-text runs accumulate
//! into a buffer and are flushed as a `Text` element whenever a recognized
//! construct interrupts them. Delimited constructs (`*strong*`, `` `code` ``,
//! …) look ahead for a matching close; on failure to find one the opening
//! delimiter is pushed back onto the buffer as literal text and the scan
//! continues past it — nothing here ever fails outright.

use crate::ast::{AttributeBag, Element, ElementKind};

/// Depth past which delimited spans stop parsing their own content and are
/// emitted as literal text instead — the inline analogue of the block
/// parser's and include resolver's nesting bounds.
const MAX_NESTING_DEPTH: usize = 32;

pub fn parse(text: &str, attrs: &AttributeBag) -> Vec<Element> {
    parse_bounded(text, attrs, 0)
}

fn parse_bounded(text: &str, attrs: &AttributeBag, depth: usize) -> Vec<Element> {
    let mut out = Vec::new();
    let mut buf = String::new();
    let mut pos = 0usize;

    while pos < text.len() {
        let rest = &text[pos..];

        if rest.starts_with('\u{2028}') {
            flush(&mut buf, &mut out);
            out.push(Element::new(ElementKind::LineBreak));
            pos += '\u{2028}'.len_utf8();
            continue;
        }

        if depth < MAX_NESTING_DEPTH {
            if let Some((el, consumed)) = try_footnote(rest, attrs, depth) {
                flush(&mut buf, &mut out);
                out.push(el);
                pos += consumed;
                continue;
            }
            if let Some((el, consumed)) = try_named_macro(rest, attrs, depth) {
                flush(&mut buf, &mut out);
                out.push(el);
                pos += consumed;
                continue;
            }
            if let Some((el, consumed)) = try_image(rest) {
                flush(&mut buf, &mut out);
                out.push(el);
                pos += consumed;
                continue;
            }
            if let Some((el, consumed)) = try_cross_reference(rest, attrs, depth) {
                flush(&mut buf, &mut out);
                out.push(el);
                pos += consumed;
                continue;
            }
            if let Some((el, consumed)) = try_inline_anchor(rest) {
                flush(&mut buf, &mut out);
                out.push(el);
                pos += consumed;
                continue;
            }
            if let Some((el, consumed)) = try_link(rest) {
                flush(&mut buf, &mut out);
                out.push(el);
                pos += consumed;
                continue;
            }
            let prev = if pos > 0 { text[..pos].chars().last() } else { None };
            if let Some((el, consumed)) = try_delimited(rest, prev, attrs, depth) {
                flush(&mut buf, &mut out);
                out.push(el);
                pos += consumed;
                continue;
            }
        }

        if let Some((value, consumed)) = try_substitution(rest, attrs) {
            buf.push_str(&value);
            pos += consumed;
            continue;
        }

        let ch = rest.chars().next().unwrap();
        buf.push(ch);
        pos += ch.len_utf8();
    }

    flush(&mut buf, &mut out);
    out
}

fn flush(buf: &mut String, out: &mut Vec<Element>) {
    if !buf.is_empty() {
        out.push(Element::text_node(std::mem::take(buf)));
    }
}

/// `{name}` — substituted against the document attribute bag; an unknown
/// name passes through unchanged (including its braces).
fn try_substitution(rest: &str, attrs: &AttributeBag) -> Option<(String, usize)> {
    if !rest.starts_with('{') {
        return None;
    }
    let close = rest[1..].find('}')?;
    let name = &rest[1..1 + close];
    if name.is_empty() || name.contains(char::is_whitespace) {
        return None;
    }
    let consumed = 1 + close + 1;
    match attrs.get(name) {
        Some(value) => Some((value.to_string(), consumed)),
        None => Some((rest[..consumed].to_string(), consumed)),
    }
}

struct Delim {
    single: &'static str,
    double: &'static str,
    kind: ElementKind,
}

const DELIMS: &[Delim] = &[
    Delim { single: "*", double: "**", kind: ElementKind::Strong },
    Delim { single: "_", double: "__", kind: ElementKind::Emphasis },
    Delim { single: "`", double: "``", kind: ElementKind::InlineCode },
    Delim { single: "#", double: "##", kind: ElementKind::Highlight },
    Delim { single: "^", double: "^^", kind: ElementKind::Superscript },
    Delim { single: "~", double: "~~", kind: ElementKind::Subscript },
];

/// Tries every registered delimiter at the current position, preferring the
/// doubled ("unconstrained") form when both delimiters start with the same
/// rune.
fn try_delimited(rest: &str, prev: Option<char>, attrs: &AttributeBag, depth: usize) -> Option<(Element, usize)> {
    for d in DELIMS {
        if rest.starts_with(d.double) {
            let inner_start = d.double.len();
            if let Some(rel_close) = rest[inner_start..].find(d.double) {
                let inner = &rest[inner_start..inner_start + rel_close];
                let consumed = inner_start + rel_close + d.double.len();
                let el = build_span(d.kind, inner, attrs, depth);
                return Some((el, consumed));
            }
        }
        if !rest.starts_with(d.double) && rest.starts_with(d.single) {
            let boundary_ok = prev.map_or(true, |c| !c.is_alphanumeric());
            let inner_start = d.single.len();
            let next_char = rest[inner_start..].chars().next();
            let opens_content = next_char.is_some_and(|c| !c.is_whitespace());
            if boundary_ok && opens_content {
                if let Some((inner, consumed)) = find_single_close(&rest[inner_start..], d.single) {
                    let el = build_span(d.kind, inner, attrs, depth);
                    return Some((el, inner_start + consumed));
                }
            }
        }
    }
    None
}

/// Finds the next occurrence of `delim` in `s` whose preceding character is
/// not whitespace (so `*a * b*` doesn't close on the first stray `*`), and
/// whose following character (if any) is not itself alphanumeric.
fn find_single_close(s: &str, delim: &str) -> Option<(&str, usize)> {
    let mut search_from = 0;
    loop {
        let rel = s[search_from..].find(delim)?;
        let idx = search_from + rel;
        if idx == 0 {
            search_from = idx + delim.len();
            continue;
        }
        let prev_char = s[..idx].chars().last();
        let next_char = s[idx + delim.len()..].chars().next();
        let prev_ok = prev_char.is_some_and(|c| !c.is_whitespace());
        let next_ok = next_char.map_or(true, |c| !c.is_alphanumeric());
        if prev_ok && next_ok {
            return Some((&s[..idx], idx + delim.len()));
        }
        search_from = idx + delim.len();
    }
}

fn build_span(kind: ElementKind, inner: &str, attrs: &AttributeBag, depth: usize) -> Element {
    let mut el = Element::new(kind);
    if kind == ElementKind::InlineCode {
        el.text = inner.to_string();
    } else {
        el.children = parse_bounded(inner, attrs, depth + 1);
    }
    el
}

/// `https://…` / `http://…`, optionally followed by a `[label]`.
fn try_link(rest: &str) -> Option<(Element, usize)> {
    let scheme_len = if rest.starts_with("https://") {
        8
    } else if rest.starts_with("http://") {
        7
    } else {
        return None;
    };
    let body_len = rest[scheme_len..]
        .find(|c: char| c.is_whitespace() || c == '[' || c == '<' || c == '>')
        .unwrap_or(rest.len() - scheme_len);
    let mut end = scheme_len + body_len;
    while end > scheme_len && matches!(rest.as_bytes()[end - 1], b'.' | b',' | b')' | b'!' | b'?') {
        end -= 1;
    }
    if end == scheme_len {
        return None;
    }
    let url = &rest[..end];
    let mut consumed = end;
    let mut label = url.to_string();
    if rest[end..].starts_with('[') {
        if let Some(close) = rest[end + 1..].find(']') {
            label = rest[end + 1..end + 1 + close].to_string();
            consumed = end + 1 + close + 1;
        }
    }
    let mut el = Element::new(ElementKind::Link);
    el.text = url.to_string();
    el.children = vec![Element::text_node(label)];
    Some((el, consumed))
}

/// `image:path[attrs]`
fn try_image(rest: &str) -> Option<(Element, usize)> {
    let target = rest.strip_prefix("image:")?;
    let bracket = target.find('[')?;
    let path = &target[..bracket];
    if path.is_empty() {
        return None;
    }
    let close = target[bracket..].find(']')?;
    let attrs_raw = &target[bracket + 1..bracket + close];
    let mut el = Element::new(ElementKind::Image);
    el.text = path.to_string();
    el.attrs = crate::ast::parse_attribute_list(attrs_raw);
    Some((el, 6 + bracket + close + 1))
}

/// `<<id>>` / `<<id,label>>`
fn try_cross_reference(rest: &str, attrs: &AttributeBag, depth: usize) -> Option<(Element, usize)> {
    let body = rest.strip_prefix("<<")?;
    let close = body.find(">>")?;
    let inner = &body[..close];
    let (id, label) = match inner.split_once(',') {
        Some((id, label)) => (id.trim().to_string(), Some(label.trim().to_string())),
        None => (inner.trim().to_string(), None),
    };
    if id.is_empty() {
        return None;
    }
    let mut el = Element::new(ElementKind::CrossReference);
    el.target = Some(id);
    if let Some(label) = label {
        el.children = parse_bounded(&label, attrs, depth + 1);
    }
    Some((el, 2 + close + 2))
}

/// `[[id]]` — inline anchor.
fn try_inline_anchor(rest: &str) -> Option<(Element, usize)> {
    let body = rest.strip_prefix("[[")?;
    let close = body.find("]]")?;
    let id = body[..close].trim().to_string();
    if id.is_empty() || id.contains(char::is_whitespace) {
        return None;
    }
    let mut el = Element::new(ElementKind::Anchor);
    el.id = Some(id);
    Some((el, 2 + close + 2))
}

/// `footnote:[text]` / `footnoteref:[id,text]` / `footnoteref:[id]`
fn try_footnote(rest: &str, attrs: &AttributeBag, depth: usize) -> Option<(Element, usize)> {
    let (is_ref, tail) = if let Some(t) = rest.strip_prefix("footnoteref:") {
        (true, t)
    } else if let Some(t) = rest.strip_prefix("footnote:") {
        (false, t)
    } else {
        return None;
    };
    let inner = tail.strip_prefix('[')?;
    let close = inner.find(']')?;
    let body = &inner[..close];
    let mut el = Element::new(ElementKind::Footnote);
    el.is_reference = is_ref;
    let prefix_len = if is_ref { "footnoteref:".len() } else { "footnote:".len() };
    let consumed = prefix_len + 1 + close + 1;
    if is_ref {
        match body.split_once(',') {
            Some((id, text)) => {
                el.id = Some(id.trim().to_string());
                el.children = parse_bounded(text.trim(), attrs, depth + 1);
            }
            None => el.id = Some(body.trim().to_string()),
        }
    } else {
        el.children = parse_bounded(body, attrs, depth + 1);
    }
    Some((el, consumed))
}

const NAMED_MACROS: &[&str] = &["kbd", "btn", "menu", "pass"];

/// `kbd:[…]`, `btn:[…]`, `menu:[…]`, `pass:[…]`
fn try_named_macro(rest: &str, attrs: &AttributeBag, depth: usize) -> Option<(Element, usize)> {
    for name in NAMED_MACROS {
        let prefix = format!("{name}:[");
        if let Some(tail) = rest.strip_prefix(prefix.as_str()) {
            let close = tail.find(']')?;
            let body = &tail[..close];
            let mut el = Element::new(ElementKind::Macro);
            el.macro_name = Some((*name).to_string());
            if *name == "pass" {
                el.text = body.to_string();
            } else {
                el.children = parse_bounded(body, attrs, depth + 1);
            }
            return Some((el, prefix.len() + close + 1));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(elements: &[Element]) -> Vec<(ElementKind, String)> {
        elements.iter().map(|e| (e.kind(), e.text.clone())).collect()
    }

    #[test]
    fn splits_strong_from_surrounding_text() {
        let attrs = AttributeBag::new();
        let out = parse("Hello *world*.", &attrs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].kind(), ElementKind::Text);
        assert_eq!(out[0].text, "Hello ");
        assert_eq!(out[1].kind(), ElementKind::Strong);
        assert_eq!(out[1].children[0].text, "world");
        assert_eq!(out[2].text, ".");
    }

    #[test]
    fn unclosed_emphasis_backtracks_to_literal() {
        let attrs = AttributeBag::new();
        let out = parse("an _unclosed emphasis", &attrs);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].kind(), ElementKind::Text);
        assert_eq!(out[0].text, "an _unclosed emphasis");
    }

    #[test]
    fn nested_emphasis_inside_strong() {
        let attrs = AttributeBag::new();
        let out = parse("*strong _and em_*", &attrs);
        assert_eq!(out[0].kind(), ElementKind::Strong);
        let nested = &out[0].children;
        assert!(nested.iter().any(|e| e.kind() == ElementKind::Emphasis));
    }

    #[test]
    fn recognizes_link_with_label() {
        let attrs = AttributeBag::new();
        let out = parse("see https://example.com[the site] for more", &attrs);
        let link = out.iter().find(|e| e.kind() == ElementKind::Link).unwrap();
        assert_eq!(link.text, "https://example.com");
        assert_eq!(link.children[0].text, "the site");
    }

    #[test]
    fn bare_url_trims_trailing_punctuation() {
        let attrs = AttributeBag::new();
        let out = parse("visit https://example.com.", &attrs);
        let link = out.iter().find(|e| e.kind() == ElementKind::Link).unwrap();
        assert_eq!(link.text, "https://example.com");
    }

    #[test]
    fn cross_reference_with_label() {
        let attrs = AttributeBag::new();
        let out = parse("see <<intro,the intro>>", &attrs);
        let xref = out.iter().find(|e| e.kind() == ElementKind::CrossReference).unwrap();
        assert_eq!(xref.target.as_deref(), Some("intro"));
        assert_eq!(xref.children[0].text, "the intro");
    }

    #[test]
    fn footnote_reference_has_no_text() {
        let attrs = AttributeBag::new();
        let out = parse("word.footnote:[a note]", &attrs);
        let fnote = out.iter().find(|e| e.kind() == ElementKind::Footnote).unwrap();
        assert!(!fnote.is_reference);
        assert_eq!(fnote.children[0].text, "a note");
    }

    #[test]
    fn substitutes_known_attribute() {
        let mut attrs = AttributeBag::new();
        attrs.set("product", "doctree");
        let out = parse("Welcome to {product}!", &attrs);
        assert_eq!(plain(&out)[0].1, "Welcome to doctree!");
    }

    #[test]
    fn unknown_attribute_passes_through() {
        let attrs = AttributeBag::new();
        let out = parse("{missing} stays", &attrs);
        assert_eq!(out[0].text, "{missing} stays");
    }

    #[test]
    fn forced_line_break_marker_becomes_element() {
        let attrs = AttributeBag::new();
        let out = parse("first\u{2028}second", &attrs);
        assert_eq!(out.len(), 3);
        assert_eq!(out[1].kind(), ElementKind::LineBreak);
    }

    #[test]
    fn inline_anchor_and_image() {
        let attrs = AttributeBag::new();
        let out = parse("[[sec-1]] image:diagram.png[alt=Diagram]", &attrs);
        assert_eq!(out[0].kind(), ElementKind::Anchor);
        assert_eq!(out[0].id.as_deref(), Some("sec-1"));
        let img = out.iter().find(|e| e.kind() == ElementKind::Image).unwrap();
        assert_eq!(img.text, "diagram.png");
        assert_eq!(img.attrs.get("alt"), Some("Diagram"));
    }
}
