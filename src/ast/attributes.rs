//! Attribute bag: case-insensitive mapping plus insertion-order pairs.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A mapping from attribute name to value, case-insensitive on lookup but
/// case-preserving in storage, plus an ordered sequence of positional
/// attributes and an insertion-order list of named pairs (kept so debug
/// output and round-trip tooling can show authors their own key casing).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeBag {
    named: HashMap<String, String>,
    order: Vec<(String, String)>,
    pub positional: Vec<String>,
    pub id: Option<String>,
    pub role: Vec<String>,
    pub options: Vec<String>,
}

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let key = name.to_ascii_lowercase();
        if self.named.insert(key, value.clone()).is_none() {
            self.order.push((name.to_string(), value));
        } else if let Some(entry) = self.order.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            entry.1 = value;
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.named.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.order
    }

    pub fn push_positional(&mut self, value: impl Into<String>) {
        self.positional.push(value.into());
    }

    pub fn set_role(&mut self, role: &str) {
        self.role = role.split_whitespace().map(str::to_string).collect();
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.iter().any(|r| r == role)
    }

    /// Merges `other` into `self`, keeping any name/id/role/options `self`
    /// already carries rather than replacing them. Used to fold a pending
    /// attribute bag into an `Element.attrs` a caller may have already set
    /// fields on directly.
    pub fn merge_from(&mut self, other: AttributeBag) {
        for (name, value) in other.order {
            if !self.is_set(&name) {
                self.set(&name, value);
            }
        }
        if self.positional.is_empty() {
            self.positional = other.positional;
        } else {
            self.positional.extend(other.positional);
        }
        if self.id.is_none() {
            self.id = other.id;
        }
        if self.role.is_empty() {
            self.role = other.role;
        }
        if self.options.is_empty() {
            self.options = other.options;
        }
    }
}

/// Parses the content of an attribute block line, e.g. `verse, Sandburg,
/// id=poem-1, role="intro"`, into positional attributes plus an
/// [`AttributeBag`]. The first positional attribute conventionally names the
/// block's "style" (e.g. `verse`, `quote`, `source`); callers interpret it.
pub fn parse_attribute_list(content: &str) -> AttributeBag {
    let mut bag = AttributeBag::new();
    for part in split_top_level(content) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some((name, value)) = split_named(part) {
            let value = unquote(value.trim());
            match name.trim() {
                "id" => bag.id = Some(value.clone()),
                "role" => bag.set_role(&value),
                _ => {}
            }
            bag.set(name.trim(), value);
        } else {
            let value = unquote(part);
            if let Some(stripped) = value.strip_prefix('#') {
                bag.id = Some(stripped.to_string());
            } else if let Some(stripped) = value.strip_prefix('.') {
                bag.role.push(stripped.to_string());
            } else if let Some(stripped) = value.strip_prefix('%') {
                bag.options.push(stripped.to_string());
            } else {
                bag.push_positional(value);
            }
        }
    }
    bag
}

fn split_named(part: &str) -> Option<(&str, &str)> {
    let idx = part.find('=')?;
    Some((&part[..idx], &part[idx + 1..]))
}

fn unquote(s: &str) -> String {
    let s = s.trim();
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        s[1..s.len() - 1].to_string()
    } else {
        s.to_string()
    }
}

/// Splits `s` on commas that are not inside a quoted string.
fn split_top_level(s: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;
    for (i, c) in s.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_positional_and_named() {
        let bag = parse_attribute_list("verse, Sandburg, id=poem-1");
        assert_eq!(bag.positional, vec!["verse", "Sandburg"]);
        assert_eq!(bag.id.as_deref(), Some("poem-1"));
    }

    #[test]
    fn parses_shorthand_id_and_role() {
        let bag = parse_attribute_list("#intro.lead");
        assert_eq!(bag.id.as_deref(), Some("intro"));
        assert!(bag.has_role("lead"));
    }

    #[test]
    fn respects_quoted_commas() {
        let bag = parse_attribute_list(r#"source, title="A, B""#);
        assert_eq!(bag.get("title"), Some("A, B"));
    }

    #[test]
    fn case_insensitive_lookup() {
        let mut bag = AttributeBag::new();
        bag.set("Source-Highlighter", "pygments");
        assert_eq!(bag.get("source-highlighter"), Some("pygments"));
    }

    #[test]
    fn merge_preserves_keys_already_set_on_self() {
        let mut el_attrs = AttributeBag::new();
        el_attrs.set("language", "rust");
        let pending = parse_attribute_list("source, rust");
        el_attrs.merge_from(pending);
        assert_eq!(el_attrs.get("language"), Some("rust"));
        assert_eq!(el_attrs.positional, vec!["source", "rust"]);
    }
}
