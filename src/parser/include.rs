//! `include::path[attrs]` resolution.
//!
//! Resolution: resolve the path relative to the base directory (rejecting
//! absolute paths and path escapes unless `safe_mode` is `unsafe`), reject a
//! path already on the include stack (circular), read the file, apply
//! `lines=`/`tags=`/`leveloffset=` filtering, then parse the filtered text
//! with the include stack extended by the resolved path. No failure mode
//! aborts the outer parse — it always degrades to a placeholder element
//! plus a diagnostic.

use std::path::{Path, PathBuf};

use crate::ast::{AttributeBag, Element};
use crate::parser::blocks::{self, ParseState};
use crate::parser::cursor::Cursor;
use crate::parser::diagnostics::DiagnosticCode;
use crate::parser::SafeMode;
use crate::tokenizer::tokenize;

pub enum IncludeOutcome {
    Expanded(Vec<Element>),
    Error(String, DiagnosticCode),
}

pub fn resolve(target: &str, attrs: &AttributeBag, state: &mut ParseState) -> IncludeOutcome {
    if !state.options.include_directives_enabled {
        return IncludeOutcome::Error(format!("includes disabled: {target}"), DiagnosticCode::IncludeNotFound);
    }
    if state.depth >= state.options.max_include_depth {
        return IncludeOutcome::Error(format!("max include depth exceeded: {target}"), DiagnosticCode::MaxNestingDepthExceeded);
    }

    let resolved = match resolve_path(&state.base_dir, target, state.options.safe_mode) {
        Ok(p) => p,
        Err(e) => return IncludeOutcome::Error(e, DiagnosticCode::IncludePathEscapesBase),
    };

    if state.include_stack.contains(&resolved) {
        return IncludeOutcome::Error(format!("circular include: {target}"), DiagnosticCode::CircularInclude);
    }

    let content = match std::fs::read_to_string(&resolved) {
        Ok(c) => c,
        Err(e) => return IncludeOutcome::Error(format!("{target}: {e}"), DiagnosticCode::IncludeNotFound),
    };

    let filtered = apply_filters(&content, attrs);

    let mut include_stack = state.include_stack.clone();
    include_stack.push(resolved.clone());
    let new_base = resolved.parent().map(Path::to_path_buf).unwrap_or_else(|| state.base_dir.clone());
    let mut inner_state = state.child_state(new_base, include_stack);

    let tokens = tokenize(&filtered);
    let mut cursor = Cursor::new(&tokens);
    let mut elements = blocks::parse_body(&mut cursor, 0, &mut inner_state);

    if let Some(offset) = attrs.get("leveloffset").and_then(|v| v.trim_start_matches('+').parse::<i64>().ok()) {
        apply_level_offset(&mut elements, offset);
    }

    IncludeOutcome::Expanded(elements)
}

fn apply_level_offset(elements: &mut [Element], offset: i64) {
    for el in elements {
        if el.kind() == crate::ast::ElementKind::Section {
            let new_level = (el.level as i64 + offset).max(1) as usize;
            el.level = new_level;
        }
        apply_level_offset(&mut el.children, offset);
    }
}

fn resolve_path(base_dir: &Path, target: &str, safe_mode: SafeMode) -> Result<PathBuf, String> {
    let candidate = Path::new(target);
    if candidate.is_absolute() && safe_mode != SafeMode::Unsafe {
        return Err(format!("absolute include path rejected under safe mode: {target}"));
    }
    let joined = if candidate.is_absolute() { candidate.to_path_buf() } else { base_dir.join(candidate) };
    let normalized = normalize(&joined);

    if safe_mode != SafeMode::Unsafe {
        let normalized_base = normalize(base_dir);
        if !normalized.starts_with(&normalized_base) {
            return Err(format!("include path escapes base directory: {target}"));
        }
    }
    Ok(normalized)
}

/// Lexically normalizes `.`/`..` components without touching the
/// filesystem (the file may not exist yet when we sandbox-check it).
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            std::path::Component::ParentDir => {
                out.pop();
            }
            std::path::Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn apply_filters(content: &str, attrs: &AttributeBag) -> String {
    let mut lines: Vec<&str> = content.lines().collect();

    if let Some(spec) = attrs.get("lines") {
        lines = filter_lines(&lines, spec);
    }
    if let Some(tag) = attrs.get("tags").or_else(|| attrs.get("tag")) {
        lines = filter_tags(&lines, tag);
    }
    lines.join("\n")
}

/// `lines=1..3;7` — 1-based, inclusive ranges, semicolon-separated.
fn filter_lines<'a>(lines: &[&'a str], spec: &str) -> Vec<&'a str> {
    let mut keep = vec![false; lines.len()];
    for part in spec.split(';') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        let (start, end) = match part.split_once("..") {
            Some((s, e)) => {
                let start: usize = s.trim().parse().unwrap_or(1);
                let end: usize = if e.trim().is_empty() || e.trim() == "$" { lines.len() } else { e.trim().parse().unwrap_or(lines.len()) };
                (start, end)
            }
            None => {
                let n: usize = part.parse().unwrap_or(0);
                (n, n)
            }
        };
        for i in start..=end {
            if i >= 1 && i <= lines.len() {
                keep[i - 1] = true;
            }
        }
    }
    lines.iter().enumerate().filter(|(i, _)| keep[*i]).map(|(_, l)| *l).collect()
}

/// `tags=name` — keeps lines between `tag::name[]` and `end::name[]`
/// markers, dropping the marker lines themselves.
fn filter_tags<'a>(lines: &[&'a str], tag: &str) -> Vec<&'a str> {
    let start_marker = format!("tag::{tag}[");
    let end_marker = format!("end::{tag}[");
    let mut out = Vec::new();
    let mut inside = false;
    for line in lines {
        let trimmed = line.trim();
        if trimmed.starts_with(&start_marker) {
            inside = true;
            continue;
        }
        if trimmed.starts_with(&end_marker) {
            inside = false;
            continue;
        }
        if inside {
            out.push(*line);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filters_line_ranges() {
        let lines = vec!["a", "b", "c", "d"];
        assert_eq!(filter_lines(&lines, "1..2;4"), vec!["a", "b", "d"]);
    }

    #[test]
    fn filters_tagged_regions() {
        let lines = vec!["before", "tag::demo[]", "kept", "end::demo[]", "after"];
        assert_eq!(filter_tags(&lines, "demo"), vec!["kept"]);
    }

    #[test]
    fn rejects_path_escaping_base() {
        let base = std::env::temp_dir().join("doctree-include-test");
        std::fs::create_dir_all(&base).unwrap();
        let err = resolve_path(&base, "../../etc/passwd", SafeMode::Safe).unwrap_err();
        assert!(err.contains("escapes"));
    }

    #[test]
    fn allows_escape_in_unsafe_mode() {
        let base = std::env::temp_dir().join("doctree-include-test2");
        std::fs::create_dir_all(&base).unwrap();
        assert!(resolve_path(&base, "/etc/passwd", SafeMode::Unsafe).is_ok());
    }
}
