//! Cross-file definition lookup.
//!
//! Used when the symbol under the cursor is reached through a member
//! access (`receiver.Symbol`) and nothing in the open documents resolves
//! it. The receiver's declared type, recovered from an `As TypeName`
//! annotation in the current document, narrows the candidate files; the
//! first declaration-shaped line for the symbol wins.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use crate::symbols::text::{split_lines, word_range_at};

/// A definition site found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDefinition {
    pub path: PathBuf,
    pub line: usize,
    pub character: usize,
}

/// The identifier immediately left of a member-access dot before
/// `word_start`, or `None` when the word is not a member access.
pub fn receiver_before(line: &str, word_start: usize) -> Option<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut index = word_start.min(chars.len());

    while index > 0 && chars[index - 1].is_whitespace() {
        index -= 1;
    }
    if index == 0 || chars[index - 1] != '.' {
        return None;
    }
    index -= 1;
    while index > 0 && chars[index - 1].is_whitespace() {
        index -= 1;
    }

    word_range_at(&chars.iter().collect::<String>(), index.checked_sub(1)?)
        .map(|(start, end)| chars[start..end].iter().collect())
}

/// The type name bound to `receiver` by an `As [New] TypeName`
/// annotation anywhere in `text`. Falls back to `None` when the receiver
/// is never annotated, in which case the receiver itself may be a type
/// name (shared member access).
pub fn inferred_receiver_type(text: &str, receiver: &str) -> Option<String> {
    let pattern = format!(
        r"(?i)\b{}\s+As\s+(?:New\s+)?([A-Za-z_][A-Za-z0-9_]*)",
        regex::escape(receiver)
    );
    let re = Regex::new(&pattern).ok()?;
    re.captures(text).map(|caps| caps[1].to_string())
}

/// Scan `candidates` for a declaration of `symbol`, restricted to files
/// declaring a `Class`/`Structure`/`Module` named `type_filter` when one
/// is known. Comment lines are skipped, and call sites (`.Symbol(`) are
/// not mistaken for declarations.
pub fn find_definition_in_files(
    symbol: &str,
    type_filter: Option<&str>,
    candidates: &[PathBuf],
) -> Option<FileDefinition> {
    let container_re = type_filter.and_then(|type_name| {
        Regex::new(&format!(
            r"(?i)\b(?:Class|Structure|Module)\s+{}\b",
            regex::escape(type_name)
        ))
        .ok()
    });
    let escaped = regex::escape(symbol);
    let declaration_re = Regex::new(&format!(
        r"(?i)\b(?:Sub|Function|Property|Class|Module|Structure)\s+({escaped})\b"
    ))
    .ok()?;
    // No look-behind in this regex engine; the leading class excludes a
    // preceding dot or word character instead.
    let invocation_re = Regex::new(&format!(r"(?i)(?:^|[^.\w])({escaped})\s*\(")).ok()?;

    for path in candidates {
        let Ok(text) = fs::read_to_string(path) else {
            debug!(path = %path.display(), "skipping unreadable candidate file");
            continue;
        };
        if let Some(re) = &container_re {
            if !re.is_match(&text) {
                continue;
            }
        }
        if let Some(definition) = find_definition_in_text(path, &text, &declaration_re, &invocation_re) {
            return Some(definition);
        }
    }

    None
}

fn find_definition_in_text(
    path: &Path,
    text: &str,
    declaration_re: &Regex,
    invocation_re: &Regex,
) -> Option<FileDefinition> {
    for (line_index, line) in split_lines(text).iter().enumerate() {
        if is_comment_line(line) {
            continue;
        }
        let name = declaration_re
            .captures(line)
            .or_else(|| invocation_re.captures(line))
            .and_then(|caps| caps.get(1));
        if let Some(name) = name {
            return Some(FileDefinition {
                path: path.to_path_buf(),
                line: line_index,
                character: line[..name.start()].chars().count(),
            });
        }
    }
    None
}

fn is_comment_line(line: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('\'') {
        return true;
    }
    let mut chars = trimmed.chars();
    let keyword: String = chars.by_ref().take(3).collect();
    keyword.eq_ignore_ascii_case("rem") && chars.next().is_none_or(|c| c.is_whitespace())
}
