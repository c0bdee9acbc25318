//! Line-based `key = value` property reader.
//!
//! Blank lines and lines starting with `#` or `;` are skipped. Key and value
//! are trimmed; the value may itself contain `=`.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: expected `key = value`, found `{content}`")]
pub struct PropertyError {
    pub line: usize,
    pub content: String,
}

/// One parsed `key = value` pair and the 1-based line it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Property<'a> {
    pub line: usize,
    pub key: &'a str,
    pub value: &'a str,
}

/// Iterate the properties in `content` in file order.
pub fn properties(content: &str) -> impl Iterator<Item = Result<Property<'_>, PropertyError>> {
    content
        .lines()
        .enumerate()
        .filter_map(|(index, raw)| parse_line(index + 1, raw))
}

fn parse_line(line: usize, raw: &str) -> Option<Result<Property<'_>, PropertyError>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(';') {
        return None;
    }

    let parsed = match trimmed.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok(Property {
            line,
            key: key.trim(),
            value: value.trim(),
        }),
        _ => Err(PropertyError {
            line,
            content: trimmed.to_owned(),
        }),
    };
    Some(parsed)
}
