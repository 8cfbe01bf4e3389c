//! Value and identifier escaping rules.

use crate::document::Scalar;

/// Sanitize a scalar for embedding in a SQL literal.
///
/// `None` means SQL NULL (distinct from the four-character text "null");
/// otherwise the value is stringified with every single quote doubled.
pub fn sanitize_value(value: &Scalar) -> Option<String> {
    match value {
        Scalar::Null => None,
        Scalar::Bool(b) => Some(b.to_string()),
        Scalar::Number(n) => Some(n.to_string()),
        Scalar::String(s) => Some(s.replace('\'', "''")),
    }
}

/// Render a possibly absent scalar as a SQL literal: `NULL`, or the
/// sanitized text in single quotes.
pub fn literal(value: Option<&Scalar>) -> String {
    match value.and_then(sanitize_value) {
        Some(text) => format!("'{}'", text),
        None => "NULL".to_string(),
    }
}

/// Wrap an identifier in delimiters if it contains characters that require
/// delimiting; otherwise return it unchanged.
pub fn escape_identifier(name: &str) -> String {
    if name.chars().any(|c| c == '_' || c == '-') {
        format!("\"{}\"", name)
    } else {
        name.to_string()
    }
}

/// Strip one layer of identifier delimiters if present. Inverse of
/// [`escape_identifier`] for all valid identifiers.
pub fn unescape_identifier(token: &str) -> String {
    let inner = token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .or_else(|| token.strip_prefix('`').and_then(|t| t.strip_suffix('`')))
        .or_else(|| token.strip_prefix('[').and_then(|t| t.strip_suffix(']')));
    inner.unwrap_or(token).to_string()
}

/// True for tables following the storage-engine-internal naming convention.
/// Reserved tables are never exported, dropped or recreated.
pub fn is_reserved_table(name: &str) -> bool {
    name.starts_with("sqlite_") || name.contains("__")
}
