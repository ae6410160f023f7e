//! `LabelTemplate`: a parsed, immutable ZPL template with `{name}` placeholders.

use std::collections::BTreeSet;

use crate::errors::{WmsError, WmsResult};

/// A template name must match `[A-Za-z_][A-Za-z0-9_]*`.
fn is_valid_placeholder_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// A template whose placeholder spans have already been located and validated.
///
/// Invariant: placeholder names are unique and each matches
/// `[A-Za-z_][A-Za-z0-9_]*`. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelTemplate {
    pub name: String,
    pub raw: String,
    pub placeholders: BTreeSet<String>,
}

impl LabelTemplate {
    /// Parses `raw` once, locating `{` … `}` spans.
    ///
    /// Fails if a brace is unclosed, a span is empty, or a span's name violates
    /// the placeholder grammar.
    pub fn parse(name: impl Into<String>, raw: impl Into<String>) -> WmsResult<Self> {
        let raw = raw.into();
        let mut placeholders = BTreeSet::new();
        let mut chars = raw.char_indices().peekable();
        while let Some((_, c)) = chars.next() {
            if c != '{' {
                continue;
            }
            let mut span = String::new();
            let mut closed = false;
            for (_, c2) in chars.by_ref() {
                if c2 == '}' {
                    closed = true;
                    break;
                }
                span.push(c2);
            }
            if !closed {
                return Err(WmsError::config(format!(
                    "template {:?} has an unclosed '{{' placeholder",
                    name.into()
                )));
            }
            if span.is_empty() {
                return Err(WmsError::config(format!(
                    "template {:?} has an empty {{}} placeholder",
                    name.into()
                )));
            }
            if !is_valid_placeholder_name(&span) {
                return Err(WmsError::config(format!(
                    "template {:?} has an invalid placeholder name {:?}",
                    name.into(),
                    span
                )));
            }
            placeholders.insert(span);
        }
        Ok(Self { name: name.into(), raw, placeholders })
    }
}
