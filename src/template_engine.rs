//! Template Engine rendering (component D): renders a
//! [`crate::models::LabelTemplate`] against a flat field map into wire-ready
//! ZPL bytes. Parsing/placeholder validation lives on the model itself;
//! escaping and substitution are pure functions here so they stay independently
//! unit-testable.

use std::collections::BTreeMap;

use crate::errors::{WmsError, WmsResult};
use crate::models::LabelTemplate;

const MAX_FIELD_LEN: usize = 255;

/// Escapes a field value for safe embedding in a ZPL template: tilde first,
/// then caret, then braces. Escaping caret before tilde would double-expand
/// the caret escape, which is why the order is pinned here.
pub fn escape_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '~' => out.push_str("~~"),
            '^' => out.push_str("~~^"),
            '{' => out.push_str("{{"),
            '}' => out.push_str("}}"),
            other => out.push(other),
        }
    }
    out
}

/// Renders `template` against `fields`. Every placeholder must have a
/// corresponding entry whose value is non-null and non-blank after trimming;
/// any value over 255 characters fails the render.
pub fn render(template: &LabelTemplate, fields: &BTreeMap<String, String>) -> WmsResult<String> {
    for name in &template.placeholders {
        let value = fields.get(name).ok_or_else(|| {
            WmsError::validation(format!("template {:?} is missing field {:?}", template.name, name))
        })?;
        if value.trim().is_empty() {
            return Err(WmsError::validation(format!(
                "template {:?} field {:?} must not be blank",
                template.name, name
            )));
        }
        if value.chars().count() > MAX_FIELD_LEN {
            return Err(WmsError::validation(format!(
                "template {:?} field {:?} exceeds {MAX_FIELD_LEN} characters",
                template.name, name
            )));
        }
    }

    let mut out = String::with_capacity(template.raw.len());
    let mut chars = template.raw.char_indices().peekable();
    while let Some((_, c)) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }
        let mut name = String::new();
        for (_, c2) in chars.by_ref() {
            if c2 == '}' {
                break;
            }
            name.push(c2);
        }
        let value = fields.get(&name).expect("validated above");
        out.push_str(&escape_value(value));
    }
    Ok(out)
}

/// Requires `^XA`/`^XZ` header/trailer tokens and no unresolved `{name}`
/// placeholder remaining.
pub fn is_valid_zpl(rendered: &str) -> bool {
    rendered.contains("^XA") && rendered.contains("^XZ") && !has_unresolved_placeholder(rendered)
}

fn has_unresolved_placeholder(s: &str) -> bool {
    let chars: Vec<char> = s.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '{' if chars.get(i + 1) == Some(&'{') => i += 2,
            '}' if chars.get(i + 1) == Some(&'}') => i += 2,
            '{' => {
                let mut span = String::new();
                let mut j = i + 1;
                let mut closed = false;
                while j < chars.len() {
                    if chars[j] == '}' {
                        closed = true;
                        break;
                    }
                    span.push(chars[j]);
                    j += 1;
                }
                if closed && !span.is_empty() {
                    return true;
                }
                i = j + 1;
            }
            _ => i += 1,
        }
    }
    false
}
