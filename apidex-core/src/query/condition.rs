// apidex-core/src/query/condition.rs
//! Classification and compilation of a single condition fragment.
//!
//! Classification order (first match wins):
//! 1. Properties lookup: `Properties : key = value`
//! 2. Attribute comparison: `<name> <op> <value>` where the name resolves
//!    in the attribute catalog
//! 3. Free-text fallback
//!
//! Malformed conditions are errors, never silently dropped. Unknown
//! attribute names are NOT malformed; they fall through to free text so
//! arbitrary words stay searchable.

use crate::catalog::{self, Field, FREE_TEXT_FIELDS};
use crate::error::{ApidexError, Result};
use crate::query::eval;
use crate::query::{CompareOp, Predicate, TextMode, TypedValue};

/// Comparison glyphs that mark a malformed operator when they touch a
/// detected one.
const OPERATOR_GLYPHS: &[char] = &['=', '<', '>'];

/// Symbolic operators other than bare `=`, which is detected last so
/// `!=`, `>=`, `<=` are never mis-split.
const SYMBOLIC_OPS: [(&str, CompareOp); 5] = [
    ("!=", CompareOp::Ne),
    (">=", CompareOp::Gte),
    ("<=", CompareOp::Lte),
    (">", CompareOp::Gt),
    ("<", CompareOp::Lt),
];

/// Compile one condition fragment into a predicate.
pub fn compile_condition(
    condition: &str,
    case_sensitive: bool,
    regex_mode: bool,
) -> Result<Predicate> {
    let condition = condition.trim();

    if let Some(body) = properties_lookup_body(condition) {
        return compile_properties(condition, body);
    }
    if let Some(predicate) = compile_comparison(condition, case_sensitive)? {
        return Ok(predicate);
    }
    compile_free_text(condition, case_sensitive, regex_mode)
}

/// Returns the text after the `Properties :` prefix, if present.
fn properties_lookup_body(condition: &str) -> Option<&str> {
    const PREFIX: &str = "properties";
    let head = condition.get(..PREFIX.len())?;
    if !head.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    condition[PREFIX.len()..].trim_start().strip_prefix(':')
}

fn compile_properties(clause: &str, body: &str) -> Result<Predicate> {
    let (key, value) = body
        .split_once('=')
        .ok_or_else(|| ApidexError::syntax(clause, "properties lookup requires 'key = value'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(ApidexError::syntax(clause, "properties key cannot be empty"));
    }
    let value = strip_quotes(value.trim());
    if value.is_empty() {
        return Err(ApidexError::syntax(clause, "properties value cannot be empty"));
    }
    Ok(Predicate::PropertiesLookup {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// Try to parse `<name> <op> <value>`. Returns `Ok(None)` when no operator
/// is present or the attribute name is unknown (free-text fallback).
fn compile_comparison(condition: &str, case_sensitive: bool) -> Result<Option<Predicate>> {
    let Some((name, op, raw_value)) = detect_operator(condition) else {
        return Ok(None);
    };
    if name.is_empty() {
        return Err(ApidexError::syntax(
            condition,
            "missing attribute name before operator",
        ));
    }
    if name.ends_with(OPERATOR_GLYPHS) {
        // Reversed pairs like `=>` and `=<` split at the bare glyph and
        // leave the rest dangling on the name
        let tail_len = name
            .chars()
            .rev()
            .take_while(|c| OPERATOR_GLYPHS.contains(c))
            .count();
        return Err(ApidexError::UnsupportedOperator(format!(
            "{}{}",
            &name[name.len() - tail_len..],
            op.token()
        )));
    }
    let Some(path) = catalog::resolve(name) else {
        // Unknown attribute: the whole fragment is free text
        return Ok(None);
    };

    let raw_value = raw_value.trim();
    if raw_value.starts_with(OPERATOR_GLYPHS) {
        // Doubled glyphs like `==`, `<>`, `=>` are not operators here
        return Err(ApidexError::UnsupportedOperator(format!(
            "{}{}",
            op.token(),
            truncate_glyphs(raw_value)
        )));
    }
    let value = strip_quotes(raw_value);
    if value.is_empty() {
        return Err(ApidexError::syntax(condition, "comparison value cannot be empty"));
    }

    // Numeric semantics only for range operators; equality on versions and
    // ids stays a string comparison
    let value = match value.parse::<f64>() {
        Ok(n) if op.is_range() => TypedValue::Number(n),
        _ => TypedValue::Text(value.to_string()),
    };

    Ok(Some(Predicate::Comparison {
        field: path.field,
        op,
        value,
        case_sensitive,
    }))
}

/// Find the operator in a condition: symbolic range/inequality operators
/// first (earliest occurrence wins, two-character tokens beat their
/// one-character prefixes at the same position), then word operators, then
/// plain `=` last.
fn detect_operator(condition: &str) -> Option<(&str, CompareOp, &str)> {
    let mut best: Option<(usize, &'static str, CompareOp)> = None;
    for (token, op) in SYMBOLIC_OPS {
        if let Some(idx) = condition.find(token) {
            let better = match best {
                None => true,
                Some((best_idx, best_token, _)) => {
                    idx < best_idx || (idx == best_idx && token.len() > best_token.len())
                }
            };
            if better {
                best = Some((idx, token, op));
            }
        }
    }
    if let Some((idx, token, op)) = best {
        return Some((
            condition[..idx].trim_end(),
            op,
            &condition[idx + token.len()..],
        ));
    }
    if let Some((start, end, op)) = find_word_operator(condition) {
        return Some((condition[..start].trim_end(), op, &condition[end..]));
    }
    if let Some(idx) = condition.find('=') {
        return Some((condition[..idx].trim_end(), CompareOp::Eq, &condition[idx + 1..]));
    }
    None
}

/// Locate a whitespace-delimited `contains` / `startswith` / `endswith`
/// token (case-insensitive). A word at position 0 cannot be an operator;
/// it has no attribute name before it.
fn find_word_operator(condition: &str) -> Option<(usize, usize, CompareOp)> {
    let base = condition.as_ptr() as usize;
    for tok in condition.split_whitespace() {
        let op = if tok.eq_ignore_ascii_case("contains") {
            CompareOp::Contains
        } else if tok.eq_ignore_ascii_case("startswith") {
            CompareOp::StartsWith
        } else if tok.eq_ignore_ascii_case("endswith") {
            CompareOp::EndsWith
        } else {
            continue;
        };
        let start = tok.as_ptr() as usize - base;
        if start == 0 {
            continue;
        }
        return Some((start, start + tok.len(), op));
    }
    None
}

fn compile_free_text(condition: &str, case_sensitive: bool, regex_mode: bool) -> Result<Predicate> {
    if condition.is_empty() {
        return Err(ApidexError::syntax(condition, "empty condition"));
    }

    if regex_mode {
        // The raw fragment is the user's pattern; validate now so
        // evaluation can never fail
        eval::validate_pattern(condition, case_sensitive)
            .map_err(|e| ApidexError::syntax(condition, format!("invalid regex: {}", e)))?;
        return Ok(Predicate::TextMatch {
            fields: free_text_fields(),
            value: condition.to_string(),
            mode: TextMode::Regex,
            case_sensitive,
        });
    }

    let value = strip_quotes(condition);
    if value.is_empty() {
        return Err(ApidexError::syntax(condition, "empty condition"));
    }
    // Word-boundary discipline for plain tokens: `tst` must not match
    // `test-service`. Tokens with punctuation match as substrings.
    let mode = if value.chars().all(|c| c.is_ascii_alphanumeric()) {
        TextMode::WordBoundary
    } else {
        TextMode::Contains
    };
    Ok(Predicate::TextMatch {
        fields: free_text_fields(),
        value: value.to_string(),
        mode,
        case_sensitive,
    })
}

fn free_text_fields() -> Vec<Field> {
    FREE_TEXT_FIELDS.iter().map(|p| p.field).collect()
}

/// Strip one matching pair of surrounding quotes (double or single).
fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

fn truncate_glyphs(raw_value: &str) -> String {
    raw_value
        .chars()
        .take_while(|c| OPERATOR_GLYPHS.contains(c))
        .collect()
}
