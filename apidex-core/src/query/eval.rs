// apidex-core/src/query/eval.rs
//! Predicate evaluation against flattened deployment rows.
//!
//! Evaluating the whole predicate tree against one row at a time is what
//! gives Environment-scoped conditions their per-element semantics: every
//! comparison inside an AND group sees the same (platform, environment)
//! pair.
//!
//! Evaluation is infallible. Regex patterns are validated when the query
//! compiles, so a pattern that reaches this module always compiles again
//! from the cache.

use lazy_static::lazy_static;
use lru::LruCache;
use parking_lot::Mutex;
use regex::Regex;
use std::borrow::Cow;
use std::num::NonZeroUsize;

use crate::query::{CompareOp, Predicate, TextMode, TypedValue};
use crate::record::DeploymentRow;

lazy_static! {
    /// Compiled pattern cache, keyed by "pattern:options". LRU-bounded so
    /// hostile query streams cannot grow it without limit.
    static ref REGEX_CACHE: Mutex<LruCache<String, Regex>> =
        Mutex::new(LruCache::new(NonZeroUsize::new(100).unwrap()));
}

fn build_pattern(pattern: &str, options: &str) -> String {
    if options.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{}){}", options, pattern)
    }
}

fn get_or_compile_regex(pattern: &str, options: &str) -> Result<Regex, regex::Error> {
    let cache_key = format!("{}:{}", pattern, options);
    {
        let mut cache = REGEX_CACHE.lock();
        if let Some(regex) = cache.get(&cache_key) {
            return Ok(regex.clone());
        }
    }
    let regex = Regex::new(&build_pattern(pattern, options))?;
    REGEX_CACHE.lock().put(cache_key, regex.clone());
    Ok(regex)
}

fn options_for(case_sensitive: bool) -> &'static str {
    if case_sensitive {
        ""
    } else {
        "i"
    }
}

/// Validate a user-supplied pattern at compile time (and warm the cache).
pub fn validate_pattern(pattern: &str, case_sensitive: bool) -> Result<(), regex::Error> {
    get_or_compile_regex(pattern, options_for(case_sensitive)).map(|_| ())
}

impl Predicate {
    /// Does this row satisfy the predicate?
    pub fn matches_row(&self, row: &DeploymentRow) -> bool {
        match self {
            Predicate::MatchAll => true,
            Predicate::And(parts) => parts.iter().all(|p| p.matches_row(row)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches_row(row)),
            Predicate::PropertiesLookup { key, value } => {
                row.properties.get(key).map_or(false, |v| v == value)
            }
            Predicate::TextMatch {
                fields,
                value,
                mode,
                case_sensitive,
            } => fields
                .iter()
                .any(|f| text_match(row.field_str(*f), value, *mode, *case_sensitive)),
            Predicate::Comparison {
                field,
                op,
                value,
                case_sensitive,
            } => compare(row.field_str(*field), *op, value, *case_sensitive),
        }
    }
}

fn text_match(haystack: &str, needle: &str, mode: TextMode, case_sensitive: bool) -> bool {
    match mode {
        TextMode::Contains => {
            let (h, n) = fold_case(haystack, needle, case_sensitive);
            h.contains(n.as_ref())
        }
        TextMode::WordBoundary => {
            let pattern = format!(r"\b{}\b", regex::escape(needle));
            get_or_compile_regex(&pattern, options_for(case_sensitive))
                .map(|re| re.is_match(haystack))
                .unwrap_or(false)
        }
        TextMode::Regex => get_or_compile_regex(needle, options_for(case_sensitive))
            .map(|re| re.is_match(haystack))
            .unwrap_or(false),
    }
}

fn compare(doc_value: &str, op: CompareOp, value: &TypedValue, case_sensitive: bool) -> bool {
    match value {
        TypedValue::Number(n) => {
            // Rows whose field does not parse as a number never satisfy a
            // numeric comparison
            let Ok(doc_n) = doc_value.trim().parse::<f64>() else {
                return false;
            };
            match op {
                CompareOp::Gt => doc_n > *n,
                CompareOp::Gte => doc_n >= *n,
                CompareOp::Lt => doc_n < *n,
                CompareOp::Lte => doc_n <= *n,
                // Number values are only built for range operators
                _ => false,
            }
        }
        TypedValue::Text(t) => {
            let (doc_s, val_s) = fold_case(doc_value, t, case_sensitive);
            match op {
                CompareOp::Eq => doc_s == val_s,
                CompareOp::Ne => doc_s != val_s,
                CompareOp::Gt => doc_s.as_ref() > val_s.as_ref(),
                CompareOp::Gte => doc_s.as_ref() >= val_s.as_ref(),
                CompareOp::Lt => doc_s.as_ref() < val_s.as_ref(),
                CompareOp::Lte => doc_s.as_ref() <= val_s.as_ref(),
                CompareOp::Contains => doc_s.contains(val_s.as_ref()),
                CompareOp::StartsWith => doc_s.starts_with(val_s.as_ref()),
                CompareOp::EndsWith => doc_s.ends_with(val_s.as_ref()),
            }
        }
    }
}

fn fold_case<'a>(left: &'a str, right: &'a str, case_sensitive: bool) -> (Cow<'a, str>, Cow<'a, str>) {
    if case_sensitive {
        (Cow::Borrowed(left), Cow::Borrowed(right))
    } else {
        (Cow::Owned(left.to_lowercase()), Cow::Owned(right.to_lowercase()))
    }
}
