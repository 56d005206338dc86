// apidex-core/src/query/mod.rs
//! The search mini-language: split, classify, compile, evaluate.
//!
//! `compile` turns a query string like
//! `Platform = IP4 AND Status = RUNNING` into a [`Predicate`] tree.
//! Compilation is pure and deterministic: no I/O, no clock, no panics.
//! Evaluation ([`Predicate::matches_row`]) is infallible; anything that can
//! fail (operator classification, regex validation) fails at compile time.

pub mod condition;
pub mod eval;
pub mod splitter;

use serde::Serialize;

use crate::catalog::Field;
use crate::error::{ApidexError, Result};

pub use condition::compile_condition;
pub use splitter::{split, CombineOp};

/// Comparison operators accepted between an attribute and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    StartsWith,
    EndsWith,
}

impl CompareOp {
    /// True for the operators that get numeric semantics when the query
    /// value parses as a number.
    pub fn is_range(&self) -> bool {
        matches!(self, CompareOp::Gt | CompareOp::Gte | CompareOp::Lt | CompareOp::Lte)
    }

    /// The query-language token for this operator.
    pub fn token(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Gte => ">=",
            CompareOp::Lt => "<",
            CompareOp::Lte => "<=",
            CompareOp::Contains => "contains",
            CompareOp::StartsWith => "startswith",
            CompareOp::EndsWith => "endswith",
        }
    }
}

/// How a free-text value is matched against a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TextMode {
    /// Plain substring.
    Contains,
    /// Substring at word boundaries (`tst` matches `svc-tst-01`, not
    /// `test-service`).
    WordBoundary,
    /// User-supplied regular expression, validated at compile time.
    Regex,
}

/// A comparison value, typed at compile time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TypedValue {
    Number(f64),
    Text(String),
}

/// Compiled filter. The output contract of the compiler and the input of
/// the executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Predicate {
    /// Blank query: every row matches.
    MatchAll,
    /// Free-text search across a fixed field set.
    TextMatch {
        fields: Vec<Field>,
        value: String,
        mode: TextMode,
        case_sensitive: bool,
    },
    /// Attribute comparison against a typed value.
    Comparison {
        field: Field,
        op: CompareOp,
        value: TypedValue,
        case_sensitive: bool,
    },
    /// Exact, always case-sensitive lookup in the Properties map.
    PropertiesLookup { key: String, value: String },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

/// Compile a query string into a predicate.
///
/// A blank query compiles to [`Predicate::MatchAll`]. A single condition is
/// returned unwrapped; multiple conditions are wrapped in `And` / `Or`
/// per the splitter. A query that is only logical operators is a syntax
/// error.
pub fn compile(query: &str, case_sensitive: bool, regex_mode: bool) -> Result<Predicate> {
    if query.trim().is_empty() {
        return Ok(Predicate::MatchAll);
    }

    let (combine, conditions) = splitter::split(query);
    if conditions.is_empty() {
        return Err(ApidexError::syntax(query, "no conditions around logical operator"));
    }

    let mut predicates = conditions
        .iter()
        .map(|c| condition::compile_condition(c, case_sensitive, regex_mode))
        .collect::<Result<Vec<_>>>()?;

    if predicates.len() == 1 {
        return Ok(predicates.remove(0));
    }
    match combine {
        CombineOp::Or => Ok(Predicate::Or(predicates)),
        _ => Ok(Predicate::And(predicates)),
    }
}

/// Canonical cache-key form of a query: trimmed conditions re-joined with
/// upper-cased logical operators. Semantically identical queries normalize
/// to identical strings.
pub fn normalize_query(query: &str) -> String {
    let (combine, conditions) = splitter::split(query);
    conditions.join(combine.joiner())
}
