// apidex-core/src/query/splitter.rs
//! Top-level logical split of a query string.
//!
//! `AND` and `OR` are recognized as whole whitespace-delimited words,
//! case-insensitively. AND takes strict precedence: when any `AND` token is
//! present the query splits only on `AND`, and a literal `OR` inside a
//! fragment stays part of that condition. A query with neither token is a
//! single condition.

/// How the split conditions combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombineOp {
    And,
    Or,
    /// Single condition, no logical operator in the query.
    None,
}

impl CombineOp {
    /// Canonical joiner text for query normalization.
    pub fn joiner(&self) -> &'static str {
        match self {
            CombineOp::And => " AND ",
            CombineOp::Or => " OR ",
            CombineOp::None => " ",
        }
    }
}

/// Byte span of one operator token inside the query.
struct OpToken {
    start: usize,
    end: usize,
    op: CombineOp,
}

fn operator_tokens(query: &str) -> Vec<OpToken> {
    let base = query.as_ptr() as usize;
    query
        .split_whitespace()
        .filter_map(|tok| {
            let op = if tok.eq_ignore_ascii_case("AND") {
                CombineOp::And
            } else if tok.eq_ignore_ascii_case("OR") {
                CombineOp::Or
            } else {
                return None;
            };
            // split_whitespace yields subslices of `query`, so pointer
            // arithmetic recovers the exact byte offset of each token
            let start = tok.as_ptr() as usize - base;
            Some(OpToken {
                start,
                end: start + tok.len(),
                op,
            })
        })
        .collect()
}

/// Split a query into trimmed condition fragments plus the operator that
/// combines them. Empty fragments (leading, trailing, or consecutive
/// operators) are dropped.
pub fn split(query: &str) -> (CombineOp, Vec<&str>) {
    let tokens = operator_tokens(query);

    let combine = if tokens.iter().any(|t| t.op == CombineOp::And) {
        CombineOp::And
    } else if tokens.iter().any(|t| t.op == CombineOp::Or) {
        CombineOp::Or
    } else {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return (CombineOp::None, Vec::new());
        }
        return (CombineOp::None, vec![trimmed]);
    };

    let mut conditions = Vec::new();
    let mut cursor = 0;
    for token in tokens {
        if token.op != combine {
            continue;
        }
        let fragment = query[cursor..token.start].trim();
        if !fragment.is_empty() {
            conditions.push(fragment);
        }
        cursor = token.end;
    }
    let tail = query[cursor..].trim();
    if !tail.is_empty() {
        conditions.push(tail);
    }

    (combine, conditions)
}
