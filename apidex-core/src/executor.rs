// apidex-core/src/executor.rs
//! Filter execution: flatten records to rows, evaluate, paginate.

use serde::Serialize;

use crate::log_trace;
use crate::query::Predicate;
use crate::record::{DeploymentRecord, DeploymentRow};

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const MAX_PAGE_SIZE: usize = 500;

/// One page of search results over flattened deployment rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub rows: Vec<DeploymentRow>,
    /// Matching rows across all pages.
    pub total_rows: usize,
    pub page: usize,
    pub per_page: usize,
    pub total_pages: usize,
}

/// Run a compiled predicate over a set of records.
///
/// Records are flattened into rows first; the predicate is evaluated
/// against whole rows, which scopes Environment-level conditions to a
/// single array element. Row order follows the input record order, then
/// platform and environment position, so results are deterministic when
/// the caller iterates records in a stable order (the registry's BTreeMap
/// iterates by api_name).
///
/// `page` is 1-based and clamped up to 1; `per_page` is clamped into
/// `1..=MAX_PAGE_SIZE`. A page past the end returns an empty row list with
/// the totals intact.
pub fn execute<'a, I>(records: I, predicate: &Predicate, page: usize, per_page: usize) -> SearchPage
where
    I: IntoIterator<Item = &'a DeploymentRecord>,
{
    let per_page = per_page.clamp(1, MAX_PAGE_SIZE);
    let page = page.max(1);

    let mut matched: Vec<DeploymentRow> = Vec::new();
    for record in records {
        for row in record.rows() {
            if predicate.matches_row(&row) {
                matched.push(row);
            }
        }
    }

    let total_rows = matched.len();
    let total_pages = if total_rows == 0 {
        1
    } else {
        total_rows.div_ceil(per_page)
    };
    log_trace!("executor matched {} rows ({} pages of {})", total_rows, total_pages, per_page);

    let start = (page - 1).saturating_mul(per_page);
    let rows = if start >= total_rows {
        Vec::new()
    } else {
        matched.into_iter().skip(start).take(per_page).collect()
    };

    SearchPage {
        rows,
        total_rows,
        page,
        per_page,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::compile;
    use crate::record::{Environment, Platform};
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn env(environment_id: &str, status: &str) -> Environment {
        let ts = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        Environment {
            environment_id: environment_id.to_string(),
            version: "1.0".to_string(),
            status: status.to_string(),
            deployment_date: ts,
            last_updated: ts,
            updated_by: "alice".to_string(),
            properties: BTreeMap::new(),
        }
    }

    fn record(api_name: &str, platforms: Vec<(&str, Vec<Environment>)>) -> DeploymentRecord {
        DeploymentRecord {
            api_name: api_name.to_string(),
            platforms: platforms
                .into_iter()
                .map(|(platform_id, environments)| Platform {
                    platform_id: platform_id.to_string(),
                    environments,
                })
                .collect(),
        }
    }

    #[test]
    fn test_match_all_returns_every_row() {
        let records = vec![
            record("a-api", vec![("IP4", vec![env("dev", "RUNNING"), env("tst", "STOPPED")])]),
            record("b-api", vec![("AWS", vec![env("prd", "RUNNING")])]),
        ];
        let page = execute(&records, &Predicate::MatchAll, 1, 100);
        assert_eq!(page.total_rows, 3);
        assert_eq!(page.rows.len(), 3);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_per_element_scoping() {
        // Only the tst environment is RUNNING; "Environment = dev AND
        // Status = RUNNING" must not match across elements
        let records = vec![record(
            "a-api",
            vec![("IP4", vec![env("dev", "STOPPED"), env("tst", "RUNNING")])],
        )];
        let pred = compile("Environment = dev AND Status = RUNNING", false, false).unwrap();
        assert_eq!(execute(&records, &pred, 1, 100).total_rows, 0);

        let pred = compile("Environment = tst AND Status = RUNNING", false, false).unwrap();
        let page = execute(&records, &pred, 1, 100);
        assert_eq!(page.total_rows, 1);
        assert_eq!(page.rows[0].environment_id, "tst");
    }

    #[test]
    fn test_pagination() {
        let envs: Vec<Environment> = ["dev", "tst", "acc", "stg", "prd"]
            .iter()
            .map(|e| env(e, "RUNNING"))
            .collect();
        let records = vec![record("a-api", vec![("IP4", envs)])];

        let page = execute(&records, &Predicate::MatchAll, 1, 2);
        assert_eq!(page.rows.len(), 2);
        assert_eq!(page.total_rows, 5);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.rows[0].environment_id, "dev");

        let page = execute(&records, &Predicate::MatchAll, 3, 2);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].environment_id, "prd");

        // Past the end: empty rows, totals intact
        let page = execute(&records, &Predicate::MatchAll, 9, 2);
        assert!(page.rows.is_empty());
        assert_eq!(page.total_rows, 5);
    }

    #[test]
    fn test_page_and_per_page_clamping() {
        let records = vec![record("a-api", vec![("IP4", vec![env("dev", "RUNNING")])])];
        let page = execute(&records, &Predicate::MatchAll, 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, 1);

        let page = execute(&records, &Predicate::MatchAll, 1, 10_000);
        assert_eq!(page.per_page, MAX_PAGE_SIZE);
    }

    #[test]
    fn test_empty_result_has_one_page() {
        let records: Vec<DeploymentRecord> = Vec::new();
        let page = execute(&records, &Predicate::MatchAll, 1, 100);
        assert_eq!(page.total_rows, 0);
        assert_eq!(page.total_pages, 1);
    }

    #[test]
    fn test_row_order_is_deterministic() {
        let records = vec![
            record("a-api", vec![("IP4", vec![env("dev", "RUNNING")]), ("AWS", vec![env("prd", "RUNNING")])]),
            record("b-api", vec![("IP2", vec![env("tst", "RUNNING")])]),
        ];
        let page = execute(&records, &Predicate::MatchAll, 1, 100);
        let order: Vec<(&str, &str)> = page
            .rows
            .iter()
            .map(|r| (r.api_name.as_str(), r.platform_id.as_str()))
            .collect();
        assert_eq!(
            order,
            vec![("a-api", "IP4"), ("a-api", "AWS"), ("b-api", "IP2")]
        );
    }
}
