// apidex-core/tests/search_integration_tests.rs
// End-to-end search behavior through the registry: compile, execute,
// paginate, cache.

use std::collections::BTreeMap;

use apidex_core::{
    compile, normalize_query, ApidexError, DeployRequest, DeploymentRegistry, Predicate,
};

fn deploy(
    registry: &DeploymentRegistry,
    api_name: &str,
    platform_id: &str,
    environment_id: &str,
    version: &str,
    status: &str,
    properties: &[(&str, &str)],
) {
    registry
        .deploy(DeployRequest {
            api_name: api_name.to_string(),
            platform_id: platform_id.to_string(),
            environment_id: environment_id.to_string(),
            version: Some(version.to_string()),
            status: status.to_string(),
            updated_by: "alice".to_string(),
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<String, String>>(),
        })
        .expect("deploy should succeed");
}

/// A small fleet exercising every corner of the query language.
fn fixture() -> DeploymentRegistry {
    let registry = DeploymentRegistry::new();
    deploy(&registry, "payments-api", "IP4", "tst", "2.5", "RUNNING", &[]);
    deploy(&registry, "payments-api", "IP4", "prd", "2.5", "RUNNING", &[]);
    deploy(
        &registry,
        "test-service",
        "IP4",
        "dev",
        "1.9",
        "STOPPED",
        &[("debug.logging", "false")],
    );
    deploy(&registry, "svc-tst-01", "AWS", "acc", "1.0", "DEPLOYED", &[]);
    deploy(&registry, "orders-api", "Kubernetes", "prd", "3.0", "RUNNING", &[]);
    registry
}

fn search(registry: &DeploymentRegistry, query: &str) -> Vec<String> {
    let page = registry
        .search(query, false, false, 1, 100)
        .expect("search should succeed");
    page.rows
        .iter()
        .map(|r| format!("{}/{}/{}", r.api_name, r.platform_id, r.environment_id))
        .collect()
}

#[test]
fn test_empty_query_returns_everything() {
    let registry = fixture();
    assert_eq!(search(&registry, "").len(), 5);
    assert_eq!(search(&registry, "   ").len(), 5);
}

#[test]
fn test_attribute_and_combination() {
    let registry = fixture();
    assert_eq!(
        search(&registry, "Platform = IP4 AND Status = RUNNING"),
        vec!["payments-api/IP4/tst", "payments-api/IP4/prd"]
    );
}

#[test]
fn test_or_combination() {
    let registry = fixture();
    let hits = search(&registry, "Environment = acc OR Environment = dev");
    assert_eq!(hits, vec!["svc-tst-01/AWS/acc", "test-service/IP4/dev"]);
}

#[test]
fn test_and_takes_precedence_over_or() {
    // "A OR B AND C" splits on AND; "A OR B" stays one (free-text) condition
    let pred = compile("A OR B AND Status = RUNNING", false, false).unwrap();
    match pred {
        Predicate::And(parts) => {
            assert_eq!(parts.len(), 2);
            assert!(matches!(parts[0], Predicate::TextMatch { .. }));
            assert!(matches!(parts[1], Predicate::Comparison { .. }));
        }
        other => panic!("expected And at the top, got {other:?}"),
    }
}

#[test]
fn test_word_boundary_free_text() {
    let registry = fixture();
    // "tst" matches the tst environment and the delimited token in
    // svc-tst-01, never the inside of "test-service"
    let hits = search(&registry, "tst");
    assert!(hits.contains(&"payments-api/IP4/tst".to_string()));
    assert!(hits.contains(&"svc-tst-01/AWS/acc".to_string()));
    assert!(!hits.iter().any(|h| h.starts_with("test-service")));
}

#[test]
fn test_per_element_environment_scoping() {
    let registry = fixture();
    // payments-api runs in tst and prd; test-service is STOPPED in dev.
    // The pair (dev, RUNNING) exists on no single environment element.
    assert!(search(&registry, "Environment = dev AND Status = RUNNING").is_empty());
    assert_eq!(
        search(&registry, "Environment = tst AND Status = RUNNING"),
        vec!["payments-api/IP4/tst"]
    );
}

#[test]
fn test_properties_lookup_is_exact() {
    let registry = fixture();
    assert_eq!(
        search(&registry, "Properties : debug.logging = false"),
        vec!["test-service/IP4/dev"]
    );
    // Value comparison is case-sensitive: "False" is a different value
    assert!(search(&registry, "Properties : debug.logging = False").is_empty());
}

#[test]
fn test_numeric_version_comparison() {
    let registry = fixture();
    let hits = search(&registry, "Version >= 2.0");
    assert_eq!(
        hits,
        vec!["orders-api/Kubernetes/prd", "payments-api/IP4/tst", "payments-api/IP4/prd"]
    );
}

#[test]
fn test_quoting_is_equivalent() {
    let registry = fixture();
    assert_eq!(
        search(&registry, r#"Platform = "IP4""#),
        search(&registry, "Platform = IP4")
    );
    assert_eq!(
        search(&registry, "Platform = 'IP4'"),
        search(&registry, "Platform = IP4")
    );
}

#[test]
fn test_case_sensitivity_toggle() {
    let registry = fixture();
    let insensitive = registry.search("status = running", false, false, 1, 100).unwrap();
    assert_eq!(insensitive.total_rows, 3);
    let sensitive = registry.search("Status = running", true, false, 1, 100).unwrap();
    assert_eq!(sensitive.total_rows, 0);
    let sensitive = registry.search("Status = RUNNING", true, false, 1, 100).unwrap();
    assert_eq!(sensitive.total_rows, 3);
}

#[test]
fn test_regex_mode_end_to_end() {
    let registry = fixture();
    let page = registry.search("^payments", false, true, 1, 100).unwrap();
    assert_eq!(page.total_rows, 2);
    assert!(matches!(
        registry.search("(unclosed", false, true, 1, 100).unwrap_err(),
        ApidexError::InvalidQuerySyntax { .. }
    ));
}

#[test]
fn test_malformed_queries_are_errors_not_match_all() {
    let registry = fixture();
    for query in [
        "Properties : debug.logging",
        "Status = ",
        "Status == RUNNING",
        "Status => RUNNING",
        "Version =< 5",
        "AND",
    ] {
        let result = registry.search(query, false, false, 1, 100);
        assert!(result.is_err(), "query {query:?} should be rejected");
    }
}

#[test]
fn test_search_is_deterministic() {
    let registry = fixture();
    let first = search(&registry, "Status = RUNNING");
    for _ in 0..5 {
        assert_eq!(search(&registry, "Status = RUNNING"), first);
    }
}

#[test]
fn test_normalized_query_shares_cache_entry() {
    let registry = fixture();
    registry.search("platform = IP4   and status = RUNNING", false, false, 1, 100).unwrap();
    registry.search("platform = IP4 AND status = RUNNING", false, false, 1, 100).unwrap();
    // Both spellings normalize identically, so only one entry exists
    assert_eq!(registry.cache_stats().size, 1);
}

#[test]
fn test_pagination_over_rows() {
    let registry = fixture();
    let page1 = registry.search("", false, false, 1, 2).unwrap();
    let page2 = registry.search("", false, false, 2, 2).unwrap();
    let page3 = registry.search("", false, false, 3, 2).unwrap();
    assert_eq!(page1.total_rows, 5);
    assert_eq!(page1.total_pages, 3);
    assert_eq!(page1.rows.len(), 2);
    assert_eq!(page2.rows.len(), 2);
    assert_eq!(page3.rows.len(), 1);

    let all: Vec<&str> = page1
        .rows
        .iter()
        .chain(&page2.rows)
        .chain(&page3.rows)
        .map(|r| r.api_name.as_str())
        .collect();
    assert_eq!(all.len(), 5);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The compiler never panics, whatever the input.
        #[test]
        fn compile_never_panics(query in ".{0,120}") {
            let _ = compile(&query, false, false);
            let _ = compile(&query, true, false);
            let _ = compile(&query, false, true);
        }

        /// Compilation is a pure function of its inputs.
        #[test]
        fn compile_is_deterministic(query in ".{0,120}") {
            let a = compile(&query, false, false).map_err(|e| e.to_string());
            let b = compile(&query, false, false).map_err(|e| e.to_string());
            prop_assert_eq!(format!("{a:?}"), format!("{b:?}"));
        }

        /// Normalization is idempotent and preserves the meaning of every
        /// query that compiles.
        #[test]
        fn normalization_is_stable(query in "[ a-zA-Z0-9=<>!.:'\"-]{0,80}") {
            let normalized = normalize_query(&query);
            prop_assert_eq!(normalize_query(&normalized), normalized.clone());

            if let Ok(direct) = compile(&query, false, false) {
                let via_normalized = compile(&normalized, false, false);
                prop_assert_eq!(Ok(direct), via_normalized.map_err(|e| e.to_string()));
            }
        }
    }
}
