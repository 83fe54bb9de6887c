//! Property-Based Tests for curriculum paths and review scheduling
//!
//! Tests the following invariants:
//! - Acyclicity safety: any graph (cyclic included) terminates, each node emitted at most once
//! - mustHave inclusion: required nodes present in the catalog always appear
//! - Dependency ordering: on acyclic graphs prerequisites precede dependants
//! - Determinism: identical inputs give identical order
//! - Review monotonicity and ease-factor floor

use std::collections::HashSet;

use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;

use pathwise_algo::{
    schedule, CurriculumScheduler, DependencyGraph, Goal, Node, PathFilter, PathRule,
    MAX_INTERVAL_DAYS, MIN_EASE_FACTOR,
};

// ============================================================================
// Arbitrary Generators
// ============================================================================

const MAX_NODES: usize = 12;

fn slug(i: usize) -> String {
    format!("n{i}")
}

/// 任意边（可能有环）
fn arb_edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..MAX_NODES, 0..MAX_NODES), 0..40)
}

/// 只从大编号指向小编号，保证无环
fn arb_acyclic_edges() -> impl Strategy<Value = Vec<(usize, usize)>> {
    arb_edges().prop_map(|edges| {
        edges
            .into_iter()
            .filter(|(a, b)| a > b)
            .collect::<Vec<_>>()
    })
}

/// 打乱顺序的目录子集
fn arb_catalog() -> impl Strategy<Value = Vec<Node>> {
    prop::sample::subsequence((0..MAX_NODES).collect::<Vec<_>>(), 0..=MAX_NODES)
        .prop_shuffle()
        .prop_map(|ids| {
            ids.into_iter()
                .map(|i| Node::new(slug(i), format!("Node {i}")))
                .collect()
        })
}

fn arb_rule() -> impl Strategy<Value = PathRule> {
    let ids = || prop::collection::vec(0..MAX_NODES, 0..4);
    (ids(), ids(), ids(), ids()).prop_map(|(keywords, include, exclude, must_have)| {
        let names = |ids: Vec<usize>| ids.into_iter().map(slug).collect::<Vec<_>>();
        let (keywords, include, exclude, must_have) =
            (names(keywords), names(include), names(exclude), names(must_have));
        PathRule::default()
            .keywords(&as_strs(&keywords))
            .include(&as_strs(&include))
            .exclude(&as_strs(&exclude))
            .must_have(&as_strs(&must_have))
    })
}

fn as_strs(values: &[String]) -> Vec<&str> {
    values.iter().map(String::as_str).collect()
}

fn build_graph(edges: &[(usize, usize)]) -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    for (a, b) in edges {
        graph.add_edge(&slug(*a), &slug(*b));
    }
    graph
}

fn scheduler(edges: &[(usize, usize)], rule: PathRule) -> CurriculumScheduler {
    CurriculumScheduler::new(
        build_graph(edges),
        PathFilter::empty().with_rule(Goal::Fullstack, rule),
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_any_graph_terminates_without_duplicates(
        edges in arb_edges(),
        catalog in arb_catalog(),
        rule in arb_rule(),
    ) {
        let scheduler = scheduler(&edges, rule);

        for goal in [None, Some(Goal::Fullstack)] {
            let path = scheduler.generate_path(&catalog, goal);
            let unique: HashSet<&str> = path.iter().map(|n| n.slug.as_str()).collect();
            prop_assert_eq!(unique.len(), path.len());
            prop_assert!(path.len() <= catalog.len());
        }
    }

    #[test]
    fn prop_unfiltered_path_is_a_permutation(
        edges in arb_edges(),
        catalog in arb_catalog(),
    ) {
        let scheduler = scheduler(&edges, PathRule::default());
        let path = scheduler.generate_path(&catalog, None);

        let expected: HashSet<&str> = catalog.iter().map(|n| n.slug.as_str()).collect();
        let actual: HashSet<&str> = path.iter().map(|n| n.slug.as_str()).collect();
        prop_assert_eq!(expected, actual);
    }

    #[test]
    fn prop_must_have_always_included(
        edges in arb_edges(),
        catalog in arb_catalog(),
        rule in arb_rule(),
    ) {
        let required = rule.must_have.clone();
        let scheduler = scheduler(&edges, rule);
        let path = scheduler.generate_path(&catalog, Some(Goal::Fullstack));

        for slug in required {
            if catalog.iter().any(|n| n.slug == slug) {
                prop_assert!(path.iter().any(|n| n.slug == slug), "{} missing", slug);
            }
        }
    }

    #[test]
    fn prop_prerequisites_precede_dependants(
        edges in arb_acyclic_edges(),
        catalog in arb_catalog(),
        rule in arb_rule(),
    ) {
        let scheduler = scheduler(&edges, rule);

        for goal in [None, Some(Goal::Fullstack)] {
            let path = scheduler.generate_path(&catalog, goal);
            let position = |s: &str| path.iter().position(|n| n.slug == s);
            for (a, b) in &edges {
                if let (Some(pa), Some(pb)) = (position(slug(*a).as_str()), position(slug(*b).as_str())) {
                    prop_assert!(pb < pa, "{} must precede {}", slug(*b), slug(*a));
                }
            }
        }
    }

    #[test]
    fn prop_deterministic(
        edges in arb_edges(),
        catalog in arb_catalog(),
        rule in arb_rule(),
    ) {
        let scheduler = scheduler(&edges, rule);
        let first = scheduler.generate_path(&catalog, Some(Goal::Fullstack));
        let second = scheduler.generate_path(&catalog, Some(Goal::Fullstack));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn prop_review_monotonicity(
        quality in 1u8..=5,
        interval in any::<u32>(),
        ease_factor in 1.3f64..=10.0,
        review_count in 0u32..50,
    ) {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let out = schedule(quality, interval, ease_factor, review_count, now).unwrap();

        if quality >= 3 {
            prop_assert_eq!(out.review_count, review_count + 1);
            prop_assert!(out.next_review_at > now);
            prop_assert!(out.interval <= MAX_INTERVAL_DAYS);
        } else {
            prop_assert_eq!(out.interval, 1);
            prop_assert_eq!(out.review_count, 0);
            prop_assert_eq!(out.next_review_at, now + Duration::days(1));
        }
        prop_assert!(out.ease_factor >= MIN_EASE_FACTOR);
    }

    #[test]
    fn prop_ease_factor_never_below_floor(
        qualities in prop::collection::vec(1u8..=2, 1..30),
    ) {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut ef = 2.5;
        for q in qualities {
            ef = schedule(q, 1, ef, 0, now).unwrap().ease_factor;
            prop_assert!(ef >= MIN_EASE_FACTOR);
        }
    }
}
