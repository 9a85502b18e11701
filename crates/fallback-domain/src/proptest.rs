//! Property-based tests for the domain crate.
//!
//! These tests use proptest to verify invariants around:
//! - the single-fetch guarantee
//! - primary-over-fallback selection in backend order
//! - the canonical text form of expressions

use crate::expr::{CmpOp, Expr, parse};
use crate::lookup::{Match, find_match};
use crate::predicate::Predicate;
use crate::source::{CountingSource, MemorySource};
use fallback_types::{Row, Value};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

const FIELDS: &[&str] = &["id", "active", "score", "name", "missing"];

fn arb_field() -> impl Strategy<Value = String> {
    prop::sample::select(FIELDS).prop_map(str::to_string)
}

fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        (-5i64..5).prop_map(Value::Int),
        (-5.0f64..5.0).prop_map(Value::Real),
        any::<bool>().prop_map(Value::Bool),
        "[a-c]{0,3}".prop_map(Value::Text),
    ]
}

fn arb_op() -> impl Strategy<Value = CmpOp> {
    prop_oneof![
        Just(CmpOp::Eq),
        Just(CmpOp::Ne),
        Just(CmpOp::Lt),
        Just(CmpOp::Le),
        Just(CmpOp::Gt),
        Just(CmpOp::Ge),
    ]
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Expr::Literal),
        (arb_field(), arb_op(), arb_value())
            .prop_map(|(field, op, value)| Expr::Compare { field, op, value }),
        (arb_field(), any::<bool>()).prop_map(|(field, negated)| Expr::IsNull { field, negated }),
    ];
    leaf.prop_recursive(4, 24, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|e| !e),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| a.and(b)),
            (inner.clone(), inner).prop_map(|(a, b)| a.or(b)),
        ]
    })
}

fn arb_row() -> impl Strategy<Value = Row> {
    (
        0i64..10,
        any::<bool>(),
        prop::option::of(-5.0f64..5.0),
        prop::option::of("[a-c]{0,3}"),
    )
        .prop_map(|(id, active, score, name)| {
            Row::new()
                .with("id", id)
                .with("active", active)
                .with("score", score)
                .with("name", name)
        })
}

fn arb_rows() -> impl Strategy<Value = Vec<Row>> {
    prop::collection::vec(arb_row(), 0..12)
}

// ============================================================================
// Lookup properties
// ============================================================================

proptest! {
    #[test]
    fn every_lookup_fetches_exactly_once(
        rows in arb_rows(),
        primary in arb_expr(),
        fallback in arb_expr(),
    ) {
        let source = CountingSource::new(MemorySource::new(rows));
        find_match(&source, primary, fallback).unwrap();
        prop_assert_eq!(source.fetches(), 1);
    }

    #[test]
    fn lookup_agrees_with_two_separate_scans(
        rows in arb_rows(),
        primary in arb_expr(),
        fallback in arb_expr(),
    ) {
        let expected = rows
            .iter()
            .find(|r| primary.evaluate(*r))
            .cloned()
            .map(Match::Primary)
            .or_else(|| rows.iter().find(|r| fallback.evaluate(*r)).cloned().map(Match::Fallback));

        let source = MemorySource::new(rows);
        let actual = find_match(&source, primary, fallback).unwrap();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn result_always_satisfies_the_branch_that_selected_it(
        rows in arb_rows(),
        primary in arb_expr(),
        fallback in arb_expr(),
    ) {
        let source = MemorySource::new(rows.clone());
        match find_match(&source, primary.clone(), fallback.clone()).unwrap() {
            Some(Match::Primary(row)) => prop_assert!(primary.evaluate(&row)),
            Some(Match::Fallback(row)) => {
                prop_assert!(fallback.evaluate(&row));
                prop_assert!(!rows.iter().any(|r| primary.evaluate(r)));
            }
            None => prop_assert!(!rows.iter().any(|r| primary.evaluate(r) || fallback.evaluate(r))),
        }
    }

    #[test]
    fn combined_fetch_is_a_superset_of_each_branch(
        rows in arb_rows(),
        primary in arb_expr(),
        fallback in arb_expr(),
    ) {
        use crate::source::QuerySource;

        let source = MemorySource::new(rows);
        let combined = primary.clone().or(fallback.clone());
        let fetched = source.fetch(&combined).unwrap();
        for branch in [&primary, &fallback] {
            let only = source.fetch(branch).unwrap();
            for row in only {
                prop_assert!(fetched.contains(&row));
            }
        }
    }
}

// ============================================================================
// Expression properties
// ============================================================================

proptest! {
    #[test]
    fn display_round_trips_through_parse(expr in arb_expr()) {
        let text = expr.to_string();
        let reparsed = parse(&text);
        prop_assert_eq!(reparsed, Ok(expr), "canonical text: {}", text);
    }

    #[test]
    fn parse_never_panics(input in "\\PC{0,40}") {
        let _ = parse(&input);
    }

    #[test]
    fn negation_flips_every_row(expr in arb_expr(), row in arb_row()) {
        prop_assert_ne!(expr.evaluate(&row), (!expr.clone()).evaluate(&row));
    }
}
