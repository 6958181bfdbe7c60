// SPDX-License-Identifier: Apache-2.0

use rolemesh_conditions::{evaluate, CompareOp, Condition, FactValue, Facts};
use rolemesh_model::ConditionSource;
use serde_json::json;

fn multinode() -> Facts {
    Facts::new()
        .with("cluster:mode", "multinode")
        .with("cluster:status", "new")
        .with("settings:common.debug.value", true)
        .with("cluster:nodes", 3_i64)
}

#[test]
fn comparison_parses_into_field_op_literal() {
    let cond = Condition::parse("cluster:mode == 'multinode'").expect("parse");
    assert_eq!(
        cond,
        Condition::Comparison {
            field: "cluster:mode".to_string(),
            op: CompareOp::Eq,
            literal: FactValue::from("multinode"),
        }
    );
}

#[test]
fn double_quotes_and_reversed_operands_are_equivalent() {
    let facts = multinode();
    assert!(evaluate("\"multinode\" == cluster:mode", &facts).expect("eval"));
    assert!(evaluate("cluster:mode != \"ha_compact\"", &facts).expect("eval"));
}

#[test]
fn boolean_operators_follow_precedence() {
    let facts = multinode();
    assert!(evaluate(
        "cluster:mode == 'ha_compact' or cluster:status == 'new' and cluster:nodes == 3",
        &facts
    )
    .expect("eval"));
    assert!(!evaluate(
        "(cluster:mode == 'ha_compact' or cluster:status == 'new') and cluster:nodes == 4",
        &facts
    )
    .expect("eval"));
    assert!(evaluate("not not settings:common.debug.value", &facts).expect("eval"));
}

#[test]
fn missing_facts_compare_as_null() {
    let facts = Facts::new();
    assert!(!evaluate("cluster:mode == 'multinode'", &facts).expect("eval"));
    assert!(evaluate("cluster:mode != 'multinode'", &facts).expect("eval"));
    assert!(evaluate("cluster:mode == null", &facts).expect("eval"));
    assert!(!evaluate("settings:common.debug.value", &facts).expect("eval"));
}

#[test]
fn values_of_different_types_are_unequal() {
    let facts = Facts::new().with("cluster:nodes", "3");
    assert!(!evaluate("cluster:nodes == 3", &facts).expect("eval"));
    assert!(evaluate("cluster:nodes == '3'", &facts).expect("eval"));
    let facts = Facts::new().with("flag", true);
    assert!(!evaluate("flag == 'true'", &facts).expect("eval"));
}

#[test]
fn malformed_expressions_are_syntax_errors() {
    for bad in [
        "",
        "cluster:mode ==",
        "cluster:mode = 'x'",
        "(cluster:mode == 'x'",
        "cluster:mode == 'unterminated",
        "and",
        "cluster:mode == 'x' or",
        "1 == 2",
    ] {
        assert!(Condition::parse(bad).is_err(), "expected syntax error for {bad:?}");
    }
}

#[test]
fn mapping_shorthand_means_every_fact_equals_its_literal() {
    let source = ConditionSource::Mapping(
        json!({"cluster:mode": "multinode", "settings:common": {"debug": {"value": true}}})
            .as_object()
            .cloned()
            .expect("object"),
    );
    let cond = Condition::compile(&source).expect("compile");
    assert!(cond.evaluate(&multinode()));
    assert!(!cond.evaluate(&Facts::new().with("cluster:mode", "multinode")));
    assert_eq!(
        cond.fact_names(),
        vec!["cluster:mode", "settings:common.debug.value"]
    );
}

#[test]
fn single_entry_mapping_compiles_to_plain_comparison() {
    let source = ConditionSource::Mapping(
        json!({"multinode": true}).as_object().cloned().expect("object"),
    );
    let cond = Condition::compile(&source).expect("compile");
    assert!(matches!(cond, Condition::Comparison { .. }));
    assert!(cond.evaluate(&Facts::new().with("multinode", true)));
    assert!(!cond.evaluate(&Facts::new()));
}

#[test]
fn mapping_shorthand_rejects_unusable_entries() {
    for bad in [json!({}), json!({"x": [1]}), json!({"x": 1.5}), json!({"bad key": 1})] {
        let source = ConditionSource::Mapping(bad.as_object().cloned().expect("object"));
        assert!(Condition::compile(&source).is_err(), "expected error for {bad}");
    }
}

#[test]
fn syntax_errors_carry_source_offsets() {
    let err = Condition::parse("cluster:mode == == 'x'").expect_err("must fail");
    assert!(err.start >= 13, "unexpected span {err:?}");
    assert!(!err.message.is_empty());
}

#[test]
fn missing_right_operand_is_reported_after_the_operator() {
    let source = "cluster:mode == ";
    let err = Condition::parse(source).expect_err("must fail");
    assert_eq!(err.start, source.len());
    assert!(err.message.contains("expected a literal after '=='"), "{err}");
    assert!(err.message.contains("end of input"), "{err}");

    let err = Condition::parse("cluster:mode != other_fact").expect_err("must fail");
    assert_eq!(err.start, 16);
    assert!(err.message.contains("expected a literal after '!='"), "{err}");

    let err = Condition::parse("'multinode' == 'ha'").expect_err("must fail");
    assert!(err.message.contains("expected a fact name"), "{err}");
}
