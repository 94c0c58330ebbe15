//! Tests for the expression parser.

use std::time::Duration;

use super::*;

fn parse(input: &str) -> Expr {
    parse_expr(input).unwrap_or_else(|e| panic!("failed to parse {:?}: {}", input, e))
}

fn parse_err(input: &str) -> ParseError {
    match parse_expr(input) {
        Ok(expr) => panic!("expected {:?} to fail, got {}", input, expr),
        Err(e) => e,
    }
}

fn selector(name: &str) -> Expr {
    Expr::VectorSelector(VectorSelector {
        name: Some(name.to_string()),
        matchers: Vec::new(),
        offset: None,
    })
}

#[test]
fn parse_selector_with_matchers() {
    let expr = parse(r#"http_requests_total{job="api", code=~"5..", env!="dev"}"#);
    let Expr::VectorSelector(sel) = expr else {
        panic!("expected vector selector");
    };
    assert_eq!(sel.name.as_deref(), Some("http_requests_total"));
    assert_eq!(sel.matchers.len(), 3);
    assert_eq!(sel.matchers[1].op, MatchOp::RegexMatch);
    assert_eq!(sel.matchers[1].value, "5..");
    assert_eq!(sel.matchers[2].op, MatchOp::NotEqual);
}

#[test]
fn parse_range_and_offset() {
    let expr = parse("node_cpu_seconds_total[5m] offset 1h");
    let Expr::MatrixSelector(m) = &expr else {
        panic!("expected matrix selector");
    };
    assert_eq!(m.range, Duration::from_secs(300));
    assert_eq!(m.selector.offset, Some(Duration::from_secs(3_600)));
    assert_eq!(expr.value_type(), ValueType::Matrix);
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let expr = parse("a + b * c");
    let Expr::Binary(bin) = expr else {
        panic!("expected binary expression");
    };
    assert_eq!(bin.op, BinaryOp::Add);
    assert_eq!(*bin.lhs, selector("a"));
    assert!(matches!(*bin.rhs, Expr::Binary(ref inner) if inner.op == BinaryOp::Mul));
}

#[test]
fn subtraction_is_left_associative() {
    let Expr::Binary(bin) = parse("a - b - c") else {
        panic!("expected binary expression");
    };
    assert!(matches!(*bin.lhs, Expr::Binary(ref inner) if inner.op == BinaryOp::Sub));
    assert_eq!(*bin.rhs, selector("c"));
}

#[test]
fn power_is_right_associative() {
    let Expr::Binary(bin) = parse("2 ^ 3 ^ 2") else {
        panic!("expected binary expression");
    };
    assert_eq!(*bin.lhs, Expr::Number(2.0));
    assert!(matches!(*bin.rhs, Expr::Binary(ref inner) if inner.op == BinaryOp::Pow));
}

#[test]
fn unary_minus_binds_looser_than_power() {
    let expr = parse("-a ^ 2");
    let Expr::Neg(inner) = expr else {
        panic!("expected negation");
    };
    assert!(matches!(*inner, Expr::Binary(ref b) if b.op == BinaryOp::Pow));
}

#[test]
fn negative_literals_are_folded() {
    assert_eq!(parse("-5"), Expr::Number(-5.0));
    assert_eq!(parse("+5"), Expr::Number(5.0));
}

#[test]
fn set_operators_have_lowest_precedence() {
    let Expr::Binary(bin) = parse("a > 1 and b or c") else {
        panic!("expected binary expression");
    };
    assert_eq!(bin.op, BinaryOp::Or);
    let Expr::Binary(lhs) = *bin.lhs else {
        panic!("expected binary lhs");
    };
    assert_eq!(lhs.op, BinaryOp::And);
}

#[test]
fn keywords_are_case_insensitive() {
    let upper = parse("SUM(x) BY (job) AND ON(job) y");
    let lower = parse("sum(x) by (job) and on(job) y");
    assert_eq!(upper, lower);
}

#[test]
fn aggregation_grouping_before_or_after() {
    let before = parse("sum by (job) (rate(x[5m]))");
    let after = parse("sum(rate(x[5m])) by (job)");
    assert_eq!(before, after);
    assert_eq!(after.to_string(), "sum by (job) (rate(x[5m]))");
}

#[test]
fn aggregation_parameters() {
    let Expr::Aggregate(agg) = parse("topk(5, http_requests_total) without (instance)") else {
        panic!("expected aggregation");
    };
    assert_eq!(agg.op, AggregateOp::Topk);
    assert_eq!(agg.param.as_deref(), Some(&Expr::Number(5.0)));
    assert!(agg.without);
    assert_eq!(agg.grouping, vec!["instance".to_string()]);

    let err = parse_err("topk(x)");
    assert!(err.message.contains("expected 2, got 1"), "{}", err);

    let err = parse_err("count_values(5, x)");
    assert!(err.message.contains("expected type string in aggregation parameter"), "{}", err);
}

#[test]
fn aggregation_requires_instant_vector() {
    let err = parse_err("sum(x[5m])");
    assert_eq!(
        err.message,
        "expected type instant vector in aggregation expression, got range vector"
    );
}

#[test]
fn function_argument_types_are_checked() {
    let err = parse_err("rate(x)");
    assert_eq!(
        err.message,
        "expected type range vector in call to function \"rate\", got instant vector"
    );

    let err = parse_err("rate(x[5m], y[5m])");
    assert!(err.message.contains("expected 1 argument(s)"), "{}", err);

    assert_eq!(parse("time()").value_type(), ValueType::Scalar);
    assert_eq!(
        parse(r#"label_replace(up, "dst", "$1", "src", "(.*)")"#).value_type(),
        ValueType::Vector
    );
}

#[test]
fn unknown_function() {
    let err = parse_err("no_such_fn(x)");
    assert_eq!(err.message, "unknown function with name \"no_such_fn\"");
    assert_eq!(err.position.column, 1);
}

#[test]
fn scalar_comparison_requires_bool() {
    let err = parse_err("1 > 2");
    assert_eq!(err.message, "comparisons between scalars must use BOOL modifier");
    assert_eq!(parse("1 > bool 2").value_type(), ValueType::Scalar);
}

#[test]
fn bool_only_on_comparisons() {
    let err = parse_err("a + bool b");
    assert_eq!(err.message, "bool modifier can only be used on comparison operators");
}

#[test]
fn set_operator_rejects_scalars() {
    let err = parse_err("a and 1");
    assert_eq!(err.message, "set operator \"and\" not allowed in binary scalar expression");
}

#[test]
fn vector_matching_clauses() {
    let expr = parse("a * on(instance) group_left(job) b");
    let Expr::Binary(bin) = &expr else {
        panic!("expected binary expression");
    };
    let matching = bin.matching.as_ref().unwrap();
    assert!(matching.on);
    assert_eq!(matching.cardinality, Cardinality::ManyToOne);
    assert_eq!(matching.labels, vec!["instance".to_string()]);
    assert_eq!(matching.include, vec!["job".to_string()]);
    assert_eq!(expr.to_string(), "a * on(instance) group_left(job) b");

    let err = parse_err("a and on(x) group_left b");
    assert_eq!(err.message, "no grouping allowed for \"and\" operation");

    let err = parse_err("a * on(job) group_left(job) b");
    assert!(err.message.contains("must not occur in ON and GROUP clause"), "{}", err);

    let err = parse_err("a * group_left b");
    assert!(err.message.contains("on() or ignoring()"), "{}", err);
}

#[test]
fn selector_needs_non_empty_matcher() {
    assert!(parse_err("{}").message.contains("at least one non-empty matcher"));
    assert!(parse_err(r#"{job=""}"#).message.contains("at least one non-empty matcher"));
    assert!(parse_err(r#"{job=~".*"}"#).message.contains("at least one non-empty matcher"));
    parse(r#"{job="api"}"#);
    parse(r#"{__name__=~"http_.*"}"#);
}

#[test]
fn metric_name_set_twice() {
    let err = parse_err(r#"up{__name__="down"}"#);
    assert!(err.message.contains("metric name must not be set twice"), "{}", err);
}

#[test]
fn invalid_regex_is_rejected() {
    let err = parse_err(r#"up{job=~"("}"#);
    assert!(err.message.contains("invalid regular expression"), "{}", err);
    assert_eq!(err.position.column, 9);
}

#[test]
fn ranges_only_on_selectors() {
    let err = parse_err("rate(x[5m])[5m]");
    assert_eq!(err.message, "ranges only allowed for vector selectors");

    let err = parse_err("sum(x) offset 5m");
    assert_eq!(
        err.message,
        "offset modifier must be preceded by an instant or range selector"
    );
}

#[test]
fn unclosed_parenthesis() {
    let err = parse_err("(up");
    assert_eq!(err.message, "unclosed left parenthesis");
    assert_eq!(err.position.column, 1);
}

#[test]
fn trailing_garbage_is_rejected() {
    let err = parse_err("up down");
    assert_eq!(err.message, "unexpected identifier \"down\" in expression");
    assert_eq!(err.position.column, 4);
}

#[test]
fn empty_input() {
    assert_eq!(parse_err("  ").message, "no expression found in input");
}

#[test]
fn keywords_cannot_be_metric_names() {
    let err = parse_err("offset");
    assert!(err.message.contains("unexpected identifier \"offset\""), "{}", err);
}

#[test]
fn error_position_spans_lines() {
    let err = parse_err("sum(\n  rate(x)\n)");
    assert_eq!(err.position.line, 2);
    assert_eq!(err.position.column, 3);
    assert!(err.to_string().starts_with("parse error at line 2, char 3:"));
}

#[test]
fn legacy_constructs_are_dialect_scoped() {
    let legacy = parse_expr_with("sum(x) by (job) keep_common", Dialect::Legacy).unwrap();
    let Expr::Aggregate(agg) = &legacy else {
        panic!("expected aggregation");
    };
    assert!(agg.keep_common);
    assert_eq!(legacy.to_string(), "sum by (job) keep_common (x)");

    assert!(parse_expr("sum(x) by (job) keep_common").is_err());
    assert!(parse_expr(&legacy.to_string()).is_err());

    assert!(parse_expr_with("count_scalar(x)", Dialect::Legacy).is_ok());
    let err = parse_err("count_scalar(x)");
    assert_eq!(err.message, "unknown function with name \"count_scalar\"");
}

#[test]
fn canonical_text_parses_back_to_the_same_tree() {
    let inputs = [
        concat!(
            r#"sum(rate(http_requests_total{code=~"5..",job="api"}[5m])) by (job)"#,
            " / ignoring(code) sum(rate(http_requests_total[5m])) by (job) > 0.05",
        ),
        "histogram_quantile(0.99, sum by (le) (rate(latency_bucket[10m])))",
        "-(a + b) * 2 ^ -1",
        r#"absent(up{job="node"} offset 5m) or vector(1)"#,
        "count_values(\"version\", build_info) unless on() x",
        "1 - avg without (cpu) (irate(node_cpu_seconds_total{mode=\"idle\"}[1m30s]))",
        "quantile_over_time(0.5, x[1d]) == bool Inf",
        r#"label_join(up, "dst", "-", "a", "b", "c")"#,
    ];
    for input in inputs {
        let first = parse(input);
        let text = first.to_string();
        let second = parse(&text);
        assert_eq!(first, second, "round trip of {:?} via {:?}", input, text);
    }
}
