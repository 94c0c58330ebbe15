//! Static type checks applied while the tree is built.

use crate::ast::*;

pub(super) fn binary(bin: &BinaryExpr) -> Result<(), String> {
    let lt = bin.lhs.value_type();
    let rt = bin.rhs.value_type();
    let operand_ok = |t: ValueType| matches!(t, ValueType::Scalar | ValueType::Vector);

    if !operand_ok(lt) || !operand_ok(rt) {
        return Err(
            "binary expression must contain only scalar and instant vector types".to_string(),
        );
    }
    if bin.op.is_comparison()
        && !bin.return_bool
        && lt == ValueType::Scalar
        && rt == ValueType::Scalar
    {
        return Err("comparisons between scalars must use BOOL modifier".to_string());
    }
    if bin.op.is_set_operator() && (lt == ValueType::Scalar || rt == ValueType::Scalar) {
        return Err(format!(
            "set operator \"{}\" not allowed in binary scalar expression",
            bin.op.as_str()
        ));
    }
    if bin.matching.is_some() && (lt != ValueType::Vector || rt != ValueType::Vector) {
        return Err("vector matching only allowed between instant vectors".to_string());
    }
    Ok(())
}

pub(super) fn unary(operand: &Expr) -> Result<(), String> {
    match operand.value_type() {
        ValueType::Scalar | ValueType::Vector => Ok(()),
        other => Err(format!(
            "unary expression only allowed on expressions of type scalar or instant vector, got {}",
            other
        )),
    }
}

pub(super) fn call(call: &Call) -> Result<(), String> {
    call.func.check_arity(call.args.len())?;
    for (i, arg) in call.args.iter().enumerate() {
        let Some(expected) = call.func.arg_type(i) else {
            continue;
        };
        let got = arg.value_type();
        if got != expected {
            return Err(format!(
                "expected type {} in call to function \"{}\", got {}",
                expected, call.func.name, got
            ));
        }
    }
    Ok(())
}

pub(super) fn aggregate(agg: &AggregateExpr) -> Result<(), String> {
    match (agg.op.param_type(), &agg.param) {
        (Some(_), None) => {
            return Err(format!(
                "wrong number of arguments for aggregate expression \"{}\" provided, \
                 expected 2, got 1",
                agg.op.as_str()
            ))
        }
        (None, Some(_)) => {
            return Err(format!(
                "wrong number of arguments for aggregate expression \"{}\" provided, \
                 expected 1, got 2",
                agg.op.as_str()
            ))
        }
        (Some(expected), Some(param)) if param.value_type() != expected => {
            return Err(format!(
                "expected type {} in aggregation parameter, got {}",
                expected,
                param.value_type()
            ))
        }
        _ => {}
    }

    let got = agg.expr.value_type();
    if got != ValueType::Vector {
        return Err(format!(
            "expected type instant vector in aggregation expression, got {}",
            got
        ));
    }
    Ok(())
}

pub(super) fn selector(sel: &VectorSelector) -> Result<(), String> {
    if let Some(name) = &sel.name {
        if sel.matchers.iter().any(|m| m.name == "__name__") {
            return Err(format!("metric name must not be set twice: \"{}\"", name));
        }
        return Ok(());
    }
    if sel.matchers.iter().all(LabelMatcher::matches_empty) {
        return Err("vector selector must contain at least one non-empty matcher".to_string());
    }
    Ok(())
}

pub(super) fn matching(matching: &VectorMatching) -> Result<(), String> {
    if !matching.on {
        return Ok(());
    }
    for label in &matching.include {
        if matching.labels.contains(label) {
            return Err(format!(
                "label \"{}\" must not occur in ON and GROUP clause at once",
                label
            ));
        }
    }
    Ok(())
}
