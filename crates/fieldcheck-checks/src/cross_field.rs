//! Checks that compare a field against its siblings through the session.

use std::cmp::Ordering;

use fieldcheck_core::{CheckFactory, ExecutionError, Session, Value, factory, predicate};

use crate::support::{expect_params, expect_some_params};

fn compare_with(test: fn(&Value<'_>, &Value<'_>) -> Result<bool, ExecutionError>) -> CheckFactory {
    factory(move |_, check| {
        expect_params(check, 1)?;
        let other = check.parameters[0].clone();
        Ok(predicate(move |session, value| {
            let sibling = session.sibling(&other)?;
            test(value, &sibling)
        }))
    })
}

pub fn eq_field() -> CheckFactory {
    compare_with(|value, other| Ok(equal_values(value, other)))
}

pub fn ne_field() -> CheckFactory {
    compare_with(|value, other| Ok(!equal_values(value, other)))
}

pub fn gt_field() -> CheckFactory {
    compare_with(|value, other| Ok(compare_values(value, other)? == Ordering::Greater))
}

pub fn lt_field() -> CheckFactory {
    compare_with(|value, other| Ok(compare_values(value, other)? == Ordering::Less))
}

/// `requiredIf(field, value)`: non-empty when the sibling equals `value`.
pub fn required_if() -> CheckFactory {
    conditional_on_value(true)
}

/// `requiredUnless(field, value)`: non-empty unless the sibling equals `value`.
pub fn required_unless() -> CheckFactory {
    conditional_on_value(false)
}

fn conditional_on_value(when_equal: bool) -> CheckFactory {
    factory(move |_, check| {
        expect_params(check, 2)?;
        let other = check.parameters[0].clone();
        let expected = check.parameters[1].clone();
        Ok(predicate(move |session, value| {
            let sibling = session.sibling(&other)?;
            let condition = equals_param(&sibling, &expected) == when_equal;
            Ok(!condition || !value.is_empty())
        }))
    })
}

/// `requiredWith(a, b, ...)`: non-empty when any listed sibling is non-empty.
pub fn required_with() -> CheckFactory {
    conditional_on_presence(false)
}

/// `requiredWithout(a, b, ...)`: non-empty when any listed sibling is empty.
pub fn required_without() -> CheckFactory {
    conditional_on_presence(true)
}

fn conditional_on_presence(when_empty: bool) -> CheckFactory {
    factory(move |_, check| {
        expect_some_params(check)?;
        let others = check.parameters.clone();
        Ok(predicate(move |session, value| {
            let condition = any_sibling(session, &others, |sibling| sibling.is_empty() == when_empty)?;
            Ok(!condition || !value.is_empty())
        }))
    })
}

fn any_sibling(
    session: &Session<'_>,
    names: &[String],
    test: impl Fn(&Value<'_>) -> bool,
) -> Result<bool, ExecutionError> {
    for name in names {
        if test(&session.sibling(name)?) {
            return Ok(true);
        }
    }
    Ok(false)
}

pub(crate) fn equal_values(left: &Value<'_>, right: &Value<'_>) -> bool {
    if left.is_nil() || right.is_nil() {
        return left.is_nil() && right.is_nil();
    }
    if let (Some(l), Some(r)) = (left.as_i128(), right.as_i128()) {
        return l == r;
    }
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l == r;
    }
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => l == r,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Time(l), Value::Time(r)) => l == r,
        _ => left.to_json() == right.to_json(),
    }
}

pub(crate) fn compare_values(left: &Value<'_>, right: &Value<'_>) -> Result<Ordering, ExecutionError> {
    let incomparable = || ExecutionError::Incomparable {
        left: left.kind_name().to_string(),
        right: right.kind_name().to_string(),
    };
    if let (Some(l), Some(r)) = (left.as_i128(), right.as_i128()) {
        return Ok(l.cmp(&r));
    }
    if let (Some(l), Some(r)) = (left.as_f64(), right.as_f64()) {
        return l.partial_cmp(&r).ok_or_else(incomparable);
    }
    match (left, right) {
        (Value::Str(l), Value::Str(r)) => Ok(l.cmp(r)),
        (Value::Time(l), Value::Time(r)) => Ok(l.cmp(r)),
        _ => Err(incomparable()),
    }
}

/// Compares a sibling value with a directive literal.
pub(crate) fn equals_param(value: &Value<'_>, expected: &str) -> bool {
    match value {
        Value::Nil => expected.is_empty() || expected.eq_ignore_ascii_case("nil"),
        Value::Str(text) => *text == expected,
        Value::Bool(flag) => expected.parse::<bool>().is_ok_and(|parsed| parsed == *flag),
        Value::Int(number) => expected.parse::<i64>().is_ok_and(|parsed| parsed == *number),
        Value::Uint(number) => expected.parse::<u64>().is_ok_and(|parsed| parsed == *number),
        Value::Float(number) => expected.parse::<f64>().is_ok_and(|parsed| parsed == *number),
        other => other.to_string() == expected,
    }
}
