//! Numeric and length bounds: `gt`, `lt`, `ge`, `le`, `min`, `max`, `between`.
//!
//! Numbers compare by value, text by character count, lists by length.

use std::cmp::Ordering;

use fieldcheck_core::{Check, CheckFactory, CompileError, Field, Kind, Value, factory, predicate};

use crate::support::{expect_params, invalid, parse_param, unsupported};

#[derive(Debug, Clone, Copy)]
enum Bound {
    Gt,
    Lt,
    Ge,
    Le,
}

impl Bound {
    fn holds(self, ordering: Ordering) -> bool {
        match self {
            Bound::Gt => ordering == Ordering::Greater,
            Bound::Lt => ordering == Ordering::Less,
            Bound::Ge => ordering != Ordering::Less,
            Bound::Le => ordering != Ordering::Greater,
        }
    }
}

/// Directive limit. Integer literals stay exact so 64-bit values compare
/// without rounding.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Limit {
    Int(i128),
    Float(f64),
}

impl Limit {
    fn parse(check: &Check, index: usize) -> Result<Self, CompileError> {
        match parse_param::<i128>(check, index) {
            Ok(limit) => Ok(Limit::Int(limit)),
            Err(_) => parse_param::<f64>(check, index).map(Limit::Float),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Limit::Int(limit) => limit as f64,
            Limit::Float(limit) => limit,
        }
    }

    fn exceeds(self, other: Limit) -> bool {
        match (self, other) {
            (Limit::Int(left), Limit::Int(right)) => left > right,
            _ => self.as_f64() > other.as_f64(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Measure {
    Number,
    Length,
}

impl Measure {
    /// Picks the measure for the field kind and normalises the limits to it.
    fn for_field(field: &Field, check: &Check, limits: &mut [Limit]) -> Result<Self, CompileError> {
        match field.kind() {
            kind if kind.is_numeric() => Ok(Measure::Number),
            Kind::String | Kind::List(_) => {
                for limit in limits.iter_mut() {
                    if let Limit::Float(value) = *limit {
                        if value.fract() != 0.0 {
                            return Err(invalid(
                                check,
                                format!("length bound expects an integer, but had: {value}"),
                            ));
                        }
                        *limit = Limit::Int(value as i128);
                    }
                }
                Ok(Measure::Length)
            }
            _ => Err(unsupported(field, check, "numeric, string or list field required")),
        }
    }

    fn compare(self, value: &Value<'_>, limit: Limit) -> Option<Ordering> {
        match self {
            Measure::Length => {
                let len = i128::try_from(value.len()?).ok()?;
                len.partial_cmp(&match limit {
                    Limit::Int(limit) => limit,
                    Limit::Float(limit) => limit as i128,
                })
            }
            Measure::Number => match (value.as_i128(), limit) {
                (Some(actual), Limit::Int(limit)) => Some(actual.cmp(&limit)),
                _ => value.as_f64()?.partial_cmp(&limit.as_f64()),
            },
        }
    }
}

fn single(bound: Bound) -> CheckFactory {
    factory(move |field, check| {
        expect_params(check, 1)?;
        let mut limits = [Limit::parse(check, 0)?];
        let measure = Measure::for_field(field, check, &mut limits)?;
        let [limit] = limits;
        Ok(predicate(move |_, value| {
            Ok(measure
                .compare(value, limit)
                .is_some_and(|ordering| bound.holds(ordering)))
        }))
    })
}

pub fn gt() -> CheckFactory {
    single(Bound::Gt)
}

pub fn lt() -> CheckFactory {
    single(Bound::Lt)
}

pub fn ge() -> CheckFactory {
    single(Bound::Ge)
}

pub fn le() -> CheckFactory {
    single(Bound::Le)
}

/// Inclusive lower bound.
pub fn min() -> CheckFactory {
    single(Bound::Ge)
}

/// Inclusive upper bound.
pub fn max() -> CheckFactory {
    single(Bound::Le)
}

/// `between(low, high)`, inclusive on both ends.
pub fn between() -> CheckFactory {
    factory(|field, check| {
        expect_params(check, 2)?;
        let mut limits = [Limit::parse(check, 0)?, Limit::parse(check, 1)?];
        if limits[0].exceeds(limits[1]) {
            return Err(invalid(
                check,
                format!(
                    "lower bound {} exceeds upper bound {}",
                    check.parameters[0], check.parameters[1]
                ),
            ));
        }
        let measure = Measure::for_field(field, check, &mut limits)?;
        let [low, high] = limits;
        Ok(predicate(move |_, value| {
            let above = measure.compare(value, low).is_some_and(|o| Bound::Ge.holds(o));
            let below = measure.compare(value, high).is_some_and(|o| Bound::Le.holds(o));
            Ok(above && below)
        }))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::support::testing::{build, eval};

    #[test]
    fn numbers_compare_by_value() {
        assert!(eval(gt(), Kind::Int, "gt(3)", Value::Int(4)));
        assert!(!eval(gt(), Kind::Int, "gt(3)", Value::Int(3)));
        assert!(eval(ge(), Kind::Uint, "ge(3)", Value::Uint(3)));
        assert!(eval(lt(), Kind::Float, "lt(1)", Value::Float(0.5)));
        assert!(!eval(le(), Kind::Float, "le(1)", Value::Float(1.5)));
    }

    #[test]
    fn text_compares_by_character_count() {
        assert!(eval(gt(), Kind::String, "gt(2)", Value::Str("abc")));
        assert!(!eval(gt(), Kind::String, "gt(3)", Value::Str("héé")));
        assert!(eval(max(), Kind::String, "max(3)", Value::Str("héé")));
    }

    #[test]
    fn lists_compare_by_length() {
        let list = Kind::List(Box::new(Kind::Record));
        assert!(eval(min(), list.clone(), "min(1)", Value::List(vec![Value::Nil])));
        assert!(!eval(min(), list, "min(1)", Value::List(Vec::new())));
    }

    #[test]
    fn large_integers_compare_exactly() {
        let limit = "gt(9007199254740992)";
        assert!(eval(gt(), Kind::Uint, limit, Value::Uint(9_007_199_254_740_993)));
        assert!(!eval(gt(), Kind::Uint, limit, Value::Uint(9_007_199_254_740_992)));
        assert!(eval(
            le(),
            Kind::Int,
            "le(-9007199254740993)",
            Value::Int(-9_007_199_254_740_993)
        ));
        assert!(!eval(
            between(),
            Kind::Uint,
            "between(9007199254740993,9007199254740995)",
            Value::Uint(9_007_199_254_740_992)
        ));
    }

    #[test]
    fn fractional_limits_apply_to_integer_fields() {
        assert!(eval(gt(), Kind::Int, "gt(2.5)", Value::Int(3)));
        assert!(!eval(gt(), Kind::Int, "gt(2.5)", Value::Int(2)));
    }

    #[test]
    fn nil_fails_without_error() {
        assert!(!eval(gt(), Kind::Int, "gt(0)", Value::Nil));
    }

    #[test]
    fn between_is_inclusive() {
        assert!(eval(between(), Kind::Int, "between(1,5)", Value::Int(1)));
        assert!(eval(between(), Kind::Int, "between(1,5)", Value::Int(5)));
        assert!(!eval(between(), Kind::Int, "between(1,5)", Value::Int(6)));
    }

    #[test]
    fn rejects_bad_parameters_and_kinds() {
        assert!(matches!(
            build(gt(), Kind::Int, "gt(abc)"),
            Err(CompileError::InvalidParameters { .. })
        ));
        assert!(matches!(
            build(gt(), Kind::Int, "gt"),
            Err(CompileError::InvalidParameters { .. })
        ));
        assert!(matches!(
            build(min(), Kind::String, "min(1.5)"),
            Err(CompileError::InvalidParameters { .. })
        ));
        assert!(matches!(
            build(between(), Kind::Int, "between(5,1)"),
            Err(CompileError::InvalidParameters { .. })
        ));
        assert!(matches!(
            build(gt(), Kind::Bool, "gt(1)"),
            Err(CompileError::Unsupported { .. })
        ));
    }
}
