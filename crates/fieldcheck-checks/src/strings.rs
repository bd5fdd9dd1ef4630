use fieldcheck_core::{CheckFactory, factory, predicate};

use crate::support::{expect_params, require_text};

fn text_check(test: fn(&str, &str) -> bool) -> CheckFactory {
    factory(move |field, check| {
        require_text(field, check)?;
        expect_params(check, 1)?;
        let argument = check.parameters[0].clone();
        Ok(predicate(move |_, value| {
            Ok(value.as_str().is_some_and(|text| test(text, &argument)))
        }))
    })
}

pub fn contains() -> CheckFactory {
    text_check(|text, argument| text.contains(argument))
}

pub fn not_contains() -> CheckFactory {
    text_check(|text, argument| !text.contains(argument))
}

pub fn starts_with() -> CheckFactory {
    text_check(|text, argument| text.starts_with(argument))
}

pub fn ends_with() -> CheckFactory {
    text_check(|text, argument| text.ends_with(argument))
}

#[cfg(test)]
mod tests {
    use fieldcheck_core::{Kind, Value};

    use super::*;
    use crate::support::testing::{build, eval};

    #[test]
    fn substring_checks() {
        assert!(eval(contains(), Kind::String, "contains(ell)", Value::Str("hello")));
        assert!(!eval(not_contains(), Kind::String, "notContains(ell)", Value::Str("hello")));
        assert!(eval(starts_with(), Kind::String, "startsWith(he)", Value::Str("hello")));
        assert!(eval(ends_with(), Kind::String, "endsWith(lo)", Value::Str("hello")));
        assert!(!eval(ends_with(), Kind::String, "endsWith(lo)", Value::Nil));
    }

    #[test]
    fn non_text_fields_are_rejected() {
        assert!(build(contains(), Kind::Int, "contains(1)").is_err());
    }
}
