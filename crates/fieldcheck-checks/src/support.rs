use std::str::FromStr;

use fieldcheck_core::{Check, CompileError, Field, Kind};

pub(crate) fn unsupported(field: &Field, check: &Check, reason: impl Into<String>) -> CompileError {
    CompileError::Unsupported {
        check: check.name.clone(),
        field: field.name.clone(),
        kind: field.kind().to_string(),
        reason: reason.into(),
    }
}

pub(crate) fn invalid(check: &Check, reason: impl Into<String>) -> CompileError {
    CompileError::InvalidParameters {
        check: check.name.clone(),
        reason: reason.into(),
    }
}

pub(crate) fn expect_params(check: &Check, count: usize) -> Result<(), CompileError> {
    if check.parameters.len() != count {
        return Err(invalid(
            check,
            format!(
                "expects {count} parameter(s), but had: {}",
                check.parameters.len()
            ),
        ));
    }
    Ok(())
}

pub(crate) fn expect_some_params(check: &Check) -> Result<(), CompileError> {
    if check.parameters.is_empty() {
        return Err(invalid(check, "expects at least 1 parameter"));
    }
    Ok(())
}

pub(crate) fn parse_param<T: FromStr>(check: &Check, index: usize) -> Result<T, CompileError> {
    let raw = check
        .parameters
        .get(index)
        .ok_or_else(|| invalid(check, format!("missing parameter {index}")))?;
    raw.parse()
        .map_err(|_| invalid(check, format!("invalid parameter: {raw}")))
}

pub(crate) fn require_text(field: &Field, check: &Check) -> Result<(), CompileError> {
    match field.kind() {
        Kind::String => Ok(()),
        _ => Err(unsupported(field, check, "string field required")),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use fieldcheck_core::{
        Check, CheckFactory, CompileError, Field, FieldSpec, Kind, Predicate, Separator, Session,
        Shape, Value,
    };

    pub(crate) fn field(shape: Shape) -> Field {
        let spec = FieldSpec {
            name: "value".to_string(),
            directive: String::new(),
            shape,
        };
        Field::from_spec("Test", 0, &spec, Separator::Comma)
    }

    pub(crate) fn build(factory: CheckFactory, kind: Kind, check: &str) -> Result<Predicate, CompileError> {
        let check = fieldcheck_core::Tag::parse(check)
            .checks
            .into_iter()
            .next()
            .unwrap_or_else(|| Check::new(check));
        factory(&field(Shape::new(kind)), &check)
    }

    /// Builds the predicate for `kind` and evaluates it outside any record.
    pub(crate) fn eval(factory: CheckFactory, kind: Kind, check: &str, value: Value<'_>) -> bool {
        let predicate = build(factory, kind, check).expect("factory accepts kind");
        predicate(&Session::default(), &value).expect("predicate runs")
    }
}
