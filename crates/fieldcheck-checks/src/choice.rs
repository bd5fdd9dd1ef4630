use std::collections::HashSet;

use fieldcheck_core::{CheckFactory, Kind, Value, factory, predicate};

use crate::support::{expect_some_params, invalid, unsupported};

/// `choice(a,b,...)`: the value must be one of the listed options.
pub fn choice() -> CheckFactory {
    factory(|field, check| {
        expect_some_params(check)?;
        match field.kind() {
            Kind::String => {
                let options: HashSet<String> = check.parameters.iter().cloned().collect();
                Ok(predicate(move |_, value| {
                    Ok(value.as_str().is_some_and(|text| options.contains(text)))
                }))
            }
            Kind::Int | Kind::Uint => {
                let mut options = HashSet::with_capacity(check.parameters.len());
                for raw in &check.parameters {
                    let option: i128 = raw.parse().map_err(|_| {
                        invalid(check, format!("choice option expects an integer, but had: {raw}"))
                    })?;
                    options.insert(option);
                }
                Ok(predicate(move |_, value| {
                    let key = match value {
                        Value::Int(number) => i128::from(*number),
                        Value::Uint(number) => i128::from(*number),
                        _ => return Ok(false),
                    };
                    Ok(options.contains(&key))
                }))
            }
            _ => Err(unsupported(field, check, "string or integer field required")),
        }
    })
}
