use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::directive::Check;
use crate::error::Error;
use crate::path::Path;
use crate::value::Value;

/// One recorded constraint failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Violation {
    pub location: String,
    pub field: String,
    pub value: serde_json::Value,
    pub check: String,
    pub message: String,
}

/// Result of one top-level validation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub violations: Vec<Violation>,
    pub failed: bool,
}

impl Validation {
    /// Records a failed check at `path`.
    pub fn push(&mut self, path: &Path, field: &str, value: &Value<'_>, check: &Check) {
        let message = render_message(check, field, value);
        self.append(Violation {
            location: path.render(),
            field: field.to_string(),
            value: value.to_json(),
            check: check.name.clone(),
            message,
        });
    }

    /// Records a violation on a top-level field, outside any traversal.
    pub fn add_violation(
        &mut self,
        field: &str,
        value: &Value<'_>,
        check: &str,
        message: Option<&str>,
    ) {
        let check = Check {
            name: check.to_string(),
            parameters: Vec::new(),
            message: message.map(str::to_string),
        };
        self.push(&Path::root().field(field), field, value, &check);
    }

    pub fn is_ok(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Turns a failed result into [`Error::Failed`].
    pub fn ensure(self) -> Result<Validation, Error> {
        if self.failed {
            return Err(Error::Failed(self));
        }
        Ok(self)
    }

    fn append(&mut self, violation: Violation) {
        self.violations.push(violation);
        self.failed = !self.violations.is_empty();
    }
}

impl fmt::Display for Validation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return Ok(());
        }
        f.write_str("Failed validation for ")?;
        for (idx, violation) in self.violations.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}({})", violation.location, violation.check)?;
        }
        Ok(())
    }
}

fn render_message(check: &Check, field: &str, value: &Value<'_>) -> String {
    match &check.message {
        Some(template) => template
            .replace("$value", &value.to_string())
            .replace("$field", field),
        None => format!("check '{}' failed on field {}", check.call(), field),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_message_names_check_and_field() {
        let mut validation = Validation::default();
        let check = Check::new("gtField").with_parameters(["min"]);
        validation.push(&Path::root().field("max"), "max", &Value::Int(4), &check);

        assert!(validation.failed);
        let violation = &validation.violations[0];
        assert_eq!(violation.location, "max");
        assert_eq!(violation.check, "gtField");
        assert_eq!(violation.message, "check 'gtField(min)' failed on field max");
        assert_eq!(violation.value, serde_json::json!(4));
    }

    #[test]
    fn template_substitutes_value_and_field() {
        let mut validation = Validation::default();
        validation.add_violation("email", &Value::Str("x@"), "email", Some("$field: '$value' is invalid"));
        assert_eq!(validation.violations[0].message, "email: 'x@' is invalid");
    }

    #[test]
    fn display_lists_locations_and_checks() {
        let mut validation = Validation::default();
        assert_eq!(validation.to_string(), "");
        validation.add_violation("a", &Value::Nil, "required", None);
        validation.push(
            &Path::root().field("b").element(1),
            "b",
            &Value::Int(1),
            &Check::new("gt").with_parameters(["3"]),
        );
        assert_eq!(validation.to_string(), "Failed validation for a(required),b[1](gt)");
    }

    #[test]
    fn ensure_reports_failures() {
        let passing = Validation::default();
        assert!(passing.clone().ensure().is_ok());

        let mut failing = Validation::default();
        failing.add_violation("a", &Value::Nil, "required", None);
        assert!(failing.failed);
        assert!(matches!(failing.ensure(), Err(Error::Failed(v)) if v.len() == 1));
    }
}
