use fieldcheck_core::{CheckFactory, Kind, factory, predicate};

use crate::support::unsupported;

/// `required`: optional fields must be set, other fields must be non-zero.
pub fn required() -> CheckFactory {
    factory(|field, check| {
        if matches!(field.kind(), Kind::Marker | Kind::Other) {
            return Err(unsupported(field, check, "required has no zero value for this kind"));
        }
        if field.is_optional() {
            return Ok(predicate(|_, value| Ok(!value.is_nil())));
        }
        Ok(predicate(|_, value| Ok(!value.is_zero())))
    })
}

#[cfg(test)]
mod tests {
    use fieldcheck_core::{Session, Shape, Value};

    use super::*;
    use crate::support::testing::{build, eval, field};

    #[test]
    fn plain_fields_must_be_non_zero() {
        assert!(!eval(required(), Kind::String, "required", Value::Str("")));
        assert!(eval(required(), Kind::String, "required", Value::Str("x")));
        assert!(!eval(required(), Kind::Int, "required", Value::Int(0)));
        assert!(eval(required(), Kind::Int, "required", Value::Int(-2)));
        assert!(!eval(required(), Kind::Bool, "required", Value::Bool(false)));
        assert!(!eval(
            required(),
            Kind::List(Box::new(Kind::Int)),
            "required",
            Value::List(Vec::new())
        ));
    }

    #[test]
    fn optional_fields_only_need_to_be_set() {
        let field = field(Shape::new(Kind::Int).optional());
        let check = fieldcheck_core::Check::new("required");
        let predicate = required()(&field, &check).expect("supported");
        let session = Session::default();
        assert!(!predicate(&session, &Value::Nil).expect("runs"));
        assert!(predicate(&session, &Value::Int(0)).expect("runs"));
    }

    #[test]
    fn markers_are_rejected() {
        assert!(build(required(), Kind::Marker, "required").is_err());
    }
}
