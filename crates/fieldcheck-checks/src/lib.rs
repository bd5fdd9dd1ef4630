//! Builtin check library for fieldcheck.
//!
//! Every check is a [`CheckFactory`](fieldcheck_core::CheckFactory): it inspects
//! the field descriptor and directive parameters once at compile time and
//! returns the predicate that runs per value.

pub mod bounds;
pub mod choice;
pub mod cross_field;
pub mod formats;
pub mod required;
pub mod strings;
pub mod temporal;

mod support;

use fieldcheck_core::Registry;
use tracing::debug;

/// Registers every builtin check and alias into `registry`.
pub fn register_builtins(registry: &Registry) {
    registry.register("required", required::required());

    registry.register("gt", bounds::gt());
    registry.register("lt", bounds::lt());
    registry.register("ge", bounds::ge());
    registry.register("le", bounds::le());
    registry.register("min", bounds::min());
    registry.register("max", bounds::max());
    registry.register("between", bounds::between());

    registry.register("choice", choice::choice());

    registry.register("contains", strings::contains());
    registry.register("notContains", strings::not_contains());
    registry.register("startsWith", strings::starts_with());
    registry.register("endsWith", strings::ends_with());

    registry.register("eqField", cross_field::eq_field());
    registry.register("neField", cross_field::ne_field());
    registry.register("gtField", cross_field::gt_field());
    registry.register("ltField", cross_field::lt_field());
    registry.register("requiredIf", cross_field::required_if());
    registry.register("requiredUnless", cross_field::required_unless());
    registry.register("requiredWith", cross_field::required_with());
    registry.register("requiredWithout", cross_field::required_without());

    registry.register("past", temporal::past());
    registry.register("future", temporal::future());

    formats::register(registry);

    registry.register_alias("phone", ["e164", "localPhone"]);
    registry.register_alias("gte", ["ge"]);
    registry.register_alias("lte", ["le"]);

    debug!(checks = registry.names().len(), "builtin checks registered");
}
