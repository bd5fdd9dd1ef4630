//! Declarative validation of structured records.
//!
//! Record types declare per-field directive strings such as
//! `"required,gt(0)"`; [`validate`] compiles them once per type against the
//! process-wide check registry and walks values, nested records and
//! collections, reporting every failed check with its location.
//!
//! ```ignore
//! use fieldcheck::{Inspect, Record, RecordSchema, ValidateOptions, Value};
//!
//! struct Account { name: String, age: i64 }
//!
//! impl Record for Account {
//!     fn schema(&self) -> RecordSchema {
//!         RecordSchema::new("Account")
//!             .field::<String>("name", "required")
//!             .field::<i64>("age", "between(18,120)")
//!     }
//!
//!     fn field_value(&self, index: usize) -> Value<'_> {
//!         match index {
//!             0 => self.name.to_value(),
//!             1 => self.age.to_value(),
//!             _ => Value::Nil,
//!         }
//!     }
//! }
//! fieldcheck::inspect_record!(Account);
//!
//! let account = Account { name: String::new(), age: 12 };
//! let validation = fieldcheck::validate(&account, &ValidateOptions::default())?;
//! assert_eq!(validation.to_string(), "Failed validation for name(required),age(between)");
//! ```

use std::sync::{Arc, OnceLock};

use tracing::info;

pub use fieldcheck_checks as checks;
pub use fieldcheck_core::*;

static REGISTRY: OnceLock<Arc<Registry>> = OnceLock::new();
static VALIDATOR: OnceLock<Validator> = OnceLock::new();

/// Process-wide registry, populated with the builtin checks on first use.
pub fn registry() -> &'static Arc<Registry> {
    REGISTRY.get_or_init(|| {
        let registry = Registry::new();
        checks::register_builtins(&registry);
        info!(checks = registry.names().len(), "check registry initialised");
        Arc::new(registry)
    })
}

/// Process-wide validator over [`registry`] with default settings.
pub fn validator() -> &'static Validator {
    VALIDATOR.get_or_init(|| Validator::new(Arc::clone(registry())))
}

/// Builds a standalone validator over the shared registry with its own
/// settings and plan cache.
pub fn validator_with_config(config: ValidatorConfig) -> Validator {
    Validator::with_config(Arc::clone(registry()), config)
}

/// Validates `value` with the process-wide validator.
pub fn validate<T: Inspect + ?Sized>(value: &T, options: &ValidateOptions) -> Result<Validation> {
    validator().validate(value, options)
}

/// Registers a custom check on the shared registry.
///
/// Plans compiled before the registration keep the factories they resolved.
pub fn register(name: &str, factory: CheckFactory) {
    registry().register(name, factory);
}

/// Registers an alias on the shared registry; see [`Registry::register_alias`].
pub fn register_alias<I, S>(name: &str, targets: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    registry().register_alias(name, targets);
}
