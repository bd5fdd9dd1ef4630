//! Traversal executor.
//!
//! Applies compiled plans to live values depth first: direct field checks,
//! then (unless shallow) nested records, collections of records and
//! per-element checks of scalar collections.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::cache::SchemaCache;
use crate::compiler::{CompiledCheck, Compiler, SchemaPlan};
use crate::config::ValidatorConfig;
use crate::directive::Check;
use crate::error::{CompileError, ExecutionError, Result};
use crate::path::Path;
use crate::record::{Field, Record};
use crate::registry::Registry;
use crate::session::{Parent, Session};
use crate::value::{Inspect, Value};
use crate::violation::Validation;

/// Options for a single validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Skip presence-tracked fields that were never marked as supplied.
    pub presence: bool,
    /// Check direct fields only, without descending.
    pub shallow: bool,
    /// Starting location; violations are reported relative to it.
    pub path: Option<Path>,
}

impl Default for ValidateOptions {
    fn default() -> Self {
        Self {
            presence: false,
            shallow: false,
            path: None,
        }
    }
}

impl ValidateOptions {
    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self {
            presence: config.track_presence,
            shallow: config.shallow,
            path: None,
        }
    }

    pub fn with_presence(mut self) -> Self {
        self.presence = true;
        self
    }

    pub fn with_shallow(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }

    pub fn with_path(mut self, path: Path) -> Self {
        self.path = Some(path);
        self
    }
}

/// Validation entry point; owns the schema cache.
#[derive(Debug)]
pub struct Validator {
    registry: Arc<Registry>,
    cache: SchemaCache,
    config: ValidatorConfig,
}

impl Validator {
    pub fn new(registry: Arc<Registry>) -> Self {
        Self::with_config(registry, ValidatorConfig::default())
    }

    pub fn with_config(registry: Arc<Registry>, config: ValidatorConfig) -> Self {
        Self {
            registry,
            cache: SchemaCache::new(),
            config,
        }
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn default_options(&self) -> ValidateOptions {
        ValidateOptions::from_config(&self.config)
    }

    /// Returns the cached plan for the record's type, compiling it on first use.
    pub fn plan_for(&self, record: &dyn Record) -> std::result::Result<Arc<SchemaPlan>, CompileError> {
        let compiler = Compiler::new(&self.registry, self.config.separator);
        self.cache.get_or_compile(record, &compiler)
    }

    /// Validates a record, an optional record or a collection of records.
    pub fn validate<T: Inspect + ?Sized>(
        &self,
        value: &T,
        options: &ValidateOptions,
    ) -> Result<Validation> {
        self.validate_value(value.to_value(), options)
    }

    pub fn validate_value(&self, value: Value<'_>, options: &ValidateOptions) -> Result<Validation> {
        let target = match &value {
            Value::Record(record) => record.type_name(),
            other => other.kind_name(),
        };
        let path = options.path.clone().unwrap_or_default();

        let mut traversal = Traversal::new(self, options, path.clone());
        traversal.run(value, path)?;
        let validation = traversal.validation;

        debug!(
            target_type = target,
            violations = validation.violations.len(),
            failed = validation.failed,
            "validation finished"
        );
        Ok(validation)
    }
}

/// Call-local traversal state.
struct Traversal<'v, 'a> {
    validator: &'v Validator,
    options: &'v ValidateOptions,
    session: Session<'a>,
    validation: Validation,
    depth: usize,
}

impl<'v, 'a> Traversal<'v, 'a> {
    fn new(validator: &'v Validator, options: &'v ValidateOptions, path: Path) -> Self {
        Self {
            validator,
            options,
            session: Session::new(path),
            validation: Validation::default(),
            depth: 0,
        }
    }

    fn run(&mut self, value: Value<'a>, path: Path) -> Result<()> {
        match value {
            Value::Nil => Ok(()),
            Value::Record(record) => self.validate_record(record, path),
            Value::List(items) => self.validate_collection(&items, &path),
            other => Err(ExecutionError::UnsupportedValue(format!(
                "expected a record or a collection of records, got {}",
                other.kind_name()
            ))
            .into()),
        }
    }

    fn validate_collection(&mut self, items: &[Value<'a>], path: &Path) -> Result<()> {
        for (index, item) in items.iter().enumerate() {
            match item {
                Value::Nil => continue,
                Value::Record(record) => self.validate_record(*record, path.element(index))?,
                other => {
                    return Err(ExecutionError::UnsupportedValue(format!(
                        "collection element {index} is {}",
                        other.kind_name()
                    ))
                    .into());
                }
            }
        }
        Ok(())
    }

    fn validate_record(&mut self, record: &'a dyn Record, path: Path) -> Result<()> {
        self.depth += 1;
        if let Some(max) = self.validator.config.max_depth
            && self.depth > max
        {
            return Err(ExecutionError::DepthExceeded(max).into());
        }

        let plan = self.validator.plan_for(record)?;
        self.check_fields(record, &plan, &path)?;

        if !self.options.shallow {
            self.dive_records(record, &plan, &path)?;
            self.dive_collections(record, &plan, &path)?;
            self.dive_scalar_collections(record, &plan, &path)?;
        }

        self.depth -= 1;
        Ok(())
    }

    fn check_fields(
        &mut self,
        record: &'a dyn Record,
        plan: &Arc<SchemaPlan>,
        path: &Path,
    ) -> Result<()> {
        let supplied = self.supplied(record, plan);
        for field_plan in &plan.fields {
            let field = &field_plan.field;
            let value = field.value(record);
            if field.tag.omitempty && value.is_empty() {
                continue;
            }
            if is_unset(supplied.as_deref(), field_plan.presence_slot) {
                continue;
            }

            let field_path = extend(path, field);
            let failed = self.evaluate(record, plan, field, &field_path, &field_plan.checks, &value)?;
            if let Some(check) = failed {
                self.record_violation(&field_path, &field.name, &value, check);
            }
        }
        Ok(())
    }

    fn dive_records(
        &mut self,
        record: &'a dyn Record,
        plan: &Arc<SchemaPlan>,
        path: &Path,
    ) -> Result<()> {
        for field in &plan.records {
            let Value::Record(child) = field.value(record) else {
                continue;
            };
            let child_path = extend(path, field);
            let saved = self.enter(record, plan, field, &child_path);
            let outcome = self.validate_record(child, child_path);
            self.session.restore(saved);
            outcome?;
        }
        Ok(())
    }

    fn dive_collections(
        &mut self,
        record: &'a dyn Record,
        plan: &Arc<SchemaPlan>,
        path: &Path,
    ) -> Result<()> {
        for field in &plan.collections {
            let Value::List(items) = field.value(record) else {
                continue;
            };
            let base = extend(path, field);
            let saved = self.enter(record, plan, field, &base);
            let outcome = self.validate_collection(&items, &base);
            self.session.restore(saved);
            outcome?;
        }
        Ok(())
    }

    fn dive_scalar_collections(
        &mut self,
        record: &'a dyn Record,
        plan: &Arc<SchemaPlan>,
        path: &Path,
    ) -> Result<()> {
        let supplied = self.supplied(record, plan);
        for scalars in &plan.scalars {
            if is_unset(supplied.as_deref(), scalars.presence_slot) {
                continue;
            }
            let Value::List(items) = scalars.field.value(record) else {
                continue;
            };
            let base = extend(path, &scalars.field);
            for (index, item) in items.iter().enumerate() {
                if scalars.field.tag.omitempty && item.is_empty() {
                    continue;
                }
                let element_path = base.element(index);
                let failed = self.evaluate(
                    record,
                    plan,
                    &scalars.element,
                    &element_path,
                    &scalars.checks,
                    item,
                )?;
                if let Some(check) = failed {
                    self.record_violation(&element_path, &scalars.field.name, item, check);
                }
            }
        }
        Ok(())
    }

    /// Runs `checks` in declared order and returns the first one that fails.
    fn evaluate<'c>(
        &mut self,
        record: &'a dyn Record,
        plan: &Arc<SchemaPlan>,
        field: &Arc<Field>,
        path: &Path,
        checks: &'c [CompiledCheck],
        value: &Value<'_>,
    ) -> Result<Option<&'c Check>> {
        let saved = self.enter(record, plan, field, path);
        let mut failed = None;
        let mut outcome = Ok(());
        for compiled in checks {
            match (compiled.predicate)(&self.session, value) {
                Ok(true) => {}
                Ok(false) => {
                    failed = Some(&compiled.check);
                    break;
                }
                Err(err) => {
                    outcome = Err(err);
                    break;
                }
            }
        }
        self.session.restore(saved);
        outcome?;
        Ok(failed)
    }

    fn enter(
        &mut self,
        record: &'a dyn Record,
        plan: &Arc<SchemaPlan>,
        field: &Arc<Field>,
        path: &Path,
    ) -> Session<'a> {
        let saved = self.session.snapshot();
        self.session.set(
            path.clone(),
            Some(field.clone()),
            Some(Parent {
                record,
                plan: plan.clone(),
            }),
        );
        saved
    }

    /// Per-slot supplied flags of the record, when presence tracking applies.
    fn supplied(&self, record: &'a dyn Record, plan: &SchemaPlan) -> Option<Vec<bool>> {
        if !self.options.presence {
            return None;
        }
        let presence = plan.presence.as_ref()?;
        match presence.holder.value(record) {
            Value::Marker(marker) => Some(presence.supplied(marker)),
            _ => None,
        }
    }

    fn record_violation(&mut self, path: &Path, field: &str, value: &Value<'_>, check: &Check) {
        trace!(location = %path, check = %check.name, "check failed");
        self.validation.push(path, field, value, check);
    }
}

fn extend(path: &Path, field: &Field) -> Path {
    if field.tag.skip_path {
        path.clone()
    } else {
        path.field(&field.name)
    }
}

fn is_unset(supplied: Option<&[bool]>, slot: Option<usize>) -> bool {
    match (supplied, slot) {
        (Some(supplied), Some(slot)) => !supplied.get(slot).copied().unwrap_or(false),
        _ => false,
    }
}
