use std::sync::Arc;

use crate::compiler::SchemaPlan;
use crate::error::ExecutionError;
use crate::path::Path;
use crate::record::{Field, Record};
use crate::value::Value;

/// Record that owns the field currently being checked.
#[derive(Clone)]
pub struct Parent<'a> {
    pub record: &'a dyn Record,
    pub plan: Arc<SchemaPlan>,
}

/// Per-call traversal context passed to every predicate.
///
/// The executor saves and restores it around each descent; it is never
/// shared between top-level calls.
#[derive(Clone, Default)]
pub struct Session<'a> {
    path: Path,
    field: Option<Arc<Field>>,
    parent: Option<Parent<'a>>,
}

impl<'a> Session<'a> {
    pub fn new(path: Path) -> Self {
        Self {
            path,
            field: None,
            parent: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn field(&self) -> Option<&Field> {
        self.field.as_deref()
    }

    pub fn parent(&self) -> Option<&'a dyn Record> {
        self.parent.as_ref().map(|parent| parent.record)
    }

    pub fn set(&mut self, path: Path, field: Option<Arc<Field>>, parent: Option<Parent<'a>>) {
        self.path = path;
        self.field = field;
        self.parent = parent;
    }

    pub fn snapshot(&self) -> Session<'a> {
        self.clone()
    }

    pub fn restore(&mut self, snapshot: Session<'a>) {
        *self = snapshot;
    }

    /// Reads a sibling of the current field from the parent record.
    pub fn sibling(&self, name: &str) -> Result<Value<'a>, ExecutionError> {
        let parent = self.parent.as_ref().ok_or(ExecutionError::NoParent)?;
        let index = parent
            .plan
            .position(name)
            .ok_or_else(|| ExecutionError::FieldNotFound {
                field: name.to_string(),
                record: parent.plan.name.clone(),
            })?;
        let record: &'a dyn Record = parent.record;
        Ok(record.field_value(index))
    }
}
