use std::any::TypeId;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::directive::{Separator, Tag};
use crate::value::{Inspect, Kind, Shape, Value};

/// A record type whose fields can be validated.
///
/// Implementations declare their fields once in [`Record::schema`] and read
/// them back by declaration index in [`Record::field_value`].
pub trait Record: 'static {
    fn schema(&self) -> RecordSchema;

    fn field_value(&self, index: usize) -> Value<'_>;

    /// Canonical cache key of the record type.
    fn record_type(&self) -> TypeId {
        TypeId::of::<Self>()
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Declared field of a record schema, before compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: String,
    pub directive: String,
    pub shape: Shape,
}

/// Ordered field declarations of a record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSchema {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl RecordSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Declares the next field; its index is its position in declaration order.
    pub fn field<T: Inspect>(mut self, name: impl Into<String>, directive: impl Into<String>) -> Self {
        self.fields.push(FieldSpec {
            name: name.into(),
            directive: directive.into(),
            shape: T::shape(),
        });
        self
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// Compiled field descriptor handed to check factories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub index: usize,
    pub owner: String,
    pub shape: Shape,
    pub tag: Tag,
}

impl Field {
    pub fn from_spec(owner: &str, index: usize, spec: &FieldSpec, separator: Separator) -> Self {
        Self {
            name: spec.name.clone(),
            index,
            owner: owner.to_string(),
            shape: spec.shape.clone(),
            tag: Tag::parse_with(&spec.directive, separator),
        }
    }

    pub fn kind(&self) -> &Kind {
        &self.shape.kind
    }

    pub fn is_optional(&self) -> bool {
        self.shape.optional
    }

    pub fn element_kind(&self) -> Option<&Kind> {
        self.shape.kind.element()
    }

    pub fn value<'a>(&self, record: &'a dyn Record) -> Value<'a> {
        record.field_value(self.index)
    }

    /// Descriptor for a single element of a collection field.
    pub fn element(&self) -> Field {
        let kind = self.element_kind().cloned().unwrap_or(Kind::Other);
        Field {
            name: self.name.clone(),
            index: self.index,
            owner: self.owner.clone(),
            shape: Shape::new(kind),
            tag: self.tag.clone(),
        }
    }
}

/// Side-channel recording which fields of a record were explicitly supplied.
///
/// Fields opt into tracking with the `presence` directive keyword. Callers (a
/// decoder, a builder) mark a field when they set it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresenceMarker {
    marked: BTreeSet<String>,
}

impl PresenceMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, field: impl Into<String>) {
        self.marked.insert(field.into());
    }

    pub fn unmark(&mut self, field: &str) {
        self.marked.remove(field);
    }

    pub fn is_marked(&self, field: &str) -> bool {
        self.marked.contains(field)
    }

    pub fn marked(&self) -> impl Iterator<Item = &str> {
        self.marked.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PresenceMarker {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            marked: iter.into_iter().map(Into::into).collect(),
        }
    }
}
