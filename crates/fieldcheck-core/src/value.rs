//! Dynamic view over field values.
//!
//! Rust has no runtime reflection, so every field type implements [`Inspect`]:
//! a static [`Shape`] used by the compiler and a borrowed [`Value`] read by
//! the executor and by check predicates.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};
use serde_json::{Map, Number};

use crate::record::{PresenceMarker, Record};

/// Kind classification of a field, after unwrapping one level of optionality.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    Bool,
    Int,
    Uint,
    Float,
    String,
    Time,
    Record,
    Marker,
    List(Box<Kind>),
    Other,
}

impl Kind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Kind::Int | Kind::Uint | Kind::Float)
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Kind::Record)
    }

    pub fn element(&self) -> Option<&Kind> {
        match self {
            Kind::List(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Bool => f.write_str("bool"),
            Kind::Int => f.write_str("int"),
            Kind::Uint => f.write_str("uint"),
            Kind::Float => f.write_str("float"),
            Kind::String => f.write_str("string"),
            Kind::Time => f.write_str("time"),
            Kind::Record => f.write_str("record"),
            Kind::Marker => f.write_str("presence marker"),
            Kind::List(element) => write!(f, "list<{element}>"),
            Kind::Other => f.write_str("other"),
        }
    }
}

/// Static description of a field type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shape {
    pub kind: Kind,
    pub optional: bool,
}

impl Shape {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Borrowed runtime value of a field.
#[derive(Clone)]
pub enum Value<'a> {
    Nil,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(&'a str),
    Time(DateTime<Utc>),
    Record(&'a dyn Record),
    List(Vec<Value<'a>>),
    Marker(&'a PresenceMarker),
}

impl<'a> Value<'a> {
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Empty in the `omitempty` sense: nil, empty text, empty list or the
    /// zero timestamp. Numbers and booleans are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Nil => true,
            Value::Str(text) => text.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Time(time) => *time == DateTime::<Utc>::default(),
            _ => false,
        }
    }

    /// Zero value of the underlying type, used by `required`.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Bool(flag) => !flag,
            Value::Int(number) => *number == 0,
            Value::Uint(number) => *number == 0,
            Value::Float(number) => *number == 0.0,
            Value::Marker(marker) => marker.is_empty(),
            Value::Record(_) => false,
            other => other.is_empty(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(number) => Some(*number as f64),
            Value::Uint(number) => Some(*number as f64),
            Value::Float(number) => Some(*number),
            _ => None,
        }
    }

    /// Exact integer view; floats and non-numbers yield `None`.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Value::Int(number) => Some(i128::from(*number)),
            Value::Uint(number) => Some(i128::from(*number)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&'a str> {
        match self {
            Value::Str(text) => Some(*text),
            _ => None,
        }
    }

    pub fn as_time(&self) -> Option<DateTime<Utc>> {
        match self {
            Value::Time(time) => Some(*time),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&'a dyn Record> {
        match self {
            Value::Record(record) => Some(*record),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value<'a>]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Character count for text, element count for lists.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Str(text) => Some(text.chars().count()),
            Value::List(items) => Some(items.len()),
            _ => None,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Uint(_) => "uint",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Time(_) => "time",
            Value::Record(_) => "record",
            Value::List(_) => "list",
            Value::Marker(_) => "presence marker",
        }
    }

    /// Dereferenced JSON form, used as the offending value of a violation.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(flag) => serde_json::Value::Bool(*flag),
            Value::Int(number) => serde_json::Value::from(*number),
            Value::Uint(number) => serde_json::Value::from(*number),
            Value::Float(number) => Number::from_f64(*number)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Str(text) => serde_json::Value::String((*text).to_string()),
            Value::Time(time) => {
                serde_json::Value::String(time.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
            Value::Record(record) => {
                let schema = record.schema();
                let mut object = Map::new();
                for (index, field) in schema.fields.iter().enumerate() {
                    let value = record.field_value(index);
                    if matches!(value, Value::Marker(_)) {
                        continue;
                    }
                    object.insert(field.name.clone(), value.to_json());
                }
                serde_json::Value::Object(object)
            }
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Marker(marker) => serde_json::Value::Array(
                marker
                    .marked()
                    .map(|name| serde_json::Value::String(name.to_string()))
                    .collect(),
            ),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("Nil"),
            Value::Bool(flag) => f.debug_tuple("Bool").field(flag).finish(),
            Value::Int(number) => f.debug_tuple("Int").field(number).finish(),
            Value::Uint(number) => f.debug_tuple("Uint").field(number).finish(),
            Value::Float(number) => f.debug_tuple("Float").field(number).finish(),
            Value::Str(text) => f.debug_tuple("Str").field(text).finish(),
            Value::Time(time) => f.debug_tuple("Time").field(time).finish(),
            Value::Record(record) => f.debug_tuple("Record").field(&record.type_name()).finish(),
            Value::List(items) => f.debug_tuple("List").field(items).finish(),
            Value::Marker(marker) => f.debug_tuple("Marker").field(marker).finish(),
        }
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => f.write_str("<nil>"),
            Value::Bool(flag) => write!(f, "{flag}"),
            Value::Int(number) => write!(f, "{number}"),
            Value::Uint(number) => write!(f, "{number}"),
            Value::Float(number) => write!(f, "{number}"),
            Value::Str(text) => f.write_str(text),
            Value::Time(time) => f.write_str(&time.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Value::Record(_) => f.write_str(&self.to_json().to_string()),
            Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Marker(marker) => {
                let names: Vec<&str> = marker.marked().collect();
                write!(f, "{{{}}}", names.join(" "))
            }
        }
    }
}

/// Field-level view used by the schema compiler and executor.
pub trait Inspect {
    fn shape() -> Shape
    where
        Self: Sized;

    fn to_value(&self) -> Value<'_>;
}

macro_rules! inspect_signed {
    ($($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn shape() -> Shape {
                    Shape::new(Kind::Int)
                }

                fn to_value(&self) -> Value<'_> {
                    Value::Int(*self as i64)
                }
            }
        )*
    };
}

macro_rules! inspect_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Inspect for $ty {
                fn shape() -> Shape {
                    Shape::new(Kind::Uint)
                }

                fn to_value(&self) -> Value<'_> {
                    Value::Uint(*self as u64)
                }
            }
        )*
    };
}

inspect_signed!(i8, i16, i32, i64, isize);
inspect_unsigned!(u8, u16, u32, u64, usize);

impl Inspect for f32 {
    fn shape() -> Shape {
        Shape::new(Kind::Float)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Float(f64::from(*self))
    }
}

impl Inspect for f64 {
    fn shape() -> Shape {
        Shape::new(Kind::Float)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl Inspect for bool {
    fn shape() -> Shape {
        Shape::new(Kind::Bool)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl Inspect for String {
    fn shape() -> Shape {
        Shape::new(Kind::String)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Str(self.as_str())
    }
}

impl Inspect for &'static str {
    fn shape() -> Shape {
        Shape::new(Kind::String)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Str(*self)
    }
}

impl Inspect for DateTime<Utc> {
    fn shape() -> Shape {
        Shape::new(Kind::Time)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Time(*self)
    }
}

impl Inspect for NaiveDateTime {
    fn shape() -> Shape {
        Shape::new(Kind::Time)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Time(self.and_utc())
    }
}

impl Inspect for NaiveDate {
    fn shape() -> Shape {
        Shape::new(Kind::Time)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Time(self.and_time(NaiveTime::default()).and_utc())
    }
}

impl Inspect for PresenceMarker {
    fn shape() -> Shape {
        Shape::new(Kind::Marker)
    }

    fn to_value(&self) -> Value<'_> {
        Value::Marker(self)
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn shape() -> Shape {
        T::shape().optional()
    }

    fn to_value(&self) -> Value<'_> {
        match self {
            Some(value) => value.to_value(),
            None => Value::Nil,
        }
    }
}

impl<T: Inspect> Inspect for Box<T> {
    fn shape() -> Shape {
        T::shape()
    }

    fn to_value(&self) -> Value<'_> {
        self.as_ref().to_value()
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn shape() -> Shape {
        Shape::new(Kind::List(Box::new(T::shape().kind)))
    }

    fn to_value(&self) -> Value<'_> {
        Value::List(self.iter().map(Inspect::to_value).collect())
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn shape() -> Shape {
        Shape::new(Kind::List(Box::new(T::shape().kind)))
    }

    fn to_value(&self) -> Value<'_> {
        Value::List(self.iter().map(Inspect::to_value).collect())
    }
}

/// Implements [`Inspect`] for types that already implement
/// [`Record`](crate::Record), so they can be nested inside other records.
#[macro_export]
macro_rules! inspect_record {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Inspect for $ty {
                fn shape() -> $crate::Shape {
                    $crate::Shape::new($crate::Kind::Record)
                }

                fn to_value(&self) -> $crate::Value<'_> {
                    $crate::Value::Record(self)
                }
            }
        )+
    };
}
