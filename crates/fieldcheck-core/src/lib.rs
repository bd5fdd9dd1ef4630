//! Core engine of fieldcheck.
//!
//! Parses per-field directives, compiles them into cached per-type plans and
//! walks live values against those plans, collecting violations with stable
//! location paths. Check predicates are supplied through the [`Registry`].

pub mod cache;
pub mod compiler;
pub mod config;
pub mod directive;
pub mod error;
pub mod path;
pub mod record;
pub mod registry;
pub mod schema;
pub mod session;
pub mod validator;
pub mod value;
pub mod violation;

pub use cache::SchemaCache;
pub use compiler::{
    CompiledCheck, Compiler, FieldPlan, PresencePlan, ScalarCollectionPlan, SchemaPlan,
};
pub use config::ValidatorConfig;
pub use directive::{Check, Separator, Tag};
pub use error::{CompileError, ConfigError, Error, ExecutionError, Result};
pub use path::Path;
pub use record::{Field, FieldSpec, PresenceMarker, Record, RecordSchema};
pub use registry::{CheckFactory, Predicate, Registry, factory, predicate};
pub use schema::validation_json_schema;
pub use session::{Parent, Session};
pub use validator::{ValidateOptions, Validator};
pub use value::{Inspect, Kind, Shape, Value};
pub use violation::{Validation, Violation};
