use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::violation::Validation;

/// Emit the JSON Schema of a serialized validation result.
pub fn validation_json_schema() -> RootSchema {
    schema_for!(Validation)
}
