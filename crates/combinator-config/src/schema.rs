use schemars::schema::RootSchema;
use schemars::schema_for;

use crate::model::MethodsDocument;

/// Emit the JSON Schema for a methods document.
pub fn methods_json_schema() -> RootSchema {
    schema_for!(MethodsDocument)
}
