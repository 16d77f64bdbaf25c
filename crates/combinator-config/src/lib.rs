//! Method configuration contracts for Combinator.
//!
//! A methods document maps method names to field rules, defaults and
//! templates. Documents are checked against a JSON Schema, then semantically,
//! and resolved into a [`MethodRegistry`].

pub mod errors;
pub mod model;
pub mod registry;
pub mod schema;
pub mod validate;

pub use errors::{ConfigError, IssueSeverity, Result, ValidationIssue, ValidationReport};
pub use model::{MethodDocument, MethodSpec, MethodsDocument, RuleSource, TemplateSpec};
pub use registry::MethodRegistry;
pub use schema::methods_json_schema;
pub use validate::{
    ValidatedMethods, load_methods, placeholder_names, validate_methods, validate_methods_json,
};

/// Current contract version for methods documents.
pub const CONFIG_VERSION: &str = "0.1";
