use std::collections::BTreeMap;
use std::path::Path;

use serde_json::Value;

use crate::errors::{ConfigError, Result, ValidationIssue};
use crate::model::{MethodSpec, MethodsDocument};
use crate::validate::{ValidatedMethods, load_methods};

const BUILTIN_METHODS: &str = include_str!("../config/builtin_methods.toml");

/// Lookup table from method name to its resolved specification, with the
/// warnings raised while its document was validated.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodRegistry {
    methods: BTreeMap<String, MethodSpec>,
    warnings: Vec<ValidationIssue>,
}

impl MethodRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The `drill` and `pin` methods shipped with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_METHODS)
    }

    /// Resolve an already parsed document without schema or semantic checks.
    pub fn from_document(document: &MethodsDocument) -> Result<Self> {
        let mut registry = Self::new();
        for (name, method) in &document.methods {
            registry.register(name.clone(), MethodSpec::from_document(name, method)?);
        }
        Ok(registry)
    }

    /// Load from a JSON value, running schema and semantic validation.
    /// Warnings stay readable through [`MethodRegistry::warnings`].
    pub fn from_json_value(document: &Value) -> Result<Self> {
        let ValidatedMethods {
            mut registry,
            warnings,
        } = load_methods(document).map_err(ConfigError::Invalid)?;
        registry.warnings = warnings;
        Ok(registry)
    }

    /// Parse and load a JSON methods document.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)?;
        Self::from_json_value(&document)
    }

    /// Parse and load a TOML methods document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let document: Value = toml::from_str(text)?;
        Self::from_json_value(&document)
    }

    /// Load a `.toml` or `.json` methods file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents),
            Some("json") => Self::from_json_str(&contents),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }

    /// Register or replace a method, returning the previous spec.
    pub fn register(&mut self, name: impl Into<String>, spec: MethodSpec) -> Option<MethodSpec> {
        self.methods.insert(name.into(), spec)
    }

    /// Builder form of [`MethodRegistry::register`].
    pub fn with_method(mut self, name: impl Into<String>, spec: MethodSpec) -> Self {
        self.register(name, spec);
        self
    }

    /// Look up a method by name.
    pub fn get(&self, name: &str) -> Option<&MethodSpec> {
        self.methods.get(name)
    }

    /// Returns true when a method with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Registered method names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.methods.keys().map(String::as_str)
    }

    /// Non-blocking issues found when the methods document was loaded, such
    /// as unknown rules or templates that reference later outputs. Empty for
    /// registries built in code or with [`MethodRegistry::from_document`].
    pub fn warnings(&self) -> &[ValidationIssue] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
