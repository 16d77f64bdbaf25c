use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use combinator_core::RuleSet;

use crate::errors::ConfigError;

/// Serialized form of a set of generation methods (`methods.toml`/`.json`).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MethodsDocument {
    /// Contract version for the methods document.
    pub config_version: String,
    /// Methods keyed by name.
    pub methods: BTreeMap<String, MethodDocument>,
}

/// Serialized form of one method.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MethodDocument {
    /// Field name to rules, either `required|integer` or a list of segments.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleSource>,
    /// Values injected when a field is absent from the input.
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, Value>")]
    pub defaults: Map<String, Value>,
    /// Output field to template string, expanded in declaration order.
    #[serde(default)]
    #[schemars(with = "BTreeMap<String, String>")]
    pub templates: Map<String, Value>,
}

/// Rule list as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RuleSource {
    Piped(String),
    Segments(Vec<String>),
}

impl RuleSource {
    pub fn to_rule_set(&self) -> RuleSet {
        match self {
            RuleSource::Piped(text) => RuleSet::parse(text),
            RuleSource::Segments(segments) => RuleSet::from_segments(segments),
        }
    }
}

/// Template producing `field` for every variation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    pub field: String,
    pub template: String,
}

/// Resolved method: parsed rules, defaults and ordered templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodSpec {
    rules: BTreeMap<String, RuleSet>,
    defaults: Map<String, Value>,
    templates: Vec<TemplateSpec>,
}

impl MethodSpec {
    /// Create an empty method: no rules, defaults or templates.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a serialized method, parsing every rule string once.
    pub fn from_document(name: &str, document: &MethodDocument) -> Result<Self, ConfigError> {
        let mut spec = MethodSpec::new();
        for (field, source) in &document.rules {
            spec.rules.insert(field.clone(), source.to_rule_set());
        }
        spec.defaults = document.defaults.clone();
        for (field, template) in &document.templates {
            let template = template
                .as_str()
                .ok_or_else(|| ConfigError::InvalidTemplate {
                    method: name.to_string(),
                    field: field.clone(),
                })?;
            spec = spec.with_template(field.clone(), template);
        }
        Ok(spec)
    }

    /// Parse `rules` (`required|min[1]`) and attach them to `field`,
    /// replacing earlier rules for that field.
    pub fn with_rules(mut self, field: impl Into<String>, rules: &str) -> Self {
        self.rules.insert(field.into(), RuleSet::parse(rules));
        self
    }

    /// Value injected when `field` is absent or null in the input.
    pub fn with_default(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(field.into(), value.into());
        self
    }

    /// Append a template; redeclaring a field replaces its text in place.
    pub fn with_template(mut self, field: impl Into<String>, template: impl Into<String>) -> Self {
        let field = field.into();
        let template = template.into();
        match self.templates.iter_mut().find(|spec| spec.field == field) {
            Some(existing) => existing.template = template,
            None => self.templates.push(TemplateSpec { field, template }),
        }
        self
    }

    /// Rules for `field`; `None` when the field is unruled.
    pub fn rules_for(&self, field: &str) -> Option<&RuleSet> {
        self.rules.get(field)
    }

    /// Default values keyed by field, in declaration order.
    pub fn defaults(&self) -> &Map<String, Value> {
        &self.defaults
    }

    /// Templates in the order they are expanded.
    pub fn templates(&self) -> &[TemplateSpec] {
        &self.templates
    }

    /// Fields whose rule list includes `required`.
    pub fn required_fields(&self) -> impl Iterator<Item = &str> {
        self.rules
            .iter()
            .filter(|(_, rules)| rules.is_required())
            .map(|(field, _)| field.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_rules_accept_piped_and_list_forms() {
        let document: MethodDocument = serde_json::from_value(json!({
            "rules": {
                "code": "required|min[1000]",
                "mode": ["required", "val[on,off]"]
            },
            "defaults": {"mode": "on"},
            "templates": {"label": "{code}", "summary": "{label}/{mode}"}
        }))
        .expect("parse method");

        let spec = MethodSpec::from_document("sample", &document).expect("resolve method");
        assert_eq!(spec.rules_for("code").map(RuleSet::len), Some(2));
        assert_eq!(spec.rules_for("mode").map(RuleSet::len), Some(2));
        assert_eq!(spec.required_fields().collect::<Vec<_>>(), vec!["code", "mode"]);
        let fields: Vec<&str> = spec.templates().iter().map(|t| t.field.as_str()).collect();
        assert_eq!(fields, vec!["label", "summary"]);
    }

    #[test]
    fn non_string_template_is_rejected() {
        let document: MethodDocument = serde_json::from_value(json!({
            "templates": {"label": 3}
        }))
        .expect("parse method");

        let err = MethodSpec::from_document("sample", &document).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTemplate { ref field, .. } if field == "label"));
    }

    #[test]
    fn redeclared_template_keeps_position() {
        let spec = MethodSpec::new()
            .with_template("a", "1")
            .with_template("b", "2")
            .with_template("a", "3");
        assert_eq!(spec.templates()[0].template, "3");
        assert_eq!(spec.templates().len(), 2);
    }
}
