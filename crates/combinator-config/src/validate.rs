use std::collections::HashSet;
use std::sync::OnceLock;

use jsonschema::JSONSchema;
use regex::Regex;
use serde_json::Value;

use combinator_core::value::is_numeric_text;
use combinator_core::{RuleKind, RuleSet, RuleSpec};

use crate::CONFIG_VERSION;
use crate::errors::{ConfigError, ValidationIssue, ValidationReport};
use crate::model::{MethodDocument, MethodsDocument};
use crate::registry::MethodRegistry;
use crate::schema::methods_json_schema;

const KNOWN_RULES: &str =
    "required, numeric, integer, decimal, natural, natural_no_zero, min[n], max[n], val[a,b]";

/// Resolved registry with accumulated warnings.
#[derive(Debug, Clone)]
pub struct ValidatedMethods {
    pub registry: MethodRegistry,
    pub warnings: Vec<ValidationIssue>,
}

/// Validate a methods JSON document against the generated JSON Schema.
pub fn validate_methods_json(document: &Value) -> Result<ValidationReport, ConfigError> {
    let schema = serde_json::to_value(methods_json_schema())?;
    let compiled =
        JSONSchema::compile(&schema).map_err(|err| ConfigError::Schema(err.to_string()))?;

    let mut report = ValidationReport::default();

    if let Err(errors) = compiled.validate(document) {
        for error in errors {
            let path = normalized_json_pointer(&error.instance_path.to_string());
            report.push(ValidationIssue::error("schema_violation", path, error.to_string()));
        }
    }

    Ok(report)
}

/// Semantic checks over a parsed methods document.
pub fn validate_methods(document: &MethodsDocument) -> ValidationReport {
    let mut report = ValidationReport::default();

    if document.config_version != CONFIG_VERSION {
        report.push(
            ValidationIssue::error(
                "config_version_mismatch",
                "/config_version",
                format!(
                    "config_version '{}' is not supported (expected '{}')",
                    document.config_version, CONFIG_VERSION
                ),
            )
            .with_hint(format!("set config_version = \"{CONFIG_VERSION}\"")),
        );
    }

    if document.methods.is_empty() {
        report.push(ValidationIssue::warning(
            "methods_empty",
            "/methods",
            "document declares no methods",
        ));
    }

    for (name, method) in &document.methods {
        let base_path = format!("/methods/{name}");
        if name.trim().is_empty() {
            report.push(ValidationIssue::error(
                "method_name_empty",
                base_path.clone(),
                "method name must not be empty",
            ));
        }
        validate_rules(method, &base_path, &mut report);
        validate_defaults(method, &base_path, &mut report);
        validate_templates(method, &base_path, &mut report);
    }

    report
}

/// Validate end-to-end and resolve the registry, returning issues on failure.
pub fn load_methods(document: &Value) -> Result<ValidatedMethods, ValidationReport> {
    let structural = match validate_methods_json(document) {
        Ok(report) => report,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "schema_validation_error",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    if !structural.is_ok() {
        return Err(structural);
    }

    let parsed: MethodsDocument = match serde_json::from_value(document.clone()) {
        Ok(parsed) => parsed,
        Err(err) => {
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error(
                "invalid_methods_json",
                "/",
                err.to_string(),
            ));
            return Err(report);
        }
    };

    let semantic = validate_methods(&parsed);
    if !semantic.is_ok() {
        return Err(semantic);
    }

    let registry = match MethodRegistry::from_document(&parsed) {
        Ok(registry) => registry,
        Err(err) => {
            let path = match &err {
                ConfigError::InvalidTemplate { method, field } => {
                    format!("/methods/{method}/templates/{field}")
                }
                _ => "/methods".to_string(),
            };
            let mut report = ValidationReport::default();
            report.push(ValidationIssue::error("invalid_method", path, err.to_string()));
            return Err(report);
        }
    };

    Ok(ValidatedMethods {
        registry,
        warnings: semantic.warnings,
    })
}

fn validate_rules(method: &MethodDocument, base_path: &str, report: &mut ValidationReport) {
    for (field, source) in &method.rules {
        let path = format!("{base_path}/rules/{field}");
        for rule in source.to_rule_set().iter() {
            if let Some(issue) = rule_issue(rule, &path) {
                report.push(issue);
            }
        }
    }
}

fn rule_issue(rule: &RuleSpec, path: &str) -> Option<ValidationIssue> {
    match (rule.kind(), rule.param()) {
        (RuleKind::Unknown(name), _) => Some(
            ValidationIssue::warning(
                "unknown_rule",
                path,
                format!("rule '{name}' is not recognised and always passes"),
            )
            .with_hint(format!("known rules: {KNOWN_RULES}")),
        ),
        (RuleKind::Min(_) | RuleKind::Max(_), None) => Some(ValidationIssue::warning(
            "rule_param_missing",
            path,
            format!("rule '{rule}' has no bound; 0 is used"),
        )),
        (RuleKind::Min(_) | RuleKind::Max(_), Some(param)) if !is_numeric_text(param) => {
            Some(ValidationIssue::warning(
                "rule_param_not_numeric",
                path,
                format!("bound '{param}' of rule '{}' is not numeric", rule.name()),
            ))
        }
        (RuleKind::Val(_), None) => Some(ValidationIssue::warning(
            "rule_param_missing",
            path,
            "rule 'val' has no allow-list; only the empty string passes",
        )),
        _ => None,
    }
}

fn validate_defaults(method: &MethodDocument, base_path: &str, report: &mut ValidationReport) {
    for (field, value) in &method.defaults {
        let Some(source) = method.rules.get(field) else {
            continue;
        };
        let rules: RuleSet = source.to_rule_set();
        let candidates: Vec<&Value> = match value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        for candidate in candidates {
            if let Err(rule) = rules.check(candidate) {
                report.push(ValidationIssue::warning(
                    "default_fails_rules",
                    format!("{base_path}/defaults/{field}"),
                    format!("default {candidate} fails rule '{rule}'"),
                ));
            }
        }
    }
}

fn validate_templates(method: &MethodDocument, base_path: &str, report: &mut ValidationReport) {
    let outputs: Vec<&str> = method.templates.keys().map(String::as_str).collect();
    let mut produced: HashSet<&str> = HashSet::new();

    for (idx, (field, template)) in method.templates.iter().enumerate() {
        let path = format!("{base_path}/templates/{field}");
        let text = template.as_str().unwrap_or_default();
        if text.is_empty() {
            report.push(ValidationIssue::warning(
                "template_empty",
                path.clone(),
                format!("template for '{field}' is empty"),
            ));
        }

        for name in placeholder_names(text) {
            if produced.contains(name) {
                continue;
            }
            if outputs[idx + 1..].contains(&name) {
                report.push(
                    ValidationIssue::warning(
                        "template_forward_reference",
                        path.clone(),
                        format!(
                            "template '{field}' references '{{{name}}}', which is produced by a later template"
                        ),
                    )
                    .with_hint(format!("declare the '{name}' template before '{field}'")),
                );
            }
        }

        produced.insert(field.as_str());
    }
}

/// Placeholder names (`{name}`) referenced by a template.
pub fn placeholder_names(template: &str) -> Vec<&str> {
    let Some(pattern) = placeholder_pattern() else {
        return Vec::new();
    };
    pattern
        .captures_iter(template)
        .filter_map(|captures| captures.get(1))
        .map(|found| found.as_str())
        .collect()
}

fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\{([^{}]+)\}").ok())
        .as_ref()
}

fn normalized_json_pointer(pointer: &str) -> String {
    if pointer.is_empty() {
        "/".to_string()
    } else {
        pointer.to_string()
    }
}
