use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Options for the generation engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Leave optional fields with no valid candidates out of the matrix
    /// instead of letting them empty the whole product.
    pub drop_empty_optional: bool,
    /// Refuse calls whose product would exceed this many variations.
    pub max_variations: Option<u64>,
}

/// A candidate dropped by validation and the rule that rejected it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    pub value: Value,
    pub rule: String,
}

/// Validation summary for one field of a generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    pub field: String,
    pub required: bool,
    /// The value came from the method defaults.
    pub defaulted: bool,
    pub candidates: usize,
    pub accepted: usize,
    pub rejections: Vec<Rejection>,
}

impl FieldReport {
    pub fn new(field: impl Into<String>, required: bool, defaulted: bool) -> Self {
        Self {
            field: field.into(),
            required,
            defaulted,
            candidates: 0,
            accepted: 0,
            rejections: Vec::new(),
        }
    }
}

/// Structured generation issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationIssue {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl GenerationIssue {
    pub fn new(code: &str, message: String, field: Option<&str>) -> Self {
        Self {
            code: code.to_string(),
            message,
            field: field.map(str::to_string),
        }
    }
}

/// Report for a single generation call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub method: String,
    pub groups: Vec<String>,
    pub fields: Vec<FieldReport>,
    pub variations: u64,
    pub duration_ms: u64,
    pub warnings_by_code: BTreeMap<String, u64>,
    pub warnings: Vec<GenerationIssue>,
}

impl GenerationReport {
    pub fn new(run_id: String, method: &str, groups: Vec<String>) -> Self {
        Self {
            run_id,
            method: method.to_string(),
            groups,
            fields: Vec::new(),
            variations: 0,
            duration_ms: 0,
            warnings_by_code: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldReport> {
        self.fields.iter().find(|report| report.field == name)
    }

    pub fn record_field(&mut self, report: FieldReport) {
        self.fields.push(report);
    }

    pub fn record_warning(&mut self, issue: GenerationIssue) {
        *self.warnings_by_code.entry(issue.code.clone()).or_insert(0) += 1;
        self.warnings.push(issue);
    }
}
