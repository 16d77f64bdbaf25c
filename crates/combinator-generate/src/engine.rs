use std::collections::HashSet;
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use combinator_config::{MethodRegistry, MethodSpec};
use combinator_core::{InputData, RuleSet, Variation};

use crate::cartesian::{ValidationMatrix, cartesian_product};
use crate::errors::GenerationError;
use crate::model::{FieldReport, GenerateOptions, GenerationIssue, GenerationReport, Rejection};
use crate::template::apply_templates;

/// Output of a successful generation call.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub variations: Vec<Variation>,
    pub report: GenerationReport,
}

/// Generates variations for registered methods. Holds no group state.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    registry: MethodRegistry,
    options: GenerateOptions,
}

impl GenerationEngine {
    /// Create an engine over `registry`, logging any warnings raised while
    /// the registry's methods document was loaded.
    pub fn new(registry: MethodRegistry, options: GenerateOptions) -> Self {
        for issue in registry.warnings() {
            warn!(
                code = %issue.code,
                path = %issue.path,
                hint = issue.hint.as_deref().unwrap_or(""),
                "methods config: {}",
                issue.message
            );
        }
        Self { registry, options }
    }

    /// Validate `data` against `method`, build the product and expand
    /// templates. `groups` only feeds the `{activeGroups}` placeholder.
    pub fn generate<S: AsRef<str>>(
        &self,
        method: &str,
        data: &InputData,
        groups: &[S],
    ) -> Result<GenerationResult, GenerationError> {
        let Some(spec) = self.registry.get(method) else {
            debug!(method, "unknown method, nothing generated");
            return Err(GenerationError::UnknownMethod(method.to_string()));
        };

        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let groups: Vec<String> = groups.iter().map(|g| g.as_ref().to_string()).collect();
        let mut report = GenerationReport::new(run_id.clone(), method, groups.clone());

        info!(
            run_id = %run_id,
            method,
            fields = data.len(),
            groups = groups.len(),
            "generation started"
        );

        let (input, defaulted) = apply_defaults(spec, data);

        if let Some(field) = spec
            .required_fields()
            .find(|field| !input.contains_key(*field))
        {
            report.record_field(FieldReport::new(field, true, false));
            record_warning(
                &mut report,
                GenerationIssue::new(
                    "required_field_missing",
                    format!("required field '{field}' is absent and has no default"),
                    Some(field),
                ),
            );
            return Err(suppress_required(field, report));
        }

        let matrix = match self.build_matrix(spec, &input, &defaulted, &mut report) {
            Ok(matrix) => matrix,
            Err(field) => return Err(suppress_required(&field, report)),
        };

        let requested = matrix.combination_count();
        debug!(
            run_id = %report.run_id,
            fields = matrix.len(),
            combinations = %requested,
            "validation matrix built"
        );
        if let Some(limit) = self.options.max_variations
            && requested > u128::from(limit)
        {
            warn!(
                run_id = %report.run_id,
                method,
                requested = %requested,
                limit,
                "variation limit exceeded, generation suppressed"
            );
            return Err(GenerationError::TooManyVariations {
                requested,
                limit,
                report: Box::new(report),
            });
        }

        let mut variations = cartesian_product(&matrix);
        for variation in &mut variations {
            apply_templates(variation, spec.templates(), &groups);
        }

        report.variations = variations.len() as u64;
        report.duration_ms = start.elapsed().as_millis() as u64;

        info!(
            run_id = %run_id,
            method,
            variations = report.variations,
            duration_ms = report.duration_ms,
            "generation completed"
        );

        Ok(GenerationResult { variations, report })
    }

    // Err carries the required field that ended with no valid candidates.
    fn build_matrix(
        &self,
        spec: &MethodSpec,
        input: &InputData,
        defaulted: &HashSet<String>,
        report: &mut GenerationReport,
    ) -> Result<ValidationMatrix, String> {
        let unruled = RuleSet::default();
        let mut matrix = ValidationMatrix::new();

        for (field, value) in input {
            let rules = spec.rules_for(field).unwrap_or(&unruled);
            let required = rules.is_required();
            let mut field_report = FieldReport::new(field, required, defaulted.contains(field));
            let mut accepted = Vec::new();

            for candidate in candidates(value) {
                field_report.candidates += 1;
                match rules.check(&candidate) {
                    Ok(()) => accepted.push(candidate),
                    Err(rule) => field_report.rejections.push(Rejection {
                        value: candidate,
                        rule: rule.to_string(),
                    }),
                }
            }
            field_report.accepted = accepted.len();

            debug!(
                field = %field,
                candidates = field_report.candidates,
                accepted = field_report.accepted,
                "field validated"
            );
            report.record_field(field_report);

            if accepted.is_empty() {
                if required {
                    record_warning(
                        report,
                        GenerationIssue::new(
                            "required_field_empty",
                            format!("required field '{field}' has no valid candidates"),
                            Some(field),
                        ),
                    );
                    return Err(field.clone());
                }

                let outcome = if self.options.drop_empty_optional {
                    "field dropped from the matrix"
                } else {
                    "no variations will be produced"
                };
                record_warning(
                    report,
                    GenerationIssue::new(
                        "optional_field_empty",
                        format!("optional field '{field}' has no valid candidates; {outcome}"),
                        Some(field),
                    ),
                );
                if self.options.drop_empty_optional {
                    continue;
                }
            }

            matrix.push(field.clone(), accepted);
        }

        Ok(matrix)
    }
}

/// Inject defaults for fields that are absent or null, returning the merged
/// input and the names of defaulted fields.
fn apply_defaults(spec: &MethodSpec, data: &InputData) -> (InputData, HashSet<String>) {
    let mut input = data.clone();
    let mut defaulted = HashSet::new();
    for (field, default) in spec.defaults() {
        if input.get(field).is_none_or(Value::is_null) {
            input.insert(field.clone(), default.clone());
            defaulted.insert(field.clone());
        }
    }
    (input, defaulted)
}

/// A list supplies its elements as candidates; anything else is a single one.
fn candidates(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        other => vec![other.clone()],
    }
}

fn suppress_required(field: &str, report: GenerationReport) -> GenerationError {
    warn!(
        run_id = %report.run_id,
        method = %report.method,
        field,
        "required field has no valid candidates, generation suppressed"
    );
    GenerationError::RequiredField {
        field: field.to_string(),
        report: Box::new(report),
    }
}

fn record_warning(report: &mut GenerationReport, issue: GenerationIssue) {
    debug!(
        code = %issue.code,
        field = issue.field.as_deref().unwrap_or(""),
        message = %issue.message
    );
    report.record_warning(issue);
}
