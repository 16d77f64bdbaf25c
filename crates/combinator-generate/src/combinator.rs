use tracing::debug;

use combinator_config::{ConfigError, MethodRegistry};
use combinator_core::InputData;

use crate::engine::GenerationEngine;
use crate::errors::GenerationError;
use crate::model::{GenerateOptions, GenerationReport};
use crate::store::{GroupFilter, GroupStore, GroupView};

/// Fluent front end: pick groups, run methods, read stored variations.
///
/// ```
/// use combinator_generate::Combinator;
/// use serde_json::json;
///
/// let mut combinator = Combinator::builtin().expect("builtin methods");
/// let data = json!({"name": "A", "fn": [1, 2]});
/// combinator
///     .set_active_groups(["drills"])
///     .run_method("drill", data.as_object().expect("object input"));
///
/// let stored = combinator.read("drills");
/// assert_eq!(stored.as_group().map(<[_]>::len), Some(2));
/// ```
#[derive(Debug, Clone)]
pub struct Combinator {
    engine: GenerationEngine,
    store: GroupStore,
    active_groups: Vec<String>,
    last_report: Option<GenerationReport>,
}

impl Combinator {
    pub fn new(registry: MethodRegistry) -> Self {
        Self::with_options(registry, GenerateOptions::default())
    }

    pub fn with_options(registry: MethodRegistry, options: GenerateOptions) -> Self {
        Self {
            engine: GenerationEngine::new(registry, options),
            store: GroupStore::new(),
            active_groups: Vec::new(),
            last_report: None,
        }
    }

    /// Combinator over the built-in `drill` and `pin` methods.
    pub fn builtin() -> Result<Self, ConfigError> {
        Ok(Self::new(MethodRegistry::builtin()?))
    }

    /// Replace the groups targeted by subsequent [`Combinator::run_method`] calls.
    pub fn set_active_groups<I, S>(&mut self, groups: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.active_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn active_groups(&self) -> &[String] {
        &self.active_groups
    }

    /// Clear one group, or all groups when `group` is `None`.
    pub fn reset_group(&mut self, group: Option<&str>) -> &mut Self {
        self.store.reset(group);
        self
    }

    pub fn read(&self, filter: impl Into<GroupFilter>) -> GroupView<'_> {
        self.store.read(&filter.into())
    }

    pub fn store(&self) -> &GroupStore {
        &self.store
    }

    /// Report of the most recent generation call that reached a method.
    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.last_report.as_ref()
    }

    /// Run `method` for the active groups. Calls that produce no output
    /// (unknown method, failed required field, variation limit) leave the
    /// store untouched.
    pub fn run_method(&mut self, method: &str, data: &InputData) -> &mut Self {
        let groups = self.active_groups.clone();
        if let Err(err) = self.generate_into(method, data, &groups) {
            debug!(method, error = %err, "generation produced no output");
        }
        self
    }

    /// Run `method` and append its variations to `groups`, without reading
    /// or changing the active groups.
    pub fn generate_into<S: AsRef<str>>(
        &mut self,
        method: &str,
        data: &InputData,
        groups: &[S],
    ) -> Result<&GenerationReport, GenerationError> {
        match self.engine.generate(method, data, groups) {
            Ok(result) => {
                self.store.append(groups, &result.variations);
                Ok(self.last_report.insert(result.report))
            }
            Err(err) => {
                if let Some(report) = err.report() {
                    self.last_report = Some(report.clone());
                }
                Err(err)
            }
        }
    }
}
