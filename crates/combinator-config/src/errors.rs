use thiserror::Error;

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Structured configuration issue with a JSON-pointer style path and hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub path: String,
    pub message: String,
    pub hint: Option<String>,
}

impl ValidationIssue {
    /// Create an issue that blocks loading.
    pub fn error(
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: IssueSeverity::Error,
            code: code.into(),
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Create an issue that is reported but does not block loading.
    pub fn warning(
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            ..Self::error(code, path, message)
        }
    }

    /// Attach a remediation hint.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Errors and warnings gathered while checking a methods document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Route an issue by its severity.
    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            IssueSeverity::Error => self.errors.push(issue),
            IssueSeverity::Warning => self.warnings.push(issue),
        }
    }

    /// Issues of either severity carrying `code`.
    pub fn with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .filter(move |issue| issue.code == code)
    }
}

/// Failures while loading method configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("unsupported config format: {0}")]
    UnsupportedFormat(String),
    #[error("template '{field}' of method '{method}' must be a string")]
    InvalidTemplate { method: String, field: String },
    #[error("invalid methods config ({} errors)", .0.errors.len())]
    Invalid(ValidationReport),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
