use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::value::{
    is_blank, is_numeric, leading_number, parse_canonical_int, scalar_text, to_number,
};

/// Separator between rule segments in a rule string (`required|integer`).
pub const RULE_SEPARATOR: char = '|';

/// Parsed rule identifier with its parameter already interpreted.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Required,
    Numeric,
    Integer,
    Decimal,
    Natural,
    NaturalNoZero,
    Min(f64),
    Max(f64),
    /// Allow-list from `val[a,b,...]`.
    Val(Vec<String>),
    /// Identifier the validator does not know; always passes.
    Unknown(String),
}

impl RuleKind {
    fn from_parts(name: &str, param: Option<&str>) -> Self {
        match name {
            "required" => RuleKind::Required,
            "numeric" => RuleKind::Numeric,
            "integer" => RuleKind::Integer,
            "decimal" => RuleKind::Decimal,
            "natural" => RuleKind::Natural,
            "natural_no_zero" => RuleKind::NaturalNoZero,
            "min" => RuleKind::Min(param.map(leading_number).unwrap_or(0.0)),
            "max" => RuleKind::Max(param.map(leading_number).unwrap_or(0.0)),
            "val" => RuleKind::Val(
                param
                    .unwrap_or_default()
                    .split(',')
                    .map(str::to_string)
                    .collect(),
            ),
            other => RuleKind::Unknown(other.to_string()),
        }
    }

    /// Returns true when `value` satisfies this rule.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            RuleKind::Required => !is_blank(value),
            RuleKind::Numeric => is_numeric(value),
            RuleKind::Integer => is_integer(value),
            RuleKind::Decimal => to_number(value).is_some_and(|number| number.floor() != number),
            RuleKind::Natural => scalar_text(value).is_some_and(|text| is_digits(&text)),
            RuleKind::NaturalNoZero => scalar_text(value)
                .is_some_and(|text| is_digits(&text) && text.bytes().any(|byte| byte != b'0')),
            RuleKind::Min(bound) => to_number(value).is_some_and(|number| number >= *bound),
            RuleKind::Max(bound) => to_number(value).is_some_and(|number| number <= *bound),
            RuleKind::Val(allowed) => {
                scalar_text(value).is_some_and(|text| allowed.iter().any(|item| *item == text))
            }
            RuleKind::Unknown(_) => true,
        }
    }
}

/// A single rule segment such as `min[1000]`.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSpec {
    name: String,
    param: Option<String>,
    kind: RuleKind,
}

impl RuleSpec {
    /// Parse one segment. `name[param]` splits at the first `[` and the next
    /// `]`; anything else is taken whole as the identifier.
    pub fn parse(segment: &str) -> Self {
        let (name, param) = split_param(segment);
        Self {
            kind: RuleKind::from_parts(name, param),
            name: name.to_string(),
            param: param.map(str::to_string),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn param(&self) -> Option<&str> {
        self.param.as_deref()
    }

    pub fn kind(&self) -> &RuleKind {
        &self.kind
    }

    pub fn accepts(&self, value: &Value) -> bool {
        self.kind.accepts(value)
    }
}

impl FromStr for RuleSpec {
    type Err = Infallible;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        Ok(RuleSpec::parse(segment))
    }
}

impl fmt::Display for RuleSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.param {
            Some(param) => write!(f, "{}[{}]", self.name, param),
            None => f.write_str(&self.name),
        }
    }
}

/// Ordered rules attached to one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<RuleSpec>,
}

impl RuleSet {
    pub fn new(rules: Vec<RuleSpec>) -> Self {
        Self { rules }
    }

    /// Parse a `|`-separated rule string. Empty segments are skipped.
    pub fn parse(text: &str) -> Self {
        Self::from_segments(text.split(RULE_SEPARATOR))
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rules = segments
            .into_iter()
            .filter(|segment| !segment.as_ref().is_empty())
            .map(|segment| RuleSpec::parse(segment.as_ref()))
            .collect();
        Self { rules }
    }

    pub fn is_required(&self) -> bool {
        self.rules
            .iter()
            .any(|rule| matches!(rule.kind, RuleKind::Required))
    }

    /// Evaluate left to right and report the first failing rule.
    pub fn check(&self, value: &Value) -> Result<(), &RuleSpec> {
        match self.rules.iter().find(|rule| !rule.accepts(value)) {
            Some(rule) => Err(rule),
            None => Ok(()),
        }
    }

    pub fn validate(&self, value: &Value) -> bool {
        self.check(value).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RuleSpec> {
        self.rules.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }
}

impl FromStr for RuleSet {
    type Err = Infallible;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Ok(RuleSet::parse(text))
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self
            .rules
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("|");
        f.write_str(&rendered)
    }
}

/// Validate a value against an ordered rule list. The empty list passes.
pub fn validate(value: &Value, rules: &RuleSet) -> bool {
    rules.validate(value)
}

fn split_param(segment: &str) -> (&str, Option<&str>) {
    if let Some(open) = segment.find('[')
        && let Some(close) = segment[open + 1..].find(']')
    {
        let name = &segment[..open];
        let param = &segment[open + 1..open + 1 + close];
        return (name, Some(param));
    }
    (segment, None)
}

// The integer 0 is accepted as-is; every other zero spelling fails.
fn is_integer(value: &Value) -> bool {
    match value {
        Value::Number(number) => {
            number.is_i64()
                || number.as_f64().is_some_and(|float| {
                    float.fract() == 0.0 && float != 0.0 && float.abs() < i64::MAX as f64
                })
        }
        Value::String(text) => parse_canonical_int(text).is_some_and(|int| int != 0),
        Value::Bool(flag) => *flag,
        _ => false,
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}
