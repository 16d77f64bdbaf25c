//! Core value helpers and the field rule validator for Combinator.
//!
//! Rules are parsed once from strings such as `required|min[1000]` into
//! [`RuleSet`] values and evaluated against `serde_json::Value` candidates.

pub mod rules;
pub mod value;

pub use rules::{RULE_SEPARATOR, RuleKind, RuleSet, RuleSpec, validate};
pub use value::{InputData, Variation, is_blank, is_numeric, to_number, to_text};
