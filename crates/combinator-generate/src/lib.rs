//! Combinatorial variation generator.
//!
//! Validates candidate values per field against a method's rules, builds the
//! cartesian product of the surviving candidates, expands the method's
//! templates for every combination and accumulates the results into named
//! groups.

pub mod cartesian;
pub mod combinator;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod model;
pub mod store;
pub mod template;

pub use cartesian::{Combinations, ValidationMatrix, cartesian_product};
pub use combinator::Combinator;
pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use logging::{LogFormat, LoggingOptions, init_logging};
pub use model::{FieldReport, GenerateOptions, GenerationIssue, GenerationReport, Rejection};
pub use store::{GroupEntries, GroupFilter, GroupStore, GroupView};
pub use template::{ACTIVE_GROUPS_TOKEN, PlaceholderTable, apply_templates, expand};
