use std::collections::HashMap;

use combinator_config::TemplateSpec;
use combinator_core::{Variation, to_text};
use serde_json::Value;

/// Placeholder replaced by the active group names.
pub const ACTIVE_GROUPS_TOKEN: &str = "{activeGroups}";

/// Separator used when rendering the active group names.
pub const ACTIVE_GROUPS_SEPARATOR: &str = ", ";

/// Placeholder to replacement table for one variation.
#[derive(Debug, Clone)]
pub struct PlaceholderTable {
    // Longest placeholder first so overlapping names resolve to the longest match.
    entries: Vec<(String, String)>,
}

impl PlaceholderTable {
    /// Field values override the reserved `{activeGroups}` token.
    pub fn new<S: AsRef<str>>(variation: &Variation, active_groups: &[S]) -> Self {
        let mut table: HashMap<String, String> = HashMap::with_capacity(variation.len() + 1);
        let groups = active_groups
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(ACTIVE_GROUPS_SEPARATOR);
        table.insert(ACTIVE_GROUPS_TOKEN.to_string(), groups);
        for (field, value) in variation {
            table.insert(format!("{{{field}}}"), to_text(value));
        }

        let mut entries: Vec<(String, String)> = table.into_iter().collect();
        entries.sort_by(|(left, _), (right, _)| right.len().cmp(&left.len()).then(left.cmp(right)));
        Self { entries }
    }

    /// Single pass replacement; substituted text is never rescanned and
    /// unknown placeholders stay as written.
    pub fn replace(&self, template: &str) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(pos) = rest.find('{') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            match self.entries.iter().find(|(key, _)| tail.starts_with(key.as_str())) {
                Some((key, value)) => {
                    out.push_str(value);
                    rest = &tail[key.len()..];
                }
                None => {
                    out.push('{');
                    rest = &tail[1..];
                }
            }
        }

        out.push_str(rest);
        out
    }
}

/// Expand `{field}` placeholders and `{activeGroups}` in one template.
pub fn expand<S: AsRef<str>>(
    template: &str,
    variation: &Variation,
    active_groups: &[S],
) -> String {
    PlaceholderTable::new(variation, active_groups).replace(template)
}

/// Run templates in declared order, writing each output into the variation
/// before the next template is expanded.
pub fn apply_templates<S: AsRef<str>>(
    variation: &mut Variation,
    templates: &[TemplateSpec],
    active_groups: &[S],
) {
    for spec in templates {
        let rendered = expand(&spec.template, variation, active_groups);
        variation.insert(spec.field.clone(), Value::String(rendered));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn variation(value: Value) -> Variation {
        match value {
            Value::Object(map) => map,
            _ => Variation::new(),
        }
    }

    const NO_GROUPS: &[&str] = &[];

    #[test]
    fn substitutes_fields_and_groups() {
        let row = variation(json!({"name": "A", "nf": "left", "fn": 2}));
        assert_eq!(
            expand("Drill: {name} ({nf}) #{fn}", &row, NO_GROUPS),
            "Drill: A (left) #2"
        );
        assert_eq!(
            expand("groups: {activeGroups}", &row, &["g1", "g2"]),
            "groups: g1, g2"
        );
    }

    #[test]
    fn unknown_placeholders_stay_verbatim() {
        let row = variation(json!({"a": 1}));
        assert_eq!(expand("{a}{b}{", &row, NO_GROUPS), "1{b}{");
    }

    #[test]
    fn substituted_text_is_not_rescanned() {
        let row = variation(json!({"a": "{b}", "b": "B"}));
        assert_eq!(expand("{a}|{b}", &row, NO_GROUPS), "{b}|B");
    }

    #[test]
    fn list_values_join_with_comma() {
        let row = variation(json!({"tags": ["x", "y", 3]}));
        assert_eq!(expand("[{tags}]", &row, NO_GROUPS), "[x,y,3]");
    }

    #[test]
    fn field_named_active_groups_wins() {
        let row = variation(json!({"activeGroups": "mine"}));
        assert_eq!(expand("{activeGroups}", &row, &["g"]), "mine");
    }

    #[test]
    fn templates_see_earlier_outputs() {
        let mut row = variation(json!({"code": 7}));
        let templates = vec![
            TemplateSpec {
                field: "label".to_string(),
                template: "L{code}".to_string(),
            },
            TemplateSpec {
                field: "summary".to_string(),
                template: "<{label}>".to_string(),
            },
        ];
        apply_templates(&mut row, &templates, NO_GROUPS);
        assert_eq!(row.get("label"), Some(&json!("L7")));
        assert_eq!(row.get("summary"), Some(&json!("<L7>")));
    }

    #[test]
    fn template_overwrites_existing_field_in_place() {
        let mut row = variation(json!({"name": "A", "nf": "left"}));
        let templates = vec![TemplateSpec {
            field: "name".to_string(),
            template: "Drill: {name}".to_string(),
        }];
        apply_templates(&mut row, &templates, NO_GROUPS);
        let keys: Vec<&String> = row.keys().collect();
        assert_eq!(keys, vec!["name", "nf"]);
        assert_eq!(row.get("name"), Some(&json!("Drill: A")));
    }
}
