use combinator_config::{MethodRegistry, MethodSpec};
use combinator_core::InputData;
use combinator_generate::{Combinator, GenerateOptions, GenerationError, GroupFilter};
use serde_json::{Value, json};

fn input(value: Value) -> InputData {
    match value {
        Value::Object(map) => map,
        other => panic!("input must be an object, got {other}"),
    }
}

fn builtin() -> Combinator {
    Combinator::builtin().expect("builtin methods load")
}

#[test]
fn drill_expands_integer_candidates_with_default_side() {
    let mut combinator = builtin();
    combinator
        .set_active_groups(["drills"])
        .run_method("drill", &input(json!({"name": "A", "fn": [1, 2]})));

    let stored = combinator.read("drills").as_group().expect("group").to_vec();
    assert_eq!(
        stored,
        vec![
            input(json!({"name": "Drill: A (left)", "fn": 1, "nf": "left"})),
            input(json!({"name": "Drill: A (left)", "fn": 2, "nf": "left"})),
        ]
    );
    let keys: Vec<&String> = stored[0].keys().collect();
    assert_eq!(keys, vec!["name", "fn", "nf"]);
}

#[test]
fn drill_with_only_invalid_integer_produces_nothing() {
    let mut combinator = builtin();
    combinator
        .set_active_groups(["drills"])
        .run_method("drill", &input(json!({"name": "A", "fn": "x"})));

    assert!(combinator.store().is_empty());
    let report = combinator.last_report().expect("report recorded");
    assert_eq!(report.variations, 0);
    assert_eq!(report.warnings_by_code.get("required_field_empty"), Some(&1));
    let field = report.field("fn").expect("fn report");
    assert_eq!(field.rejections[0].rule, "integer");
}

#[test]
fn required_short_circuit_ignores_other_valid_fields() {
    let mut combinator = builtin();
    combinator.set_active_groups(["drills"]).run_method(
        "drill",
        &input(json!({"name": ["A", "B", "C"], "fn": [1, 2, 3], "nf": ["up", "down"]})),
    );

    assert!(combinator.read(GroupFilter::All).as_groups().is_some_and(|g| g.is_empty()));
}

#[test]
fn invalid_candidates_are_dropped_before_the_product() {
    let mut combinator = builtin();
    combinator.set_active_groups(["drills"]).run_method(
        "drill",
        &input(json!({"name": "A", "fn": [1, "x", 3], "nf": ["left", "middle", "right"]})),
    );

    let stored = combinator.store().group("drills");
    assert_eq!(stored.len(), 4);
    let sides: Vec<&Value> = stored.iter().filter_map(|row| row.get("nf")).collect();
    assert_eq!(sides, vec!["left", "right", "left", "right"]);
    let names: Vec<&Value> = stored.iter().filter_map(|row| row.get("name")).collect();
    assert_eq!(names[1], "Drill: A (right)");
}

#[test]
fn pin_templates_include_active_groups() {
    let mut combinator = builtin();
    combinator
        .set_active_groups(["alpha", "beta"])
        .run_method("pin", &input(json!({"id": [1, 0, 2], "code": [999, 1234]})));

    let alpha = combinator.store().group("alpha");
    assert_eq!(alpha.len(), 2);
    assert_eq!(alpha, combinator.store().group("beta"));
    assert_eq!(
        alpha[0].get("custom_label"),
        Some(&json!("Pin active - groups: alpha, beta"))
    );
    assert_eq!(
        alpha[1].get("description"),
        Some(&json!("Object ID: 2 with code 1234"))
    );
    let keys: Vec<&String> = alpha[0].keys().collect();
    assert_eq!(keys, vec!["id", "code", "mode", "custom_label", "description"]);
}

#[test]
fn default_injection_matches_explicit_value() {
    let mut defaulted = builtin();
    defaulted
        .set_active_groups(["g"])
        .run_method("drill", &input(json!({"name": "A", "fn": 5})));

    let mut explicit = builtin();
    explicit
        .set_active_groups(["g"])
        .run_method("drill", &input(json!({"name": "A", "fn": 5, "nf": "left"})));

    assert_eq!(defaulted.store().group("g"), explicit.store().group("g"));
}

#[test]
fn later_templates_see_earlier_outputs() {
    let spec = MethodSpec::new()
        .with_rules("code", "required|natural")
        .with_template("label", "L-{code}")
        .with_template("summary", "{label} / {code}")
        .with_template("early", "{late}")
        .with_template("late", "done");
    let mut combinator = Combinator::new(MethodRegistry::new().with_method("tag", spec));
    combinator
        .set_active_groups(["tags"])
        .run_method("tag", &input(json!({"code": "7"})));

    let row = &combinator.store().group("tags")[0];
    assert_eq!(row.get("summary"), Some(&json!("L-7 / 7")));
    assert_eq!(row.get("early"), Some(&json!("{late}")));
    assert_eq!(row.get("late"), Some(&json!("done")));
}

#[test]
fn groups_accumulate_and_reset() {
    let mut combinator = builtin();
    let data = input(json!({"name": "A", "fn": [1, 2]}));

    combinator.set_active_groups(["a"]).run_method("drill", &data);
    combinator.run_method("drill", &data);
    combinator.set_active_groups(["b"]).run_method("drill", &data);

    assert_eq!(combinator.store().group("a").len(), 4);
    assert_eq!(combinator.store().group("b").len(), 2);

    combinator.reset_group(Some("a"));
    assert!(combinator.store().group("a").is_empty());
    assert_eq!(combinator.store().group("b").len(), 2);

    combinator.reset_group(None);
    assert!(combinator.store().is_empty());
    assert_eq!(combinator.active_groups(), ["b".to_string()]);
}

#[test]
fn read_with_group_list_skips_missing_names() {
    let mut combinator = builtin();
    combinator
        .set_active_groups(["a", "b"])
        .run_method("drill", &input(json!({"name": "A", "fn": 1})));

    let view = combinator.read(vec!["b".to_string(), "missing".to_string()]);
    let groups = view.as_groups().expect("sub-mapping");
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].0, "b");
    assert_eq!(groups[0].1.len(), 1);
    assert!(combinator.read("missing").as_group().is_some_and(<[_]>::is_empty));
}

#[test]
fn read_all_lists_groups_in_first_write_order() {
    let mut combinator = builtin();
    let data = input(json!({"name": "A", "fn": 1}));
    combinator.set_active_groups(["zeta"]).run_method("drill", &data);
    combinator.set_active_groups(["alpha", "mid"]).run_method("drill", &data);
    combinator.set_active_groups(["zeta"]).run_method("drill", &data);

    let all = combinator.read(GroupFilter::All);
    let names: Vec<&str> = all
        .as_groups()
        .map(|groups| groups.iter().map(|(name, _)| *name).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["zeta", "alpha", "mid"]);

    let picked = combinator.read(["mid", "zeta"]);
    let names: Vec<&str> = picked
        .as_groups()
        .map(|groups| groups.iter().map(|(name, _)| *name).collect())
        .unwrap_or_default();
    assert_eq!(names, vec!["zeta", "mid"]);
}

#[test]
fn toml_template_order_drives_expansion() {
    let registry = MethodRegistry::from_toml_str(
        r#"
config_version = "0.1"

[methods.tag.rules]
id = "required"

[methods.tag.templates]
zeta = "Z{id}"
alpha = "A{zeta}"
"#,
    )
    .expect("load methods");
    let mut combinator = Combinator::new(registry);
    combinator
        .set_active_groups(["tags"])
        .run_method("tag", &input(json!({"id": 1})));

    let row = &combinator.store().group("tags")[0];
    assert_eq!(row.get("alpha"), Some(&json!("AZ1")));
    let keys: Vec<&String> = row.keys().collect();
    assert_eq!(keys, vec!["id", "zeta", "alpha"]);
}

#[test]
fn unknown_method_is_a_no_op() {
    let mut combinator = builtin();
    combinator
        .set_active_groups(["g"])
        .run_method("missing", &input(json!({"name": "A"})));

    assert!(combinator.store().is_empty());
    assert!(combinator.last_report().is_none());
}

#[test]
fn explicit_groups_leave_active_groups_alone() {
    let mut combinator = builtin();
    combinator.set_active_groups(["active"]);

    let report = combinator
        .generate_into("drill", &input(json!({"name": "A", "fn": [1, 2, 3]})), &["explicit"])
        .expect("generation succeeds");
    assert_eq!(report.variations, 3);
    assert_eq!(report.groups, vec!["explicit".to_string()]);

    assert_eq!(combinator.store().group("explicit").len(), 3);
    assert!(combinator.store().group("active").is_empty());
    assert_eq!(combinator.active_groups(), ["active".to_string()]);
}

#[test]
fn explicit_api_surfaces_suppression_reasons() {
    let mut combinator = builtin();
    let err = combinator
        .generate_into("pin", &input(json!({"code": 1234})), &["g"])
        .unwrap_err();

    assert!(matches!(err, GenerationError::RequiredField { ref field, .. } if field == "id"));
    assert!(combinator.store().is_empty());
}

#[test]
fn no_active_groups_stores_nothing() {
    let mut combinator = builtin();
    combinator.run_method("drill", &input(json!({"name": "A", "fn": 1})));

    assert!(combinator.store().is_empty());
    assert_eq!(combinator.last_report().map(|r| r.variations), Some(1));
}

#[test]
fn variation_limit_keeps_store_untouched() {
    let registry = MethodRegistry::builtin().expect("builtin methods load");
    let options = GenerateOptions {
        max_variations: Some(2),
        ..GenerateOptions::default()
    };
    let mut combinator = Combinator::with_options(registry, options);
    combinator
        .set_active_groups(["g"])
        .run_method("drill", &input(json!({"name": "A", "fn": [1, 2, 3]})));

    assert!(combinator.store().is_empty());
    assert_eq!(
        combinator
            .last_report()
            .and_then(|r| r.field("fn"))
            .map(|f| f.accepted),
        Some(3)
    );
}
