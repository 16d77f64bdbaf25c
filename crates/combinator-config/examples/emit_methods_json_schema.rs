use combinator_config::methods_json_schema;

fn main() {
    let schema = methods_json_schema();
    let json = serde_json::to_string_pretty(&schema).expect("serialize methods json schema");
    println!("{json}");
}
