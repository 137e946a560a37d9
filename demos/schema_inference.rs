/// Two-phase schema inference: provisional all-text pass, per-column type
/// decision, then the real typed build.
use anvil::flatten::FlattenConfig;
use anvil::schema::{discover_fields, flatten_inferred, infer_schema};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    println!("=== Schema Inference ===\n");

    // Messy field names and stringly-typed numbers, as real exports have
    let records = vec![
        json!({"Incident Number": "160331", "Call  Type": "Alarm", "Priority": 3}),
        json!({"Incident Number": "160332", "Call  Type": "Medical"}),
        json!({"Incident Number": 160333, "Call  Type": "Fire", "Priority": "2"}),
    ];

    let field_names = discover_fields(&records);
    println!("Discovered fields: {:?}\n", field_names);

    let schema = infer_schema(&records, &field_names)?;
    println!("Inferred schema:");
    println!("{}\n", serde_json::to_string_pretty(&schema)?);

    // The convenience call chains discovery, inference, and the typed build
    let (_, flattened) = flatten_inferred(&records, FlattenConfig::default())?;

    println!("Rebuilt table:");
    for row in 0..flattened.table.row_count() {
        println!(
            "  {}",
            serde_json::Value::Object(flattened.table.row_object(row))
        );
    }

    Ok(())
}
