/// Expanding a nested sub-record field into prefixed columns, with bounds
/// validation on numeric sub-fields.
use anvil::flatten::{
    expand_nested, ColumnsFirstBuilder, FlattenConfig, NestedFieldSpec, SubFieldSpec,
};
use anvil::schema::{ColumnType, FieldSchema, FieldSpec};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    println!("=== Nested Field Expansion ===\n");

    // "loc" arrives as a JSON-string-encoded record, as some exports ship it
    let records = vec![
        json!({"id": 1, "loc": "{\"city\":\"NYC\",\"lat\":\"41\",\"lon\":\"-74\"}"}),
        json!({"id": 2, "loc": "{\"city\":\"LA\",\"lat\":\"34\",\"lon\":\"-118\"}"}),
        json!({"id": 3, "loc": "{\"city\":\"Nowhere\",\"lat\":\"412\",\"lon\":\"-74\"}"}),
    ];

    let config = FlattenConfig::default();

    // Main table
    let schema = FieldSchema::new(vec![FieldSpec::new("id", ColumnType::Integer)])?;
    let mut flattened = ColumnsFirstBuilder::new(schema, config.clone()).build(&records)?;

    // Expansion: declared sub-fields with latitude/longitude bounds
    let spec = NestedFieldSpec::new(
        "loc",
        "loc",
        vec![
            SubFieldSpec::new("city", ColumnType::Text),
            SubFieldSpec::new("lat", ColumnType::Integer).with_bounds(-90, 90),
            SubFieldSpec::new("lon", ColumnType::Integer).with_bounds(-180, 180),
        ],
    );
    let (columns, issues) = expand_nested(&records, &spec, &config)?;

    // Merge is strictly positional: row i everywhere is record i
    flattened.table.merge(columns)?;
    flattened.issues.extend(issues);

    println!("Merged table:");
    for row in 0..flattened.table.row_count() {
        println!(
            "  {}",
            serde_json::Value::Object(flattened.table.row_object(row))
        );
    }

    println!("\nDiagnostics (record 3's latitude is out of range):");
    for issue in &flattened.issues {
        println!("  {}", serde_json::to_string(issue)?);
    }

    Ok(())
}
