/// Quickstart example - the simplest possible usage
use anvil::flatten::{ColumnsFirstBuilder, FlattenConfig, TableWriter};
use anvil::schema::{ColumnType, FieldSchema, FieldSpec};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    println!("=== Anvil Quick Start ===\n");

    // Step 1: Your records, as parsed JSON
    let records = vec![
        json!({"id": 1, "name": "Alice", "age": 30}),
        json!({"id": 2, "name": "  Bob ", "age": null}),
        json!({"id": "3", "name": "Eve", "age": "n/a"}),
    ];

    println!("Input records:");
    for record in &records {
        println!("  {}", record);
    }

    // Step 2: Declare the fields you want and their types
    let schema = FieldSchema::new(vec![
        FieldSpec::new("id", ColumnType::Integer),
        FieldSpec::new("name", ColumnType::Text),
        FieldSpec::new("age", ColumnType::Integer),
    ])?;

    // Step 3: Build the table, one column at a time
    let builder = ColumnsFirstBuilder::new(schema, FlattenConfig::default());
    let flattened = builder.build(&records)?;

    println!(
        "\nBuilt a table with {} rows and {} columns",
        flattened.table.row_count(),
        flattened.table.column_count()
    );

    // Step 4: Look at what we got - note the null markers where "age" was
    // null or missing, and the trimmed "Bob"
    println!("\nRows:");
    let stdout = std::io::stdout();
    let mut writer = TableWriter::new(stdout.lock());
    writer.write_rows(&flattened.table)?;
    writer.flush()?;

    // Step 5: Diagnostics never abort the batch
    println!("\nDiagnostics: {}", flattened.issues.len());
    for issue in &flattened.issues {
        println!("  {}", serde_json::to_string(issue)?);
    }

    Ok(())
}
