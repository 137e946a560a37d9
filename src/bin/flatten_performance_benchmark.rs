//! Benchmark comparing the two table-construction strategies
//!
//! Columns-first reuses a pre-computed schema across the whole batch;
//! rows-first re-infers column types from the assembled rows every run.

use anvil::flatten::{ColumnsFirstBuilder, FlattenConfig, RowsFirstBuilder};
use anvil::schema::{discover_fields, infer_schema};
use serde_json::json;
use std::time::Instant;

fn main() -> anyhow::Result<()> {
    println!("=== Anvil Flatten Performance Benchmark ===\n");
    println!("Comparing columns-first vs rows-first construction\n");

    // Generate test data
    let mut records = Vec::new();
    for i in 0..10_000 {
        records.push(json!({
            "id": i,
            "username": format!("user{}", i),
            "email": format!("user{}@example.com", i),
            "age": (18 + i % 60).to_string(),
            "city": if i % 7 == 0 { "  San Francisco " } else { "Oakland" },
            "visits": i % 100,
            "notes": if i % 3 == 0 { json!(null) } else { json!(format!("note {}", i)) },
        }));
    }

    let config = FlattenConfig::default();
    let field_names = discover_fields(&records);

    // Benchmark 1: columns-first with an amortized schema
    println!("=== Benchmark 1: Columns-First (pre-computed schema) ===");
    println!("Step 1: Inferring schema from {} records...", records.len());

    let infer_start = Instant::now();
    let schema = infer_schema(&records, &field_names)?;
    let infer_duration = infer_start.elapsed();
    println!("Schema inference time: {:?}\n", infer_duration);

    println!("Step 2: Building the table with the settled schema...");
    let builder = ColumnsFirstBuilder::new(schema, config.clone());
    let start = Instant::now();
    let columns_first = builder.build(&records)?;
    let columns_duration = start.elapsed();

    println!("Time: {:?}", columns_duration);
    println!(
        "Rows: {}, columns: {}, issues: {}\n",
        columns_first.table.row_count(),
        columns_first.table.column_count(),
        columns_first.issues.len()
    );

    // Benchmark 2: rows-first, inference included every run
    println!("=== Benchmark 2: Rows-First (inference per run) ===");

    let builder = RowsFirstBuilder::new(config);
    let start = Instant::now();
    let rows_first = builder.build(&records, &field_names)?;
    let rows_duration = start.elapsed();

    println!("Time: {:?}", rows_duration);
    println!(
        "Rows: {}, columns: {}, issues: {}\n",
        rows_first.table.row_count(),
        rows_first.table.column_count(),
        rows_first.issues.len()
    );

    // Analysis
    println!("=== Performance Analysis ===\n");

    let speedup = rows_duration.as_secs_f64() / columns_duration.as_secs_f64();
    let total_columns_time = infer_duration + columns_duration;

    println!("Columns-first build:     {:?}", columns_duration);
    println!("Schema inference:        {:?}", infer_duration);
    println!("Columns-first total:     {:?}", total_columns_time);
    println!("Rows-first total:        {:?}", rows_duration);
    println!();
    println!("Speedup (build only): {:.2}x", speedup);

    if columns_first.table == rows_first.table {
        println!("\n✓ Both strategies produced identical tables");
    } else {
        println!("\n⚠ Strategy outputs differ - this is a bug");
    }

    Ok(())
}
