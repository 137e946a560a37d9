//! anvil-flatten: Flatten nested records into one typed table
//!
//! Usage:
//!   # Read from file, output rows to stdout
//!   anvil-flatten data.json
//!
//!   # Read from stdin with an inferred schema
//!   echo '[{"id": 1, "name": "Alice"}, {"id": 2}]' | anvil-flatten
//!
//!   # Use a declared schema and expand a nested field
//!   anvil-flatten --schema fields.json --nested loc events.jsonl --ndjson
//!
//!   # Column-major output
//!   anvil-flatten --columns data.json

// Use MiMalloc allocator for better performance (recommended by simd-json)
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anvil::flatten::{
    expand_nested, infer_sub_fields, ColumnsFirstBuilder, FlattenConfig, Flattened,
    NestedFieldSpec, TableWriter,
};
use anvil::schema::{flatten_inferred, ColumnType, FieldSchema, FieldSpec};
use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::Read;

#[derive(Parser, Debug)]
#[command(name = "anvil-flatten")]
#[command(about = "Flatten nested records into one typed table", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON (one record per line)
    #[arg(long)]
    ndjson: bool,

    /// Schema file: a field array or an anvil-infer output document.
    /// If omitted, the schema is inferred from the records
    #[arg(long, short = 's')]
    schema: Option<String>,

    /// Skip the whitespace-trim pass on text columns
    #[arg(long)]
    no_trim: bool,

    /// Separator between an expansion prefix and a sub-field name (default: "_")
    #[arg(long)]
    separator: Option<String>,

    /// Nested field to expand into prefixed columns, as FIELD or
    /// FIELD:PREFIX (repeatable). Sub-fields are inferred from the data
    #[arg(long)]
    nested: Vec<String>,

    /// Emit one column-major JSON object instead of row objects
    #[arg(long)]
    columns: bool,

    /// Suppress per-cell diagnostics on stderr
    #[arg(long)]
    quiet: bool,
}

/// Lenient schema-file entry: accepts both hand-written field arrays and
/// anvil-infer output (whose extra keys are ignored).
#[derive(Debug, Deserialize)]
struct SchemaEntry {
    name: String,
    #[serde(rename = "type")]
    column_type: ColumnType,
}

#[derive(Debug, Deserialize)]
struct SchemaFile {
    fields: Vec<SchemaEntry>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = FlattenConfig::default();
    if args.no_trim {
        config.trim_text = false;
    }
    if let Some(separator) = args.separator {
        config.separator = separator;
    }

    let records = read_records(args.input.as_deref(), args.ndjson)?;

    let mut flattened: Flattened = if let Some(path) = &args.schema {
        let schema = load_schema(path)?;
        ColumnsFirstBuilder::new(schema, config.clone()).build(&records)?
    } else {
        flatten_inferred(&records, config.clone())?.1
    };

    // Expand requested nested fields and merge by row position
    for entry in &args.nested {
        let (field, prefix) = match entry.split_once(':') {
            Some((field, prefix)) => (field.to_string(), prefix.to_string()),
            None => (entry.clone(), entry.clone()),
        };
        let sub_fields = infer_sub_fields(&records, &field)?;
        let spec = NestedFieldSpec::new(field, prefix, sub_fields);
        let (columns, issues) = expand_nested(&records, &spec, &config)?;
        flattened.table.merge(columns)?;
        flattened.issues.extend(issues);
    }

    if !args.quiet {
        for issue in &flattened.issues {
            let line =
                serde_json::to_string(issue).context("Failed to serialize diagnostic")?;
            eprintln!("{}", line);
        }
    }

    let stdout = std::io::stdout();
    let mut writer = TableWriter::new(stdout.lock());
    if args.columns {
        writer.write_columns(&flattened.table)?;
    } else {
        writer.write_rows(&flattened.table)?;
    }
    writer.flush()?;

    Ok(())
}

/// Read all records from a file or stdin.
///
/// Whole-buffer input goes through simd-json first (a top-level array is a
/// record stream); anything that fails falls back to line-by-line
/// serde_json parsing.
fn read_records(input: Option<&str>, ndjson: bool) -> Result<Vec<Value>> {
    let mut content = Vec::new();
    match input {
        Some(path) => {
            File::open(path)
                .with_context(|| format!("Failed to open input file: {}", path))?
                .read_to_end(&mut content)
                .context("Failed to read input file")?;
        }
        None => {
            std::io::stdin()
                .read_to_end(&mut content)
                .context("Failed to read stdin")?;
        }
    }

    let mut records = Vec::new();

    if !ndjson {
        // simd-json parses in place; give it its own buffer so the
        // fallback below sees the input untouched
        let mut simd_buffer = content.clone();
        match simd_json::to_owned_value(&mut simd_buffer) {
            Ok(simd_json::OwnedValue::Array(items)) => {
                for item in items.iter() {
                    records.push(simd_to_serde(item)?);
                }
                return Ok(records);
            }
            Ok(item) => {
                records.push(simd_to_serde(&item)?);
                return Ok(records);
            }
            Err(_) => {
                // Fall through to NDJSON handling
            }
        }
    }

    let text = String::from_utf8_lossy(&content);
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).context("Failed to parse record")?;
        records.push(value);
    }

    Ok(records)
}

fn simd_to_serde(value: &simd_json::OwnedValue) -> Result<Value> {
    let text = simd_json::to_string(value).context("Failed to re-serialize record")?;
    serde_json::from_str(&text).context("Failed to convert record")
}

fn load_schema(path: &str) -> Result<FieldSchema> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read schema file: {}", path))?;

    let entries = match serde_json::from_str::<SchemaFile>(&text) {
        Ok(file) => file.fields,
        Err(_) => serde_json::from_str::<Vec<SchemaEntry>>(&text)
            .context("Schema file must be a field array or {\"fields\": [...]}")?,
    };

    let specs = entries
        .into_iter()
        .map(|entry| FieldSpec::new(entry.name, entry.column_type))
        .collect();

    Ok(FieldSchema::new(specs)?)
}
