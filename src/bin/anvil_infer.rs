//! anvil-infer: Infer a field schema from nested records
//!
//! Runs the two-phase inference: a provisional all-text pass over the
//! records, then a per-column type decision. The output document can be fed
//! back to `anvil-flatten --schema`.
//!
//! Usage:
//!   # Read from file, output to stdout
//!   anvil-infer data.json
//!
//!   # Read from stdin, output to stdout
//!   echo '[{"id": 1, "name": "Alice"}]' | anvil-infer
//!
//!   # Process NDJSON with compact output
//!   anvil-infer --ndjson events.jsonl --compact

use anvil::schema::{discover_fields, infer_schema};
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::fs::File;
use std::io::{stdin, BufRead, BufReader, Read};

#[derive(Parser, Debug)]
#[command(name = "anvil-infer")]
#[command(about = "Infer a field schema from nested records", long_about = None)]
struct Args {
    /// Input file (use stdin if omitted)
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// Process newline-delimited JSON (one record per line)
    #[arg(long)]
    ndjson: bool,

    /// Compact output (no pretty-printing)
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Create reader based on input source
    let reader: Box<dyn BufRead> = if let Some(file_path) = &args.input {
        Box::new(BufReader::new(
            File::open(file_path)
                .with_context(|| format!("Failed to open input file: {}", file_path))?,
        ))
    } else {
        Box::new(BufReader::new(stdin()))
    };

    let mut records = Vec::new();

    if args.ndjson {
        for line in reader.lines() {
            let line = line.context("Failed to read line")?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let value: Value = serde_json::from_str(line).context("Failed to parse record")?;
            records.push(value);
        }
    } else {
        // Whole input as one JSON value; a top-level array is a record stream
        let mut text = String::new();
        let mut reader = reader;
        reader
            .read_to_string(&mut text)
            .context("Failed to read input")?;
        let value: Value =
            serde_json::from_str(text.trim()).context("Failed to parse input")?;
        match value {
            Value::Array(items) => records.extend(items),
            other => records.push(other),
        }
    }

    if records.is_empty() {
        eprintln!("Warning: No records found in input");
    }

    let field_names = discover_fields(&records);
    let schema = infer_schema(&records, &field_names)?;

    let output = if args.compact {
        serde_json::to_string(&schema)?
    } else {
        serde_json::to_string_pretty(&schema)?
    };

    println!("{}", output);

    Ok(())
}
