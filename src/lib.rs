//! # Anvil - Nested Record Flattening Toolkit
//!
//! A unified library for flattening homogeneous sequences of nested records
//! into flat, typed, columnar tables, with schema inference over the records
//! themselves.
//!
//! ## Modules
//!
//! - **flatten**: Build tables columns-first or rows-first, expand nested
//!   sub-record fields into prefixed columns, write tables out
//! - **schema**: Field schemas, the type-handler registry, and two-phase
//!   type inference
//!
//! ## Quick Start
//!
//! ### Flattening with a declared schema
//!
//! ```rust
//! use anvil::{ColumnsFirstBuilder, FlattenConfig};
//! use anvil::schema::{ColumnType, FieldSchema, FieldSpec};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let records = vec![
//!     json!({"a": 1, "b": "x"}),
//!     json!({"a": null, "b": "y"}),
//!     json!({"a": 3}),
//! ];
//!
//! let schema = FieldSchema::new(vec![
//!     FieldSpec::new("a", ColumnType::Integer),
//!     FieldSpec::new("b", ColumnType::Text),
//! ])?;
//!
//! let flattened = ColumnsFirstBuilder::new(schema, FlattenConfig::default())
//!     .build(&records)?;
//!
//! // One row per record; missing fields become null markers
//! assert_eq!(flattened.table.row_count(), 3);
//! assert_eq!(flattened.table.column_count(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ### Schema Inference
//!
//! ```rust
//! use anvil::{flatten_inferred, FlattenConfig};
//! use anvil::schema::ColumnType;
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let records = vec![
//!     json!({"id": 1, "name": "Alice"}),
//!     json!({"id": "2", "name": "Bob"}),
//! ];
//!
//! let (schema, flattened) = flatten_inferred(&records, FlattenConfig::default())?;
//!
//! // "id" settles on integer even though one record encodes it as a string
//! assert_eq!(schema.fields()[0].column_type, ColumnType::Integer);
//! assert_eq!(flattened.table.row_count(), 2);
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::BufRead;

pub mod error;
pub mod flatten;
pub mod schema;

// Re-export commonly used types for convenience
pub use error::{FlattenError, FlattenResult};
pub use flatten::{
    expand_nested, infer_sub_fields, CellIssue, Column, ColumnData, ColumnsFirstBuilder,
    FlatTable, Flattened, FlattenConfig, IssueKind, NestedFieldSpec, RowsFirstBuilder,
    SubFieldSpec, TableWriter,
};
pub use schema::{
    canonical_name, discover_fields, flatten_inferred, infer_schema, CellValue, ColumnType,
    FieldSchema, FieldSpec,
};

/// Main entry point: flatten a stream of newline-delimited records into one
/// table using a declared schema.
pub fn flatten_ndjson<R: BufRead>(
    reader: R,
    schema: &FieldSchema,
    config: FlattenConfig,
) -> Result<Flattened> {
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read line")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line).context("Failed to parse record")?;
        records.push(value);
    }

    let builder = ColumnsFirstBuilder::new(schema.clone(), config);
    builder
        .build(&records)
        .context("Failed to flatten records")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnType, FieldSpec};

    #[test]
    fn test_flatten_ndjson() {
        let input = "{\"a\": 1, \"b\": \"x\"}\n\n{\"a\": 2}\n";
        let schema = FieldSchema::new(vec![
            FieldSpec::new("a", ColumnType::Integer),
            FieldSpec::new("b", ColumnType::Text),
        ])
        .unwrap();

        let flattened =
            flatten_ndjson(input.as_bytes(), &schema, FlattenConfig::default()).unwrap();

        assert_eq!(flattened.table.row_count(), 2);
        assert_eq!(flattened.table.cell(0, "a"), Some(CellValue::Int(1)));
        assert_eq!(flattened.table.cell(1, "b"), Some(CellValue::Null));
    }
}
