//! Field schemas and type inference.
//!
//! This module provides the two-type column model, the type-handler
//! registry, and two-phase schema inference over realized tables.

pub mod infer;
pub mod types;

pub use infer::{discover_fields, flatten_inferred, infer_schema};
pub use types::{canonical_name, CellValue, ColumnType, FieldSchema, FieldSpec, TypeHandler};
