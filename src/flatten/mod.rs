//! Record flattening - turn nested records into flat, typed tables.
//!
//! This module handles the construction of columnar [`FlatTable`]s from
//! sequences of nested records, with null-marker substitution for missing
//! fields and per-cell diagnostics for malformed ones.
//!
//! ## Build Strategies
//!
//! [`ColumnsFirstBuilder`] extracts one typed column at a time across all
//! records, driven by a pre-computed field schema. [`RowsFirstBuilder`]
//! gathers whole rows first and infers column types at the end; it exists
//! as a cross-check with a different failure surface.

pub mod extract;
pub mod nested;
pub mod rows;
pub mod types;
pub mod writer;

pub use extract::{pick_field, pick_fields, ColumnsFirstBuilder};
pub use nested::{expand_nested, infer_sub_fields, NestedFieldSpec, SubFieldSpec};
pub use rows::RowsFirstBuilder;
pub use types::{
    CellIssue, Column, ColumnData, FlatTable, Flattened, FlattenConfig, IssueKind,
};
pub use writer::TableWriter;
