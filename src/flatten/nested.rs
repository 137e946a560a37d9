//! Expansion of nested sub-record fields into prefixed flat columns.
//!
//! A declared field may hold a nested record directly, or a JSON-string
//! encoding of one. Either way it expands into one column per sub-field,
//! named `<prefix><separator><sub_field>`, merged into the main table by
//! strict row position.

use crate::error::FlattenResult;
use crate::flatten::extract::{pick_field, NULL_VALUE};
use crate::flatten::types::{CellIssue, Column, ColumnData, FlattenConfig, IssueKind};
use crate::schema::infer::{discover_fields, infer_schema};
use crate::schema::types::json_kind;
use crate::schema::{canonical_name, ColumnType};
use serde_json::Value;

/// One sub-field to extract from the nested record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFieldSpec {
    /// Key within the nested record.
    pub name: String,
    pub column_type: ColumnType,
    /// Inclusive bounds for integer sub-fields; out-of-range values are
    /// reported, not dropped.
    pub bounds: Option<(i64, i64)>,
}

impl SubFieldSpec {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        SubFieldSpec {
            name: name.into(),
            column_type,
            bounds: None,
        }
    }

    pub fn with_bounds(mut self, lo: i64, hi: i64) -> Self {
        self.bounds = Some((lo, hi));
        self
    }
}

/// A nested field and how to expand it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedFieldSpec {
    /// Field name in the outer record.
    pub field: String,
    /// Prefix for the generated column names.
    pub prefix: String,
    pub sub_fields: Vec<SubFieldSpec>,
}

impl NestedFieldSpec {
    pub fn new(
        field: impl Into<String>,
        prefix: impl Into<String>,
        sub_fields: Vec<SubFieldSpec>,
    ) -> Self {
        NestedFieldSpec {
            field: field.into(),
            prefix: prefix.into(),
            sub_fields,
        }
    }
}

/// Expand one nested field across all records into a group of typed
/// columns, each `records.len()` rows long.
///
/// Rows where the field is absent or null yield null markers in every
/// sub-column; rows holding anything other than a record (or a decodable
/// string encoding of one) additionally yield a [`IssueKind::TypeMismatch`]
/// diagnostic. Merge the returned group with
/// [`crate::flatten::FlatTable::merge`], which enforces the row-count match.
pub fn expand_nested(
    records: &[Value],
    spec: &NestedFieldSpec,
    config: &FlattenConfig,
) -> FlattenResult<(Vec<Column>, Vec<CellIssue>)> {
    let mut issues = Vec::new();

    // Decode the nested value once per record
    let mut decoded: Vec<Option<Value>> = Vec::with_capacity(records.len());
    for (row, record) in records.iter().enumerate() {
        let raw = pick_field(record, &spec.field);
        match decode_sub_record(raw) {
            Ok(sub_record) => decoded.push(sub_record),
            Err(detail) => {
                issues.push(CellIssue {
                    row,
                    field: spec.field.clone(),
                    raw: raw.to_string(),
                    expected: ColumnType::Text,
                    kind: IssueKind::TypeMismatch,
                    detail,
                });
                decoded.push(None);
            }
        }
    }

    let mut columns = Vec::with_capacity(spec.sub_fields.len());
    for sub in &spec.sub_fields {
        let column_name = format!(
            "{}{}{}",
            spec.prefix,
            config.separator,
            canonical_name(&sub.name)
        );
        let handler = sub.column_type.handler();
        let mut data = ColumnData::with_capacity(sub.column_type, records.len());

        for (row, sub_record) in decoded.iter().enumerate() {
            let raw = match sub_record {
                Some(value) => pick_field(value, &sub.name),
                None => &NULL_VALUE,
            };
            match (handler.parse)(raw) {
                Ok(cell) => {
                    if let Err(detail) = (handler.validate)(&cell, sub.bounds) {
                        issues.push(CellIssue {
                            row,
                            field: column_name.clone(),
                            raw: raw.to_string(),
                            expected: sub.column_type,
                            kind: IssueKind::OutOfRange,
                            detail,
                        });
                    }
                    data.push(cell);
                }
                Err(detail) => {
                    issues.push(CellIssue {
                        row,
                        field: column_name.clone(),
                        raw: raw.to_string(),
                        expected: sub.column_type,
                        kind: IssueKind::TypeMismatch,
                        detail,
                    });
                    data.push(handler.null_marker.clone());
                }
            }
        }

        columns.push(Column::new(column_name, data));
    }

    Ok((columns, issues))
}

/// Discover and type the sub-fields of a nested field, for callers without
/// a hand-written sub-schema. Undecodable rows are skipped here; expansion
/// reports them.
pub fn infer_sub_fields(records: &[Value], field: &str) -> FlattenResult<Vec<SubFieldSpec>> {
    let sub_records: Vec<Value> = records
        .iter()
        .filter_map(|record| decode_sub_record(pick_field(record, field)).ok().flatten())
        .collect();

    let names = discover_fields(&sub_records);
    let schema = infer_schema(&sub_records, &names)?;

    Ok(schema
        .fields()
        .iter()
        .map(|spec| SubFieldSpec::new(spec.source_name.clone(), spec.column_type))
        .collect())
}

/// Normalize a nested field's raw value to an optional record.
///
/// Strings are decoded as JSON; blank strings count as absent.
fn decode_sub_record(raw: &Value) -> Result<Option<Value>, String> {
    match raw {
        Value::Null => Ok(None),
        Value::Object(_) => Ok(Some(raw.clone())),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(Value::Object(map)) => Ok(Some(Value::Object(map))),
                Ok(other) => Err(format!(
                    "encoded value is {} rather than a record",
                    json_kind(&other)
                )),
                Err(err) => Err(format!("not a valid encoded record: {err}")),
            }
        }
        other => Err(format!(
            "{} cannot be expanded into sub-columns",
            json_kind(other)
        )),
    }
}
