//! Safe field extraction and the columns-first table builder.

use crate::error::FlattenResult;
use crate::flatten::types::{
    CellIssue, Column, ColumnData, FlatTable, Flattened, FlattenConfig, IssueKind,
};
use crate::schema::FieldSchema;
use serde_json::Value;

pub(crate) static NULL_VALUE: Value = Value::Null;

/// Read one named field from a record.
///
/// An absent key, an explicit JSON null, and a non-object record all read
/// as null; callers never see a missing-key failure.
pub fn pick_field<'a>(record: &'a Value, name: &str) -> &'a Value {
    match record {
        Value::Object(map) => map.get(name).unwrap_or(&NULL_VALUE),
        _ => &NULL_VALUE,
    }
}

/// Read a fixed set of named fields from a record, in requested order.
///
/// The result is parallel to `names`: every requested name yields a slot,
/// with null standing in for anything absent.
pub fn pick_fields<'a, S: AsRef<str>>(record: &'a Value, names: &[S]) -> Vec<&'a Value> {
    names
        .iter()
        .map(|name| pick_field(record, name.as_ref()))
        .collect()
}

/// Builds a [`FlatTable`] one column at a time, across all records, driven
/// by a [`FieldSchema`].
///
/// All extraction decisions are pre-computed in the schema, so the record
/// loop is pure mechanics: extract, parse, push. A malformed value never
/// fails the batch; it becomes a [`CellIssue`] and a null marker.
pub struct ColumnsFirstBuilder {
    schema: FieldSchema,
    config: FlattenConfig,
}

impl ColumnsFirstBuilder {
    pub fn new(schema: FieldSchema, config: FlattenConfig) -> Self {
        ColumnsFirstBuilder { schema, config }
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// Flatten `records` into a table with one row per record and one
    /// column per schema entry, in schema order.
    pub fn build(&self, records: &[Value]) -> FlattenResult<Flattened> {
        let mut table = FlatTable::empty(records.len());
        let mut issues = Vec::new();

        for spec in self.schema.fields() {
            let handler = spec.column_type.handler();
            let mut data = ColumnData::with_capacity(spec.column_type, records.len());

            for (row, record) in records.iter().enumerate() {
                let raw = pick_field(record, &spec.source_name);
                match (handler.parse)(raw) {
                    Ok(cell) => data.push(cell),
                    Err(detail) => {
                        issues.push(CellIssue {
                            row,
                            field: spec.canonical_name.clone(),
                            raw: raw.to_string(),
                            expected: spec.column_type,
                            kind: IssueKind::TypeMismatch,
                            detail,
                        });
                        data.push(handler.null_marker.clone());
                    }
                }
            }

            table.merge(vec![Column::new(spec.canonical_name.clone(), data)])?;
        }

        let table = if self.config.trim_text {
            table.trim_text()
        } else {
            table
        };

        Ok(Flattened { table, issues })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{CellValue, ColumnType, FieldSpec};
    use serde_json::json;

    fn schema(fields: Vec<FieldSpec>) -> FieldSchema {
        FieldSchema::new(fields).unwrap()
    }

    #[test]
    fn test_pick_field_normalizes_absence() {
        let record = json!({"a": 1, "b": null});

        assert_eq!(pick_field(&record, "a"), &json!(1));
        // Explicit null and missing key read identically
        assert_eq!(pick_field(&record, "b"), &Value::Null);
        assert_eq!(pick_field(&record, "c"), &Value::Null);
        // Non-object records have no fields at all
        assert_eq!(pick_field(&json!([1, 2]), "a"), &Value::Null);
    }

    #[test]
    fn test_pick_fields_keeps_requested_order() {
        let record = json!({"a": 1, "b": 2});
        let picked = pick_fields(&record, &["b", "missing", "a"]);

        assert_eq!(picked, vec![&json!(2), &Value::Null, &json!(1)]);
    }

    #[test]
    fn test_worked_example() {
        // Three records, one with an explicit null and one missing a field;
        // both must yield the null marker.
        let records = vec![
            json!({"a": 1, "b": "x"}),
            json!({"a": null, "b": "y"}),
            json!({"a": 3}),
        ];
        let builder = ColumnsFirstBuilder::new(
            schema(vec![
                FieldSpec::new("a", ColumnType::Integer),
                FieldSpec::new("b", ColumnType::Text),
            ]),
            FlattenConfig::default(),
        );

        let flattened = builder.build(&records).unwrap();
        let table = &flattened.table;

        assert_eq!(table.row_count(), 3);
        assert_eq!(table.column_count(), 2);
        assert!(flattened.issues.is_empty());

        assert_eq!(table.cell(0, "a"), Some(CellValue::Int(1)));
        assert_eq!(table.cell(1, "a"), Some(CellValue::Null));
        assert_eq!(table.cell(2, "a"), Some(CellValue::Int(3)));

        assert_eq!(table.cell(0, "b"), Some(CellValue::Text("x".to_string())));
        assert_eq!(table.cell(1, "b"), Some(CellValue::Text("y".to_string())));
        assert_eq!(table.cell(2, "b"), Some(CellValue::Null));
    }

    #[test]
    fn test_type_mismatch_is_reported_not_fatal() {
        let records = vec![json!({"n": "12"}), json!({"n": "not a number"})];
        let builder = ColumnsFirstBuilder::new(
            schema(vec![FieldSpec::new("n", ColumnType::Integer)]),
            FlattenConfig::default(),
        );

        let flattened = builder.build(&records).unwrap();

        assert_eq!(flattened.table.cell(0, "n"), Some(CellValue::Int(12)));
        assert_eq!(flattened.table.cell(1, "n"), Some(CellValue::Null));

        assert_eq!(flattened.issues.len(), 1);
        let issue = &flattened.issues[0];
        assert_eq!(issue.row, 1);
        assert_eq!(issue.field, "n");
        assert_eq!(issue.raw, "\"not a number\"");
        assert_eq!(issue.expected, ColumnType::Integer);
        assert_eq!(issue.kind, IssueKind::TypeMismatch);
    }

    #[test]
    fn test_zero_field_schema() {
        let records = vec![json!({"a": 1}), json!({"a": 2})];
        let builder = ColumnsFirstBuilder::new(schema(vec![]), FlattenConfig::default());

        let flattened = builder.build(&records).unwrap();

        assert_eq!(flattened.table.row_count(), 2);
        assert_eq!(flattened.table.column_count(), 0);
    }

    #[test]
    fn test_round_trip_preserves_multibyte_text() {
        let records = vec![
            json!({"name": "café"}),
            json!({"name": "渋谷"}),
            json!({"name": "Ωμέγα"}),
        ];
        let builder = ColumnsFirstBuilder::new(
            schema(vec![FieldSpec::new("name", ColumnType::Text)]),
            FlattenConfig {
                trim_text: false,
                ..FlattenConfig::default()
            },
        );

        let table = builder.build(&records).unwrap().table;

        assert_eq!(
            table.cell(0, "name"),
            Some(CellValue::Text("café".to_string()))
        );
        assert_eq!(
            table.cell(1, "name"),
            Some(CellValue::Text("渋谷".to_string()))
        );
        assert_eq!(
            table.cell(2, "name"),
            Some(CellValue::Text("Ωμέγα".to_string()))
        );
    }

    #[test]
    fn test_canonical_names_label_columns() {
        let records = vec![json!({"First Name": "Ada"})];
        let builder = ColumnsFirstBuilder::new(
            schema(vec![FieldSpec::new("First Name", ColumnType::Text)]),
            FlattenConfig::default(),
        );

        let table = builder.build(&records).unwrap().table;
        assert!(table.column("first_name").is_some());
        assert_eq!(
            table.cell(0, "first_name"),
            Some(CellValue::Text("Ada".to_string()))
        );
    }
}
