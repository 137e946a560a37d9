//! Rows-first table construction.
//!
//! The comparison strategy to [`crate::flatten::ColumnsFirstBuilder`]: every
//! record is extracted into one row of raw values first, and column types are
//! inferred once over the fully assembled rows. The end state matches the
//! columns-first build with an inferred schema; the intermediate
//! representation and the point where type conflicts surface differ.

use crate::error::FlattenResult;
use crate::flatten::extract::pick_fields;
use crate::flatten::types::{
    CellIssue, Column, ColumnData, FlatTable, Flattened, FlattenConfig, IssueKind,
};
use crate::schema::infer::ColumnStats;
use crate::schema::{CellValue, ColumnType, FieldSchema, FieldSpec};
use serde_json::Value;

pub struct RowsFirstBuilder {
    config: FlattenConfig,
}

impl RowsFirstBuilder {
    pub fn new(config: FlattenConfig) -> Self {
        RowsFirstBuilder { config }
    }

    /// Gather all rows, infer each column's type over the assembled rows,
    /// then convert with the type handlers.
    pub fn build<S: AsRef<str>>(
        &self,
        records: &[Value],
        field_names: &[S],
    ) -> FlattenResult<Flattened> {
        // Stage one: one row of raw values per record, in field order
        let rows: Vec<Vec<&Value>> = records
            .iter()
            .map(|record| pick_fields(record, field_names))
            .collect();

        // Stage two: type inference over the gathered rows, one column at a
        // time, seeing exactly what a provisional text pass would have seen
        let text = ColumnType::Text.handler();
        let mut specs = Vec::with_capacity(field_names.len());
        for (index, name) in field_names.iter().enumerate() {
            let mut stats = ColumnStats::default();
            for row in &rows {
                match (text.parse)(row[index]) {
                    Ok(CellValue::Text(s)) => stats.observe_text(Some(&s)),
                    _ => stats.observe_text(None),
                }
            }
            specs.push(FieldSpec::new(name.as_ref(), stats.column_type()));
        }
        let schema = FieldSchema::new(specs)?;

        // Stage three: typed conversion
        let mut table = FlatTable::empty(records.len());
        let mut issues = Vec::new();
        for (index, spec) in schema.fields().iter().enumerate() {
            let handler = spec.column_type.handler();
            let mut data = ColumnData::with_capacity(spec.column_type, rows.len());

            for (row_index, row) in rows.iter().enumerate() {
                match (handler.parse)(row[index]) {
                    Ok(cell) => data.push(cell),
                    Err(detail) => {
                        issues.push(CellIssue {
                            row: row_index,
                            field: spec.canonical_name.clone(),
                            raw: row[index].to_string(),
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
    use crate::flatten::extract::ColumnsFirstBuilder;
    use crate::schema::infer::infer_schema;
    use serde_json::json;

    fn fixture() -> Vec<Value> {
        vec![
            json!({"id": 1, "name": " Alice ", "score": "10"}),
            json!({"id": "2", "name": "Bob"}),
            json!({"id": null, "name": "Eve", "score": 30}),
        ]
    }

    #[test]
    fn test_matches_columns_first_with_inferred_schema() {
        let records = fixture();
        let names = vec!["id".to_string(), "name".to_string(), "score".to_string()];

        let rows_first = RowsFirstBuilder::new(FlattenConfig::default())
            .build(&records, &names)
            .unwrap();

        let schema = infer_schema(&records, &names).unwrap();
        let columns_first = ColumnsFirstBuilder::new(schema, FlattenConfig::default())
            .build(&records)
            .unwrap();

        assert_eq!(rows_first.table, columns_first.table);
        assert_eq!(rows_first.issues, columns_first.issues);
    }

    #[test]
    fn test_type_conflict_surfaces_after_assembly() {
        // The conflicting value sits in the last record; the whole column
        // still settles on text rather than failing part-way
        let records = vec![json!({"v": 1}), json!({"v": 2}), json!({"v": "three"})];
        let names = vec!["v".to_string()];

        let flattened = RowsFirstBuilder::new(FlattenConfig::default())
            .build(&records, &names)
            .unwrap();

        assert_eq!(
            flattened.table.cell(0, "v"),
            Some(CellValue::Text("1".to_string()))
        );
        assert_eq!(
            flattened.table.cell(2, "v"),
            Some(CellValue::Text("three".to_string()))
        );
        assert!(flattened.issues.is_empty());
    }
}
