//! Two-phase schema inference.
//!
//! Phase one builds a provisional all-text table over the requested fields.
//! Phase two runs a per-column accumulator over the realized table and
//! settles each column on Integer or Text. Callers then re-run the
//! columns-first build with the real schema; [`flatten_inferred`] chains
//! all three steps.

use crate::error::FlattenResult;
use crate::flatten::extract::ColumnsFirstBuilder;
use crate::flatten::types::{ColumnData, FlattenConfig, Flattened};
use crate::schema::types::{is_integer_literal, ColumnType, FieldSchema, FieldSpec};
use serde_json::Value;
use std::collections::HashSet;

/// Accumulated evidence about one column's values.
#[derive(Debug, Default)]
pub(crate) struct ColumnStats {
    non_null: usize,
    integer_like: usize,
}

impl ColumnStats {
    /// Observe one provisional text cell. Null markers and blank strings
    /// carry no type evidence.
    pub(crate) fn observe_text(&mut self, cell: Option<&str>) {
        let Some(text) = cell else { return };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return;
        }
        self.non_null += 1;
        if is_integer_literal(trimmed) {
            self.integer_like += 1;
        }
    }

    /// The type this column settled into: Integer iff every observed value
    /// was an integer literal and there was at least one.
    pub(crate) fn column_type(&self) -> ColumnType {
        if self.non_null > 0 && self.integer_like == self.non_null {
            ColumnType::Integer
        } else {
            ColumnType::Text
        }
    }
}

/// Union of top-level object keys across all records, in order of first
/// appearance.
pub fn discover_fields(records: &[Value]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();

    for record in records {
        if let Value::Object(map) = record {
            for key in map.keys() {
                if seen.insert(key.clone()) {
                    names.push(key.clone());
                }
            }
        }
    }

    names
}

/// Infer a [`FieldSchema`] for the named fields from the records themselves.
pub fn infer_schema<S: AsRef<str>>(
    records: &[Value],
    field_names: &[S],
) -> FlattenResult<FieldSchema> {
    // Phase one: best-effort pass with every field declared as text
    let provisional_schema = FieldSchema::new(
        field_names
            .iter()
            .map(|name| FieldSpec::new(name.as_ref(), ColumnType::Text))
            .collect(),
    )?;
    let provisional = ColumnsFirstBuilder::new(
        provisional_schema,
        FlattenConfig {
            trim_text: false,
            ..FlattenConfig::default()
        },
    )
    .build(records)?;

    // Phase two: settle each realized column on a type
    let mut specs = Vec::with_capacity(field_names.len());
    for (index, name) in field_names.iter().enumerate() {
        let mut stats = ColumnStats::default();
        if let ColumnData::Text(values) = &provisional.table.columns()[index].data {
            for value in values {
                stats.observe_text(value.as_deref());
            }
        }
        specs.push(FieldSpec::new(name.as_ref(), stats.column_type()));
    }

    FieldSchema::new(specs)
}

/// Discover fields, infer their schema, and re-run the typed build: the
/// full two-phase pipeline in one call.
pub fn flatten_inferred(
    records: &[Value],
    config: FlattenConfig,
) -> FlattenResult<(FieldSchema, Flattened)> {
    let field_names = discover_fields(records);
    let schema = infer_schema(records, &field_names)?;
    let flattened = ColumnsFirstBuilder::new(schema.clone(), config).build(records)?;
    Ok((schema, flattened))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CellValue;
    use serde_json::json;

    #[test]
    fn test_infers_integer_from_numbers_and_numeric_strings() {
        let records = vec![
            json!({"id": 1, "name": "Alice"}),
            json!({"id": "2", "name": "Bob"}),
            json!({"id": null, "name": "Eve"}),
        ];

        let schema = infer_schema(&records, &["id", "name"]).unwrap();
        assert_eq!(schema.fields()[0].column_type, ColumnType::Integer);
        assert_eq!(schema.fields()[1].column_type, ColumnType::Text);
    }

    #[test]
    fn test_mixed_column_settles_on_text() {
        let records = vec![json!({"v": 1}), json!({"v": "x"})];

        let schema = infer_schema(&records, &["v"]).unwrap();
        assert_eq!(schema.fields()[0].column_type, ColumnType::Text);
    }

    #[test]
    fn test_all_null_column_defaults_to_text() {
        let records = vec![json!({"v": null}), json!({})];

        let schema = infer_schema(&records, &["v"]).unwrap();
        assert_eq!(schema.fields()[0].column_type, ColumnType::Text);
    }

    #[test]
    fn test_blank_strings_carry_no_evidence() {
        let records = vec![json!({"v": ""}), json!({"v": "  "}), json!({"v": "7"})];

        let schema = infer_schema(&records, &["v"]).unwrap();
        assert_eq!(schema.fields()[0].column_type, ColumnType::Integer);
    }

    #[test]
    fn test_discover_fields_first_seen_order() {
        let records = vec![
            json!({"a": 1, "b": 2}),
            json!({"b": 3, "c": 4}),
            json!("not an object"),
        ];

        assert_eq!(discover_fields(&records), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_flatten_inferred_end_to_end() {
        let records = vec![
            json!({"Incident Number": 101, "City": "NYC"}),
            json!({"Incident Number": "102", "City": "  LA "}),
        ];

        let (schema, flattened) = flatten_inferred(&records, FlattenConfig::default()).unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(flattened.table.row_count(), 2);
        assert_eq!(
            flattened.table.cell(1, "incident_number"),
            Some(CellValue::Int(102))
        );
        // Trim pass applied to the rebuilt text column
        assert_eq!(
            flattened.table.cell(1, "city"),
            Some(CellValue::Text("LA".to_string()))
        );
        assert!(flattened.issues.is_empty());
    }
}
