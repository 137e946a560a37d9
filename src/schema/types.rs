//! Column types, the type-handler registry, and field schemas.

use crate::error::{FlattenError, FlattenResult};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// Pre-compiled patterns shared by canonicalization and integer detection
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

static INT_LITERAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

/// Scalar type of a column.
///
/// The set is deliberately closed to the two types the domain needs; each
/// variant maps to one [`TypeHandler`] in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Integer,
    Text,
}

impl ColumnType {
    /// Look up the handler for this type.
    pub fn handler(self) -> &'static TypeHandler {
        match self {
            ColumnType::Integer => &INTEGER_HANDLER,
            ColumnType::Text => &TEXT_HANDLER,
        }
    }
}

/// A scalar cell in transit between a type handler and its column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Null,
    Int(i64),
    Text(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Render this cell as a generic JSON value.
    pub fn to_json(&self) -> Value {
        match self {
            CellValue::Null => Value::Null,
            CellValue::Int(n) => Value::Number((*n).into()),
            CellValue::Text(s) => Value::String(s.clone()),
        }
    }
}

/// Registry entry for one column type: how to parse a raw value into a cell,
/// what the type's null marker is, and how to validate a parsed cell against
/// caller-supplied bounds.
///
/// Handlers are looked up through [`ColumnType::handler`], never by name.
#[derive(Debug)]
pub struct TypeHandler {
    pub name: &'static str,
    pub null_marker: CellValue,
    pub parse: fn(&Value) -> Result<CellValue, String>,
    pub validate: fn(&CellValue, Option<(i64, i64)>) -> Result<(), String>,
}

static INTEGER_HANDLER: TypeHandler = TypeHandler {
    name: "integer",
    null_marker: CellValue::Null,
    parse: parse_integer,
    validate: validate_integer,
};

static TEXT_HANDLER: TypeHandler = TypeHandler {
    name: "text",
    null_marker: CellValue::Null,
    parse: parse_text,
    validate: validate_ok,
};

fn parse_integer(value: &Value) -> Result<CellValue, String> {
    match value {
        Value::Null => Ok(CellValue::Null),
        Value::Number(n) => n
            .as_i64()
            .map(CellValue::Int)
            .ok_or_else(|| format!("number {n} does not fit an i64")),
        Value::String(s) => {
            let trimmed = s.trim();
            // An empty string is "present but empty" and reads as the null marker
            if trimmed.is_empty() {
                return Ok(CellValue::Null);
            }
            if is_integer_literal(trimmed) {
                trimmed
                    .parse::<i64>()
                    .map(CellValue::Int)
                    .map_err(|e| e.to_string())
            } else {
                Err(format!("string {trimmed:?} is not an integer literal"))
            }
        }
        other => Err(format!("{} is not an integer", json_kind(other))),
    }
}

fn parse_text(value: &Value) -> Result<CellValue, String> {
    match value {
        Value::Null => Ok(CellValue::Null),
        Value::String(s) => Ok(CellValue::Text(s.clone())),
        // Scalars keep their JSON rendering so mixed-type columns lose no data
        Value::Number(n) => Ok(CellValue::Text(n.to_string())),
        Value::Bool(b) => Ok(CellValue::Text(b.to_string())),
        other => Err(format!("{} cannot be a text cell", json_kind(other))),
    }
}

fn validate_integer(cell: &CellValue, bounds: Option<(i64, i64)>) -> Result<(), String> {
    if let (CellValue::Int(n), Some((lo, hi))) = (cell, bounds) {
        if *n < lo || *n > hi {
            return Err(format!("{n} outside [{lo}, {hi}]"));
        }
    }
    Ok(())
}

fn validate_ok(_cell: &CellValue, _bounds: Option<(i64, i64)>) -> Result<(), String> {
    Ok(())
}

/// True if `text` is an optionally-signed run of digits that fits an i64.
pub(crate) fn is_integer_literal(text: &str) -> bool {
    INT_LITERAL.is_match(text) && text.parse::<i64>().is_ok()
}

/// Short name for a JSON value's shape, for diagnostics.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Canonical column identifier: trimmed, lower-cased, whitespace runs
/// replaced with underscores.
pub fn canonical_name(source: &str) -> String {
    WHITESPACE_RUN
        .replace_all(source.trim(), "_")
        .to_lowercase()
}

/// One schema entry: the field to extract and the column it becomes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Field name as it appears in the source records.
    #[serde(rename = "name")]
    pub source_name: String,

    /// Canonicalized column identifier.
    #[serde(rename = "canonical")]
    pub canonical_name: String,

    /// Scalar type of the resulting column.
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

impl FieldSpec {
    pub fn new(source_name: impl Into<String>, column_type: ColumnType) -> Self {
        let source_name = source_name.into();
        let canonical_name = canonical_name(&source_name);
        FieldSpec {
            source_name,
            canonical_name,
            column_type,
        }
    }
}

/// Ordered field declarations driving a columns-first build.
///
/// Canonical names are unique; construction fails otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSchema {
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    pub fn new(fields: Vec<FieldSpec>) -> FlattenResult<Self> {
        let mut seen: HashMap<String, String> = HashMap::new();
        for spec in &fields {
            if let Some(first) =
                seen.insert(spec.canonical_name.clone(), spec.source_name.clone())
            {
                return Err(FlattenError::NameCollision {
                    canonical: spec.canonical_name.clone(),
                    first,
                    second: spec.source_name.clone(),
                });
            }
        }
        Ok(FieldSchema { fields })
    }

    pub fn empty() -> Self {
        FieldSchema { fields: Vec::new() }
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Index of a field by canonical name, if present.
    pub fn index_of(&self, canonical: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.canonical_name == canonical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_name() {
        assert_eq!(canonical_name("  First Name "), "first_name");
        assert_eq!(canonical_name("Incident\tNumber"), "incident_number");
        assert_eq!(canonical_name("already_fine"), "already_fine");
    }

    #[test]
    fn test_schema_collision_is_fatal() {
        let result = FieldSchema::new(vec![
            FieldSpec::new("First Name", ColumnType::Text),
            FieldSpec::new("first  name", ColumnType::Text),
        ]);

        match result {
            Err(FlattenError::NameCollision { canonical, .. }) => {
                assert_eq!(canonical, "first_name");
            }
            other => panic!("expected NameCollision, got {other:?}"),
        }
    }

    #[test]
    fn test_integer_handler() {
        let handler = ColumnType::Integer.handler();

        assert_eq!((handler.parse)(&json!(42)), Ok(CellValue::Int(42)));
        assert_eq!((handler.parse)(&json!("  -7 ")), Ok(CellValue::Int(-7)));
        assert_eq!((handler.parse)(&json!(null)), Ok(CellValue::Null));
        assert_eq!((handler.parse)(&json!("")), Ok(CellValue::Null));
        assert!((handler.parse)(&json!("abc")).is_err());
        assert!((handler.parse)(&json!(1.5)).is_err());
    }

    #[test]
    fn test_text_handler_coerces_scalars() {
        let handler = ColumnType::Text.handler();

        assert_eq!(
            (handler.parse)(&json!("hello")),
            Ok(CellValue::Text("hello".to_string()))
        );
        assert_eq!(
            (handler.parse)(&json!(30)),
            Ok(CellValue::Text("30".to_string()))
        );
        assert_eq!(
            (handler.parse)(&json!(true)),
            Ok(CellValue::Text("true".to_string()))
        );
        assert!((handler.parse)(&json!([1, 2])).is_err());
        assert!((handler.parse)(&json!({"a": 1})).is_err());
    }

    #[test]
    fn test_integer_bounds_validation() {
        let handler = ColumnType::Integer.handler();

        assert!((handler.validate)(&CellValue::Int(50), Some((0, 100))).is_ok());
        assert!((handler.validate)(&CellValue::Int(101), Some((0, 100))).is_err());
        // Null markers and unbounded fields always pass
        assert!((handler.validate)(&CellValue::Null, Some((0, 100))).is_ok());
        assert!((handler.validate)(&CellValue::Int(101), None).is_ok());
    }

    #[test]
    fn test_column_type_serde_names() {
        assert_eq!(serde_json::to_string(&ColumnType::Integer).unwrap(), "\"integer\"");
        assert_eq!(
            serde_json::from_str::<ColumnType>("\"text\"").unwrap(),
            ColumnType::Text
        );
    }
}
