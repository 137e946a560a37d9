use crate::error::{FlattenError, FlattenResult};
use crate::schema::{CellValue, ColumnType};
use serde::Serialize;
use serde_json::{Map, Value};

/// Configuration for the flattening pipeline.
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Separator between an expansion prefix and a sub-field name.
    pub separator: String,

    /// Trim leading/trailing whitespace from text columns as a final pass.
    pub trim_text: bool,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            separator: String::from("_"),
            trim_text: true,
        }
    }
}

/// Typed columnar storage. `None` is the column's null marker.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Integer(Vec<Option<i64>>),
    Text(Vec<Option<String>>),
}

impl ColumnData {
    pub fn with_capacity(column_type: ColumnType, capacity: usize) -> Self {
        match column_type {
            ColumnType::Integer => ColumnData::Integer(Vec::with_capacity(capacity)),
            ColumnType::Text => ColumnData::Text(Vec::with_capacity(capacity)),
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Integer(_) => ColumnType::Integer,
            ColumnData::Text(_) => ColumnType::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Integer(values) => values.len(),
            ColumnData::Text(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append one cell. A cell of the wrong variant degrades to the null
    /// marker; handlers guarantee matching variants by construction.
    pub fn push(&mut self, cell: CellValue) {
        match (self, cell) {
            (ColumnData::Integer(values), CellValue::Int(n)) => values.push(Some(n)),
            (ColumnData::Integer(values), _) => values.push(None),
            (ColumnData::Text(values), CellValue::Text(s)) => values.push(Some(s)),
            (ColumnData::Text(values), _) => values.push(None),
        }
    }

    /// Cell at `row`, or `None` when out of bounds.
    pub fn get(&self, row: usize) -> Option<CellValue> {
        match self {
            ColumnData::Integer(values) => values.get(row).map(|v| match v {
                Some(n) => CellValue::Int(*n),
                None => CellValue::Null,
            }),
            ColumnData::Text(values) => values.get(row).map(|v| match v {
                Some(s) => CellValue::Text(s.clone()),
                None => CellValue::Null,
            }),
        }
    }
}

/// One named, typed column of a [`FlatTable`].
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Column {
            name: name.into(),
            data,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// What went wrong with one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Value present but not convertible to the declared type.
    TypeMismatch,
    /// Parsed value falls outside the caller-supplied bounds.
    OutOfRange,
}

/// Per-cell diagnostic collected alongside the table instead of aborting
/// the batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellIssue {
    /// Zero-based record index.
    pub row: usize,
    /// Canonical name of the affected column.
    pub field: String,
    /// Raw value rendered as JSON text.
    pub raw: String,
    /// Type the schema declared for the column.
    pub expected: ColumnType,
    pub kind: IssueKind,
    /// Handler message describing the failure.
    pub detail: String,
}

/// A flat, typed, columnar table.
///
/// Invariants: every column's length equals `row_count`, column names are
/// unique, and row `i` of every column refers to source record `i`. A table
/// keeps its row count even with zero columns.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTable {
    row_count: usize,
    columns: Vec<Column>,
}

impl FlatTable {
    /// A table with no columns covering `row_count` records.
    pub fn empty(row_count: usize) -> Self {
        FlatTable {
            row_count,
            columns: Vec::new(),
        }
    }

    pub fn new(row_count: usize, columns: Vec<Column>) -> FlattenResult<Self> {
        let mut table = FlatTable::empty(row_count);
        table.merge(columns)?;
        Ok(table)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Cell at (`row`, `name`), or `None` for an unknown column or
    /// out-of-bounds row.
    pub fn cell(&self, row: usize, name: &str) -> Option<CellValue> {
        self.column(name).and_then(|c| c.data.get(row))
    }

    /// Append column groups strictly by row position.
    ///
    /// Row counts must match exactly; a mismatch indicates an upstream
    /// invariant violation and aborts construction.
    pub fn merge(&mut self, columns: Vec<Column>) -> FlattenResult<()> {
        for column in columns {
            if column.len() != self.row_count {
                return Err(FlattenError::RowCountMismatch {
                    expected: self.row_count,
                    found: column.len(),
                    column: column.name,
                });
            }
            if self.columns.iter().any(|c| c.name == column.name) {
                return Err(FlattenError::DuplicateColumn {
                    column: column.name,
                });
            }
            self.columns.push(column);
        }
        Ok(())
    }

    /// Trim leading/trailing whitespace in every text column, producing a
    /// new table. Idempotent.
    pub fn trim_text(&self) -> FlatTable {
        let columns = self
            .columns
            .iter()
            .map(|column| {
                let data = match &column.data {
                    ColumnData::Text(values) => ColumnData::Text(
                        values
                            .iter()
                            .map(|v| v.as_ref().map(|s| s.trim().to_string()))
                            .collect(),
                    ),
                    other => other.clone(),
                };
                Column::new(column.name.clone(), data)
            })
            .collect();

        FlatTable {
            row_count: self.row_count,
            columns,
        }
    }

    /// Render one row as a JSON object keyed by column name.
    pub fn row_object(&self, row: usize) -> Map<String, Value> {
        let mut object = Map::new();
        for column in &self.columns {
            let cell = column.data.get(row).unwrap_or(CellValue::Null);
            object.insert(column.name.clone(), cell.to_json());
        }
        object
    }
}

/// A built table plus the per-cell diagnostics collected along the way.
#[derive(Debug, Clone)]
pub struct Flattened {
    pub table: FlatTable,
    pub issues: Vec<CellIssue>,
}
