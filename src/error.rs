use thiserror::Error;

/// Convenience result type for table-construction operations.
pub type FlattenResult<T> = Result<T, FlattenError>;

/// Structural errors that abort table construction.
///
/// Per-cell problems (a missing field, a value that does not parse as its
/// declared type) are never errors; they surface as null markers and
/// [`crate::flatten::CellIssue`] diagnostics instead. This enum covers only
/// invariant violations that make the table itself unbuildable.
#[derive(Debug, Error)]
pub enum FlattenError {
    /// A column group being merged does not match the table's row count.
    #[error("row count mismatch merging column '{column}': table has {expected} rows, column has {found}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Two schema entries canonicalize to the same column identifier.
    #[error("schema name collision: '{first}' and '{second}' both canonicalize to '{canonical}'")]
    NameCollision {
        canonical: String,
        first: String,
        second: String,
    },

    /// A column with this name is already present in the table.
    #[error("duplicate column '{column}' in table")]
    DuplicateColumn { column: String },
}
