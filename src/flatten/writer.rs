use crate::flatten::types::FlatTable;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::io::Write;

/// Writes a [`FlatTable`] to a stream, row-major or column-major.
pub struct TableWriter<W: Write> {
    writer: W,
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W) -> Self {
        TableWriter { writer }
    }

    /// Write one JSON object per row (JSON Lines), keyed by column name.
    pub fn write_rows(&mut self, table: &FlatTable) -> Result<()> {
        for row in 0..table.row_count() {
            let object = table.row_object(row);
            let line = serde_json::to_string(&Value::Object(object))
                .context("Failed to serialize row")?;
            writeln!(self.writer, "{}", line).context("Failed to write row")?;
        }
        Ok(())
    }

    /// Write the whole table as one column-major JSON object.
    pub fn write_columns(&mut self, table: &FlatTable) -> Result<()> {
        let mut object = Map::new();
        for column in table.columns() {
            let values: Vec<Value> = (0..table.row_count())
                .map(|row| {
                    column
                        .data
                        .get(row)
                        .map(|cell| cell.to_json())
                        .unwrap_or(Value::Null)
                })
                .collect();
            object.insert(column.name.clone(), Value::Array(values));
        }

        let text = serde_json::to_string_pretty(&Value::Object(object))
            .context("Failed to serialize columns")?;
        writeln!(self.writer, "{}", text).context("Failed to write columns")?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("Failed to flush table writer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::types::{Column, ColumnData};

    fn sample_table() -> FlatTable {
        FlatTable::new(
            2,
            vec![
                Column::new("id", ColumnData::Integer(vec![Some(1), None])),
                Column::new(
                    "name",
                    ColumnData::Text(vec![Some("Alice".to_string()), Some("Bob".to_string())]),
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_write_rows() {
        let mut buffer = Vec::new();
        let mut writer = TableWriter::new(&mut buffer);

        writer.write_rows(&sample_table()).unwrap();
        writer.flush().unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"id\":1"));
        assert!(lines[1].contains("\"id\":null"));
        assert!(lines[1].contains("Bob"));
    }

    #[test]
    fn test_write_columns() {
        let mut buffer = Vec::new();
        let mut writer = TableWriter::new(&mut buffer);

        writer.write_columns(&sample_table()).unwrap();

        let output = String::from_utf8(buffer).unwrap();
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["id"][0], 1);
        assert_eq!(value["id"][1], Value::Null);
        assert_eq!(value["name"][1], "Bob");
    }
}
