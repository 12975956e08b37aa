//! CSV reader.

use std::io::Read;
use std::path::Path;

use crate::error::{PanelError, PanelResult};
use crate::types::{DataSet, DataType, Schema, Value};

/// Cell spellings read as missing, besides the empty cell.
const NULL_TOKENS: [&str; 4] = ["NA", "NaN", "nan", "null"];

/// Read a CSV file with a header row into a [`DataSet`] shaped by `schema`.
///
/// Extra file columns are ignored; a schema field without a header is a
/// [`PanelError::SchemaMismatch`].
pub fn read_csv(path: impl AsRef<Path>, schema: &Schema) -> PanelResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)?;
    read_csv_from_reader(&mut rdr, schema)
}

/// Read CSV records from an existing reader.
pub fn read_csv_from_reader<R: Read>(rdr: &mut csv::Reader<R>, schema: &Schema) -> PanelResult<DataSet> {
    let headers = rdr.headers()?.clone();
    let positions = schema
        .fields
        .iter()
        .map(|field| {
            headers
                .iter()
                .position(|h| h == field.name)
                .ok_or_else(|| PanelError::SchemaMismatch {
                    message: format!(
                        "missing required column '{}'. headers={:?}",
                        field.name,
                        headers.iter().collect::<Vec<_>>()
                    ),
                })
        })
        .collect::<PanelResult<Vec<usize>>>()?;

    let mut rows = Vec::new();
    for (record_idx, record) in rdr.records().enumerate() {
        let record = record?;
        // 1-based, counting the header line.
        let line = record_idx + 2;
        let row = schema
            .fields
            .iter()
            .zip(&positions)
            .map(|(field, &pos)| {
                parse_cell(record.get(pos).unwrap_or(""), field.data_type).map_err(|message| {
                    PanelError::ParseError {
                        row: line,
                        column: field.name.clone(),
                        raw: record.get(pos).unwrap_or("").to_string(),
                        message,
                    }
                })
            })
            .collect::<PanelResult<Vec<Value>>>()?;
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn parse_cell(raw: &str, data_type: DataType) -> Result<Value, String> {
    let cell = raw.trim();
    if cell.is_empty() || NULL_TOKENS.contains(&cell) {
        return Ok(Value::Null);
    }

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(cell.to_string())),
        DataType::Int64 => cell.parse().map(Value::Int64).map_err(|e| format!("{e}")),
        DataType::Float64 => cell.parse().map(Value::Float64).map_err(|e| format!("{e}")),
        DataType::Bool => match cell.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" | "yes" | "y" => Ok(Value::Bool(true)),
            "false" | "f" | "0" | "no" | "n" => Ok(Value::Bool(false)),
            _ => Err("expected bool (true/false/1/0/yes/no)".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_cell, read_csv_from_reader};
    use crate::types::{DataType, Field, Schema, Value};

    #[test]
    fn null_tokens_become_null_for_every_type() {
        for t in [DataType::Int64, DataType::Float64, DataType::Bool, DataType::Utf8] {
            assert_eq!(parse_cell("NA", t), Ok(Value::Null));
            assert_eq!(parse_cell("  ", t), Ok(Value::Null));
        }
    }

    #[test]
    fn reads_reordered_columns_and_reports_line_numbers() {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Utf8),
            Field::new("year", DataType::Int64),
        ]);
        let input = "year,extra,id\n2020,z,A\noops,z,B\n";
        let mut rdr = csv::ReaderBuilder::new().from_reader(input.as_bytes());

        let err = read_csv_from_reader(&mut rdr, &schema).unwrap_err().to_string();
        assert!(err.contains("row 3 column 'year'"), "{err}");

        let mut rdr = csv::ReaderBuilder::new().from_reader("year,id\n2020,A\n".as_bytes());
        let ds = read_csv_from_reader(&mut rdr, &schema).unwrap();
        assert_eq!(ds.rows, vec![vec![Value::Utf8("A".to_string()), Value::Int64(2020)]]);
    }
}
