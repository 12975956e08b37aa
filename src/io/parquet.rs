//! Parquet reader.

use std::collections::HashSet;
use std::path::Path;

use parquet::file::reader::FileReader;
use parquet::file::serialized_reader::SerializedFileReader;
use parquet::record::Field;

use crate::error::{PanelError, PanelResult};
use crate::types::{DataSet, DataType, Schema, Value};

/// Read a Parquet file into a [`DataSet`] shaped by `schema`.
///
/// Columns are matched by leaf column path. Integer columns may be read into `Float64` fields;
/// the reverse is rejected.
pub fn read_parquet(path: impl AsRef<Path>, schema: &Schema) -> PanelResult<DataSet> {
    let reader = SerializedFileReader::try_from(path.as_ref())?;

    let available: HashSet<String> = reader
        .metadata()
        .file_metadata()
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.path().string())
        .collect();
    if let Some(missing) = schema.fields.iter().find(|f| !available.contains(&f.name)) {
        return Err(PanelError::SchemaMismatch {
            message: format!("missing required column '{}'", missing.name),
        });
    }

    let mut rows = Vec::new();
    for (row_idx, record) in reader.into_iter().enumerate() {
        let record = record?;
        let mut row = vec![Value::Null; schema.fields.len()];
        for (name, cell) in record.get_column_iter() {
            let Some(idx) = schema.index_of(name) else {
                continue;
            };
            let field = &schema.fields[idx];
            row[idx] = convert(cell, field.data_type).ok_or_else(|| PanelError::ParseError {
                row: row_idx + 1,
                column: field.name.clone(),
                raw: cell.to_string(),
                message: format!("cannot read as {:?}", field.data_type),
            })?;
        }
        rows.push(row);
    }

    Ok(DataSet::new(schema.clone(), rows))
}

fn convert(cell: &Field, data_type: DataType) -> Option<Value> {
    if matches!(cell, Field::Null) {
        return Some(Value::Null);
    }

    let int = match cell {
        Field::Byte(v) => Some(i64::from(*v)),
        Field::Short(v) => Some(i64::from(*v)),
        Field::Int(v) => Some(i64::from(*v)),
        Field::Long(v) => Some(*v),
        Field::UByte(v) => Some(i64::from(*v)),
        Field::UShort(v) => Some(i64::from(*v)),
        Field::UInt(v) => Some(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v).ok(),
        _ => None,
    };

    match (data_type, cell) {
        (DataType::Utf8, Field::Str(s)) => Some(Value::Utf8(s.clone())),
        (DataType::Bool, Field::Bool(b)) => Some(Value::Bool(*b)),
        (DataType::Int64, _) => int.map(Value::Int64),
        (DataType::Float64, Field::Float(v)) => Some(Value::Float64(f64::from(*v))),
        (DataType::Float64, Field::Double(v)) => Some(Value::Float64(*v)),
        (DataType::Float64, _) => int.map(|v| Value::Float64(v as f64)),
        _ => None,
    }
}
