//! Conversion between [`DataSet`] and `polars::DataFrame` (Cargo feature `polars`).
//!
//! Polars users can convert into a [`DataSet`], run the panel helpers, and convert back.
//! Polars dtypes without a [`DataType`] counterpart are read as their string rendering.

use polars::prelude::{Column, DataFrame, DataType as PolarsType, NamedFrom};

use crate::error::PanelResult;
use crate::types::{DataSet, DataType, Field, Schema, Value};

impl DataSet {
    /// Build a polars `DataFrame` with one column per field.
    pub fn to_polars(&self) -> PanelResult<DataFrame> {
        let mut columns = Vec::with_capacity(self.schema.fields.len());
        for (idx, field) in self.schema.fields.iter().enumerate() {
            let name = field.name.as_str().into();
            let cells = self.rows.iter().map(|row| &row[idx]);
            let column = match field.data_type {
                DataType::Int64 => {
                    let v: Vec<Option<i64>> = cells
                        .map(|c| match c {
                            Value::Int64(v) => Some(*v),
                            _ => None,
                        })
                        .collect();
                    Column::new(name, v)
                }
                DataType::Float64 => {
                    let v: Vec<Option<f64>> = cells.map(Value::as_f64).collect();
                    Column::new(name, v)
                }
                DataType::Bool => {
                    let v: Vec<Option<bool>> = cells
                        .map(|c| match c {
                            Value::Bool(b) => Some(*b),
                            _ => None,
                        })
                        .collect();
                    Column::new(name, v)
                }
                DataType::Utf8 => {
                    let v: Vec<Option<String>> = cells
                        .map(|c| match c {
                            Value::Utf8(s) => Some(s.clone()),
                            _ => None,
                        })
                        .collect();
                    Column::new(name, v)
                }
            };
            columns.push(column);
        }
        Ok(DataFrame::new(columns)?)
    }

    /// Build a [`DataSet`] from a polars `DataFrame`.
    pub fn from_polars(df: &DataFrame) -> PanelResult<Self> {
        let height = df.height();
        let mut fields = Vec::with_capacity(df.width());
        let mut rows: Vec<Vec<Value>> = (0..height).map(|_| Vec::with_capacity(df.width())).collect();

        for column in df.get_columns() {
            let series = column.as_materialized_series();
            let (data_type, values): (DataType, Vec<Value>) = match series.dtype() {
                PolarsType::Boolean => (
                    DataType::Bool,
                    series.bool()?.into_iter().map(Value::from).collect(),
                ),
                PolarsType::Float32 | PolarsType::Float64 => (
                    DataType::Float64,
                    series
                        .cast(&PolarsType::Float64)?
                        .f64()?
                        .into_iter()
                        .map(Value::from)
                        .collect(),
                ),
                dt if dt.is_integer() => (
                    DataType::Int64,
                    series
                        .cast(&PolarsType::Int64)?
                        .i64()?
                        .into_iter()
                        .map(Value::from)
                        .collect(),
                ),
                _ => (
                    DataType::Utf8,
                    series
                        .cast(&PolarsType::String)?
                        .str()?
                        .into_iter()
                        .map(Value::from)
                        .collect(),
                ),
            };

            fields.push(Field::new(column.name().as_str(), data_type));
            for (row, value) in rows.iter_mut().zip(values) {
                row.push(value);
            }
        }

        Ok(DataSet::new(Schema::new(fields), rows))
    }
}
