//! Core data model: the in-memory [`DataSet`] the panel operations work on.
//!
//! A [`DataSet`] is a [`Schema`] (an ordered list of typed [`Field`]s) plus row-major storage of
//! typed [`Value`]s. Missing observations are [`Value::Null`] whatever the column type.

use std::fmt;

use crate::error::{PanelError, PanelResult};

/// Logical data type for a schema field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Whether values of this type take part in arithmetic.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Int64 | Self::Float64)
    }
}

/// A single named, typed field in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Field/column name.
    pub name: String,
    /// Field data type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// Ordered list of fields describing the shape of a [`DataSet`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Iterate field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a field by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Like [`Self::index_of`], but a missing name is a [`PanelError::MissingColumn`].
    pub fn require(&self, name: &str) -> PanelResult<usize> {
        self.index_of(name)
            .ok_or_else(|| PanelError::missing_column(name, self.field_names()))
    }
}

/// A single typed value in a [`DataSet`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// The type of a non-null value.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Null => None,
            Self::Int64(_) => Some(DataType::Int64),
            Self::Float64(_) => Some(DataType::Float64),
            Self::Bool(_) => Some(DataType::Bool),
            Self::Utf8(_) => Some(DataType::Utf8),
        }
    }

    /// Numeric view of the value. Booleans count as `0.0` / `1.0`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int64(v) => Some(*v as f64),
            Self::Float64(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Null | Self::Utf8(_) => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Utf8(s) => write!(f, "'{s}'"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int64(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int64(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Utf8(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// In-memory tabular dataset.
///
/// Rows are stored as `Vec<Vec<Value>>` in the same order as the [`Schema`] fields.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Build a dataset column by column.
    ///
    /// Every column must have the same length, column names must be unique, and every non-null
    /// cell must match its column's type. `Int64` cells in a `Float64` column are widened.
    ///
    /// ```rust
    /// use rust_panel_data::types::{DataSet, DataType, Value};
    ///
    /// let ds = DataSet::from_columns(vec![
    ///     ("id", DataType::Utf8, vec!["A".into(), "B".into()]),
    ///     ("year", DataType::Int64, vec![Value::Int64(2020), Value::Int64(2020)]),
    /// ])
    /// .unwrap();
    /// assert_eq!(ds.row_count(), 2);
    /// ```
    pub fn from_columns<S: Into<String>>(
        columns: Vec<(S, DataType, Vec<Value>)>,
    ) -> PanelResult<Self> {
        let row_count = columns.first().map_or(0, |(_, _, values)| values.len());
        let mut fields = Vec::with_capacity(columns.len());
        let mut rows: Vec<Vec<Value>> = (0..row_count)
            .map(|_| Vec::with_capacity(columns.len()))
            .collect();

        for (name, data_type, values) in columns {
            let name = name.into();
            if values.len() != row_count {
                return Err(PanelError::validation(format!(
                    "column '{name}' has {} values, expected {row_count}",
                    values.len()
                )));
            }
            if fields.iter().any(|f: &Field| f.name == name) {
                return Err(PanelError::validation(format!(
                    "column '{name}' given more than once"
                )));
            }
            for (row_idx, (row, value)) in rows.iter_mut().zip(values).enumerate() {
                row.push(conform(&name, data_type, row_idx, value)?);
            }
            fields.push(Field::new(name, data_type));
        }

        Ok(Self::new(Schema::new(fields), rows))
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Iterate the values of one column, in row order.
    pub fn column(&self, name: &str) -> PanelResult<impl Iterator<Item = &Value>> {
        let idx = self.schema.require(name)?;
        Ok(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Value at `(row, column)`, if both exist.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.schema.index_of(column)?;
        self.rows.get(row).and_then(|r| r.get(idx))
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}

/// Check `value` against the column type, widening integers stored in a float column.
fn conform(column: &str, data_type: DataType, row: usize, value: Value) -> PanelResult<Value> {
    match (data_type, value) {
        (DataType::Float64, Value::Int64(v)) => Ok(Value::Float64(v as f64)),
        (_, Value::Null) => Ok(Value::Null),
        (expected, value) if value.data_type() == Some(expected) => Ok(value),
        (expected, value) => Err(PanelError::type_mismatch(
            column,
            format!("row {row} holds {value}, expected {expected:?}"),
        )),
    }
}
