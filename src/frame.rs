//! The table primitives the panel operations are written against.
//!
//! [`PanelFrame`] is the seam between the algorithms in [`crate::shift`] / [`crate::mutate`] and
//! whatever table representation backs them. The crate implements it for [`DataSet`].

use std::collections::{HashMap, HashSet};

use crate::error::{PanelError, PanelResult};
use crate::query::Condition;
use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Sorted, de-duplicated set of row positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet(Vec<usize>);

impl RowSet {
    /// All rows `0..row_count`.
    pub fn range(row_count: usize) -> Self {
        Self((0..row_count).collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, row: usize) -> bool {
        self.0.binary_search(&row).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    /// Rows in `self` that are not in `other`.
    pub fn difference(&self, other: &RowSet) -> RowSet {
        Self(self.iter().filter(|r| !other.contains(*r)).collect())
    }
}

impl FromIterator<usize> for RowSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut rows: Vec<usize> = iter.into_iter().collect();
        rows.sort_unstable();
        rows.dedup();
        Self(rows)
    }
}

/// Suffixes applied to non-key columns present on both sides of a join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinSuffixes {
    pub left: String,
    pub right: String,
}

impl JoinSuffixes {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }
}

impl Default for JoinSuffixes {
    fn default() -> Self {
        Self::new("_x", "_y")
    }
}

/// Values written by [`PanelFrame::assign`].
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// The same value on every selected row.
    Scalar(Value),
    /// One value per selected row, in row order.
    PerRow(Vec<Value>),
}

macro_rules! fill_from_scalar {
    ($($t:ty),*) => {
        $(impl From<$t> for Fill {
            fn from(v: $t) -> Self {
                Self::Scalar(Value::from(v))
            }
        })*
    };
}

fill_from_scalar!(Value, i64, i32, f64, bool, &str, String);

impl From<Vec<Value>> for Fill {
    fn from(v: Vec<Value>) -> Self {
        Self::PerRow(v)
    }
}

/// Two rows sharing the same key, as found by [`PanelFrame::find_duplicate_key`].
#[derive(Debug, Clone, PartialEq)]
pub struct KeyCollision {
    pub first_row: usize,
    pub second_row: usize,
    pub key: Vec<Value>,
}

/// Table operations needed by the panel helpers.
///
/// Every method except [`Self::assign`] leaves `self` untouched and returns a new value.
pub trait PanelFrame: Clone {
    /// Column names in order.
    fn column_names(&self) -> Vec<String>;

    fn has_column(&self, name: &str) -> bool {
        self.column_names().iter().any(|c| c == name)
    }

    fn row_count(&self) -> usize;

    fn all_rows(&self) -> RowSet {
        RowSet::range(self.row_count())
    }

    /// Keep only `columns`, in the given order.
    fn project(&self, columns: &[&str]) -> PanelResult<Self>;

    /// Remove `columns`; each must exist.
    fn drop_columns(&self, columns: &[&str]) -> PanelResult<Self>;

    /// Add `delta` to every non-null value of a numeric column.
    fn offset_column(self, column: &str, delta: i64) -> PanelResult<Self>;

    /// Left-outer equi-join on `on` (same names on both sides).
    ///
    /// Every left row is kept, in order. Left rows without a match get nulls in the right-hand
    /// columns; left rows with several matches are repeated once per match. Non-key columns present
    /// on both sides are renamed with `suffixes`.
    fn left_join(&self, right: &Self, on: &[&str], suffixes: &JoinSuffixes) -> PanelResult<Self>;

    /// First pair of rows sharing the same non-null values in `keys`, if any.
    fn find_duplicate_key(&self, keys: &[&str]) -> PanelResult<Option<KeyCollision>>;

    /// Rows for which `condition` holds.
    fn select_rows(&self, condition: &Condition) -> PanelResult<RowSet>;

    /// Write `fill` into `column` at `rows`, creating the column (null elsewhere) if absent.
    ///
    /// On error the frame is left unchanged.
    fn assign(&mut self, rows: &RowSet, column: &str, fill: &Fill) -> PanelResult<()>;
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum JoinKey {
    Int(i64),
    Float(u64),
    Bool(bool),
    Str(String),
}

/// Hashable form of a key cell. Integral floats compare equal to integers; null and NaN never match.
fn join_key(v: &Value) -> Option<JoinKey> {
    match v {
        Value::Null => None,
        Value::Int64(i) => Some(JoinKey::Int(*i)),
        Value::Float64(f) if f.is_nan() => None,
        Value::Float64(f)
            if f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64 =>
        {
            Some(JoinKey::Int(*f as i64))
        }
        Value::Float64(f) => Some(JoinKey::Float(f.to_bits())),
        Value::Bool(b) => Some(JoinKey::Bool(*b)),
        Value::Utf8(s) => Some(JoinKey::Str(s.clone())),
    }
}

fn row_key(row: &[Value], key_idxs: &[usize]) -> Option<Vec<JoinKey>> {
    key_idxs.iter().map(|&i| join_key(&row[i])).collect()
}

impl DataSet {
    fn require_all(&self, columns: &[&str]) -> PanelResult<Vec<usize>> {
        columns.iter().map(|c| self.schema.require(c)).collect()
    }
}

impl PanelFrame for DataSet {
    fn column_names(&self) -> Vec<String> {
        self.schema.field_names().map(str::to_string).collect()
    }

    fn has_column(&self, name: &str) -> bool {
        self.schema.index_of(name).is_some()
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn project(&self, columns: &[&str]) -> PanelResult<Self> {
        let idxs = self.require_all(columns)?;
        let mut seen = HashSet::new();
        if let Some(dup) = columns.iter().find(|c| !seen.insert(**c)) {
            return Err(PanelError::validation(format!(
                "column '{dup}' selected more than once"
            )));
        }

        let fields = idxs.iter().map(|&i| self.schema.fields[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| idxs.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(DataSet::new(Schema::new(fields), rows))
    }

    fn drop_columns(&self, columns: &[&str]) -> PanelResult<Self> {
        let dropped = self.require_all(columns)?;
        let keep: Vec<usize> = (0..self.schema.fields.len())
            .filter(|i| !dropped.contains(i))
            .collect();

        let fields = keep.iter().map(|&i| self.schema.fields[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| keep.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(DataSet::new(Schema::new(fields), rows))
    }

    fn offset_column(mut self, column: &str, delta: i64) -> PanelResult<Self> {
        let idx = self.schema.require(column)?;
        let data_type = self.schema.fields[idx].data_type;
        if !data_type.is_numeric() {
            return Err(PanelError::type_mismatch(
                column,
                format!("expected a numeric column, found {data_type:?}"),
            ));
        }

        // Every non-null cell moves or the call fails.
        for (row_idx, row) in self.rows.iter_mut().enumerate() {
            row[idx] = match (data_type, &row[idx]) {
                (_, Value::Null) => Value::Null,
                (DataType::Int64, Value::Int64(v)) => {
                    Value::Int64(v.checked_add(delta).ok_or_else(|| {
                        PanelError::validation(format!(
                            "offsetting '{column}' value {v} by {delta} overflows i64"
                        ))
                    })?)
                }
                (DataType::Float64, Value::Float64(v)) => Value::Float64(v + delta as f64),
                (DataType::Float64, Value::Int64(v)) => Value::Float64(*v as f64 + delta as f64),
                (_, other) => {
                    return Err(PanelError::type_mismatch(
                        column,
                        format!("row {row_idx} holds {other}, which a {data_type:?} column cannot offset"),
                    ));
                }
            };
        }
        Ok(self)
    }

    fn left_join(&self, right: &Self, on: &[&str], suffixes: &JoinSuffixes) -> PanelResult<Self> {
        let left_keys = self.require_all(on)?;
        let right_keys = right.require_all(on)?;
        let right_payload: Vec<usize> = (0..right.schema.fields.len())
            .filter(|i| !right_keys.contains(i))
            .collect();

        let right_names: HashSet<&str> = right_payload
            .iter()
            .map(|&i| right.schema.fields[i].name.as_str())
            .collect();
        let left_names: HashSet<&str> = self
            .schema
            .fields
            .iter()
            .enumerate()
            .filter(|(i, _)| !left_keys.contains(i))
            .map(|(_, f)| f.name.as_str())
            .collect();

        let mut fields = Vec::with_capacity(self.schema.fields.len() + right_payload.len());
        for (i, f) in self.schema.fields.iter().enumerate() {
            let name = if !left_keys.contains(&i) && right_names.contains(f.name.as_str()) {
                format!("{}{}", f.name, suffixes.left)
            } else {
                f.name.clone()
            };
            fields.push(Field::new(name, f.data_type));
        }
        for &i in &right_payload {
            let f = &right.schema.fields[i];
            let name = if left_names.contains(f.name.as_str()) {
                format!("{}{}", f.name, suffixes.right)
            } else {
                f.name.clone()
            };
            fields.push(Field::new(name, f.data_type));
        }

        let mut seen = HashSet::new();
        let clashes: Vec<String> = fields
            .iter()
            .filter(|f| !seen.insert(f.name.as_str()))
            .map(|f| f.name.clone())
            .collect();
        if !clashes.is_empty() {
            return Err(PanelError::ColumnConflict { columns: clashes });
        }

        let mut index: HashMap<Vec<JoinKey>, Vec<usize>> = HashMap::new();
        for (row_idx, row) in right.rows.iter().enumerate() {
            if let Some(key) = row_key(row, &right_keys) {
                index.entry(key).or_default().push(row_idx);
            }
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        for row in &self.rows {
            let matches = row_key(row, &left_keys).and_then(|key| index.get(&key));
            match matches {
                Some(matched) => {
                    for &r in matched {
                        let mut out = row.clone();
                        out.extend(right_payload.iter().map(|&i| right.rows[r][i].clone()));
                        rows.push(out);
                    }
                }
                None => {
                    let mut out = row.clone();
                    out.resize(fields.len(), Value::Null);
                    rows.push(out);
                }
            }
        }

        Ok(DataSet::new(Schema::new(fields), rows))
    }

    fn find_duplicate_key(&self, keys: &[&str]) -> PanelResult<Option<KeyCollision>> {
        let key_idxs = self.require_all(keys)?;
        let mut first_seen: HashMap<Vec<JoinKey>, usize> = HashMap::new();
        for (row_idx, row) in self.rows.iter().enumerate() {
            let Some(key) = row_key(row, &key_idxs) else {
                continue;
            };
            if let Some(&first_row) = first_seen.get(&key) {
                return Ok(Some(KeyCollision {
                    first_row,
                    second_row: row_idx,
                    key: key_idxs.iter().map(|&i| row[i].clone()).collect(),
                }));
            }
            first_seen.insert(key, row_idx);
        }
        Ok(None)
    }

    fn select_rows(&self, condition: &Condition) -> PanelResult<RowSet> {
        let bound = condition.bind(&self.schema)?;
        let mut out = Vec::new();
        for (row_idx, row) in self.rows.iter().enumerate() {
            if bound.evaluate(row)? {
                out.push(row_idx);
            }
        }
        Ok(RowSet(out))
    }

    fn assign(&mut self, rows: &RowSet, column: &str, fill: &Fill) -> PanelResult<()> {
        if let Some(out_of_range) = rows.iter().find(|&r| r >= self.rows.len()) {
            return Err(PanelError::validation(format!(
                "row {out_of_range} out of range for {} rows",
                self.rows.len()
            )));
        }

        let values: Vec<&Value> = match fill {
            Fill::Scalar(v) => vec![v; rows.len()],
            Fill::PerRow(vs) => {
                if vs.len() != rows.len() {
                    return Err(PanelError::validation(format!(
                        "{} values supplied for {} selected rows",
                        vs.len(),
                        rows.len()
                    )));
                }
                vs.iter().collect()
            }
        };

        let existing = self.schema.index_of(column);
        let mut target = existing.map(|i| self.schema.fields[i].data_type);
        for incoming in values.iter().filter_map(|v| v.data_type()) {
            target = Some(unify_types(column, target, incoming)?);
        }
        // A column made only of missing values is numeric, as a NaN column would be.
        let target = target.unwrap_or(DataType::Float64);

        let idx = match existing {
            Some(idx) => idx,
            None => {
                self.schema.fields.push(Field::new(column, target));
                for row in &mut self.rows {
                    row.push(Value::Null);
                }
                self.schema.fields.len() - 1
            }
        };

        if self.schema.fields[idx].data_type != target {
            // Only Int64 -> Float64 widening reaches here.
            for row in &mut self.rows {
                if let Value::Int64(v) = row[idx] {
                    row[idx] = Value::Float64(v as f64);
                }
            }
            self.schema.fields[idx].data_type = target;
        }

        for (row_idx, value) in rows.iter().zip(values) {
            self.rows[row_idx][idx] = match (target, value) {
                (DataType::Float64, Value::Int64(v)) => Value::Float64(*v as f64),
                _ => value.clone(),
            };
        }
        Ok(())
    }
}

fn unify_types(column: &str, current: Option<DataType>, incoming: DataType) -> PanelResult<DataType> {
    match (current, incoming) {
        (None, t) => Ok(t),
        (Some(a), b) if a == b => Ok(a),
        (Some(DataType::Int64), DataType::Float64) | (Some(DataType::Float64), DataType::Int64) => {
            Ok(DataType::Float64)
        }
        (Some(a), b) => Err(PanelError::type_mismatch(
            column,
            format!("cannot store {b:?} values in a {a:?} column"),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::{Fill, JoinSuffixes, PanelFrame, RowSet};
    use crate::error::{ErrorKind, PanelError};
    use crate::query::col;
    use crate::types::{DataSet, DataType, Field, Schema, Value};

    fn people() -> DataSet {
        DataSet::from_columns(vec![
            ("id", DataType::Utf8, vec!["a".into(), "b".into(), "c".into()]),
            ("t", DataType::Int64, vec![Value::Int64(1), Value::Int64(2), Value::Null]),
            ("x", DataType::Int64, vec![Value::Int64(10), Value::Int64(20), Value::Int64(30)]),
        ])
        .unwrap()
    }

    #[test]
    fn row_set_difference_and_collect() {
        let all = RowSet::range(5);
        let some: RowSet = vec![3, 1, 3].into_iter().collect();
        assert_eq!(some.as_slice(), &[1, 3]);
        assert_eq!(all.difference(&some).as_slice(), &[0, 2, 4]);
        assert!(some.contains(3));
        assert!(!some.contains(2));
    }

    #[test]
    fn project_reorders_and_validates() {
        let ds = people();
        let out = ds.project(&["x", "id"]).unwrap();
        assert_eq!(out.column_names(), vec!["x", "id"]);
        assert_eq!(out.rows[0], vec![Value::Int64(10), Value::Utf8("a".to_string())]);

        assert_eq!(ds.project(&["nope"]).unwrap_err().kind(), ErrorKind::Lookup);
        assert_eq!(ds.project(&["x", "x"]).unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn drop_columns_keeps_order() {
        let out = people().drop_columns(&["t"]).unwrap();
        assert_eq!(out.column_names(), vec!["id", "x"]);
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn offset_column_skips_nulls_and_rejects_text() {
        let out = people().offset_column("t", -1).unwrap();
        let t: Vec<_> = out.column("t").unwrap().cloned().collect();
        assert_eq!(t, vec![Value::Int64(0), Value::Int64(1), Value::Null]);

        let err = people().offset_column("id", 1).unwrap_err();
        assert!(matches!(err, PanelError::TypeMismatch { .. }));
    }

    #[test]
    fn offset_column_moves_every_numeric_cell_or_fails() {
        // `DataSet::new` does not check cells against the schema.
        let mixed = DataSet::new(
            Schema::new(vec![Field::new("t", DataType::Float64)]),
            vec![vec![Value::Int64(2020)], vec![Value::Float64(2021.0)], vec![Value::Null]],
        );
        let out = mixed.offset_column("t", 1).unwrap();
        let t: Vec<_> = out.column("t").unwrap().cloned().collect();
        assert_eq!(t, vec![Value::Float64(2021.0), Value::Float64(2022.0), Value::Null]);

        let stray = DataSet::new(
            Schema::new(vec![Field::new("t", DataType::Int64)]),
            vec![vec![Value::Int64(1)], vec![Value::Utf8("2".to_string())]],
        );
        let err = stray.offset_column("t", 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Data);
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn offset_column_reports_overflow() {
        let ds = DataSet::from_columns(vec![("t", DataType::Int64, vec![Value::Int64(i64::MAX)])]).unwrap();
        assert_eq!(ds.offset_column("t", 1).unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn left_join_keeps_left_rows_and_suffixes_overlap() {
        let left = people();
        let right = DataSet::from_columns(vec![
            ("id", DataType::Utf8, vec!["b".into(), "a".into(), "c".into()]),
            ("t", DataType::Int64, vec![Value::Int64(2), Value::Int64(1), Value::Null]),
            ("x", DataType::Int64, vec![Value::Int64(200), Value::Int64(100), Value::Int64(300)]),
            ("y", DataType::Bool, vec![Value::Bool(true), Value::Bool(false), Value::Bool(true)]),
        ])
        .unwrap();

        let out = left
            .left_join(&right, &["id", "t"], &JoinSuffixes::new("", "_r"))
            .unwrap();

        assert_eq!(out.column_names(), vec!["id", "t", "x", "x_r", "y"]);
        assert_eq!(out.row_count(), 3);
        assert_eq!(out.rows[0][3], Value::Int64(100));
        assert_eq!(out.rows[1][3], Value::Int64(200));
        // Null key on "c" never matches.
        assert_eq!(out.rows[2][3], Value::Null);
        assert_eq!(out.rows[2][4], Value::Null);
    }

    #[test]
    fn left_join_fans_out_on_duplicate_right_keys() {
        let left = DataSet::from_columns(vec![("k", DataType::Int64, vec![Value::Int64(1)])]).unwrap();
        let right = DataSet::from_columns(vec![
            ("k", DataType::Float64, vec![Value::Float64(1.0), Value::Float64(1.0)]),
            ("v", DataType::Utf8, vec!["p".into(), "q".into()]),
        ])
        .unwrap();

        let out = left.left_join(&right, &["k"], &JoinSuffixes::default()).unwrap();
        assert_eq!(out.row_count(), 2);
        assert_eq!(out.rows[1], vec![Value::Int64(1), Value::Utf8("q".to_string())]);
    }

    #[test]
    fn left_join_detects_suffix_clash() {
        let left = DataSet::from_columns(vec![
            ("k", DataType::Int64, vec![Value::Int64(1)]),
            ("v", DataType::Int64, vec![Value::Int64(1)]),
            ("v_y", DataType::Int64, vec![Value::Int64(1)]),
        ])
        .unwrap();
        let right = left.project(&["k", "v"]).unwrap();

        let err = left.left_join(&right, &["k"], &JoinSuffixes::new("", "_y")).unwrap_err();
        match err {
            PanelError::ColumnConflict { columns } => assert_eq!(columns, vec!["v_y".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn find_duplicate_key_reports_first_pair() {
        let ds = DataSet::from_columns(vec![
            ("id", DataType::Utf8, vec!["a".into(), "b".into(), "a".into()]),
            ("t", DataType::Int64, vec![Value::Int64(1), Value::Int64(1), Value::Int64(1)]),
        ])
        .unwrap();
        let hit = ds.find_duplicate_key(&["id", "t"]).unwrap().unwrap();
        assert_eq!((hit.first_row, hit.second_row), (0, 2));
        assert!(people().find_duplicate_key(&["id", "t"]).unwrap().is_none());
    }

    #[test]
    fn select_rows_uses_condition() {
        let rows = people().select_rows(&col("x").ge(20)).unwrap();
        assert_eq!(rows.as_slice(), &[1, 2]);
    }

    #[test]
    fn assign_creates_column_with_nulls_elsewhere() {
        let mut ds = people();
        let rows: RowSet = [0].into_iter().collect();
        ds.assign(&rows, "flag", &Fill::from(true)).unwrap();
        let flag: Vec<_> = ds.column("flag").unwrap().cloned().collect();
        assert_eq!(flag, vec![Value::Bool(true), Value::Null, Value::Null]);
        assert_eq!(ds.schema.fields[3].data_type, DataType::Bool);
    }

    #[test]
    fn assign_widens_int_column_for_floats() {
        let mut ds = people();
        let rows: RowSet = [1].into_iter().collect();
        ds.assign(&rows, "x", &Fill::from(2.5)).unwrap();
        let x: Vec<_> = ds.column("x").unwrap().cloned().collect();
        assert_eq!(x, vec![Value::Float64(10.0), Value::Float64(2.5), Value::Float64(30.0)]);
    }

    #[test]
    fn assign_is_all_or_nothing() {
        let mut ds = people();
        let before = ds.clone();
        let rows = ds.all_rows();

        let err = ds.assign(&rows, "x", &Fill::from("text")).unwrap_err();
        assert!(matches!(err, PanelError::TypeMismatch { .. }));
        let err = ds
            .assign(&rows, "x", &Fill::PerRow(vec![Value::Int64(1)]))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(ds, before);
    }
}
