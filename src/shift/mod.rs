//! Lagged and lead variables for panel data.
//!
//! Given a table with an entity identifier column, an integer time column and some variables,
//! these functions add one column per variable holding its value `n` periods earlier (lag) or
//! later (lead) for the same entity. Rows without a matching period get [`Value::Null`].
//!
//! - [`time_shift()`]: signed shift; positive = lag, negative = lead
//! - [`lag()`] / [`lead()`]: unsigned periods, direction implied
//!
//! All three run the same operation: project `(time, identifier, variables)`, move the time axis by
//! the shift, and left-join the result back onto the source on `(identifier, time)`.
//!
//! ## Example
//!
//! ```rust
//! use rust_panel_data::shift::{lag, ShiftOptions};
//! use rust_panel_data::types::{DataSet, DataType, Value};
//!
//! let ds = DataSet::from_columns(vec![
//!     ("firm", DataType::Utf8, vec!["A".into(), "A".into(), "B".into()]),
//!     ("year", DataType::Int64, vec![Value::Int64(2020), Value::Int64(2021), Value::Int64(2021)]),
//!     ("profit", DataType::Int64, vec![Value::Int64(10), Value::Int64(20), Value::Int64(5)]),
//! ])
//! .unwrap();
//!
//! let out = lag(&ds, "profit", 1, &ShiftOptions::new("firm", "year")).unwrap();
//! let lagged: Vec<_> = out.column("profit_lag").unwrap().cloned().collect();
//! assert_eq!(lagged, vec![Value::Null, Value::Int64(10), Value::Null]);
//! ```
//!
//! [`Value::Null`]: crate::types::Value::Null

mod spec;

use std::fmt;
use std::sync::Arc;

use crate::error::{PanelError, PanelResult};
use crate::frame::{JoinSuffixes, PanelFrame};
use crate::observability::{report, Operation, OperationContext, OperationStats, PanelObserver, Severity};

pub use spec::{suffix_for, ConflictPolicy, ShiftDirection, ShiftSpec, Variables};

/// Options controlling a shift.
///
/// Use [`Default`] (columns `id` and `time`) or [`ShiftOptions::new`] for the common cases.
#[derive(Clone)]
pub struct ShiftOptions {
    /// Entity identifier column.
    pub identifier: String,
    /// Integer period column.
    pub time: String,
    /// What to do when a derived column already exists.
    pub conflict: ConflictPolicy,
    /// Reject tables with repeated `(identifier, time)` pairs instead of letting the join fan out.
    pub check_unique_keys: bool,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PanelObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl ShiftOptions {
    /// Options keyed on the given identifier and time columns.
    pub fn new(identifier: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            time: time.into(),
            ..Default::default()
        }
    }
}

impl Default for ShiftOptions {
    fn default() -> Self {
        Self {
            identifier: "id".to_string(),
            time: "time".to_string(),
            conflict: ConflictPolicy::Fail,
            check_unique_keys: false,
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl fmt::Debug for ShiftOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShiftOptions")
            .field("identifier", &self.identifier)
            .field("time", &self.time)
            .field("conflict", &self.conflict)
            .field("check_unique_keys", &self.check_unique_keys)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Add lagged (`shift > 0`) or lead (`shift < 0`) copies of `variables`.
///
/// New columns are named `{variable}_lag`, `{variable}_lag{n}`, `{variable}_lead` or
/// `{variable}_lead{n}` and appended after the existing columns. The input is not modified.
///
/// # Errors
///
/// - [`PanelError::Validation`] if `shift == 0` or the variable list is empty or malformed
/// - [`PanelError::MissingColumn`] if a variable, the identifier or the time column is absent
/// - [`PanelError::ColumnConflict`] if a derived column exists and `options.conflict` is
///   [`ConflictPolicy::Fail`]
/// - [`PanelError::DuplicateKey`] if `options.check_unique_keys` is set and a key repeats
/// - [`PanelError::TypeMismatch`] if the time column is not numeric
pub fn time_shift<F: PanelFrame>(
    frame: &F,
    variables: impl Into<Variables>,
    shift: i64,
    options: &ShiftOptions,
) -> PanelResult<F> {
    let spec = ShiftSpec::new(
        options.identifier.as_str(),
        options.time.as_str(),
        variables,
        shift,
        options.conflict,
    );
    run(frame, spec, options)
}

/// Add values from `periods` periods earlier. `periods` must be positive.
pub fn lag<F: PanelFrame>(
    frame: &F,
    variables: impl Into<Variables>,
    periods: i64,
    options: &ShiftOptions,
) -> PanelResult<F> {
    let spec = positive_periods("lag", periods).and_then(|n| {
        ShiftSpec::new(
            options.identifier.as_str(),
            options.time.as_str(),
            variables,
            n,
            options.conflict,
        )
    });
    run(frame, spec, options)
}

/// Add values from `periods` periods later. `periods` must be positive.
pub fn lead<F: PanelFrame>(
    frame: &F,
    variables: impl Into<Variables>,
    periods: i64,
    options: &ShiftOptions,
) -> PanelResult<F> {
    let spec = positive_periods("lead", periods).and_then(|n| {
        ShiftSpec::new(
            options.identifier.as_str(),
            options.time.as_str(),
            variables,
            -n,
            options.conflict,
        )
    });
    run(frame, spec, options)
}

fn positive_periods(kind: &str, periods: i64) -> PanelResult<i64> {
    if periods > 0 {
        Ok(periods)
    } else {
        Err(PanelError::validation(format!(
            "{kind} periods must be a positive integer, got {periods}"
        )))
    }
}

fn run<F: PanelFrame>(
    frame: &F,
    spec: PanelResult<ShiftSpec>,
    options: &ShiftOptions,
) -> PanelResult<F> {
    let ctx = OperationContext {
        operation: Operation::Shift,
        target: match &spec {
            Ok(spec) => spec.to_string(),
            Err(_) => format!("shift by ({}, {})", options.identifier, options.time),
        },
    };

    let result = spec.and_then(|spec| {
        let out = apply(frame, &spec, options.check_unique_keys)?;
        Ok((out, spec.variables().len()))
    });

    report(
        options.observer.as_ref(),
        options.alert_at_or_above,
        &ctx,
        &result,
        |(out, added)| OperationStats {
            rows: out.row_count(),
            columns_added: *added,
        },
    );

    result.map(|(out, _)| out)
}

/// Run a validated shift against `frame`.
///
/// All table-dependent checks happen before the join, so a failure never yields a partial result.
pub fn apply<F: PanelFrame>(frame: &F, spec: &ShiftSpec, check_unique_keys: bool) -> PanelResult<F> {
    let available = frame.column_names();
    let required = spec
        .variables()
        .iter()
        .chain([spec.identifier(), spec.time()]);
    for name in required {
        if !frame.has_column(name) {
            return Err(PanelError::missing_column(
                name,
                available.iter().map(String::as_str),
            ));
        }
    }

    let conflicts: Vec<String> = spec
        .output_columns()
        .into_iter()
        .filter(|c| frame.has_column(c))
        .collect();

    let replaced;
    let working = if conflicts.is_empty() {
        frame
    } else {
        match spec.conflict() {
            ConflictPolicy::Fail => return Err(PanelError::ColumnConflict { columns: conflicts }),
            ConflictPolicy::Replace => {
                let names: Vec<&str> = conflicts.iter().map(String::as_str).collect();
                replaced = frame.drop_columns(&names)?;
                &replaced
            }
        }
    };

    let keys = [spec.identifier(), spec.time()];
    if check_unique_keys {
        if let Some(hit) = working.find_duplicate_key(&keys)? {
            return Err(PanelError::DuplicateKey {
                identifier: spec.identifier().to_string(),
                time: spec.time().to_string(),
                id_value: hit.key[0].to_string(),
                time_value: hit.key[1].to_string(),
                first_row: hit.first_row,
                second_row: hit.second_row,
            });
        }
    }

    let mut projection = vec![spec.time(), spec.identifier()];
    projection.extend(spec.variables().iter());

    let shifted = working
        .project(&projection)?
        .offset_column(spec.time(), spec.shift())?;

    working.left_join(&shifted, &keys, &JoinSuffixes::new("", spec.suffix()))
}

#[cfg(test)]
mod tests {
    use super::{apply, positive_periods, run, ConflictPolicy, ShiftOptions, ShiftSpec};
    use crate::error::{ErrorKind, PanelError};
    use crate::frame::PanelFrame;
    use crate::types::{DataSet, DataType, Value};

    fn panel() -> DataSet {
        DataSet::from_columns(vec![
            ("id", DataType::Utf8, vec!["A".into(), "A".into(), "B".into(), "B".into()]),
            ("time", DataType::Int64, (1_i64..=2).chain(1..=2).map(Value::from).collect()),
            ("x", DataType::Int64, [10_i64, 11, 20, 21].into_iter().map(Value::from).collect()),
        ])
        .unwrap()
    }

    fn column(ds: &DataSet, name: &str) -> Vec<Value> {
        ds.column(name).unwrap().cloned().collect()
    }

    #[test]
    fn periods_must_be_positive() {
        assert_eq!(positive_periods("lag", 3).unwrap(), 3);
        let err = positive_periods("lead", 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(err.to_string().contains("lead periods must be a positive integer, got 0"));
        assert!(positive_periods("lag", -2).is_err());
    }

    #[test]
    fn apply_replace_drops_stale_columns_before_joining() {
        let spec = ShiftSpec::new("id", "time", "x", 1, ConflictPolicy::Fail).unwrap();
        let mut stale = apply(&panel(), &spec, false).unwrap();
        let idx = stale.schema.index_of("x_lag").unwrap();
        for row in &mut stale.rows {
            row[idx] = Value::Int64(-1);
        }

        assert!(matches!(
            apply(&stale, &spec, false).unwrap_err(),
            PanelError::ColumnConflict { .. }
        ));

        let replace = ShiftSpec::new("id", "time", "x", 1, ConflictPolicy::Replace).unwrap();
        let out = apply(&stale, &replace, false).unwrap();
        assert_eq!(out.column_names(), ["id", "time", "x", "x_lag"]);
        assert_eq!(
            column(&out, "x_lag"),
            vec![Value::Null, Value::Int64(10), Value::Null, Value::Int64(20)]
        );
    }

    #[test]
    fn run_without_observer_returns_the_result() {
        let options = ShiftOptions::default();
        assert!(options.observer.is_none());

        let spec = ShiftSpec::new("id", "time", "x", -1, ConflictPolicy::Fail);
        let out = run(&panel(), spec, &options).unwrap();
        assert_eq!(
            column(&out, "x_lead"),
            vec![Value::Int64(11), Value::Null, Value::Int64(21), Value::Null]
        );

        let invalid = ShiftSpec::new("id", "time", "x", 0, ConflictPolicy::Fail);
        assert_eq!(run(&panel(), invalid, &options).unwrap_err().kind(), ErrorKind::Validation);
    }
}
