//! Conditional column assignment.
//!
//! [`mutate`] writes `value` into `column` on every row matching a predicate and, when `other` is
//! given, writes `other` on the remaining rows. The column is created if it does not exist yet
//! (rows that receive nothing are null). The predicate is a [`Condition`] or a query string.
//!
//! ```rust
//! use rust_panel_data::mutate::mutate;
//! use rust_panel_data::types::{DataSet, DataType, Value};
//!
//! let ds = DataSet::from_columns(vec![
//!     ("A", DataType::Int64, vec![Value::Int64(1), Value::Int64(2)]),
//!     ("B", DataType::Utf8, vec!["x".into(), "y".into()]),
//! ])
//! .unwrap();
//!
//! let out = mutate(&ds, "B == 'x'", "A", 10, Some(0.into())).unwrap();
//! let a: Vec<_> = out.column("A").unwrap().cloned().collect();
//! assert_eq!(a, vec![Value::Int64(10), Value::Int64(0)]);
//! ```
//!
//! [`Condition`]: crate::query::Condition

use crate::error::PanelResult;
use crate::frame::PanelFrame;
use crate::query::IntoCondition;

pub use crate::frame::Fill;

/// Return a copy of `frame` with `column` set to `value` where `predicate` holds, and to
/// `other` (if given) elsewhere.
pub fn mutate<F: PanelFrame>(
    frame: &F,
    predicate: impl IntoCondition,
    column: &str,
    value: impl Into<Fill>,
    other: Option<Fill>,
) -> PanelResult<F> {
    let mut out = frame.clone();
    assign_where(&mut out, predicate, column, value.into(), other)?;
    Ok(out)
}

/// Same as [`mutate`], but modifies `frame` in place.
///
/// On error `frame` is left exactly as it was.
pub fn mutate_in_place<F: PanelFrame>(
    frame: &mut F,
    predicate: impl IntoCondition,
    column: &str,
    value: impl Into<Fill>,
    other: Option<Fill>,
) -> PanelResult<()> {
    let mut work = frame.clone();
    assign_where(&mut work, predicate, column, value.into(), other)?;
    *frame = work;
    Ok(())
}

fn assign_where<F: PanelFrame>(
    frame: &mut F,
    predicate: impl IntoCondition,
    column: &str,
    value: Fill,
    other: Option<Fill>,
) -> PanelResult<()> {
    let condition = predicate.into_condition()?;
    let matched = frame.select_rows(&condition)?;
    let unmatched = frame.all_rows().difference(&matched);

    frame.assign(&matched, column, &value)?;
    if let Some(other) = other {
        frame.assign(&unmatched, column, &other)?;
    }
    Ok(())
}
