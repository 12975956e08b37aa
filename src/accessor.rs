//! Method-style surface over any [`PanelFrame`].
//!
//! ```rust
//! use rust_panel_data::accessor::PanelExt;
//! use rust_panel_data::types::{DataSet, DataType, Value};
//!
//! let ds = DataSet::from_columns(vec![
//!     ("firm", DataType::Utf8, vec!["A".into(), "A".into()]),
//!     ("year", DataType::Int64, vec![Value::Int64(2020), Value::Int64(2021)]),
//!     ("profit", DataType::Int64, vec![Value::Int64(10), Value::Int64(20)]),
//! ])
//! .unwrap();
//!
//! let out = ds.panel().lead("profit", "firm", "year", 1).unwrap();
//! assert_eq!(out.value(0, "profit_lead"), Some(&Value::Int64(20)));
//! ```
//!
//! [`PanelExtMut::panel_mut`] edits the frame itself:
//!
//! ```rust
//! use rust_panel_data::accessor::PanelExtMut;
//! use rust_panel_data::types::{DataSet, DataType, Value};
//!
//! let mut ds = DataSet::from_columns(vec![
//!     ("year", DataType::Int64, vec![Value::Int64(2020), Value::Int64(2021)]),
//! ])
//! .unwrap();
//!
//! ds.panel_mut().mutate("year >= 2021", "post", 1, Some(0.into())).unwrap();
//! assert_eq!(ds.value(1, "post"), Some(&Value::Int64(1)));
//! ```

use std::sync::Arc;

use crate::error::PanelResult;
use crate::frame::{Fill, PanelFrame};
use crate::mutate;
use crate::observability::PanelObserver;
use crate::query::IntoCondition;
use crate::shift::{self, ConflictPolicy, ShiftOptions, Variables};

/// Borrowing wrapper exposing the panel helpers as methods.
///
/// Holds the options shared by every call; identifier and time columns are passed per call.
#[derive(Debug, Clone)]
pub struct PanelAccessor<'a, F> {
    frame: &'a F,
    options: ShiftOptions,
}

impl<'a, F: PanelFrame> PanelAccessor<'a, F> {
    pub fn new(frame: &'a F) -> Self {
        Self {
            frame,
            options: ShiftOptions::default(),
        }
    }

    /// Replace derived columns that already exist instead of failing.
    pub fn replace_existing(mut self, replace: bool) -> Self {
        self.options.conflict = if replace {
            ConflictPolicy::Replace
        } else {
            ConflictPolicy::Fail
        };
        self
    }

    /// Reject repeated `(identifier, time)` pairs.
    pub fn check_unique_keys(mut self, check: bool) -> Self {
        self.options.check_unique_keys = check;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn PanelObserver>) -> Self {
        self.options.observer = Some(observer);
        self
    }

    fn options_for(&self, identifier: &str, time: &str) -> ShiftOptions {
        ShiftOptions {
            identifier: identifier.to_string(),
            time: time.to_string(),
            ..self.options.clone()
        }
    }

    /// See [`shift::lag`].
    pub fn lag(
        &self,
        variables: impl Into<Variables>,
        identifier: &str,
        time: &str,
        periods: i64,
    ) -> PanelResult<F> {
        shift::lag(self.frame, variables, periods, &self.options_for(identifier, time))
    }

    /// See [`shift::lead`].
    pub fn lead(
        &self,
        variables: impl Into<Variables>,
        identifier: &str,
        time: &str,
        periods: i64,
    ) -> PanelResult<F> {
        shift::lead(self.frame, variables, periods, &self.options_for(identifier, time))
    }

    /// See [`shift::time_shift`].
    pub fn shift(
        &self,
        variables: impl Into<Variables>,
        identifier: &str,
        time: &str,
        shift: i64,
    ) -> PanelResult<F> {
        shift::time_shift(self.frame, variables, shift, &self.options_for(identifier, time))
    }

    /// See [`mutate::mutate`].
    pub fn mutate(
        &self,
        predicate: impl IntoCondition,
        column: &str,
        value: impl Into<Fill>,
        other: Option<Fill>,
    ) -> PanelResult<F> {
        mutate::mutate(self.frame, predicate, column, value, other)
    }
}

/// Mutable counterpart of [`PanelAccessor`]; changes are written to the borrowed frame.
#[derive(Debug)]
pub struct PanelAccessorMut<'a, F> {
    frame: &'a mut F,
}

impl<'a, F: PanelFrame> PanelAccessorMut<'a, F> {
    pub fn new(frame: &'a mut F) -> Self {
        Self { frame }
    }

    /// See [`mutate::mutate_in_place`]. On error the frame is left as it was.
    pub fn mutate(
        &mut self,
        predicate: impl IntoCondition,
        column: &str,
        value: impl Into<Fill>,
        other: Option<Fill>,
    ) -> PanelResult<()> {
        mutate::mutate_in_place(self.frame, predicate, column, value, other)
    }
}

/// Extension trait giving every [`PanelFrame`] a `.panel()` accessor.
pub trait PanelExt: PanelFrame {
    fn panel(&self) -> PanelAccessor<'_, Self> {
        PanelAccessor::new(self)
    }
}

impl<F: PanelFrame> PanelExt for F {}

/// Extension trait giving every [`PanelFrame`] a `.panel_mut()` accessor.
pub trait PanelExtMut: PanelFrame {
    fn panel_mut(&mut self) -> PanelAccessorMut<'_, Self> {
        PanelAccessorMut::new(self)
    }
}

impl<F: PanelFrame> PanelExtMut for F {}
