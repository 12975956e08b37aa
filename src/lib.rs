//! `rust-panel-data` adds lagged and lead variables to panel (entity × period) tables, assigns
//! column values conditionally, and ships a few reporting helpers for applied work.
//!
//! Tables are in-memory [`types::DataSet`]s, or anything else implementing
//! [`frame::PanelFrame`]. The core entrypoint is [`shift::time_shift`] (and its [`shift::lag`] /
//! [`shift::lead`] wrappers).
//!
//! ## What a shift does
//!
//! For every row, the shifted column holds the variable's value for the **same identifier** at
//! time `t - n` (lag by `n`) or `t + n` (lead by `n`). Gaps in the time axis produce
//! [`types::Value::Null`]; values are never taken from the nearest available period.
//!
//! Output columns are named:
//!
//! - `{var}_lag` / `{var}_lead` for a shift of one period
//! - `{var}_lag{n}` / `{var}_lead{n}` otherwise
//!
//! The input table is never modified; row count and row order are preserved (unless duplicate
//! `(identifier, time)` pairs fan out the join, see [`shift::ShiftOptions::check_unique_keys`]).
//!
//! ## Quick example
//!
//! ```rust
//! use rust_panel_data::shift::{lag, ShiftOptions};
//! use rust_panel_data::types::{DataSet, DataType, Value};
//!
//! # fn main() -> Result<(), rust_panel_data::PanelError> {
//! let ds = DataSet::from_columns(vec![
//!     ("id", DataType::Utf8, vec!["A".into(), "A".into(), "A".into(), "B".into(), "B".into()]),
//!     ("t", DataType::Int64, (1..=3).chain(1..=2).map(Value::from).collect()),
//!     ("profit", DataType::Int64, [10, 12, 15, 7, 9].into_iter().map(Value::from).collect()),
//! ])?;
//!
//! let out = lag(&ds, "profit", 1, &ShiftOptions::new("id", "t"))?;
//! let lagged: Vec<_> = out.column("profit_lag")?.cloned().collect();
//! assert_eq!(
//!     lagged,
//!     vec![Value::Null, Value::Int64(10), Value::Int64(12), Value::Null, Value::Int64(7)]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Conditional assignment
//!
//! ```rust
//! use rust_panel_data::mutate::mutate;
//! use rust_panel_data::query::col;
//! use rust_panel_data::types::{DataSet, DataType, Value};
//!
//! # fn main() -> Result<(), rust_panel_data::PanelError> {
//! let ds = DataSet::from_columns(vec![
//!     ("leverage", DataType::Float64, vec![Value::Float64(1.2), Value::Float64(2.1)]),
//! ])?;
//!
//! // Query strings and built conditions are interchangeable.
//! let a = mutate(&ds, "leverage > 2", "high", true, Some(false.into()))?;
//! let b = mutate(&ds, col("leverage").gt(2), "high", true, Some(false.into()))?;
//! assert_eq!(a, b);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`shift`]: lag/lead columns by entity and period
//! - [`mutate`]: conditional column assignment
//! - [`accessor`]: `.panel()` method surface over any [`frame::PanelFrame`]
//! - [`query`]: row predicates, built in code or parsed from query strings
//! - [`frame`]: the table operations the helpers rely on
//! - [`types`]: schema + in-memory dataset types
//! - [`stats`]: grouped t-test report and regression-summary filter
//! - [`pipe_list`]: pipe-separated list cells
//! - [`datasets`]: bundled example datasets
//! - [`io`]: CSV / Parquet readers
//! - [`observability`]: observer hooks for logging and alerting
//! - [`error`]: error types used across the crate
//! - `interop` (Cargo feature `polars`): conversion to and from `polars::DataFrame`

pub mod accessor;
pub mod datasets;
pub mod error;
pub mod frame;
#[cfg(feature = "polars")]
pub mod interop;
pub mod io;
pub mod mutate;
pub mod observability;
pub mod pipe_list;
pub mod query;
pub mod shift;
pub mod stats;
pub mod types;

pub use error::{ErrorKind, PanelError, PanelResult};
