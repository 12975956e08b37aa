//! Small statistics helpers: a two-sample t-test report and a regression-summary filter.
//!
//! The t distribution comes from `statrs`; this module only prepares the samples and formats the
//! result.

use std::fmt;

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

use crate::error::{PanelError, PanelResult};
use crate::types::{DataSet, Value};

/// Result of an independent two-sample t-test.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TTest {
    /// t statistic (first sample minus second).
    pub statistic: f64,
    /// Two-sided p-value.
    pub p_value: f64,
    /// Degrees of freedom, `n1 + n2 - 2`.
    pub df: f64,
}

/// Student's t-test for two independent samples with pooled variance.
///
/// Each sample needs at least two observations and the pooled variance must be non-zero.
pub fn two_sample_ttest(a: &[f64], b: &[f64]) -> PanelResult<TTest> {
    if a.len() < 2 || b.len() < 2 {
        return Err(PanelError::validation(format!(
            "t-test needs at least two observations per group, got {} and {}",
            a.len(),
            b.len()
        )));
    }

    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let (m1, m2) = (mean(a), mean(b));
    let ss1: f64 = a.iter().map(|x| (x - m1).powi(2)).sum();
    let ss2: f64 = b.iter().map(|x| (x - m2).powi(2)).sum();
    let df = n1 + n2 - 2.0;
    let pooled = (ss1 + ss2) / df;
    let se = (pooled * (1.0 / n1 + 1.0 / n2)).sqrt();
    if !(se > 0.0) {
        return Err(PanelError::validation(
            "t-test is undefined when both groups have zero variance",
        ));
    }

    let statistic = (m1 - m2) / se;
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| PanelError::validation(format!("invalid t distribution: {e}")))?;
    let p_value = (2.0 * (1.0 - dist.cdf(statistic.abs()))).clamp(0.0, 1.0);

    Ok(TTest {
        statistic,
        p_value,
        df,
    })
}

fn mean(xs: &[f64]) -> f64 {
    xs.iter().sum::<f64>() / xs.len() as f64
}

/// Group comparison produced by [`ttest`].
///
/// `Display` renders the plain-text report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TTestReport {
    pub variable: String,
    pub treatment: String,
    /// Mean of `variable` where `treatment == 1`.
    pub mean_treated: f64,
    /// Mean of `variable` where `treatment == 0`.
    pub mean_base: f64,
    /// `mean_treated - mean_base`.
    pub difference: f64,
    pub n_treated: usize,
    pub n_base: usize,
    pub test: TTest,
}

impl fmt::Display for TTestReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "T-test for {}, grouped by {}:", self.variable, self.treatment)?;
        writeln!(f)?;
        writeln!(f, "Mean for {} (1): {:.3}", self.treatment, self.mean_treated)?;
        writeln!(f, "Mean for {} (0): {:.3}", self.treatment, self.mean_base)?;
        writeln!(f)?;
        writeln!(f, "Difference: {:.3}", self.difference)?;
        writeln!(f, "T-value: {:.3}", self.test.statistic)?;
        write!(f, "Significance: {:.3}", self.test.p_value)
    }
}

/// Compare `variable` between rows with `treatment == 1` and rows with `treatment == 0`.
///
/// Rows with any other treatment value, or with a null `variable`, are ignored.
pub fn ttest(dataset: &DataSet, variable: &str, treatment: &str) -> PanelResult<TTestReport> {
    let var_idx = dataset.schema.require(variable)?;
    let treat_idx = dataset.schema.require(treatment)?;
    let var_type = dataset.schema.fields[var_idx].data_type;
    if !var_type.is_numeric() {
        return Err(PanelError::type_mismatch(
            variable,
            format!("t-test needs a numeric column, found {var_type:?}"),
        ));
    }

    let in_group = |code: f64| {
        move |row: &[Value]| row[treat_idx].as_f64() == Some(code) && !row[var_idx].is_null()
    };
    let sample = |group: &DataSet| -> Vec<f64> {
        group
            .rows
            .iter()
            .filter_map(|row| row[var_idx].as_f64())
            .collect()
    };

    let treated = sample(&dataset.filter_rows(in_group(1.0)));
    let base = sample(&dataset.filter_rows(in_group(0.0)));
    let test = two_sample_ttest(&treated, &base)?;
    let (mean_treated, mean_base) = (mean(&treated), mean(&base));

    Ok(TTestReport {
        variable: variable.to_string(),
        treatment: treatment.to_string(),
        mean_treated,
        mean_base,
        difference: mean_treated - mean_base,
        n_treated: treated.len(),
        n_base: base.len(),
        test,
    })
}

/// Run [`ttest`] and print the report to stdout.
pub fn print_ttest(dataset: &DataSet, variable: &str, treatment: &str) -> PanelResult<TTestReport> {
    let report = ttest(dataset, variable, treatment)?;
    println!("{report}");
    Ok(report)
}

/// A fitted model that can render a plain-text summary table.
pub trait ModelSummary {
    fn summary_text(&self) -> String;
}

impl ModelSummary for str {
    fn summary_text(&self) -> String {
        self.to_string()
    }
}

impl ModelSummary for String {
    fn summary_text(&self) -> String {
        self.clone()
    }
}

/// The model summary without fixed-effect dummy rows (lines starting with `C(`).
pub fn summary_no_fe<M: ModelSummary + ?Sized>(model: &M) -> String {
    strip_fixed_effects(&model.summary_text())
}

/// Drop every line starting with `C(` from `summary`.
pub fn strip_fixed_effects(summary: &str) -> String {
    summary
        .lines()
        .filter(|line| !line.starts_with("C("))
        .collect::<Vec<_>>()
        .join("\n")
}
