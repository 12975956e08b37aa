//! Validated description of a single lag/lead request.

use std::collections::HashSet;
use std::fmt;

use crate::error::{PanelError, PanelResult};

/// Whether a shift pulls values from the past or the future.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftDirection {
    /// Value from `n` periods earlier (positive shift).
    Lag,
    /// Value from `n` periods later (negative shift).
    Lead,
}

impl ShiftDirection {
    /// Direction of a signed shift; `None` for zero.
    pub fn of(shift: i64) -> Option<Self> {
        match shift {
            0 => None,
            s if s > 0 => Some(Self::Lag),
            _ => Some(Self::Lead),
        }
    }

    fn stem(self) -> &'static str {
        match self {
            Self::Lag => "_lag",
            Self::Lead => "_lead",
        }
    }
}

/// Column-name suffix for a signed shift: `_lag`, `_lag2`, `_lead`, `_lead3`, ...
///
/// Returns `None` for a zero shift.
pub fn suffix_for(shift: i64) -> Option<String> {
    let direction = ShiftDirection::of(shift)?;
    let periods = shift.unsigned_abs();
    Some(if periods == 1 {
        direction.stem().to_string()
    } else {
        format!("{}{periods}", direction.stem())
    })
}

/// What to do when a derived column already exists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Reject the whole operation, listing every colliding column.
    #[default]
    Fail,
    /// Drop the existing columns from the working copy and recompute them.
    Replace,
}

/// Non-empty list of column names to shift.
///
/// Converts from a bare name as well as from lists, so both `"profit"` and
/// `["profit", "assets"]` are accepted wherever `impl Into<Variables>` is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variables(Vec<String>);

impl Variables {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Variables {
    fn from(v: &str) -> Self {
        Self(vec![v.to_string()])
    }
}

impl From<String> for Variables {
    fn from(v: String) -> Self {
        Self(vec![v])
    }
}

impl From<Vec<String>> for Variables {
    fn from(v: Vec<String>) -> Self {
        Self(v)
    }
}

impl From<Vec<&str>> for Variables {
    fn from(v: Vec<&str>) -> Self {
        Self(v.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for Variables {
    fn from(v: &[&str]) -> Self {
        Self(v.iter().map(|s| s.to_string()).collect())
    }
}

impl From<&[String]> for Variables {
    fn from(v: &[String]) -> Self {
        Self(v.to_vec())
    }
}

impl<const N: usize> From<[&str; N]> for Variables {
    fn from(v: [&str; N]) -> Self {
        Self(v.iter().map(|s| s.to_string()).collect())
    }
}

impl fmt::Display for Variables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(", "))
    }
}

/// A validated shift request.
///
/// Construction checks everything that can be checked without looking at the table: the shift is
/// non-zero, the variable list is non-empty and free of repeats, the key columns are distinct and
/// not themselves shifted, and no derived name coincides with a requested variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftSpec {
    identifier: String,
    time: String,
    variables: Variables,
    shift: i64,
    conflict: ConflictPolicy,
    suffix: String,
}

impl ShiftSpec {
    pub fn new(
        identifier: impl Into<String>,
        time: impl Into<String>,
        variables: impl Into<Variables>,
        shift: i64,
        conflict: ConflictPolicy,
    ) -> PanelResult<Self> {
        let identifier = identifier.into();
        let time = time.into();
        let variables = variables.into();

        let suffix = suffix_for(shift).ok_or_else(|| {
            PanelError::validation("shift cannot be 0, as it would not change the data")
        })?;

        if variables.is_empty() {
            return Err(PanelError::validation("at least one variable is required"));
        }
        if identifier == time {
            return Err(PanelError::validation(format!(
                "identifier and time must be different columns, both are '{time}'"
            )));
        }

        let mut seen = HashSet::new();
        for v in variables.iter() {
            if !seen.insert(v) {
                return Err(PanelError::validation(format!("variable '{v}' listed twice")));
            }
            if v == identifier || v == time {
                return Err(PanelError::validation(format!(
                    "variable '{v}' is a key column and cannot be shifted"
                )));
            }
        }
        if let Some(clash) = variables
            .iter()
            .map(|v| format!("{v}{suffix}"))
            .find(|out| seen.contains(out.as_str()))
        {
            return Err(PanelError::validation(format!(
                "derived column '{clash}' is also a requested variable"
            )));
        }

        Ok(Self {
            identifier,
            time,
            variables,
            shift,
            conflict,
            suffix,
        })
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    /// Signed shift; positive for lags.
    pub fn shift(&self) -> i64 {
        self.shift
    }

    pub fn direction(&self) -> ShiftDirection {
        if self.shift > 0 {
            ShiftDirection::Lag
        } else {
            ShiftDirection::Lead
        }
    }

    pub fn conflict(&self) -> ConflictPolicy {
        self.conflict
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Derived column names, one per variable, in variable order.
    pub fn output_columns(&self) -> Vec<String> {
        self.variables
            .iter()
            .map(|v| format!("{v}{}", self.suffix))
            .collect()
    }
}

impl fmt::Display for ShiftSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.direction() {
            ShiftDirection::Lag => "lag",
            ShiftDirection::Lead => "lead",
        };
        write!(
            f,
            "{kind} {} of [{}] by ({}, {})",
            self.shift.unsigned_abs(),
            self.variables,
            self.identifier,
            self.time
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{suffix_for, ConflictPolicy, ShiftDirection, ShiftSpec, Variables};
    use crate::error::ErrorKind;

    #[test]
    fn suffix_omits_magnitude_one() {
        assert_eq!(suffix_for(1).as_deref(), Some("_lag"));
        assert_eq!(suffix_for(2).as_deref(), Some("_lag2"));
        assert_eq!(suffix_for(-1).as_deref(), Some("_lead"));
        assert_eq!(suffix_for(-12).as_deref(), Some("_lead12"));
        assert_eq!(suffix_for(0), None);
        assert_eq!(
            suffix_for(i64::MIN).as_deref(),
            Some("_lead9223372036854775808")
        );
    }

    #[test]
    fn direction_follows_sign() {
        assert_eq!(ShiftDirection::of(3), Some(ShiftDirection::Lag));
        assert_eq!(ShiftDirection::of(-3), Some(ShiftDirection::Lead));
        assert_eq!(ShiftDirection::of(0), None);
    }

    #[test]
    fn variables_accept_bare_name_and_lists() {
        assert_eq!(Variables::from("profit"), Variables::from(vec!["profit"]));
        assert_eq!(
            Variables::from(["a", "b"]),
            Variables::from(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(Variables::from(["a", "b"]).to_string(), "a, b");
    }

    #[test]
    fn spec_derives_output_columns() {
        let spec = ShiftSpec::new("id", "time", ["x", "y"], -2, ConflictPolicy::Fail).unwrap();
        assert_eq!(spec.output_columns(), vec!["x_lead2", "y_lead2"]);
        assert_eq!(spec.direction(), ShiftDirection::Lead);
        assert_eq!(spec.to_string(), "lead 2 of [x, y] by (id, time)");
    }

    #[test]
    fn spec_rejects_invalid_requests() {
        let cases: Vec<(Variables, i64, &str)> = vec![
            (Variables::from("x"), 0, "shift cannot be 0"),
            (Variables::from(Vec::<String>::new()), 1, "at least one variable"),
            (Variables::from(["x", "x"]), 1, "listed twice"),
            (Variables::from(["x", "id"]), 1, "key column"),
            (Variables::from(["x", "x_lag"]), 1, "also a requested variable"),
        ];
        for (vars, shift, needle) in cases {
            let err = ShiftSpec::new("id", "time", vars, shift, ConflictPolicy::Fail).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
            assert!(err.to_string().contains(needle), "{err} should mention {needle}");
        }

        let err = ShiftSpec::new("t", "t", "x", 1, ConflictPolicy::Fail).unwrap_err();
        assert!(err.to_string().contains("must be different"));
    }
}
