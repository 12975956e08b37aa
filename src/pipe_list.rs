//! Pipe-separated list cells (`"3|7|12"`), as found in exported panel files.

/// Parsed content of a pipe-separated cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipeList {
    /// Every element parsed as an integer.
    Integers(Vec<i64>),
    /// At least one element was not an integer; all elements kept as text.
    Strings(Vec<String>),
}

impl PipeList {
    pub fn len(&self) -> usize {
        match self {
            Self::Integers(v) => v.len(),
            Self::Strings(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split `cell` on `|`, skipping empty segments.
///
/// Falls back to [`PipeList::Strings`] when any segment is not an integer; this is the expected
/// outcome for text lists, not an error.
///
/// ```rust
/// use rust_panel_data::pipe_list::{convert_pipe_list, PipeList};
///
/// assert_eq!(convert_pipe_list("1|2||3"), PipeList::Integers(vec![1, 2, 3]));
/// assert_eq!(
///     convert_pipe_list("1|b"),
///     PipeList::Strings(vec!["1".to_string(), "b".to_string()])
/// );
/// ```
pub fn convert_pipe_list(cell: &str) -> PipeList {
    let parts: Vec<&str> = cell.split('|').filter(|s| !s.is_empty()).collect();
    let ints: Option<Vec<i64>> = parts.iter().map(|s| s.trim().parse().ok()).collect();
    match ints {
        Some(ints) => PipeList::Integers(ints),
        None => PipeList::Strings(parts.into_iter().map(str::to_string).collect()),
    }
}
