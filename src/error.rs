use thiserror::Error;

/// Convenience result type for panel operations.
pub type PanelResult<T> = Result<T, PanelError>;

/// Coarse classification of a [`PanelError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad argument: zero/negative shift, bad variable list, wrong fill length, bad query.
    Validation,
    /// Something named by the caller does not exist (column, dataset).
    Lookup,
    /// A derived column already exists, or join keys are not unique.
    Conflict,
    /// Values of the wrong type for the requested operation.
    Data,
    /// File system or file-format failure.
    Io,
}

/// Error type returned by every operation in this crate.
#[derive(Debug, Error)]
pub enum PanelError {
    /// Underlying I/O error (e.g. dataset file not found).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Parquet reader error.
    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[cfg(feature = "polars")]
    /// Polars conversion error (feature-gated behind `polars`).
    #[error("polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// An argument failed validation.
    #[error("invalid argument: {message}")]
    Validation { message: String },

    /// A referenced column is not part of the table.
    #[error("column '{column}' not found (available: {})", .available.join(", "))]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// Derived output columns already exist and replacement was not requested.
    #[error("the following lag/lead columns already exist: {}", .columns.join(", "))]
    ColumnConflict { columns: Vec<String> },

    /// The same (identifier, time) pair appears on more than one row.
    #[error("duplicate key {identifier}={id_value}, {time}={time_value} at rows {first_row} and {second_row}")]
    DuplicateKey {
        identifier: String,
        time: String,
        id_value: String,
        time_value: String,
        first_row: usize,
        second_row: usize,
    },

    /// The dataset name is not in the registry.
    #[error("unknown dataset '{name}' (known: {})", .known.join(", "))]
    UnknownDataset { name: String, known: Vec<String> },

    /// A query string could not be parsed.
    #[error("invalid query at byte {position}: {message}")]
    Query { position: usize, message: String },

    /// A value or column has the wrong type for the operation.
    #[error("type mismatch in column '{column}': {message}")]
    TypeMismatch { column: String, message: String },

    /// A file does not conform to the expected schema.
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A cell could not be parsed into the required [`crate::types::DataType`].
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },
}

impl PanelError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub(crate) fn missing_column<'a>(
        column: &str,
        available: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self::MissingColumn {
            column: column.to_string(),
            available: available.into_iter().map(str::to_string).collect(),
        }
    }

    pub(crate) fn type_mismatch(column: &str, message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            column: column.to_string(),
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) | Self::Csv(_) | Self::Parquet(_) => ErrorKind::Io,
            #[cfg(feature = "polars")]
            Self::Polars(_) => ErrorKind::Data,
            Self::Validation { .. } | Self::Query { .. } => ErrorKind::Validation,
            Self::MissingColumn { .. } | Self::UnknownDataset { .. } => ErrorKind::Lookup,
            Self::ColumnConflict { .. } | Self::DuplicateKey { .. } => ErrorKind::Conflict,
            Self::TypeMismatch { .. } | Self::SchemaMismatch { .. } | Self::ParseError { .. } => {
                ErrorKind::Data
            }
        }
    }
}
