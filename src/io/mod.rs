//! Schema-driven readers for on-disk tables.
//!
//! Used by [`crate::datasets`] to materialize bundled datasets; usable directly as well.
//! Both readers match columns by name (file column order does not matter), parse every cell into
//! the schema's [`crate::types::DataType`], and treat empty cells as [`crate::types::Value::Null`].

pub mod csv;
pub mod parquet;

use std::path::Path;

use crate::error::{PanelError, PanelResult};
use crate::types::{DataSet, Schema};

/// On-disk table format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated values with a header row.
    Csv,
    /// Apache Parquet.
    Parquet,
}

impl TableFormat {
    /// Parse a format from a file extension (case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Some(Self::Csv),
            "parquet" | "pq" => Some(Self::Parquet),
            _ => None,
        }
    }

    /// Infer the format of `path` from its extension.
    pub fn infer(path: &Path) -> PanelResult<Self> {
        path.extension()
            .and_then(|s| s.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| PanelError::SchemaMismatch {
                message: format!("cannot infer table format from path ({})", path.display()),
            })
    }
}

/// Read a table from `path` in the given format.
pub fn read_table(path: impl AsRef<Path>, schema: &Schema, format: TableFormat) -> PanelResult<DataSet> {
    match format {
        TableFormat::Csv => csv::read_csv(path, schema),
        TableFormat::Parquet => parquet::read_parquet(path, schema),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::TableFormat;

    #[test]
    fn format_from_extension() {
        assert_eq!(TableFormat::from_extension("CSV"), Some(TableFormat::Csv));
        assert_eq!(TableFormat::from_extension("pq"), Some(TableFormat::Parquet));
        assert_eq!(TableFormat::from_extension("xlsx"), None);
        assert_eq!(TableFormat::infer(Path::new("a/b.parquet")).unwrap(), TableFormat::Parquet);
        assert!(TableFormat::infer(Path::new("noext")).is_err());
    }
}
