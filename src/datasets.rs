//! Bundled example datasets.
//!
//! A [`DatasetRegistry`] maps dataset names to a file name, an on-disk format and the schema used
//! to read it. [`load_dataset`] resolves a name against [`DatasetRegistry::bundled`] and reads the
//! file from [`DatasetOptions::data_dir`], which defaults to the crate's own `data/` directory.
//!
//! ```rust
//! use rust_panel_data::datasets::{load_dataset, DatasetOptions};
//!
//! # fn main() -> Result<(), rust_panel_data::PanelError> {
//! let firms = load_dataset("firm_panel", &DatasetOptions::default())?;
//! println!("rows={}", firms.row_count());
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{PanelError, PanelResult};
use crate::io::{read_table, TableFormat};
use crate::observability::{report, Operation, OperationContext, OperationStats, PanelObserver, Severity};
use crate::types::{DataSet, DataType, Field, Schema};

/// A dataset the registry knows how to read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundledDataset {
    pub name: String,
    /// File name, relative to the data directory.
    pub file_name: String,
    pub format: TableFormat,
    pub schema: Schema,
}

impl BundledDataset {
    /// Entry whose format is inferred from the extension of `file_name`.
    pub fn from_file(
        name: impl Into<String>,
        file_name: impl Into<String>,
        schema: Schema,
    ) -> PanelResult<Self> {
        let file_name = file_name.into();
        let format = TableFormat::infer(Path::new(&file_name))?;
        Ok(Self {
            name: name.into(),
            file_name,
            format,
            schema,
        })
    }
}

/// Name -> dataset lookup table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DatasetRegistry {
    entries: Vec<BundledDataset>,
}

impl DatasetRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The datasets shipped with the crate.
    pub fn bundled() -> Self {
        Self::new().with(BundledDataset {
            name: "firm_panel".to_string(),
            file_name: "firm_panel.csv".to_string(),
            format: TableFormat::Csv,
            schema: firm_panel_schema(),
        })
    }

    /// Add (or replace) an entry.
    pub fn with(mut self, dataset: BundledDataset) -> Self {
        self.entries.retain(|d| d.name != dataset.name);
        self.entries.push(dataset);
        self
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.name.as_str()).collect()
    }

    /// Look up `name`; unknown names are a lookup error listing the known ones.
    pub fn get(&self, name: &str) -> PanelResult<&BundledDataset> {
        self.entries
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| PanelError::UnknownDataset {
                name: name.to_string(),
                known: self.names().into_iter().map(str::to_string).collect(),
            })
    }
}

/// Directory holding the files of [`DatasetRegistry::bundled`].
pub fn bundled_data_dir() -> PathBuf {
    PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/data"))
}

/// Firm-year panel: one row per company and fiscal year.
pub fn firm_panel_schema() -> Schema {
    Schema::new(vec![
        Field::new("company", DataType::Utf8),
        Field::new("year", DataType::Int64),
        Field::new("profit", DataType::Int64),
        Field::new("assets", DataType::Int64),
        Field::new("leverage", DataType::Float64),
        Field::new("revenue", DataType::Int64),
        Field::new("expenses", DataType::Int64),
    ])
}

/// Options controlling dataset loading.
#[derive(Clone)]
pub struct DatasetOptions {
    /// Directory holding the dataset files.
    pub data_dir: PathBuf,
    /// Registry used to resolve names.
    pub registry: DatasetRegistry,
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PanelObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl Default for DatasetOptions {
    fn default() -> Self {
        Self {
            data_dir: bundled_data_dir(),
            registry: DatasetRegistry::bundled(),
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

impl fmt::Debug for DatasetOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatasetOptions")
            .field("data_dir", &self.data_dir)
            .field("datasets", &self.registry.names())
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

/// Load a known dataset by name.
///
/// # Errors
///
/// - [`PanelError::UnknownDataset`] if `name` is not in `options.registry`
/// - I/O, Parquet/CSV and schema errors from reading the file
pub fn load_dataset(name: &str, options: &DatasetOptions) -> PanelResult<DataSet> {
    let ctx = OperationContext {
        operation: Operation::LoadDataset,
        target: name.to_string(),
    };

    let result = options.registry.get(name).and_then(|dataset| {
        let path = options.data_dir.join(&dataset.file_name);
        read_table(&path, &dataset.schema, dataset.format)
    });

    report(
        options.observer.as_ref(),
        options.alert_at_or_above,
        &ctx,
        &result,
        |ds| OperationStats {
            rows: ds.row_count(),
            columns_added: 0,
        },
    );

    result
}
