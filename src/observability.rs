//! Outcome reporting for panel operations.
//!
//! Operations that accept options ([`crate::shift::ShiftOptions`],
//! [`crate::datasets::DatasetOptions`]) report success/failure to an optional
//! [`PanelObserver`], and raise `on_alert` when the failure severity reaches the configured
//! threshold.

use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Serialize;

use crate::error::{ErrorKind, PanelError, PanelResult};

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (operation failed).
    Error,
    /// Critical error (I/O or other infrastructure failures).
    Critical,
}

impl Severity {
    /// Severity of a failed operation: I/O problems are critical, bad input is an error.
    pub fn for_error(error: &PanelError) -> Self {
        match error.kind() {
            ErrorKind::Io => Self::Critical,
            ErrorKind::Validation | ErrorKind::Lookup | ErrorKind::Conflict | ErrorKind::Data => {
                Self::Error
            }
        }
    }
}

/// Which operation produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    Shift,
    LoadDataset,
}

/// Context about an operation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationContext {
    pub operation: Operation,
    /// Human-readable description of what was requested.
    pub target: String,
}

/// Minimal stats reported on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationStats {
    /// Rows in the produced table.
    pub rows: usize,
    /// Columns added to the input.
    pub columns_added: usize,
}

/// Observer interface for operation outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait PanelObserver: Send + Sync {
    /// Called when an operation succeeds.
    fn on_success(&self, _ctx: &OperationContext, _stats: OperationStats) {}

    /// Called when an operation fails.
    fn on_failure(&self, _ctx: &OperationContext, _severity: Severity, _error: &PanelError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &OperationContext, severity: Severity, error: &PanelError) {
        self.on_failure(ctx, severity, error)
    }
}

/// Report `result` to `observer`, if any.
pub(crate) fn report<T>(
    observer: Option<&Arc<dyn PanelObserver>>,
    alert_at_or_above: Severity,
    ctx: &OperationContext,
    result: &PanelResult<T>,
    stats: impl FnOnce(&T) -> OperationStats,
) {
    let Some(obs) = observer else {
        return;
    };
    match result {
        Ok(value) => obs.on_success(ctx, stats(value)),
        Err(e) => {
            let sev = Severity::for_error(e);
            obs.on_failure(ctx, sev, e);
            if sev >= alert_at_or_above {
                obs.on_alert(ctx, sev, e);
            }
        }
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PanelObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn PanelObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PanelObserver for CompositeObserver {
    fn on_success(&self, ctx: &OperationContext, stats: OperationStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &OperationContext, severity: Severity, error: &PanelError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &OperationContext, severity: Severity, error: &PanelError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs events to stderr, one line each.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PanelObserver for StdErrObserver {
    fn on_success(&self, ctx: &OperationContext, stats: OperationStats) {
        eprintln!(
            "[panel][ok] op={:?} target={} rows={} added={}",
            ctx.operation, ctx.target, stats.rows, stats.columns_added
        );
    }

    fn on_failure(&self, ctx: &OperationContext, severity: Severity, error: &PanelError) {
        eprintln!(
            "[panel][{severity:?}] op={:?} target={} err={error}",
            ctx.operation, ctx.target
        );
    }

    fn on_alert(&self, ctx: &OperationContext, severity: Severity, error: &PanelError) {
        eprintln!(
            "[ALERT][panel][{severity:?}] op={:?} target={} err={error}",
            ctx.operation, ctx.target
        );
    }
}

/// One JSON line written by [`FileObserver`].
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    ts: u64,
    event: &'static str,
    operation: Operation,
    target: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns_added: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Appends events to a local file as JSON lines.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append(&self, record: &EventRecord<'_>) {
        let Ok(line) = serde_json::to_string(record) else {
            return;
        };
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }

    fn failure_record<'a>(
        event: &'static str,
        ctx: &'a OperationContext,
        severity: Severity,
        error: &PanelError,
    ) -> EventRecord<'a> {
        EventRecord {
            ts: unix_ts(),
            event,
            operation: ctx.operation,
            target: &ctx.target,
            severity: Some(severity),
            rows: None,
            columns_added: None,
            error: Some(error.to_string()),
        }
    }
}

impl PanelObserver for FileObserver {
    fn on_success(&self, ctx: &OperationContext, stats: OperationStats) {
        self.append(&EventRecord {
            ts: unix_ts(),
            event: "ok",
            operation: ctx.operation,
            target: &ctx.target,
            severity: None,
            rows: Some(stats.rows),
            columns_added: Some(stats.columns_added),
            error: None,
        });
    }

    fn on_failure(&self, ctx: &OperationContext, severity: Severity, error: &PanelError) {
        self.append(&Self::failure_record("fail", ctx, severity, error));
    }

    fn on_alert(&self, ctx: &OperationContext, severity: Severity, error: &PanelError) {
        self.append(&Self::failure_record("alert", ctx, severity, error));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
