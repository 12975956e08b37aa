use std::fs;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use rust_panel_data::observability::{
    CompositeObserver, FileObserver, Operation, OperationContext, OperationStats, PanelObserver,
    Severity, StdErrObserver,
};
use rust_panel_data::shift::{time_shift, ShiftOptions};
use rust_panel_data::types::{DataSet, DataType, Value};
use rust_panel_data::PanelError;

#[derive(Default)]
struct RecordingObserver {
    successes: Mutex<Vec<(OperationContext, OperationStats)>>,
    failures: Mutex<Vec<Severity>>,
    alerts: Mutex<Vec<Severity>>,
}

impl PanelObserver for RecordingObserver {
    fn on_success(&self, ctx: &OperationContext, stats: OperationStats) {
        self.successes.lock().unwrap().push((ctx.clone(), stats));
    }

    fn on_failure(&self, _ctx: &OperationContext, severity: Severity, _error: &PanelError) {
        self.failures.lock().unwrap().push(severity);
    }

    fn on_alert(&self, _ctx: &OperationContext, severity: Severity, _error: &PanelError) {
        self.alerts.lock().unwrap().push(severity);
    }
}

fn panel() -> DataSet {
    DataSet::from_columns(vec![
        ("id", DataType::Int64, vec![Value::Int64(1), Value::Int64(1)]),
        ("time", DataType::Int64, vec![Value::Int64(1), Value::Int64(2)]),
        ("x", DataType::Float64, vec![Value::Float64(0.1), Value::Float64(0.2)]),
        ("y", DataType::Float64, vec![Value::Float64(1.0), Value::Float64(2.0)]),
    ])
    .unwrap()
}

#[test]
fn successful_shift_reports_rows_and_added_columns() {
    let obs = Arc::new(RecordingObserver::default());
    let options = ShiftOptions {
        observer: Some(obs.clone()),
        ..Default::default()
    };

    time_shift(&panel(), ["x", "y"], 1, &options).unwrap();

    let successes = obs.successes.lock().unwrap().clone();
    assert_eq!(successes.len(), 1);
    let (ctx, stats) = &successes[0];
    assert_eq!(ctx.operation, Operation::Shift);
    assert_eq!(ctx.target, "lag 1 of [x, y] by (id, time)");
    assert_eq!(
        *stats,
        OperationStats {
            rows: 2,
            columns_added: 2
        }
    );
    assert!(obs.failures.lock().unwrap().is_empty());
}

#[test]
fn alert_threshold_is_respected() {
    let obs = Arc::new(RecordingObserver::default());
    let options = ShiftOptions {
        observer: Some(obs.clone()),
        alert_at_or_above: Severity::Error,
        ..Default::default()
    };

    let _ = time_shift(&panel(), "x", 0, &options).unwrap_err();
    assert_eq!(obs.failures.lock().unwrap().clone(), vec![Severity::Error]);
    assert_eq!(obs.alerts.lock().unwrap().clone(), vec![Severity::Error]);

    let quiet = Arc::new(RecordingObserver::default());
    let options = ShiftOptions {
        observer: Some(quiet.clone()),
        ..Default::default()
    };
    let _ = time_shift(&panel(), "missing", 1, &options).unwrap_err();
    assert_eq!(quiet.failures.lock().unwrap().clone(), vec![Severity::Error]);
    assert!(quiet.alerts.lock().unwrap().is_empty());
}

#[test]
fn file_observer_writes_json_lines() {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let path = std::env::temp_dir().join(format!("rust-panel-data-events-{nanos}.jsonl"));

    let recorder = Arc::new(RecordingObserver::default());
    let observers: Vec<Arc<dyn PanelObserver>> = vec![
        Arc::new(FileObserver::new(&path)),
        Arc::new(StdErrObserver),
        recorder.clone(),
    ];
    let composite = CompositeObserver::new(observers);
    let options = ShiftOptions {
        observer: Some(Arc::new(composite)),
        ..Default::default()
    };

    time_shift(&panel(), "x", -1, &options).unwrap();
    let _ = time_shift(&panel(), "x", 0, &options).unwrap_err();

    let content = fs::read_to_string(&path).unwrap();
    let events: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(events.len(), 2);

    assert_eq!(events[0]["event"], "ok");
    assert_eq!(events[0]["operation"], "shift");
    assert_eq!(events[0]["target"], "lead 1 of [x] by (id, time)");
    assert_eq!(events[0]["columns_added"], 1);

    assert_eq!(events[1]["event"], "fail");
    assert_eq!(events[1]["severity"], "Error");
    assert!(events[1]["error"].as_str().unwrap().contains("invalid argument"));

    assert_eq!(recorder.successes.lock().unwrap().len(), 1);
    assert_eq!(recorder.failures.lock().unwrap().len(), 1);

    let _ = fs::remove_file(path);
}
