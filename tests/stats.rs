use rust_panel_data::error::ErrorKind;
use rust_panel_data::mutate::mutate;
use rust_panel_data::pipe_list::{convert_pipe_list, PipeList};
use rust_panel_data::stats::{print_ttest, summary_no_fe, ttest};
use rust_panel_data::types::{DataSet, DataType, Value};

fn groups() -> DataSet {
    DataSet::from_columns(vec![
        (
            "score",
            DataType::Float64,
            [1.0, 2.0, 3.0, 4.0, 5.0, 2.0, 4.0, 6.0, 8.0, 10.0]
                .into_iter()
                .map(Value::from)
                .chain([Value::Null])
                .collect(),
        ),
        (
            "treated",
            DataType::Int64,
            [1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 1]
                .into_iter()
                .map(Value::from)
                .collect(),
        ),
    ])
    .unwrap()
}

#[test]
fn ttest_report_text() {
    let report = ttest(&groups(), "score", "treated").unwrap();

    assert_eq!(report.n_treated, 5);
    assert_eq!(report.n_base, 5);
    assert_eq!(
        report.to_string(),
        "T-test for score, grouped by treated:\n\
         \n\
         Mean for treated (1): 3.000\n\
         Mean for treated (0): 6.000\n\
         \n\
         Difference: -3.000\n\
         T-value: -1.897\n\
         Significance: 0.094"
    );
    assert_eq!(print_ttest(&groups(), "score", "treated").unwrap(), report);
}

#[test]
fn ttest_on_flag_built_with_mutate() {
    // Treatment indicator derived from a condition, as in an event-study setup.
    let base = DataSet::from_columns(vec![
        (
            "year",
            DataType::Int64,
            (2015..2025).map(Value::from).collect(),
        ),
        (
            "profit",
            DataType::Int64,
            [10, 12, 11, 13, 12, 20, 22, 21, 25, 23]
                .into_iter()
                .map(Value::from)
                .collect(),
        ),
    ])
    .unwrap();
    let flagged = mutate(&base, "year >= 2020", "post", 1, Some(0.into())).unwrap();

    let report = ttest(&flagged, "profit", "post").unwrap();
    assert!((report.mean_treated - 22.2).abs() < 1e-9);
    assert!((report.mean_base - 11.6).abs() < 1e-9);
    assert!(report.test.statistic > 0.0);
    assert!(report.test.p_value < 0.001);
}

#[test]
fn ttest_rejects_text_variables() {
    let ds = DataSet::from_columns(vec![
        ("name", DataType::Utf8, vec!["a".into(), "b".into()]),
        ("treated", DataType::Int64, vec![Value::Int64(1), Value::Int64(0)]),
    ])
    .unwrap();
    assert_eq!(ttest(&ds, "name", "treated").unwrap_err().kind(), ErrorKind::Data);
    assert_eq!(ttest(&ds, "nope", "treated").unwrap_err().kind(), ErrorKind::Lookup);
}

#[test]
fn summary_without_fixed_effects() {
    let summary = String::from(
        "                 coef    std err\n\
         Intercept      1.20      0.10\n\
         C(year)[T.2019] 0.30     0.05\n\
         leverage       -0.40     0.08",
    );
    let out = summary_no_fe(&summary);
    assert!(!out.contains("C(year)"));
    assert_eq!(out.lines().count(), 3);
}

#[test]
fn pipe_lists_from_exported_cells() {
    assert_eq!(convert_pipe_list("2017|2018|2019"), PipeList::Integers(vec![2017, 2018, 2019]));
    assert!(matches!(convert_pipe_list("ZENTECH|QUANTZ"), PipeList::Strings(v) if v.len() == 2));
}
