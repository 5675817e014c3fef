mod common;

use proptest::prelude::*;
use sheet_insights::classify::{
    ClassifierThresholds, ColumnType, classify_columns, classify_columns_with,
};
use sheet_insights::data::CellValue;
use sheet_insights::grid::ValueGrid;

use common::{grid_from_csv, sales_grid};

fn single_column(header: &str, cells: &[String]) -> ValueGrid {
    let mut rows = vec![vec![header.to_string()]];
    rows.extend(cells.iter().map(|cell| vec![cell.clone()]));
    ValueGrid::from_text_rows(rows).expect("grid")
}

#[test]
fn sales_columns_receive_expected_types() {
    let descriptors = classify_columns(&sales_grid(20));
    let types = descriptors
        .iter()
        .map(|d| (d.header.as_str(), d.column_type))
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            ("region", ColumnType::Text),
            ("units", ColumnType::Numeric),
            ("price", ColumnType::Numeric),
            ("ordered", ColumnType::Date),
            ("active", ColumnType::Boolean),
            ("note", ColumnType::Text),
        ]
    );
}

#[test]
fn categorical_flag_needs_low_ratio_and_bounded_distinct_count() {
    let descriptors = classify_columns(&sales_grid(20));
    let region = &descriptors[0];
    assert!(region.is_categorical);
    assert_eq!(region.unique_value_count, 3);
    assert!(descriptors[4].is_categorical);
    assert!(!descriptors[1].is_categorical);
    assert!(!descriptors[5].is_categorical);

    // Three distinct values in six rows is a 0.5 ratio.
    let small = classify_columns(&sales_grid(6));
    assert!(!small[0].is_categorical);
}

fn cycling_column(distinct: usize, rows: usize) -> ValueGrid {
    let cells = (0..rows)
        .map(|i| format!("cat{}", i % distinct))
        .collect::<Vec<_>>();
    single_column("category", &cells)
}

#[test]
fn categorical_ratio_boundary_is_exclusive() {
    // 5 of 30 is below the 0.2 ratio, 6 of 30 sits exactly on it.
    assert!(classify_columns(&cycling_column(5, 30))[0].is_categorical);
    assert!(!classify_columns(&cycling_column(6, 30))[0].is_categorical);
}

#[test]
fn categorical_distinct_count_caps_at_twenty() {
    let twenty = classify_columns(&cycling_column(20, 110)).remove(0);
    assert_eq!(twenty.unique_value_count, 20);
    assert!(twenty.is_categorical);

    let twenty_one = classify_columns(&cycling_column(21, 110)).remove(0);
    assert_eq!(twenty_one.unique_value_count, 21);
    assert!(!twenty_one.is_categorical);
}

#[test]
fn mixed_case_boolean_spellings_are_text() {
    let cells = ["True", "False", "True"].map(String::from);
    let descriptors = classify_columns(&single_column("flag", &cells));
    assert_eq!(descriptors[0].column_type, ColumnType::Text);

    let cells = ["TRUE", "false", "true"].map(String::from);
    let descriptors = classify_columns(&single_column("flag", &cells));
    assert_eq!(descriptors[0].column_type, ColumnType::Boolean);
}

#[test]
fn single_repeated_value_is_not_categorical() {
    let cells = vec!["same".to_string(); 30];
    let descriptors = classify_columns(&single_column("constant", &cells));
    assert_eq!(descriptors[0].unique_value_count, 1);
    assert!(!descriptors[0].is_categorical);
}

#[test]
fn custom_thresholds_change_the_categorical_decision() {
    let grid = sales_grid(6);
    let relaxed = ClassifierThresholds {
        categorical_max_ratio: 0.6,
        ..ClassifierThresholds::default()
    };
    assert!(classify_columns_with(&grid, &relaxed)[0].is_categorical);
}

#[test]
fn empty_cells_are_counted_and_excluded_from_distinct_values() {
    let descriptors = classify_columns(&sales_grid(20));
    let note = &descriptors[5];
    assert_eq!(note.total_cells, 20);
    assert_eq!(note.empty_cells, 5);
    assert_eq!(note.non_empty_cells(), 15);
    assert_eq!(note.unique_value_count, 15);
    assert_eq!(note.completeness(), 75);
}

#[test]
fn header_only_grid_yields_text_columns() {
    let grid = grid_from_csv("a,b\n");
    let descriptors = classify_columns(&grid);
    assert_eq!(descriptors.len(), 2);
    assert!(descriptors.iter().all(|d| d.column_type == ColumnType::Text));
    assert!(descriptors.iter().all(|d| d.total_cells == 0));
    assert!(descriptors.iter().all(|d| d.completeness() == 100));
}

#[test]
fn json_native_cells_classify_like_their_text_forms() {
    let grid = ValueGrid::from_rows(vec![
        vec![CellValue::from("amount"), CellValue::from("when")],
        vec![CellValue::from(1.5), CellValue::from("2024-05-01")],
        vec![CellValue::from("2.5"), CellValue::from("2024-05-02")],
        vec![CellValue::from(3.0), CellValue::Empty],
    ])
    .expect("grid");
    let descriptors = classify_columns(&grid);
    assert_eq!(descriptors[0].column_type, ColumnType::Numeric);
    assert_eq!(descriptors[1].column_type, ColumnType::Date);
    assert_eq!(descriptors[1].empty_cells, 1);
}

proptest! {
    #[test]
    fn integer_columns_are_numeric(values in proptest::collection::vec(-100_000i64..100_000, 1..40)) {
        let cells = values.iter().map(|v| v.to_string()).collect::<Vec<_>>();
        let descriptors = classify_columns(&single_column("n", &cells));
        prop_assert_eq!(descriptors[0].column_type, ColumnType::Numeric);
    }

    #[test]
    fn classification_is_idempotent(
        cells in proptest::collection::vec("[a-c0-9 ]{0,4}", 0..30)
    ) {
        let grid = single_column("mixed", &cells);
        prop_assert_eq!(classify_columns(&grid), classify_columns(&grid));
    }

    #[test]
    fn completeness_matches_empty_share(filled in 1usize..40, empty in 0usize..40) {
        let mut cells = vec!["x".to_string(); filled];
        cells.extend(std::iter::repeat_n(String::new(), empty));
        let descriptor = classify_columns(&single_column("c", &cells)).remove(0);
        let total = filled + empty;
        let expected = 100 - ((empty as f64 / total as f64) * 100.0).round() as u32;
        prop_assert_eq!(descriptor.total_cells, total);
        prop_assert_eq!(descriptor.completeness(), expected);
    }
}
