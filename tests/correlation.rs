mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use proptest::prelude::*;
use sheet_insights::correlation::{
    CorrelationDirection, CorrelationStrength, pearson, rank_pairs,
};
use sheet_insights::data::CellValue;

use common::{TestWorkspace, grid_from_csv, sales_csv, sales_grid};

fn numbers(values: &[i32]) -> Vec<CellValue> {
    values.iter().map(|v| CellValue::Number(f64::from(*v))).collect()
}

#[test]
fn lockstep_columns_correlate_perfectly() {
    let grid = sales_grid(12);
    let ranked = rank_pairs(&grid, &[1, 2]);
    assert_eq!(ranked.len(), 1);
    let pair = &ranked[0];
    assert!((pair.coefficient - 1.0).abs() < 1e-9);
    assert_eq!(pair.strength, CorrelationStrength::Strong);
    assert_eq!(pair.direction, CorrelationDirection::Positive);
    assert_eq!(
        pair.describe(),
        "units and price: strong positive correlation (r = 1.00)"
    );
}

#[test]
fn pairs_are_ranked_by_magnitude_and_undefined_pairs_dropped() {
    let grid = grid_from_csv(
        "a,b,c,flat\n1,10,3,5\n2,8,1,5\n3,6,4,5\n4,4,1,5\n5,2,5,5\n",
    );
    let ranked = rank_pairs(&grid, &[0, 1, 2, 3]);
    assert_eq!(ranked.len(), 3);
    assert_eq!((ranked[0].first.as_str(), ranked[0].second.as_str()), ("a", "b"));
    assert_eq!(ranked[0].direction, CorrelationDirection::Negative);
    assert!(ranked.iter().all(|pair| pair.second != "flat"));
    assert!(
        ranked
            .windows(2)
            .all(|w| w[0].coefficient.abs() >= w[1].coefficient.abs())
    );
}

#[test]
fn fractional_constant_columns_are_excluded_from_ranking() {
    let grid = grid_from_csv("rate,units,price\n0.1,1,2.5\n0.1,2,3.5\n0.1,3,4.5\n0.1,4,6\n");
    let ranked = rank_pairs(&grid, &[0, 1, 2]);
    assert_eq!(ranked.len(), 1);
    assert_eq!((ranked[0].first.as_str(), ranked[0].second.as_str()), ("units", "price"));
}

#[test]
fn mixed_cells_only_use_rows_numeric_on_both_sides() {
    let xs = vec![
        CellValue::from("1"),
        CellValue::Empty,
        CellValue::from(2.0),
        CellValue::from("n/a"),
        CellValue::from(3.0),
    ];
    let ys = vec![
        CellValue::from(2.0),
        CellValue::from(100.0),
        CellValue::from(4.0),
        CellValue::from(-50.0),
        CellValue::from(6.0),
    ];
    let r = pearson(&xs, &ys).expect("defined");
    assert!((r - 1.0).abs() < 1e-9);
}

#[test]
fn correlate_command_lists_numeric_pairs() {
    let workspace = TestWorkspace::new();
    let input = workspace.write("sales.csv", &sales_csv(10));
    cargo_bin_cmd!("sheet-insights")
        .args(["correlate", "-i", input.to_str().unwrap()])
        .assert()
        .success()
        .stdout(contains("units"))
        .stdout(contains("1.0000"))
        .stdout(contains("strong"));
}

proptest! {
    #[test]
    fn column_with_itself_is_one_or_undefined(values in proptest::collection::vec(-500i32..500, 0..40)) {
        let xs = numbers(&values);
        let distinct = values.iter().collect::<std::collections::HashSet<_>>().len();
        match pearson(&xs, &xs) {
            Some(r) => prop_assert!((r - 1.0).abs() < 1e-9),
            None => prop_assert!(values.len() < 3 || distinct < 2),
        }
    }

    #[test]
    fn fractional_constant_is_always_undefined(
        constant in -1_000.0f64..1_000.0,
        others in proptest::collection::vec(-500i32..500, 3..40)
    ) {
        let xs = vec![CellValue::Number(constant); others.len()];
        let ys = numbers(&others);
        prop_assert_eq!(pearson(&xs, &ys), None);
        prop_assert_eq!(pearson(&ys, &xs), None);
    }

    #[test]
    fn coefficient_is_bounded_and_symmetric(
        pairs in proptest::collection::vec((-500i32..500, -500i32..500), 3..40)
    ) {
        let xs = numbers(&pairs.iter().map(|p| p.0).collect::<Vec<_>>());
        let ys = numbers(&pairs.iter().map(|p| p.1).collect::<Vec<_>>());
        let forward = pearson(&xs, &ys);
        let backward = pearson(&ys, &xs);
        prop_assert_eq!(forward.is_some(), backward.is_some());
        if let (Some(f), Some(b)) = (forward, backward) {
            prop_assert!((-1.0..=1.0).contains(&f));
            prop_assert!((f - b).abs() < 1e-12);
        }
    }
}
