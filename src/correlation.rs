//! Pearson correlation between paired columns.
//!
//! `None` is the "undefined" sentinel: fewer than [`MIN_PAIRS`] rows where both
//! sides are numeric, or no variance in either column.

use std::fmt;

use anyhow::Result;
use itertools::Itertools;
use log::info;
use serde::Serialize;

use crate::{
    classify::{self, ColumnType},
    cli::{CorrelateArgs, OutputFormat},
    data::CellValue,
    grid::ValueGrid,
    io_utils, stats, table,
};

pub const MIN_PAIRS: usize = 3;

pub fn pearson(xs: &[CellValue], ys: &[CellValue]) -> Option<f64> {
    let pairs = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| Some((x.as_number()?, y.as_number()?)))
        .collect::<Vec<_>>();
    if pairs.len() < MIN_PAIRS {
        return None;
    }
    // A constant side has no variance, but its float mean may not cancel exactly.
    let (first_x, first_y) = pairs[0];
    if pairs.iter().all(|(x, _)| *x == first_x) || pairs.iter().all(|(_, y)| *y == first_y) {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut covariance, mut variance_x, mut variance_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        variance_x += dx * dx;
        variance_y += dy * dy;
    }

    let denominator = (variance_x * variance_y).sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return None;
    }
    Some((covariance / denominator).clamp(-1.0, 1.0))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationStrength {
    Weak,
    Moderate,
    Strong,
}

impl CorrelationStrength {
    pub fn classify(coefficient: f64) -> Self {
        let magnitude = coefficient.abs();
        if magnitude > 0.7 {
            CorrelationStrength::Strong
        } else if magnitude > 0.4 {
            CorrelationStrength::Moderate
        } else {
            CorrelationStrength::Weak
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CorrelationStrength::Weak => "weak",
            CorrelationStrength::Moderate => "moderate",
            CorrelationStrength::Strong => "strong",
        }
    }
}

impl fmt::Display for CorrelationStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationDirection {
    Positive,
    Negative,
}

impl CorrelationDirection {
    pub fn of(coefficient: f64) -> Self {
        if coefficient >= 0.0 {
            CorrelationDirection::Positive
        } else {
            CorrelationDirection::Negative
        }
    }
}

impl fmt::Display for CorrelationDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationDirection::Positive => f.write_str("positive"),
            CorrelationDirection::Negative => f.write_str("negative"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnCorrelation {
    pub first: String,
    pub second: String,
    pub first_index: usize,
    pub second_index: usize,
    pub coefficient: f64,
    pub strength: CorrelationStrength,
    pub direction: CorrelationDirection,
}

impl ColumnCorrelation {
    pub fn describe(&self) -> String {
        format!(
            "{} and {}: {} {} correlation (r = {:.2})",
            self.first, self.second, self.strength, self.direction, self.coefficient
        )
    }
}

/// Correlates every unordered pair of `columns`, strongest first.
///
/// Undefined pairs are dropped. Pairs with equal magnitude keep the order in
/// which they were generated.
pub fn rank_pairs(grid: &ValueGrid, columns: &[usize]) -> Vec<ColumnCorrelation> {
    let values = columns
        .iter()
        .map(|&idx| (idx, grid.column_values(idx)))
        .collect::<Vec<_>>();

    let mut ranked = values
        .iter()
        .tuple_combinations()
        .filter_map(|((a, xs), (b, ys))| {
            let coefficient = pearson(xs, ys)?;
            Some(ColumnCorrelation {
                first: grid.headers()[*a].clone(),
                second: grid.headers()[*b].clone(),
                first_index: *a,
                second_index: *b,
                coefficient,
                strength: CorrelationStrength::classify(coefficient),
                direction: CorrelationDirection::of(coefficient),
            })
        })
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.coefficient.abs().total_cmp(&a.coefficient.abs()));
    ranked
}

pub fn execute(args: &CorrelateArgs) -> Result<()> {
    let grid = io_utils::load_grid(&args.source)?;
    let columns = if args.columns.is_empty() {
        classify::classify_columns(&grid)
            .iter()
            .enumerate()
            .filter(|(_, d)| d.column_type == ColumnType::Numeric)
            .map(|(idx, _)| idx)
            .collect()
    } else {
        stats::resolve_columns(&grid, &args.columns)?
    };
    let mut ranked = rank_pairs(&grid, &columns);
    if args.top > 0 {
        ranked.truncate(args.top);
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&ranked)?),
        OutputFormat::Table => {
            let headers = ["first", "second", "r", "strength", "direction"].map(String::from);
            let rows = ranked
                .iter()
                .map(|pair| {
                    vec![
                        pair.first.clone(),
                        pair.second.clone(),
                        format!("{:.4}", pair.coefficient),
                        pair.strength.to_string(),
                        pair.direction.to_string(),
                    ]
                })
                .collect::<Vec<_>>();
            table::print_table(&headers, &rows);
        }
    }
    info!(
        "Correlated {} column(s); {} defined pair(s)",
        columns.len(),
        ranked.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(values: &[f64]) -> Vec<CellValue> {
        values.iter().copied().map(CellValue::Number).collect()
    }

    #[test]
    fn column_with_itself_is_perfectly_correlated() {
        let xs = numbers(&[1.0, 4.0, 2.0, 8.0]);
        let r = pearson(&xs, &xs).unwrap();
        assert!((r - 1.0).abs() < 1e-9);
    }

    #[test]
    fn constant_column_is_undefined() {
        let xs = numbers(&[3.0; 10]);
        let ys = numbers(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        assert_eq!(pearson(&xs, &ys), None);
        assert_eq!(pearson(&xs, &xs), None);
    }

    #[test]
    fn fractional_constant_column_is_undefined() {
        let ys = numbers(&[1.0, 2.0, 3.0]);
        assert_eq!(pearson(&numbers(&[0.1; 3]), &ys), None);
        assert_eq!(pearson(&ys, &numbers(&[0.1; 3])), None);
        let squares = numbers(&[1.0, 4.0, 9.0, 16.0, 25.0, 36.0, 49.0]);
        assert_eq!(pearson(&numbers(&[0.7; 7]), &squares), None);
    }

    #[test]
    fn zero_coefficient_is_labelled_positive() {
        assert_eq!(CorrelationDirection::of(0.0), CorrelationDirection::Positive);
        assert_eq!(CorrelationDirection::of(-0.01), CorrelationDirection::Negative);
    }

    #[test]
    fn fewer_than_three_pairs_is_undefined() {
        let xs = vec![
            CellValue::Number(1.0),
            CellValue::Text("x".to_string()),
            CellValue::Number(3.0),
        ];
        let ys = numbers(&[2.0, 4.0, 6.0]);
        assert_eq!(pearson(&xs, &ys), None);
    }

    #[test]
    fn inverse_relationship_is_negative() {
        let xs = numbers(&[1.0, 2.0, 3.0, 4.0]);
        let ys = numbers(&[8.0, 6.0, 4.0, 2.0]);
        let r = pearson(&xs, &ys).unwrap();
        assert!((r + 1.0).abs() < 1e-9);
        assert_eq!(CorrelationDirection::of(r), CorrelationDirection::Negative);
        assert_eq!(CorrelationStrength::classify(r), CorrelationStrength::Strong);
    }

    #[test]
    fn strength_thresholds_are_inclusive_on_the_lower_band() {
        assert_eq!(CorrelationStrength::classify(0.4), CorrelationStrength::Weak);
        assert_eq!(CorrelationStrength::classify(0.41), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::classify(-0.7), CorrelationStrength::Moderate);
        assert_eq!(CorrelationStrength::classify(0.71), CorrelationStrength::Strong);
    }
}
