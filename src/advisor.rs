//! Chart recommendation heuristics.
//!
//! The advisor profiles columns with its own thresholds, separate from the
//! classifier's `is_categorical` flag: a column is numeric here when more than
//! half of its data rows coerce to a number, and categorical when it is not
//! numeric and holds between 2 and 10 distinct values. The decision table in
//! [`recommend_chart`] is evaluated top to bottom and the first rule wins.

use std::{collections::HashSet, fmt, fmt::Write as _};

use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    classify::{self, ColumnTypeDescriptor},
    cli::AdviseArgs,
    config::AnalysisConfig,
    correlation, formulas,
    grid::ValueGrid,
    io_utils,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdvisorThresholds {
    /// Share of data rows that must parse as numbers, exclusive.
    pub numeric_min_ratio: f64,
    pub categorical_min_unique: usize,
    pub categorical_max_unique: usize,
}

impl Default for AdvisorThresholds {
    fn default() -> Self {
        Self {
            numeric_min_ratio: 0.5,
            categorical_min_unique: 2,
            categorical_max_unique: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    GroupedColumn,
    Bar,
    Line,
    Scatter,
    Combo,
    Pie,
    Donut,
    Histogram,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartKind::GroupedColumn => "grouped column chart",
            ChartKind::Bar => "bar chart",
            ChartKind::Line => "line chart",
            ChartKind::Scatter => "scatter plot",
            ChartKind::Combo => "combo chart",
            ChartKind::Pie => "pie chart",
            ChartKind::Donut => "donut chart",
            ChartKind::Histogram => "histogram",
        }
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AdvisorProfile {
    pub numeric: Vec<usize>,
    pub categorical: Vec<usize>,
}

pub fn profile_columns(grid: &ValueGrid, thresholds: &AdvisorThresholds) -> AdvisorProfile {
    let rows = grid.row_count();
    let mut profile = AdvisorProfile::default();
    if rows == 0 {
        return profile;
    }
    for idx in 0..grid.column_count() {
        let numeric_hits = grid.column(idx).filter(|cell| cell.as_number().is_some()).count();
        if numeric_hits as f64 / rows as f64 > thresholds.numeric_min_ratio {
            profile.numeric.push(idx);
            continue;
        }
        let distinct = grid
            .column(idx)
            .filter(|cell| !cell.is_empty())
            .map(|cell| cell.display())
            .collect::<HashSet<_>>()
            .len();
        if (thresholds.categorical_min_unique..=thresholds.categorical_max_unique)
            .contains(&distinct)
        {
            profile.categorical.push(idx);
        }
    }
    debug!(
        "Advisor profile: numeric={:?} categorical={:?}",
        profile.numeric, profile.categorical
    );
    profile
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartRecommendation {
    /// 1-based index of the decision-table rule that fired.
    pub rule: u8,
    pub chart: Option<ChartKind>,
    pub columns: Vec<String>,
    pub rationale: String,
    pub alternatives: Vec<ChartKind>,
    pub correlation: Option<f64>,
}

impl ChartRecommendation {
    pub fn render(&self) -> String {
        let mut output = String::from("## Chart Recommendation\n");
        match self.chart {
            Some(chart) => {
                let _ = writeln!(output, "- Recommended: {chart}");
                let _ = writeln!(output, "- {}", self.rationale);
                if let Some(r) = self.correlation {
                    let _ = writeln!(output, "- Correlation between the series: r = {r:.2}");
                }
                if !self.alternatives.is_empty() {
                    let names = self
                        .alternatives
                        .iter()
                        .map(ChartKind::as_str)
                        .collect::<Vec<_>>()
                        .join(", ");
                    let _ = writeln!(output, "- Alternatives: {names}");
                }
            }
            None => {
                let _ = writeln!(output, "- No chart recommended");
                let _ = writeln!(output, "- {}", self.rationale);
            }
        }
        output
    }
}

pub fn recommend_chart(
    grid: &ValueGrid,
    descriptors: &[ColumnTypeDescriptor],
) -> ChartRecommendation {
    recommend_chart_with(grid, descriptors, &AdvisorThresholds::default())
}

pub fn recommend_chart_with(
    grid: &ValueGrid,
    descriptors: &[ColumnTypeDescriptor],
    thresholds: &AdvisorThresholds,
) -> ChartRecommendation {
    let profile = profile_columns(grid, thresholds);
    let name = |idx: usize| {
        descriptors
            .get(idx)
            .map(|d| d.header.clone())
            .unwrap_or_else(|| grid.headers()[idx].clone())
    };
    let numeric = &profile.numeric;
    let categorical = &profile.categorical;

    if numeric.len() >= 2 && !categorical.is_empty() {
        let (category, first, second) = (name(categorical[0]), name(numeric[0]), name(numeric[1]));
        return ChartRecommendation {
            rule: 1,
            chart: Some(ChartKind::GroupedColumn),
            rationale: format!("Compare {first} and {second} side by side for each {category}"),
            columns: vec![category, first, second],
            alternatives: vec![ChartKind::Bar, ChartKind::Line, ChartKind::Scatter],
            correlation: None,
        };
    }
    if numeric.len() == 1 && !categorical.is_empty() {
        let (category, value) = (name(categorical[0]), name(numeric[0]));
        return ChartRecommendation {
            rule: 2,
            chart: Some(ChartKind::Pie),
            rationale: format!("Show how {value} is distributed across {category}"),
            columns: vec![category, value],
            alternatives: vec![ChartKind::Donut],
            correlation: None,
        };
    }
    if numeric.len() >= 2 {
        let best = correlation::rank_pairs(grid, numeric).into_iter().next();
        let (x, y, r) = match best {
            Some(pair) => (pair.first_index, pair.second_index, Some(pair.coefficient)),
            None => (numeric[0], numeric[1], None),
        };
        let (x, y) = (name(x), name(y));
        return ChartRecommendation {
            rule: 3,
            chart: Some(ChartKind::Scatter),
            rationale: format!("Plot {x} against {y} to explore their relationship"),
            columns: vec![x, y],
            alternatives: vec![ChartKind::Line, ChartKind::Combo],
            correlation: r,
        };
    }
    if numeric.len() == 1 {
        let value = name(numeric[0]);
        return ChartRecommendation {
            rule: 4,
            chart: Some(ChartKind::Histogram),
            rationale: format!("Show the distribution of {value}"),
            columns: vec![value],
            alternatives: Vec::new(),
            correlation: None,
        };
    }
    if !categorical.is_empty() {
        let category = name(categorical[0]);
        return ChartRecommendation {
            rule: 5,
            chart: Some(ChartKind::Bar),
            rationale: format!("Count how often each {category} value occurs"),
            columns: vec![category],
            alternatives: Vec::new(),
            correlation: None,
        };
    }
    ChartRecommendation {
        rule: 6,
        chart: None,
        rationale: "The data needs preprocessing: no mostly-numeric column and no column with a small set of categories".to_string(),
        columns: Vec::new(),
        alternatives: Vec::new(),
        correlation: None,
    }
}

pub fn execute(args: &AdviseArgs) -> Result<()> {
    let config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    let grid = io_utils::load_grid(&args.source)?;
    let descriptors = classify::classify_columns_with(&grid, &config.classifier);
    let (want_charts, want_formulas) = match (args.charts, args.formulas) {
        (false, false) => (true, true),
        selected => selected,
    };

    let mut sections = Vec::new();
    if want_charts {
        let recommendation = recommend_chart_with(&grid, &descriptors, &config.advisor);
        info!("Chart advisor selected rule {}", recommendation.rule);
        sections.push(recommendation.render());
    }
    if want_formulas {
        let suggestions = formulas::recommend_formulas(&grid, &descriptors, &config.formulas);
        info!("Formula advisor produced {} suggestion(s)", suggestions.len());
        sections.push(formulas::render_formulas(&suggestions));
    }
    print!("{}", sections.join("\n"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify_columns;

    fn grid(rows: Vec<Vec<&str>>) -> ValueGrid {
        ValueGrid::from_text_rows(rows).unwrap()
    }

    #[test]
    fn numeric_threshold_is_strictly_above_half() {
        let grid = grid(vec![
            vec!["half"],
            vec!["1"],
            vec!["x"],
            vec!["2"],
            vec!["y"],
        ]);
        let profile = profile_columns(&grid, &AdvisorThresholds::default());
        assert!(profile.numeric.is_empty());
    }

    #[test]
    fn single_categorical_column_recommends_bar_chart() {
        let grid = grid(vec![
            vec!["status"],
            vec!["open"],
            vec!["closed"],
            vec!["open"],
        ]);
        let recommendation = recommend_chart(&grid, &classify_columns(&grid));
        assert_eq!(recommendation.rule, 5);
        assert_eq!(recommendation.chart, Some(ChartKind::Bar));
    }

    #[test]
    fn free_text_needs_preprocessing() {
        let grid = grid(vec![vec!["note"], vec!["alpha"]]);
        let recommendation = recommend_chart(&grid, &classify_columns(&grid));
        assert_eq!(recommendation.rule, 6);
        assert!(recommendation.chart.is_none());
        assert!(recommendation.render().contains("No chart recommended"));
    }
}
