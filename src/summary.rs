//! Dataset summary report.
//!
//! [`build_summary`] gathers everything into a [`SummaryReport`];
//! [`SummaryReport::render`] turns it into markdown-style text. The report is
//! a pure function of the grid and its descriptors, so identical input always
//! renders identical text.

use std::fmt::Write as _;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    classify::{self, ColumnType, ColumnTypeDescriptor},
    cli::{SummaryArgs, TextFormat},
    config::AnalysisConfig,
    correlation::{self, ColumnCorrelation},
    data::format_number,
    frequency::{self, CategoryCount},
    grid::ValueGrid,
    io_utils,
    stats::{self, DateStats, NumericStats},
};

const TOP_CATEGORIES: usize = 3;
const TOP_CORRELATIONS: usize = 3;
const TOP_MISSING: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ColumnDetail {
    Numeric(NumericStats),
    Date(DateStats),
    Distinct { unique_value_count: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSection {
    pub header: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub is_categorical: bool,
    pub detail: ColumnDetail,
    pub top_categories: Vec<CategoryCount>,
    pub completeness: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingData {
    pub header: String,
    pub empty_cells: usize,
    pub missing_percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryReport {
    pub row_count: usize,
    pub column_count: usize,
    pub columns: Vec<ColumnSection>,
    pub numeric_column_count: usize,
    pub correlations: Vec<ColumnCorrelation>,
    pub overall_completeness: u32,
    pub most_missing: Vec<MissingData>,
    pub has_categorical: bool,
}

pub fn build_summary(grid: &ValueGrid, descriptors: &[ColumnTypeDescriptor]) -> SummaryReport {
    let columns = descriptors
        .iter()
        .enumerate()
        .map(|(idx, descriptor)| column_section(grid, idx, descriptor))
        .collect::<Vec<_>>();

    let numeric_columns = descriptors
        .iter()
        .enumerate()
        .filter(|(_, d)| d.column_type == ColumnType::Numeric)
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();
    let mut correlations = correlation::rank_pairs(grid, &numeric_columns);
    correlations.truncate(TOP_CORRELATIONS);

    let overall_completeness = if descriptors.is_empty() {
        100
    } else {
        let total: u32 = descriptors.iter().map(ColumnTypeDescriptor::completeness).sum();
        (f64::from(total) / descriptors.len() as f64).round() as u32
    };

    let mut missing = descriptors
        .iter()
        .filter(|d| d.empty_cells > 0)
        .map(|d| MissingData {
            header: d.header.clone(),
            empty_cells: d.empty_cells,
            missing_percentage: 100 - d.completeness(),
        })
        .collect::<Vec<_>>();
    missing.sort_by(|a, b| b.empty_cells.cmp(&a.empty_cells));
    missing.truncate(TOP_MISSING);

    SummaryReport {
        row_count: grid.row_count(),
        column_count: grid.column_count(),
        columns,
        numeric_column_count: numeric_columns.len(),
        correlations,
        overall_completeness,
        most_missing: missing,
        has_categorical: descriptors.iter().any(|d| d.is_categorical),
    }
}

fn column_section(grid: &ValueGrid, idx: usize, descriptor: &ColumnTypeDescriptor) -> ColumnSection {
    let values = grid.non_empty_values(idx);
    let detail = match descriptor.column_type {
        ColumnType::Numeric => ColumnDetail::Numeric(stats::numeric_stats(&values)),
        ColumnType::Date => ColumnDetail::Date(stats::date_stats(&values)),
        _ => ColumnDetail::Distinct {
            unique_value_count: descriptor.unique_value_count,
        },
    };
    let top_categories = if descriptor.is_categorical {
        frequency::categorical_stats(&values)
            .top(TOP_CATEGORIES)
            .to_vec()
    } else {
        Vec::new()
    };
    ColumnSection {
        header: descriptor.header.clone(),
        column_type: descriptor.column_type,
        is_categorical: descriptor.is_categorical,
        detail,
        top_categories,
        completeness: descriptor.completeness(),
    }
}

fn format_categories(categories: &[CategoryCount]) -> String {
    categories
        .iter()
        .map(|entry| format!("{} ({}%)", entry.value, entry.percentage))
        .collect::<Vec<_>>()
        .join(", ")
}

impl SummaryReport {
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Data Summary");
        let _ = writeln!(out);
        let _ = writeln!(out, "## Overview");
        let _ = writeln!(out, "- Rows: {}", self.row_count);
        let _ = writeln!(out, "- Columns: {}", self.column_count);

        let _ = writeln!(out);
        let _ = writeln!(out, "## Columns");
        for column in &self.columns {
            self.render_column(&mut out, column);
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "## Correlations");
        if self.numeric_column_count < 2 {
            let _ = writeln!(out, "- Fewer than two numeric columns; no correlations computed");
        } else if self.correlations.is_empty() {
            let _ = writeln!(out, "- No defined correlations between numeric columns");
        } else {
            for pair in &self.correlations {
                let _ = writeln!(out, "- {}", pair.describe());
            }
        }

        let categorical = self
            .columns
            .iter()
            .filter(|c| c.is_categorical)
            .collect::<Vec<_>>();
        if !categorical.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "## Categorical Breakdown");
            for column in categorical {
                let _ = writeln!(out, "### {}", column.header);
                for entry in &column.top_categories {
                    let _ = writeln!(
                        out,
                        "- {}: {} ({}%)",
                        entry.value, entry.count, entry.percentage
                    );
                }
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "## Data Quality");
        let _ = writeln!(out, "- Overall completeness: {}%", self.overall_completeness);
        if self.most_missing.is_empty() {
            let _ = writeln!(out, "- No missing values detected");
        } else {
            let _ = writeln!(out, "- Columns with the most missing data:");
            for entry in &self.most_missing {
                let _ = writeln!(
                    out,
                    "  - {}: {} empty cell(s) ({}% missing)",
                    entry.header, entry.empty_cells, entry.missing_percentage
                );
            }
        }

        let _ = writeln!(out);
        let _ = writeln!(out, "## Visualization Opportunities");
        let mut any = false;
        if self.numeric_column_count > 0 {
            any = true;
            let _ = writeln!(
                out,
                "- Distribution charts (histograms, box plots) for numeric columns"
            );
        }
        if self.has_categorical {
            any = true;
            let _ = writeln!(out, "- Proportion charts (pie, bar) for categorical columns");
        }
        if self.numeric_column_count >= 2 {
            any = true;
            let _ = writeln!(
                out,
                "- Relationship visualizations (scatter plots) between numeric columns"
            );
        }
        if !any {
            let _ = writeln!(out, "- No obvious chart types; consider cleaning or reshaping the data");
        }
        out
    }

    fn render_column(&self, out: &mut String, column: &ColumnSection) {
        let flag = if column.is_categorical { ", categorical" } else { "" };
        let _ = writeln!(out, "### {} ({}{flag})", column.header, column.column_type);
        match &column.detail {
            ColumnDetail::Numeric(stats) => {
                let _ = writeln!(
                    out,
                    "- Min: {}, Max: {}, Mean: {}, Median: {}",
                    format_number(stats.min),
                    format_number(stats.max),
                    format_number(stats.mean),
                    format_number(stats.median)
                );
                let mode = stats
                    .mode
                    .map(format_number)
                    .unwrap_or_else(|| "none".to_string());
                let _ = writeln!(out, "- Mode: {mode}");
            }
            ColumnDetail::Date(stats) => {
                let _ = writeln!(
                    out,
                    "- Earliest: {}, Latest: {}, Timespan: {} day(s)",
                    stats.min_label(),
                    stats.max_label(),
                    stats.timespan_days
                );
            }
            ColumnDetail::Distinct { unique_value_count } => {
                let _ = writeln!(out, "- Distinct values: {unique_value_count}");
            }
        }
        if !column.top_categories.is_empty() {
            let _ = writeln!(
                out,
                "- Top categories: {}",
                format_categories(&column.top_categories)
            );
        }
        let _ = writeln!(out, "- Completeness: {}%", column.completeness);
    }
}

/// Renders the summary report text for a grid.
pub fn generate_summary(grid: &ValueGrid, descriptors: &[ColumnTypeDescriptor]) -> String {
    build_summary(grid, descriptors).render()
}

pub fn execute(args: &SummaryArgs) -> Result<()> {
    let config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    let grid = io_utils::load_grid(&args.source)?;
    let descriptors = classify::classify_columns_with(&grid, &config.classifier);
    let report = build_summary(&grid, &descriptors);
    let rendered = match args.format {
        TextFormat::Text => report.render(),
        TextFormat::Json => serde_json::to_string_pretty(&report)? + "\n",
    };
    match &args.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("Writing summary to {path:?}"))?,
        None => print!("{rendered}"),
    }
    info!(
        "Summarized {} column(s) across {} data row(s)",
        report.column_count, report.row_count
    );
    Ok(())
}
