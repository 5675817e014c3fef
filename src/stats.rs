//! Numeric and date summary statistics over a single column.
//!
//! Both functions are total: cells that do not coerce are skipped and an
//! empty input produces a zeroed result rather than an error.

use anyhow::{Result, anyhow};
use chrono::NaiveDateTime;
use log::info;
use serde::Serialize;

use crate::{
    classify::{self, ColumnType},
    cli::{OutputFormat, StatsArgs},
    data::{CellValue, format_number},
    frequency,
    grid::ValueGrid,
    io_utils, table,
};

const NOT_AVAILABLE: &str = "N/A";
const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub mode: Option<f64>,
}

impl NumericStats {
    fn empty() -> Self {
        Self {
            count: 0,
            min: 0.0,
            max: 0.0,
            mean: 0.0,
            median: 0.0,
            mode: None,
        }
    }
}

pub fn numeric_stats(values: &[CellValue]) -> NumericStats {
    let mut sorted = values
        .iter()
        .filter_map(CellValue::as_number)
        .collect::<Vec<_>>();
    if sorted.is_empty() {
        return NumericStats::empty();
    }
    sorted.sort_by(f64::total_cmp);

    let count = sorted.len();
    let sum: f64 = sorted.iter().sum();
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    NumericStats {
        count,
        min: sorted[0],
        max: sorted[count - 1],
        mean: sum / count as f64,
        median,
        mode: sorted_mode(&sorted),
    }
}

/// Longest run in an ascending sequence; earlier runs win ties.
fn sorted_mode(sorted: &[f64]) -> Option<f64> {
    let mut best: Option<(f64, usize)> = None;
    let mut run_start = 0usize;
    for idx in 1..=sorted.len() {
        if idx < sorted.len() && sorted[idx] == sorted[run_start] {
            continue;
        }
        let run_len = idx - run_start;
        if best.is_none_or(|(_, len)| run_len > len) {
            best = Some((sorted[run_start], run_len));
        }
        run_start = idx;
    }
    best.filter(|(_, len)| *len >= 2).map(|(value, _)| value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateStats {
    pub count: usize,
    pub min: Option<NaiveDateTime>,
    pub max: Option<NaiveDateTime>,
    pub timespan_days: i64,
}

impl DateStats {
    pub fn min_label(&self) -> String {
        date_label(self.min)
    }

    pub fn max_label(&self) -> String {
        date_label(self.max)
    }
}

fn date_label(value: Option<NaiveDateTime>) -> String {
    value
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

pub fn date_stats(values: &[CellValue]) -> DateStats {
    let dates = values
        .iter()
        .filter_map(CellValue::as_datetime)
        .collect::<Vec<_>>();
    let min = dates.iter().min().copied();
    let max = dates.iter().max().copied();
    let timespan_days = match (min, max) {
        (Some(min), Some(max)) => {
            let millis = (max - min).num_milliseconds() as f64;
            (millis / MILLIS_PER_DAY).round() as i64
        }
        _ => 0,
    };
    DateStats {
        count: dates.len(),
        min,
        max,
        timespan_days,
    }
}

pub fn execute(args: &StatsArgs) -> Result<()> {
    let grid = io_utils::load_grid(&args.source)?;
    let columns = resolve_columns(&grid, &args.columns)?;
    let descriptors = classify::classify_columns(&grid);

    if args.frequency {
        let mut rows = Vec::new();
        let mut reports = Vec::new();
        for &idx in &columns {
            let header = &grid.headers()[idx];
            let stats = frequency::categorical_stats(&grid.non_empty_values(idx));
            for entry in stats.top(args.top) {
                rows.push(vec![
                    header.clone(),
                    entry.value.clone(),
                    entry.count.to_string(),
                    format!("{}%", entry.percentage),
                ]);
            }
            reports.push(serde_json::json!({ "column": header, "stats": stats }));
        }
        match args.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
            OutputFormat::Table => {
                let headers = ["column", "value", "count", "percent"].map(String::from);
                table::print_table(&headers, &rows);
            }
        }
        info!("Computed frequency counts for {} column(s)", columns.len());
        return Ok(());
    }

    let mut rows = Vec::new();
    let mut reports = Vec::new();
    for &idx in &columns {
        let descriptor = &descriptors[idx];
        let values = grid.non_empty_values(idx);
        match descriptor.column_type {
            ColumnType::Numeric => {
                let stats = numeric_stats(&values);
                rows.push(vec![
                    descriptor.header.clone(),
                    descriptor.column_type.to_string(),
                    stats.count.to_string(),
                    format_number(stats.min),
                    format_number(stats.max),
                    format_number(stats.mean),
                    format_number(stats.median),
                    stats.mode.map(format_number).unwrap_or_default(),
                ]);
                reports.push(serde_json::json!({ "column": descriptor.header, "numeric": stats }));
            }
            ColumnType::Date => {
                let stats = date_stats(&values);
                rows.push(vec![
                    descriptor.header.clone(),
                    descriptor.column_type.to_string(),
                    stats.count.to_string(),
                    stats.min_label(),
                    stats.max_label(),
                    String::new(),
                    String::new(),
                    format!("{} days", stats.timespan_days),
                ]);
                reports.push(serde_json::json!({ "column": descriptor.header, "date": stats }));
            }
            _ => {}
        }
    }
    if rows.is_empty() && args.format == OutputFormat::Table {
        info!("No numeric or date columns selected; try --frequency for categorical columns");
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&reports)?),
        OutputFormat::Table => {
            let headers = [
                "column", "type", "count", "min", "max", "mean", "median", "mode/span",
            ]
            .map(String::from);
            table::print_table(&headers, &rows);
        }
    }
    info!("Computed summary statistics for {} column(s)", rows.len());
    Ok(())
}

/// Header names match exactly first, then ignoring ASCII case.
pub(crate) fn resolve_columns(grid: &ValueGrid, specified: &[String]) -> Result<Vec<usize>> {
    if specified.is_empty() {
        return Ok((0..grid.column_count()).collect());
    }
    specified
        .iter()
        .flat_map(|entry| entry.split(','))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| {
            grid.column_index(name)
                .ok_or_else(|| anyhow!("Column '{name}' not found in input"))
        })
        .collect()
}
