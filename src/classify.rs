//! Column type classification.
//!
//! Each data cell of a column lands in exactly one bucket (empty, numeric,
//! date, boolean, text). The primary type is the numeric, date or boolean
//! bucket that strictly outnumbers every other bucket, text included;
//! anything else falls back to text.
//!
//! Numeric precedes date, so a year-like `2024` counts as numeric.

use std::{collections::HashSet, fmt};

use anyhow::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{
    cli::{OutputFormat, ProbeArgs},
    config::AnalysisConfig,
    data::CellValue,
    grid::ValueGrid,
    io_utils, table,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Numeric,
    Date,
    Boolean,
    Text,
}

impl ColumnType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Date => "date",
            ColumnType::Boolean => "boolean",
            ColumnType::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnTypeDescriptor {
    pub header: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    pub unique_value_count: usize,
    pub empty_cells: usize,
    pub total_cells: usize,
    pub is_categorical: bool,
}

impl ColumnTypeDescriptor {
    pub fn non_empty_cells(&self) -> usize {
        self.total_cells.saturating_sub(self.empty_cells)
    }

    /// Percentage of filled cells, `100 - round(empty / total * 100)`.
    pub fn completeness(&self) -> u32 {
        if self.total_cells == 0 {
            return 100;
        }
        let missing = (self.empty_cells as f64 / self.total_cells as f64) * 100.0;
        100u32.saturating_sub(missing.round() as u32)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClassifierThresholds {
    /// Distinct/non-empty ratio below which a column counts as categorical.
    pub categorical_max_ratio: f64,
    pub categorical_min_unique: usize,
    pub categorical_max_unique: usize,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            categorical_max_ratio: 0.2,
            categorical_min_unique: 2,
            categorical_max_unique: 20,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct TypeTally {
    total: usize,
    empty: usize,
    numeric: usize,
    date: usize,
    boolean: usize,
    text: usize,
    distinct: HashSet<String>,
}

impl TypeTally {
    fn update(&mut self, value: &CellValue) {
        self.total += 1;
        match bucket_of(value) {
            Bucket::Empty => {
                self.empty += 1;
                return;
            }
            Bucket::Numeric => self.numeric += 1,
            Bucket::Date => self.date += 1,
            Bucket::Boolean => self.boolean += 1,
            Bucket::Text => self.text += 1,
        }
        self.distinct.insert(value.display());
    }

    fn dominates(&self, count: usize, others: [usize; 3]) -> bool {
        others.iter().all(|other| count > *other)
    }

    fn decide(&self) -> ColumnType {
        let (numeric, date, boolean, text) = (self.numeric, self.date, self.boolean, self.text);
        if self.dominates(numeric, [date, boolean, text]) {
            ColumnType::Numeric
        } else if self.dominates(date, [numeric, boolean, text]) {
            ColumnType::Date
        } else if self.dominates(boolean, [numeric, date, text]) {
            ColumnType::Boolean
        } else {
            ColumnType::Text
        }
    }

    fn is_categorical(&self, thresholds: &ClassifierThresholds) -> bool {
        let non_empty = self.total - self.empty;
        if non_empty == 0 {
            return false;
        }
        let unique = self.distinct.len();
        let ratio = unique as f64 / non_empty as f64;
        ratio < thresholds.categorical_max_ratio
            && (thresholds.categorical_min_unique..=thresholds.categorical_max_unique)
                .contains(&unique)
    }

    fn finalize(self, header: &str, thresholds: &ClassifierThresholds) -> ColumnTypeDescriptor {
        ColumnTypeDescriptor {
            header: header.to_string(),
            column_type: self.decide(),
            unique_value_count: self.distinct.len(),
            empty_cells: self.empty,
            total_cells: self.total,
            is_categorical: self.is_categorical(thresholds),
        }
    }
}

enum Bucket {
    Empty,
    Numeric,
    Date,
    Boolean,
    Text,
}

fn bucket_of(value: &CellValue) -> Bucket {
    if value.is_empty() {
        return Bucket::Empty;
    }
    match value {
        CellValue::Number(_) => Bucket::Numeric,
        CellValue::Date(_) => Bucket::Date,
        CellValue::Boolean(_) => Bucket::Boolean,
        CellValue::Text(_) if value.as_number().is_some() => Bucket::Numeric,
        CellValue::Text(_) if value.as_datetime().is_some() => Bucket::Date,
        CellValue::Text(_) if value.as_boolean().is_some() => Bucket::Boolean,
        _ => Bucket::Text,
    }
}

pub fn classify_columns(grid: &ValueGrid) -> Vec<ColumnTypeDescriptor> {
    classify_columns_with(grid, &ClassifierThresholds::default())
}

pub fn classify_columns_with(
    grid: &ValueGrid,
    thresholds: &ClassifierThresholds,
) -> Vec<ColumnTypeDescriptor> {
    grid.headers()
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            let mut tally = TypeTally::default();
            for value in grid.column(idx) {
                tally.update(value);
            }
            debug!(
                "Column '{header}': numeric={} date={} boolean={} text={} empty={}",
                tally.numeric, tally.date, tally.boolean, tally.text, tally.empty
            );
            tally.finalize(header, thresholds)
        })
        .collect()
}

pub fn execute(args: &ProbeArgs) -> Result<()> {
    let config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    let grid = io_utils::load_grid(&args.source)?;
    let descriptors = classify_columns_with(&grid, &config.classifier);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&descriptors)?),
        OutputFormat::Table => {
            let rows = descriptors
                .iter()
                .enumerate()
                .map(|(idx, descriptor)| {
                    vec![
                        (idx + 1).to_string(),
                        descriptor.header.clone(),
                        descriptor.column_type.to_string(),
                        descriptor.unique_value_count.to_string(),
                        descriptor.empty_cells.to_string(),
                        descriptor.total_cells.to_string(),
                        if descriptor.is_categorical { "yes" } else { "no" }.to_string(),
                    ]
                })
                .collect::<Vec<_>>();
            let headers = ["#", "column", "type", "unique", "empty", "total", "categorical"]
                .map(String::from);
            table::print_table(&headers, &rows);
        }
    }
    info!(
        "Classified {} column(s) across {} data row(s)",
        descriptors.len(),
        grid.row_count()
    );
    Ok(())
}
