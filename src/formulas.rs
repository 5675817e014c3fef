//! Canned spreadsheet formula suggestions keyed by column type.
//!
//! The catalogue is plain configuration: each [`FormulaTarget`] owns a list of
//! templates with `{placeholder}` tokens that are filled with A1 references for
//! the column they are applied to.

use std::{collections::BTreeMap, fmt::Write as _, sync::OnceLock};

use anyhow::{Result, bail, ensure};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::{
    classify::{ColumnType, ColumnTypeDescriptor},
    grid::ValueGrid,
};

const PLACEHOLDERS: &[&str] = &[
    "range",
    "cell",
    "last_cell",
    "column",
    "header",
    "other_range",
    "other_header",
];

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{([a-z_]+)\}").expect("valid placeholder regex"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormulaTarget {
    Numeric,
    NumericPair,
    Text,
    Date,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormulaTemplate {
    pub label: String,
    pub template: String,
}

impl FormulaTemplate {
    fn new(label: &str, template: &str) -> Self {
        Self {
            label: label.to_string(),
            template: template.to_string(),
        }
    }

    pub fn render(&self, bindings: &BTreeMap<&str, String>) -> String {
        placeholder_pattern()
            .replace_all(&self.template, |caps: &regex::Captures<'_>| {
                bindings
                    .get(&caps[1])
                    .cloned()
                    .unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormulaCatalog {
    pub numeric: Vec<FormulaTemplate>,
    pub numeric_pair: Vec<FormulaTemplate>,
    pub text: Vec<FormulaTemplate>,
    pub date: Vec<FormulaTemplate>,
    pub boolean: Vec<FormulaTemplate>,
}

impl Default for FormulaCatalog {
    fn default() -> Self {
        Self {
            numeric: vec![
                FormulaTemplate::new("Sum", "=SUM({range})"),
                FormulaTemplate::new("Average", "=AVERAGE({range})"),
                FormulaTemplate::new("Minimum", "=MIN({range})"),
                FormulaTemplate::new("Maximum", "=MAX({range})"),
                FormulaTemplate::new("Count", "=COUNT({range})"),
            ],
            numeric_pair: vec![FormulaTemplate::new(
                "Correlation",
                "=CORREL({range}, {other_range})",
            )],
            text: vec![
                FormulaTemplate::new("Join values", "=TEXTJOIN(\", \", TRUE, {range})"),
                FormulaTemplate::new("First 3 characters", "=LEFT({cell}, 3)"),
                FormulaTemplate::new("Length", "=LEN({cell})"),
            ],
            date: vec![
                FormulaTemplate::new(
                    "Days between first and last",
                    "=DATEDIF({cell}, {last_cell}, \"D\")",
                ),
                FormulaTemplate::new("Year", "=YEAR({cell})"),
            ],
            boolean: vec![FormulaTemplate::new("Count TRUE", "=COUNTIF({range}, TRUE)")],
        }
    }
}

impl FormulaCatalog {
    pub fn templates(&self, target: FormulaTarget) -> &[FormulaTemplate] {
        match target {
            FormulaTarget::Numeric => &self.numeric,
            FormulaTarget::NumericPair => &self.numeric_pair,
            FormulaTarget::Text => &self.text,
            FormulaTarget::Date => &self.date,
            FormulaTarget::Boolean => &self.boolean,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let targets = [
            FormulaTarget::Numeric,
            FormulaTarget::NumericPair,
            FormulaTarget::Text,
            FormulaTarget::Date,
            FormulaTarget::Boolean,
        ];
        for target in targets {
            for template in self.templates(target) {
                ensure!(
                    template.template.starts_with('='),
                    "Formula template '{}' must start with '='",
                    template.label
                );
                for caps in placeholder_pattern().captures_iter(&template.template) {
                    let name = &caps[1];
                    if !PLACEHOLDERS.contains(&name) {
                        bail!(
                            "Formula template '{}' uses unknown placeholder '{{{name}}}'",
                            template.label
                        );
                    }
                    if name.starts_with("other_") && target != FormulaTarget::NumericPair {
                        bail!(
                            "Formula template '{}' uses '{{{name}}}' outside numeric_pair",
                            template.label
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormulaSuggestion {
    pub target: FormulaTarget,
    pub columns: Vec<String>,
    pub label: String,
    pub formula: String,
}

/// Spreadsheet column letters for a zero-based index (`0 -> A`, `26 -> AA`).
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut remaining = index + 1;
    while remaining > 0 {
        let offset = (remaining - 1) % 26;
        letters.push(char::from(b'A' + offset as u8));
        remaining = (remaining - 1) / 26;
    }
    letters.iter().rev().collect()
}

fn column_bindings(grid: &ValueGrid, idx: usize) -> BTreeMap<&'static str, String> {
    let letter = column_letter(idx);
    // Data starts on spreadsheet row 2, below the header.
    let last_row = grid.row_count().max(1) + 1;
    let mut bindings = BTreeMap::new();
    bindings.insert("range", format!("{letter}2:{letter}{last_row}"));
    bindings.insert("cell", format!("{letter}2"));
    bindings.insert("last_cell", format!("{letter}{last_row}"));
    bindings.insert("header", grid.headers()[idx].clone());
    bindings.insert("column", letter);
    bindings
}

fn target_for(column_type: ColumnType) -> FormulaTarget {
    match column_type {
        ColumnType::Numeric => FormulaTarget::Numeric,
        ColumnType::Date => FormulaTarget::Date,
        ColumnType::Boolean => FormulaTarget::Boolean,
        ColumnType::Text => FormulaTarget::Text,
    }
}

pub fn recommend_formulas(
    grid: &ValueGrid,
    descriptors: &[ColumnTypeDescriptor],
    catalog: &FormulaCatalog,
) -> Vec<FormulaSuggestion> {
    let mut suggestions = Vec::new();
    for (idx, descriptor) in descriptors.iter().enumerate() {
        if descriptor.non_empty_cells() == 0 {
            continue;
        }
        let target = target_for(descriptor.column_type);
        let bindings = column_bindings(grid, idx);
        for template in catalog.templates(target) {
            suggestions.push(FormulaSuggestion {
                target,
                columns: vec![descriptor.header.clone()],
                label: template.label.clone(),
                formula: template.render(&bindings),
            });
        }
    }

    let numeric = descriptors
        .iter()
        .enumerate()
        .filter(|(_, d)| d.column_type == ColumnType::Numeric && d.non_empty_cells() > 0)
        .map(|(idx, _)| idx)
        .take(2)
        .collect::<Vec<_>>();
    if let [first, second] = numeric[..] {
        let mut bindings = column_bindings(grid, first);
        let other = column_bindings(grid, second);
        bindings.insert("other_range", other["range"].clone());
        bindings.insert("other_header", other["header"].clone());
        for template in catalog.templates(FormulaTarget::NumericPair) {
            suggestions.push(FormulaSuggestion {
                target: FormulaTarget::NumericPair,
                columns: vec![
                    descriptors[first].header.clone(),
                    descriptors[second].header.clone(),
                ],
                label: template.label.clone(),
                formula: template.render(&bindings),
            });
        }
    }
    suggestions
}

pub fn render_formulas(suggestions: &[FormulaSuggestion]) -> String {
    let mut output = String::from("## Formula Suggestions\n");
    if suggestions.is_empty() {
        output.push_str("- No formula suggestions: no numeric, text, or date columns detected\n");
        return output;
    }
    let mut current: Option<&[String]> = None;
    for suggestion in suggestions {
        if current != Some(suggestion.columns.as_slice()) {
            let _ = writeln!(output, "### {}", suggestion.columns.join(" vs "));
            current = Some(suggestion.columns.as_slice());
        }
        let _ = writeln!(output, "- {}: `{}`", suggestion.label, suggestion.formula);
    }
    output
}
