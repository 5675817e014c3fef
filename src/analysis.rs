//! One-shot JSON bundle of every analysis for a host UI.

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use crate::{
    advisor::{self, ChartRecommendation},
    classify::{self, ColumnTypeDescriptor},
    cli::AnalyzeArgs,
    config::AnalysisConfig,
    formulas::{self, FormulaSuggestion},
    grid::ValueGrid,
    io_utils,
    summary::{self, SummaryReport},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisBundle {
    pub descriptors: Vec<ColumnTypeDescriptor>,
    pub summary: SummaryReport,
    pub summary_text: String,
    pub chart: ChartRecommendation,
    pub formulas: Vec<FormulaSuggestion>,
}

pub fn analyze(grid: &ValueGrid, config: &AnalysisConfig) -> AnalysisBundle {
    let descriptors = classify::classify_columns_with(grid, &config.classifier);
    let summary = summary::build_summary(grid, &descriptors);
    let summary_text = summary.render();
    let chart = advisor::recommend_chart_with(grid, &descriptors, &config.advisor);
    let formulas = formulas::recommend_formulas(grid, &descriptors, &config.formulas);
    AnalysisBundle {
        descriptors,
        summary,
        summary_text,
        chart,
        formulas,
    }
}

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let config = AnalysisConfig::load_or_default(args.config.as_deref())?;
    let grid = io_utils::load_grid(&args.source)?;
    let bundle = analyze(&grid, &config);
    let rendered = serde_json::to_string_pretty(&bundle).context("Serializing analysis")?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered + "\n")
            .with_context(|| format!("Writing analysis to {path:?}"))?,
        None => println!("{rendered}"),
    }
    info!(
        "Analyzed {} column(s); chart rule {}, {} formula suggestion(s)",
        bundle.descriptors.len(),
        bundle.chart.rule,
        bundle.formulas.len()
    );
    Ok(())
}
