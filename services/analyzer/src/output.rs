//! Rendering analysis outcomes for the terminal.

use raster_analysis::AnalysisOutcome;
use std::fmt::Write;

/// Output format for the analysis result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

pub fn render(outcome: &AnalysisOutcome, format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(outcome),
        OutputFormat::Table => Ok(render_table(outcome)),
    }
}

/// Legend table, one row per result.
pub fn render_table(outcome: &AnalysisOutcome) -> String {
    let name_width = outcome
        .results
        .iter()
        .map(|r| r.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("CLASS".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} analysis of {}x{} image: {} pixels analyzed, {:.1}% matched",
        outcome.analysis_type,
        outcome.metadata.image_width,
        outcome.metadata.image_height,
        outcome.total_pixels,
        outcome.metadata.match_percentage,
    );
    let _ = writeln!(
        out,
        "{:<name_width$}  {:<7}  {:>10}  {:>7}",
        "CLASS", "COLOR", "PIXELS", "PERCENT"
    );

    for result in &outcome.results {
        let color = result.rgb.map(|rgb| rgb.hex()).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<name_width$}  {:<7}  {:>10}  {:>6}%",
            result.name,
            color,
            result.count,
            result.percent_label()
        );
    }

    if outcome.results.is_empty() {
        let _ = writeln!(out, "(no classes)");
    }

    out
}
