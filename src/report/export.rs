//! Analysis export functionality

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{AnalysisReport, LogitConfig};

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct AnalysisMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    /// Protlogit version
    pub protlogit_version: String,
    /// Input file path
    pub input_file: String,
    /// Solver settings used for the fit
    pub solver: LogitConfig,
    /// Sentinel codes replaced during cleaning
    pub sentinels: Vec<f64>,
}

/// Complete analysis export with metadata
#[derive(Serialize)]
pub struct AnalysisExport<'a> {
    pub metadata: AnalysisMetadata,
    #[serde(flatten)]
    pub report: &'a AnalysisReport,
}

/// Parameters for the analysis export
pub struct ExportParams<'a> {
    pub input_file: &'a str,
    pub config: &'a LogitConfig,
    pub sentinels: &'a [f64],
}

/// Serialize a report with its run metadata
pub fn analysis_to_json(report: &AnalysisReport, params: &ExportParams) -> Result<String> {
    let export = AnalysisExport {
        metadata: AnalysisMetadata {
            timestamp: Utc::now().to_rfc3339(),
            protlogit_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: params.input_file.to_string(),
            solver: *params.config,
            sentinels: params.sentinels.to_vec(),
        },
        report,
    };

    serde_json::to_string_pretty(&export).context("Failed to serialize analysis to JSON")
}

/// Export an analysis report to a JSON file
pub fn export_analysis(report: &AnalysisReport, output_path: &Path, params: &ExportParams) -> Result<()> {
    let json = analysis_to_json(report, params)?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis to {}", output_path.display()))?;

    Ok(())
}
