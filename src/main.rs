//! Protlogit: Cohort Logistic Regression CLI Tool
//!
//! Cleans sentinel codes out of a protein intake survey, derives ratio and
//! threshold variables, and fits a univariate logistic model on a cohort
//! selected by weight and blood-pressure status.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use protlogit::cli::Cli;
use protlogit::pipeline::{
    analyze_missing_values, build_derived_variables, count_sentinels, load_dataset_with_progress,
    normalize_missing, run_analysis, validate_schema, APTP_RATIO, CRP_CATEGORY, DEFAULT_SENTINELS,
    HIGH_BP, OVERWEIGHT, REQUIRED_COLUMNS, VPTP_RATIO,
};
use protlogit::report::{
    display_analysis, export_analysis, render_curve, render_histogram, CleaningSummary,
    ExportParams,
};
use protlogit::utils::{
    create_spinner, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning,
};

const HISTOGRAM_WIDTH: usize = 40;
const CURVE_WIDTH: usize = 60;
const CURVE_HEIGHT: usize = 15;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let request = cli.request();
    let config = cli.logit_config();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(
        &cli.input,
        &request.outcome,
        &request.predictor,
        &request.display_variable,
        &request.cohort.to_string(),
    );

    // Step 1: Load dataset and check required columns
    print_step_header(1, "Load Dataset");
    let step_start = Instant::now();
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(&cli.input, cli.infer_schema_length)?;
    validate_schema(&df, &REQUIRED_COLUMNS)
        .with_context(|| format!("Invalid input file: {}", cli.input.display()))?;

    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);

    let mut summary = CleaningSummary::new(rows, cols);
    let load_elapsed = step_start.elapsed();
    summary.set_load_time(load_elapsed);
    print_step_time(load_elapsed);

    // Step 2: Replace sentinel codes and derive variables
    print_step_header(2, "Clean & Derive Variables");
    let step_start = Instant::now();
    let spinner = create_spinner("Replacing sentinel codes...");
    summary.sentinel_counts = count_sentinels(&df, &DEFAULT_SENTINELS)?;
    let df = normalize_missing(&df, &DEFAULT_SENTINELS)?;
    finish_with_success(&spinner, "Sentinel codes replaced with missing");

    if summary.sentinel_counts.is_empty() {
        print_info("No sentinel codes found");
    } else {
        print_count(
            "sentinel cell(s)",
            summary.total_sentinels(),
            Some(&format!("in {} column(s)", summary.sentinel_counts.len())),
        );
    }

    let df = build_derived_variables(&df)?;
    summary.derived_columns = [APTP_RATIO, VPTP_RATIO, OVERWEIGHT, CRP_CATEGORY, HIGH_BP]
        .iter()
        .map(|s| s.to_string())
        .collect();
    summary.missing_ratios = analyze_missing_values(&df)?;
    print_success("Derived variables added");

    if let Some(path) = &cli.save_derived {
        save_dataset(&mut df.clone(), path)?;
        print_success(&format!("Saved derived dataset to {}", path.display()));
    }

    let clean_elapsed = step_start.elapsed();
    summary.set_clean_time(clean_elapsed);
    print_step_time(clean_elapsed);
    summary.display();

    // Step 3: Cohort selection and logistic fit
    print_step_header(3, "Cohort Logistic Regression");
    let step_start = Instant::now();
    let spinner = create_spinner("Fitting logistic model...");
    let report = match run_analysis(&df, &request, &config) {
        Ok(report) => {
            finish_with_success(&spinner, "Model fitted");
            report
        }
        Err(err) => {
            finish_with_warning(&spinner, "Analysis failed");
            return Err(err).with_context(|| {
                format!(
                    "Analysis of {} ~ {} failed ({})",
                    request.outcome, request.predictor, request.cohort
                )
            });
        }
    };

    if !report.fit.converged {
        print_warning(&format!(
            "Fit did not converge after {} iterations",
            report.fit.iterations
        ));
    }
    display_analysis(&report);
    print_step_time(step_start.elapsed());

    if !cli.no_plots {
        println!();
        for line in render_histogram(&report.histogram, HISTOGRAM_WIDTH).lines() {
            println!("    {}", line);
        }
        println!();
        for line in render_curve(
            &report.curve,
            CURVE_WIDTH,
            CURVE_HEIGHT,
            &request.outcome,
            &request.predictor,
        )
        .lines()
        {
            println!("    {}", line);
        }
    }

    if let Some(path) = &cli.export {
        let input_file = cli.input.display().to_string();
        let params = ExportParams {
            input_file: &input_file,
            config: &config,
            sentinels: &DEFAULT_SENTINELS,
        };
        export_analysis(&report, path, &params)?;
        print_success(&format!("Exported analysis to {}", path.display()));
    }

    print_completion();

    Ok(())
}

/// Save dataset to file (CSV or Parquet based on extension)
fn save_dataset(df: &mut polars::prelude::DataFrame, path: &std::path::Path) -> Result<()> {
    use polars::prelude::*;

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    match extension.as_str() {
        "csv" => {
            let mut file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            CsvWriter::new(&mut file)
                .finish(df)
                .with_context(|| format!("Failed to write CSV file: {}", path.display()))?;
        }
        "parquet" => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            ParquetWriter::new(file)
                .finish(df)
                .with_context(|| format!("Failed to write Parquet file: {}", path.display()))?;
        }
        _ => anyhow::bail!(
            "Unsupported output format: {}. Supported formats: csv, parquet",
            extension
        ),
    }

    Ok(())
}
