//! Console rendering of the cleaning summary and analysis results

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::pipeline::{AnalysisReport, ColumnSummary};

/// Summary of the cleaning and derivation steps
#[derive(Debug, Default)]
pub struct CleaningSummary {
    pub rows: usize,
    pub columns: usize,
    /// Sentinel cells replaced, per column
    pub sentinel_counts: Vec<(String, usize)>,
    /// Missing ratio per column after cleaning, sorted descending
    pub missing_ratios: Vec<(String, f64)>,
    pub derived_columns: Vec<String>,
    pub load_time: Duration,
    pub clean_time: Duration,
}

impl CleaningSummary {
    pub fn new(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            ..Default::default()
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = elapsed;
    }

    pub fn set_clean_time(&mut self, elapsed: Duration) {
        self.clean_time = elapsed;
    }

    pub fn total_sentinels(&self) -> usize {
        self.sentinel_counts.iter().map(|(_, n)| n).sum()
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("CLEANING SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![Cell::new("📁 Rows"), Cell::new(self.rows)]);
        table.add_row(vec![Cell::new("📁 Input Columns"), Cell::new(self.columns)]);
        table.add_row(vec![
            Cell::new("🧹 Sentinel Codes Replaced"),
            Cell::new(self.total_sentinels()).fg(if self.total_sentinels() == 0 {
                Color::White
            } else {
                Color::Yellow
            }),
        ]);
        table.add_row(vec![
            Cell::new("➕ Derived Columns"),
            Cell::new(self.derived_columns.join(", ")).fg(Color::Green),
        ]);
        table.add_row(vec![
            Cell::new("⏱️  Load / Clean"),
            Cell::new(format!(
                "{:.2}s / {:.2}s",
                self.load_time.as_secs_f64(),
                self.clean_time.as_secs_f64()
            )),
        ]);

        print_indented(&table);

        let with_missing: Vec<&(String, f64)> =
            self.missing_ratios.iter().filter(|(_, r)| *r > 0.0).collect();
        if !with_missing.is_empty() {
            println!();
            println!(
                "      {} {}:",
                style("Missing After Cleaning").yellow(),
                style(format!("({})", with_missing.len())).dim()
            );
            for (name, ratio) in with_missing {
                println!(
                    "        {} {} {}",
                    style("•").dim(),
                    name,
                    style(format!("{:.1}%", ratio * 100.0)).dim()
                );
            }
        }
    }
}

fn print_indented(table: &Table) {
    for line in table.to_string().lines() {
        println!("    {}", line);
    }
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "NaN".to_string(), |v| format!("{:.4}", v))
}

fn fmt_p(p: f64) -> String {
    if p < 1e-4 {
        format!("{:.2e}", p)
    } else {
        format!("{:.4}", p)
    }
}

/// Table of count, mean, std, min, quartiles and max per column
pub fn descriptive_table(summaries: &[ColumnSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        ["column", "count", "mean", "std", "min", "25%", "50%", "75%", "max"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.name),
            Cell::new(s.count),
            Cell::new(fmt_opt(s.mean)),
            Cell::new(fmt_opt(s.std)),
            Cell::new(fmt_opt(s.min)),
            Cell::new(fmt_opt(s.q25)),
            Cell::new(fmt_opt(s.median)),
            Cell::new(fmt_opt(s.q75)),
            Cell::new(fmt_opt(s.max)),
        ]);
    }
    table
}

/// Coefficient table in the usual logit summary layout
pub fn coefficient_table(report: &AnalysisReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        ["", "coef", "std err", "z", "P>|z|", "[0.025", "0.975]"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for c in &report.fit.coefficients {
        let significant = c.p_value < 0.05;
        table.add_row(vec![
            Cell::new(&c.name),
            Cell::new(format!("{:.4}", c.estimate)),
            Cell::new(format!("{:.4}", c.std_error)),
            Cell::new(format!("{:.3}", c.z_value)),
            Cell::new(fmt_p(c.p_value)).fg(if significant { Color::Green } else { Color::White }),
            Cell::new(format!("{:.4}", c.ci_lower)),
            Cell::new(format!("{:.4}", c.ci_upper)),
        ]);
    }
    table
}

/// Odds ratios with exponentiated 95% bounds
pub fn odds_ratio_table(report: &AnalysisReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(
        ["", "2.5%", "97.5%", "OR"]
            .iter()
            .map(|h| Cell::new(h).add_attribute(Attribute::Bold)),
    );

    for or in &report.odds_ratios {
        table.add_row(vec![
            Cell::new(&or.name),
            Cell::new(format!("{:.6}", or.ci_lower)),
            Cell::new(format!("{:.6}", or.ci_upper)),
            Cell::new(format!("{:.6}", or.odds_ratio)).add_attribute(Attribute::Bold),
        ]);
    }
    table
}

fn section(title: &str) {
    println!();
    println!("    {} {}", style("◆").cyan().bold(), style(title).white().bold());
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print the preview, descriptive statistics, fit summary and odds ratios
pub fn display_analysis(report: &AnalysisReport) {
    section("Cohort Preview");
    for line in format!("{}", report.preview).lines() {
        println!("    {}", line);
    }

    section("Descriptive Statistics");
    print_indented(&descriptive_table(&report.descriptive));

    let fit = &report.fit;
    section(&format!(
        "Logit Regression: {} ~ {}",
        report.request.outcome, report.request.predictor
    ));
    println!(
        "      Cohort:            {}",
        style(&report.request.cohort).yellow()
    );
    println!("      Cohort rows:       {}", report.cohort_rows);
    println!(
        "      No. Observations:  {} {}",
        fit.n_obs,
        style(format!("({} excluded as incomplete)", report.excluded_rows)).dim()
    );
    println!("      Df Model/Resid:    {} / {}", fit.df_model, fit.df_resid);
    println!("      Pseudo R-squ.:     {:.4}", fit.pseudo_r_squared);
    println!("      Log-Likelihood:    {:.4}", fit.log_likelihood);
    println!("      LL-Null:           {:.4}", fit.ll_null);
    println!("      LLR p-value:       {}", fmt_p(fit.llr_p_value));
    println!(
        "      Converged:         {} {}",
        if fit.converged {
            style("yes").green()
        } else {
            style("no").red().bold()
        },
        style(format!("({} iterations)", fit.iterations)).dim()
    );
    println!();
    print_indented(&coefficient_table(report));

    section("Odds Ratios (95% CI)");
    print_indented(&odds_ratio_table(report));
}
