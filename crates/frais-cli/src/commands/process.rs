//! Process command - reconcile a single expense PDF.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use frais_core::{ExpensePipeline, FraisConfig, Report, ReportBuilder};

use super::config::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Currency symbol for display amounts (overrides config)
    #[arg(long)]
    currency: Option<String>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON report
    Json,
    /// CSV page table
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if let Some(currency) = &args.currency {
        config.report.currency_symbol = currency.clone();
    }

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Reading {}", args.input.display()));

    let report = process_file(&args.input, &config);
    pb.finish_and_clear();
    let report = report?;

    let output = format_report(&report, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Run the pipeline on one PDF file and build its report.
pub fn process_file(path: &Path, config: &FraisConfig) -> anyhow::Result<Report> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {}", path.display());
    }

    let data = fs::read(path)?;
    let pipeline = ExpensePipeline::from_config(config)?;
    let result = pipeline
        .process_pdf(&data)
        .map_err(|e| anyhow::anyhow!("Could not read {} as a PDF: {}", path.display(), e))?;

    Ok(ReportBuilder::from_config(&config.report).build(&result))
}

pub fn format_report(report: &Report, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(report.to_json()? + "\n"),
        OutputFormat::Csv => Ok(report.to_csv()?),
        OutputFormat::Text => Ok(format_text(report)),
    }
}

fn page_list(pages: &[u32]) -> String {
    pages
        .iter()
        .map(|p| format!("Page {}\n", p))
        .collect()
}

fn format_text(report: &Report) -> String {
    let mut output = String::new();

    output.push_str("Amounts extracted from each page:\n");
    for row in report.rows.iter().filter(|r| r.amount.is_some() && !r.duplicate) {
        output.push_str(&format!("Page {}: {} ({})\n", row.page, row.amount_display, row.category));
    }
    output.push('\n');

    output.push_str(&format!(
        "The total sum of all invoices in this document is: {}\n",
        report.total_display
    ));

    if !report.missing_pages.is_empty() {
        output.push_str("\nNo amount was found on the following pages:\n");
        output.push_str(&page_list(&report.missing_pages));
    }

    if !report.image_pages.is_empty() {
        output.push_str(
            "\nThe following pages contain images or non-text content and could not be processed:\n",
        );
        output.push_str(&page_list(&report.image_pages));
    }

    if !report.duplicate_pages.is_empty() {
        output.push_str("\nThe following pages duplicate an earlier page and were not counted:\n");
        output.push_str(&page_list(&report.duplicate_pages));
    }

    if !report.amount_review.is_empty() {
        output.push_str("\nSame amount in the same category, please check:\n");
        for group in &report.amount_review {
            let pages: Vec<String> = group.pages.iter().map(u32::to_string).collect();
            output.push_str(&format!(
                "{} {}: pages {}\n",
                group.category,
                report
                    .rows
                    .iter()
                    .find(|r| r.page == group.pages[0])
                    .map(|r| r.amount_display.as_str())
                    .unwrap_or_default(),
                pages.join(", ")
            ));
        }
    }

    if report.all_pages_valid {
        output.push_str("\nAll pages contained a valid amount.\n");
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(texts: &[Option<&str>]) -> Report {
        let result =
            ExpensePipeline::new().process_pages(texts.iter().map(|t| t.map(str::to_string)));
        ReportBuilder::new().build(&result)
    }

    #[test]
    fn test_text_summary() {
        let text = format_text(&report(&[
            Some("Prix 10.00"),
            None,
            Some("Prix 10.00"),
            Some("Bonjour"),
        ]));

        assert!(text.contains("Page 1: €10.00 (Unknown)"));
        assert!(text.contains("The total sum of all invoices in this document is: €10.00"));
        assert!(text.contains("No amount was found on the following pages:\nPage 4\n"));
        assert!(text.contains("could not be processed:\nPage 2\n"));
        assert!(text.contains("were not counted:\nPage 3\n"));
        assert!(!text.contains("All pages contained a valid amount."));
    }

    #[test]
    fn test_text_all_valid_and_review() {
        let text = format_text(&report(&[Some("Uber 1\nTotal 9,50"), Some("Uber 2\nTotal 9,50")]));

        assert!(text.contains("All pages contained a valid amount."));
        assert!(text.contains("Taxi €9.50: pages 1, 2"));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = process_file(Path::new("receipt.png"), &FraisConfig::default()).unwrap_err();
        assert!(err.to_string().contains("Unsupported file format"));
    }
}
