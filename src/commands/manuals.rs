//! Manuals command - download user manuals for a list of companies.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use tabled::{
    settings::{object::Columns, style::Style, Alignment, Modify},
    Table, Tabled,
};
use tracing::{info, warn};

use crate::config::Settings;
use crate::fcc::{DownloadStatus, FccClient, Product};

/// Per-company download tally.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CompanySummary {
    company: String,
    products: usize,
    manuals: usize,
    downloaded: usize,
    existing: usize,
    skipped: usize,
    failed: usize,
}

impl CompanySummary {
    fn new(company: &str) -> Self {
        Self {
            company: company.to_string(),
            ..Default::default()
        }
    }

    fn record(&mut self, status: DownloadStatus) {
        match status {
            DownloadStatus::Downloaded => self.downloaded += 1,
            DownloadStatus::AlreadyPresent => self.existing += 1,
            DownloadStatus::Skipped => self.skipped += 1,
        }
    }
}

/// Table row for the final summary.
#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Company")]
    company: String,
    #[tabled(rename = "Products")]
    products: usize,
    #[tabled(rename = "Manuals")]
    manuals: usize,
    #[tabled(rename = "Downloaded")]
    downloaded: usize,
    #[tabled(rename = "Existing")]
    existing: usize,
    #[tabled(rename = "Skipped")]
    skipped: String,
}

impl From<&CompanySummary> for SummaryRow {
    fn from(s: &CompanySummary) -> Self {
        let skipped = if s.failed > 0 {
            format!("{} ({} failed)", s.skipped + s.failed, s.failed)
        } else {
            s.skipped.to_string()
        };

        Self {
            company: s.company.clone(),
            products: s.products,
            manuals: s.manuals,
            downloaded: s.downloaded,
            existing: s.existing,
            skipped,
        }
    }
}

/// Execute the manuals command.
pub fn execute(input_file: &Path, output_dir: &Path, settings: &Settings) -> Result<()> {
    let companies = read_companies(input_file)?;
    if companies.is_empty() {
        println!(
            "{} No companies listed in {}",
            "✗".red(),
            input_file.display().to_string().cyan()
        );
        return Ok(());
    }

    let client = FccClient::new(&settings.user_agent, settings.timeout)?;
    let mut summaries = Vec::with_capacity(companies.len());

    let company_bar = progress_bar(companies.len(), "Companies");
    for company in &companies {
        company_bar.set_message(company.clone());
        info!(company = %company, "Downloading manuals");

        let mut summary = CompanySummary::new(company);
        let products = match client.collect_company_manuals(company) {
            Ok(products) => products,
            Err(e) => {
                warn!(company = %company, error = %e, "Company lookup failed");
                summaries.push(summary);
                company_bar.inc(1);
                continue;
            }
        };

        summary.products = products.len();
        summary.manuals = products.iter().filter(|p| p.has_manual()).count();
        info!(
            company = %company,
            products = summary.products,
            manuals = summary.manuals,
            "Found product manuals"
        );

        if !products.is_empty() {
            let company_dir = output_dir.join(company_dir_name(company));
            fs::create_dir_all(&company_dir).with_context(|| {
                format!("Failed to create output directory {}", company_dir.display())
            })?;
            download_all(&client, &products, &company_dir, &mut summary);
        }

        summaries.push(summary);
        company_bar.inc(1);
    }
    company_bar.finish_and_clear();

    print_summary(&summaries, output_dir);
    Ok(())
}

fn download_all(
    client: &FccClient,
    products: &[Product],
    company_dir: &Path,
    summary: &mut CompanySummary,
) {
    let product_bar = progress_bar(products.len(), "Products");
    for product in products {
        product_bar.set_message(product.title.clone());
        match client.download_pdf(product.manual.as_deref(), company_dir) {
            Ok(status) => summary.record(status),
            Err(e) => {
                warn!(title = %product.title, error = %e, "Download failed");
                summary.failed += 1;
            }
        }
        product_bar.inc(1);
    }
    product_bar.finish_and_clear();
}

/// Read company names, one per line. Blank lines are ignored.
fn read_companies(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read company list {}", path.display()))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Directory name for a company's manuals; path separators are replaced.
fn company_dir_name(company: &str) -> PathBuf {
    let name: String = company
        .chars()
        .map(|c| match c {
            '/' | '\\' => '_',
            c => c,
        })
        .collect();

    match name.as_str() {
        "." | ".." => PathBuf::from(name.replace('.', "_")),
        _ => PathBuf::from(name),
    }
}

fn progress_bar(len: usize, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    let template = format!(
        "{{spinner:.green}} {}: [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {{msg}}",
        label
    );
    pb.set_style(
        ProgressStyle::with_template(&template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_summary(summaries: &[CompanySummary], output_dir: &Path) {
    let rows: Vec<SummaryRow> = summaries.iter().map(SummaryRow::from).collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(1..=4)).with(Alignment::right()))
        .to_string();
    println!("{}", table);

    let downloaded: usize = summaries.iter().map(|s| s.downloaded).sum();
    let existing: usize = summaries.iter().map(|s| s.existing).sum();
    let failed: usize = summaries.iter().map(|s| s.failed).sum();

    println!(
        "{} {} new, {} already present in {}",
        if failed == 0 {
            "✓".green().bold()
        } else {
            "!".yellow().bold()
        },
        downloaded,
        existing,
        output_dir.display().to_string().cyan()
    );
}
