//! Search command - index a document batch, run a query, export matches.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};

use nfind_core::models::document::RawDocument;
use nfind_core::search::SearchHit;
use nfind_core::service::SearchService;

use super::extract::load_config;

/// Arguments for the search command.
#[derive(Args)]
pub struct SearchArgs {
    /// Input files or glob pattern (*.pdf / *.xml)
    #[arg(required = true)]
    input: String,

    /// Search term: product text, CNPJ or NCM code
    #[arg(required = true)]
    term: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Write the matched originals to a ZIP archive at this path
    #[arg(short, long)]
    export: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON output
    Json,
    /// CSV output
    Csv,
}

pub async fn run(args: SearchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    // Expand the glob pattern into the ordered input batch.
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "pdf" | "xml")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let identity = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        documents.push(RawDocument::new(identity, fs::read(path)?));
    }

    let service = SearchService::new(config);

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    let report = match service.rebuild(&documents, |completed, _total, identity| {
        pb.set_position(completed as u64);
        pb.set_message(identity.to_string());
    }) {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            anyhow::bail!("Indexing failed: {}", e);
        }
    };

    pb.finish_with_message("Complete");

    if !report.skipped.is_empty() {
        println!("{}", style("Skipped documents:").yellow());
        for skipped in &report.skipped {
            println!("  - {}: {}", skipped.identity, skipped.reason);
        }
    }

    let hits = service.search(&args.term)?;

    if hits.is_empty() {
        println!(
            "{} No documents matched '{}'",
            style("!").yellow(),
            args.term
        );
        return Ok(());
    }

    println!(
        "{} Found '{}' in {} document(s)",
        style("✓").green(),
        args.term,
        hits.len()
    );
    println!();
    print_hits(&hits, args.format)?;

    if let Some(export_path) = &args.export {
        let matched: Vec<String> = hits.iter().map(|h| h.identity.clone()).collect();
        let archive = service.export_archive(&matched, &documents)?;
        fs::write(export_path, &archive)?;
        println!();
        println!(
            "{} Matched originals written to {}",
            style("✓").green(),
            export_path.display()
        );
    }

    Ok(())
}

fn print_hits(hits: &[SearchHit], format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for hit in hits {
                println!("{} ({})", style(&hit.identity).bold(), hit.kind);
                if let Some(snippet) = &hit.snippet {
                    println!("    {}", style(snippet).italic());
                }
            }
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(hits)?);
        }
        OutputFormat::Csv => {
            let mut wtr = csv::Writer::from_writer(vec![]);
            wtr.write_record(["identity", "type", "snippet"])?;
            for hit in hits {
                let kind = hit.kind.to_string();
                wtr.write_record([
                    hit.identity.as_str(),
                    kind.as_str(),
                    hit.snippet.as_deref().unwrap_or(""),
                ])?;
            }
            print!("{}", String::from_utf8(wtr.into_inner()?)?);
        }
    }
    Ok(())
}
