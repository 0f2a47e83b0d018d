//! Extract command - dump the searchable text of one document.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;
use tracing::debug;

use nfind_core::models::config::NfindConfig;
use nfind_core::models::document::{DocumentKind, RawDocument};
use nfind_core::pdf::PdfTextExtractor;

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Input file (PDF or NFe XML)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub async fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let identity = args
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let bytes = fs::read(&args.input)?;
    let document = RawDocument::new(identity, bytes);

    debug!("extracting {} as {}", document.identity, document.kind);

    let text = match document.kind {
        DocumentKind::Pdf => PdfTextExtractor::new(config.ocr.clone()).extract(&document.bytes)?,
        DocumentKind::Xml => nfind_core::nfe::extract_text(&document.bytes)?,
    };

    if text.trim().is_empty() {
        println!(
            "{} No text extracted from {}",
            style("!").yellow(),
            document.identity
        );
        return Ok(());
    }

    match &args.output {
        Some(path) => {
            fs::write(path, &text)?;
            println!("{} Text written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", text),
    }

    Ok(())
}

/// Load the pipeline configuration, falling back to defaults.
pub(crate) fn load_config(config_path: Option<&str>) -> anyhow::Result<NfindConfig> {
    Ok(match config_path {
        Some(path) => NfindConfig::from_file(std::path::Path::new(path))?,
        None => NfindConfig::default(),
    })
}
