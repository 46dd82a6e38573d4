use anyhow::{Context, Result};
use clap::Parser;
use pkgdeck::{DeckConfig, DocumentFileSource, PackagePresenter, SummaryRequest, jsr_from_id};
use pkgdeck_core::PackageDocument;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// `--version` selects the package version, so clap's own flag is not enabled.
#[derive(Parser)]
#[command(name = "pkgdeck")]
#[command(about = "Summarize an npm registry document: release lines, commands and README")]
struct Cli {
    /// Registry document (JSON) to summarize
    document: PathBuf,

    /// README Markdown to render instead of the one in the document
    #[arg(long)]
    readme: Option<PathBuf>,

    /// Package manager to build commands for (npm, pnpm, yarn, bun, deno, vlt)
    #[arg(long, short = 'p')]
    package_manager: Option<String>,

    /// Version or dist-tag to present
    #[arg(long)]
    version: Option<String>,

    /// Binary to run for packages with several commands
    #[arg(long)]
    command: Option<String>,

    /// JSR package id (e.g. @std/path) the package is also published as
    #[arg(long)]
    jsr: Option<String>,

    /// Registry document holding the full version history
    #[arg(long)]
    history: Option<PathBuf>,

    /// Configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Pretty-print the summary
    #[arg(long)]
    pretty: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DeckConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => DeckConfig::default(),
    };

    let doc = read_document(&cli.document)?;
    let readme = cli
        .readme
        .as_deref()
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read README {}", path.display()))
        })
        .transpose()?;
    let jsr = cli.jsr.as_deref().map(jsr_from_id).transpose()?;

    let mut presenter = PackagePresenter::new(config);
    if let Some(path) = &cli.history {
        presenter = presenter.with_history_source(Arc::new(DocumentFileSource::new(path)));
    }

    let request = SummaryRequest {
        version: cli.version.as_deref(),
        package_manager: cli.package_manager.as_deref(),
        readme: readme.as_deref(),
        jsr: jsr.as_ref(),
        command: cli.command.as_deref(),
    };
    let mut summary = presenter.summarize(&doc, request)?;
    presenter.expand_history(&mut summary).await;

    let json = if cli.pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    println!("{json}");

    tracing::info!(package = %summary.name, "summary written");
    Ok(())
}

fn read_document(path: &Path) -> Result<PackageDocument> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    PackageDocument::from_json(&json).with_context(|| format!("invalid document {}", path.display()))
}
