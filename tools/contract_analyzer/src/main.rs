use anyhow::{Context, Result};
use clap::Parser;
use contract_risk_core::adapters::interface::TextSource;
use contract_risk_core::adapters::page_highlighter::PageTextHighlighter;
use contract_risk_core::adapters::recorded::RecordedResponse;
use contract_risk_core::adapters::text_source::PlainTextSource;
use contract_risk_core::mapping::highlight::apply_highlights;
use contract_risk_core::report::{write_artifacts, write_error_artifact};
use contract_risk_core::{ContractPipeline, PipelineConfig, SourceDocument};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "contract_analyzer",
    about = "Scan a contract for risk, reconcile a model extraction and gate it on quality",
    version
)]
struct Cli {
    /// Extracted contract text; pages separated by form feeds
    #[arg(short, long)]
    input: PathBuf,

    /// Recorded generative-model response to reconcile. Without it the model is unavailable.
    #[arg(short, long)]
    ai_response: Option<PathBuf>,

    /// Pipeline configuration (JSON). Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,

    /// RFC 3339 timestamp recorded as the analysis date. Defaults to now.
    #[arg(long)]
    analysis_date: Option<String>,

    /// Request per-clause and whole-document summaries from the model
    #[arg(long)]
    summaries: bool,

    /// Run the rule-based scan only and print it as JSON
    #[arg(long)]
    scan_only: bool,

    /// Write the planned page annotations to this JSON file
    #[arg(long)]
    highlights_out: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

fn now_rfc3339() -> Result<String> {
    Ok(time::OffsetDateTime::now_utc().format(&time::format_description::well_known::Rfc3339)?)
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig> {
    match path {
        Some(p) => PipelineConfig::from_json_file(p)
            .with_context(|| format!("loading config {}", p.display())),
        None => Ok(PipelineConfig::default()),
    }
}

fn run(cli: Cli) -> Result<i32> {
    let cfg = load_config(cli.config.as_deref())?;

    let source = PlainTextSource::new(cfg.extraction.ocr_min_chars);
    let extracted = source
        .extract(&cli.input)
        .with_context(|| format!("reading {}", cli.input.display()))?;
    let file_size = std::fs::metadata(&cli.input)?.len();
    let file_name = cli
        .input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let doc = SourceDocument::from_extracted(extracted, file_name, file_size);

    let model = match &cli.ai_response {
        Some(p) => RecordedResponse::from_file(p)
            .with_context(|| format!("reading AI response {}", p.display()))?,
        None => RecordedResponse::unavailable(),
    };
    let pipeline = ContractPipeline::new(cfg, model)?.with_summaries(cli.summaries);

    if cli.scan_only {
        let scan = pipeline.scan(&doc.text)?;
        println!("{}", serde_json::to_string_pretty(&scan)?);
        return Ok(0);
    }

    let analysis_date = match cli.analysis_date {
        Some(d) => d,
        None => now_rfc3339()?,
    };

    match pipeline.analyze(&doc, &analysis_date) {
        Ok(report) => {
            let paths = write_artifacts(&cli.out_dir, &report)?;
            if let Some(out) = &cli.highlights_out {
                let mut highlighter = PageTextHighlighter::new(&doc.text);
                let pages = highlighter.page_count();
                let summary = apply_highlights(&mut highlighter, &report.highlights, pages)?;
                std::fs::write(out, serde_json::to_string_pretty(&highlighter.annotations)?)?;
                info!(annotations = summary.annotations, path = %out.display(), "highlight plan written");
            }
            println!("{}", serde_json::to_string_pretty(&paths)?);
            Ok(0)
        }
        Err(e) => {
            error!(kind = e.kind(), "analysis failed: {}", e);
            let path = write_error_artifact(&cli.out_dir, &e, &analysis_date)?;
            eprintln!("analysis failed: {} (see {})", e, path.display());
            Ok(1)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("contract_analyzer error: {:#}", e);
            std::process::exit(2);
        }
    }
}
