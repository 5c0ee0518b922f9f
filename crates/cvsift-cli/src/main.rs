use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod output;

use cvsift_core::config_file::{self, ConfigFile};
use cvsift_core::{ChatBackend, Config, DeepSeekClient, ProgressEvent};
use output::ColorMode;

/// Extract personal data from a folder of CV documents into a CSV
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Folder containing the CV files (PDF/DOCX/DOC/TXT).
    /// Falls back to CV_FOLDER_PATH, then an interactive prompt.
    folder: Option<PathBuf>,

    /// Output CSV path (default: extracted_data.csv)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// DeepSeek API key (falls back to DEEPSEEK_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Chat-completion API base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Model name
    #[arg(long)]
    model: Option<String>,

    /// Maximum CV characters sent per request
    #[arg(long)]
    max_chars: Option<usize>,

    /// Path of the run log file (default: cv_extraction.log)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Extract text and print per-file statistics without calling the API
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let file_config = config_file::load_config();

    let log_path = cli
        .log_file
        .clone()
        .or_else(|| {
            file_config
                .output
                .as_ref()
                .and_then(|o| o.log_file.clone())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("cv_extraction.log"));
    let _guard = init_tracing(&log_path)?;

    let folder = resolve_folder(cli.folder.clone())?;

    if cli.dry_run {
        return dry_run(&folder, &cli, &file_config);
    }

    run(&folder, &cli, &file_config).await
}

async fn run(folder: &Path, cli: &Cli, file_config: &ConfigFile) -> anyhow::Result<()> {
    let config = resolve_config(cli, file_config)?;
    let csv_path = resolve_csv_path(cli, file_config);
    let color = ColorMode(!cli.no_color);

    let files = cvsift_ingest::collect_cv_files(folder)?;
    if files.is_empty() {
        tracing::warn!(folder = %folder.display(), "no CV files found");
        println!("No CV files found in {}", folder.display());
        cvsift_reporting::write_csv(&[], &csv_path)?;
        return Ok(());
    }

    tracing::info!(count = files.len(), folder = %folder.display(), "starting extraction run");
    println!("Found {} CV files to process\n", files.len());

    let client = DeepSeekClient::new(&config)?;
    let backend: &dyn ChatBackend = &client;

    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel_clone.cancel();
        }
    });

    let progress = move |event: ProgressEvent| {
        let mut out = std::io::stdout();
        let _ = output::print_progress(&mut out, &event, color);
        let _ = out.flush();
    };

    let (records, stats) =
        cvsift_core::extract_folder(&files, &config, backend, progress, cancel.clone()).await;

    if cancel.is_cancelled() {
        println!("\nInterrupted; writing the {} completed rows", records.len());
    }

    cvsift_reporting::write_csv(&records, &csv_path)?;

    let mut out = std::io::stdout();
    output::print_summary(&mut out, &stats, &csv_path, color)?;

    Ok(())
}

fn dry_run(folder: &Path, cli: &Cli, file_config: &ConfigFile) -> anyhow::Result<()> {
    let max_chars = cli
        .max_chars
        .or_else(|| file_config.extraction.as_ref().and_then(|e| e.max_chars))
        .unwrap_or(cvsift_core::DEFAULT_MAX_CHARS);

    let files = cvsift_ingest::collect_cv_files(folder)?;
    println!("DRY RUN: {} CV files in {}\n", files.len(), folder.display());

    for (i, path) in files.iter().enumerate() {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        match cvsift_ingest::extract_text(path) {
            Ok(text) => {
                let chars = text.chars().count();
                let sent = cvsift_ingest::truncate_chars(&text, max_chars);
                println!(
                    "[{}/{}] {}: {} chars extracted, {} would be sent",
                    i + 1,
                    files.len(),
                    name,
                    chars,
                    sent.chars().count()
                );
            }
            Err(e) => {
                println!("[{}/{}] {}: FAILED ({})", i + 1, files.len(), name, e);
            }
        }
    }

    Ok(())
}

/// Resolve the input folder: CLI arg > CV_FOLDER_PATH > interactive prompt.
fn resolve_folder(arg: Option<PathBuf>) -> anyhow::Result<PathBuf> {
    if let Some(folder) = arg {
        return Ok(folder);
    }
    if let Ok(env) = std::env::var("CV_FOLDER_PATH") {
        return Ok(PathBuf::from(env));
    }

    print!("Enter the path to the CV folder: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        anyhow::bail!("CV folder path is required");
    }
    Ok(PathBuf::from(trimmed))
}

/// Resolve run configuration: CLI flags > environment > config file > defaults.
fn resolve_config(cli: &Cli, file_config: &ConfigFile) -> anyhow::Result<Config> {
    let api = file_config.api.as_ref();
    let extraction = file_config.extraction.as_ref();
    let defaults = Config::default();

    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())
        .or_else(|| api.and_then(|a| a.api_key.clone()))
        .context("DEEPSEEK_API_KEY is not set (use --api-key, the environment, or the config file)")?;

    Ok(Config {
        api_key,
        base_url: cli
            .base_url
            .clone()
            .or_else(|| api.and_then(|a| a.base_url.clone()))
            .unwrap_or(defaults.base_url),
        model: cli
            .model
            .clone()
            .or_else(|| api.and_then(|a| a.model.clone()))
            .unwrap_or(defaults.model),
        max_tokens: extraction
            .and_then(|e| e.max_tokens)
            .unwrap_or(defaults.max_tokens),
        temperature: extraction
            .and_then(|e| e.temperature)
            .unwrap_or(defaults.temperature),
        max_text_chars: cli
            .max_chars
            .or_else(|| extraction.and_then(|e| e.max_chars))
            .unwrap_or(defaults.max_text_chars),
        request_timeout_secs: extraction
            .and_then(|e| e.request_timeout_secs)
            .unwrap_or(defaults.request_timeout_secs),
    })
}

fn resolve_csv_path(cli: &Cli, file_config: &ConfigFile) -> PathBuf {
    cli.output
        .clone()
        .or_else(|| std::env::var("OUTPUT_CSV_PATH").ok().map(PathBuf::from))
        .or_else(|| {
            file_config
                .output
                .as_ref()
                .and_then(|o| o.csv_path.clone())
                .map(PathBuf::from)
        })
        .unwrap_or_else(|| PathBuf::from("extracted_data.csv"))
}

/// Install a console layer on stderr and a non-blocking file layer.
/// The returned guard must be kept alive for the duration of the run.
fn init_tracing(log_path: &Path) -> anyhow::Result<tracing_appender::non_blocking::WorkerGuard> {
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false),
        )
        .init();

    Ok(guard)
}
