//! CLI binary for pdfocr-client.
//!
//! A thin shim over the library crate: the positional argument is the file
//! picker, stderr messages are the alerts, a spinner stands in for the
//! disabled upload button, and the tag table goes to stdout.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfocr_client::{
    input, render, ClientConfig, HttpBackend, Notice, Notifier, Tag, UiState, UploadSession,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── Terminal notifier ────────────────────────────────────────────────────────

/// Shows a spinner while a submission is in flight and prints alerts to
/// stderr.
struct CliNotifier {
    /// Spinner for the current submission; `None` when idle.
    spinner: Mutex<Option<ProgressBar>>,
    show_progress: bool,
    quiet: bool,
}

impl CliNotifier {
    fn new(show_progress: bool, quiet: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            show_progress,
            quiet,
        }
    }

    fn start_spinner(name: &str) -> ProgressBar {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Uploading...");
        bar.set_message(name.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }
}

impl Notifier for CliNotifier {
    fn alert(&self, notice: &Notice) {
        match notice {
            Notice::Success if !self.quiet => {
                eprintln!("{} {}", green("✔"), bold(notice.message()))
            }
            Notice::Success => {}
            _ => eprintln!("{} {}", red("✘"), bold(notice.message())),
        }
    }

    fn on_state_change(&self, state: &UiState) {
        if !self.show_progress {
            return;
        }
        let mut spinner = match self.spinner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match (state.uploading, spinner.as_ref()) {
            (true, None) => *spinner = Some(Self::start_spinner(state.selected_name())),
            (true, Some(bar)) if state.download_url.is_some() => {
                bar.set_message("processed, fetching tags…");
            }
            (false, Some(_)) => {
                if let Some(bar) = spinner.take() {
                    bar.finish_and_clear();
                }
            }
            _ => {}
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload a drawing and print the extracted tags
  pdfocr --backend http://localhost:5000 drawing.pdf

  # Same, with the backend from the environment, and save the spreadsheet
  export OCR_BACKEND_URL=http://localhost:5000
  pdfocr drawing.pdf --download ./out/

  # Machine-readable output
  pdfocr --json drawing.pdf > tags.json

ENVIRONMENT VARIABLES:
  OCR_BACKEND_URL     Base URL of the OCR backend (same as --backend)
  PDFOCR_DOWNLOAD     Where to save the processed file (same as --download)
  RUST_LOG            Override log filtering (e.g. pdfocr_client=debug)
"#;

/// Upload a PDF to the OCR backend and print the extracted tags.
#[derive(Parser, Debug)]
#[command(
    name = "pdfocr",
    version,
    about = "Upload a PDF to an OCR backend and print the extracted tags",
    long_about = "Upload a PDF to an OCR processing backend, wait for it to be processed, \
print the extracted tag counts and optionally download the processed spreadsheet.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF file to upload.
    input: Option<PathBuf>,

    /// Base URL of the OCR backend.
    #[arg(long, env = "OCR_BACKEND_URL")]
    backend: String,

    /// Save the processed file to this path (file or existing directory).
    #[arg(short, long, env = "PDFOCR_DOWNLOAD")]
    download: Option<PathBuf>,

    /// Output JSON ({download_url, tags}) instead of a table.
    #[arg(long, env = "PDFOCR_JSON")]
    json: bool,

    /// Per-request timeout in seconds (default: wait indefinitely).
    #[arg(long, env = "PDFOCR_TIMEOUT")]
    timeout: Option<u64>,

    /// Disable the spinner.
    #[arg(long, env = "PDFOCR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFOCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFOCR_QUIET")]
    quiet: bool,
}

/// What `--json` prints.
#[derive(Serialize)]
struct JsonOutput<'a> {
    download_url: Option<String>,
    tags: &'a [Tag],
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers the interesting part of the run; keep library INFO
    // logs out of its way unless asked for.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build client ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;
    let backend = HttpBackend::new(config.clone()).context("Failed to create HTTP client")?;
    let notifier = CliNotifier::new(show_progress, cli.quiet);
    let mut session = UploadSession::new(backend, &notifier);

    // ── Pick file ────────────────────────────────────────────────────────
    if let Some(ref path) = cli.input {
        let file = input::open_pdf(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        session.select_file(file);
    }

    // ── Submit ───────────────────────────────────────────────────────────
    session.submit().await.context("Submission failed")?;

    let state = session.state();
    let link = session.download_link(&config.base_url);

    if cli.json {
        let out = JsonOutput {
            download_url: link.clone(),
            tags: &state.tags,
        };
        let json = serde_json::to_string_pretty(&out).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        let table = render::tag_table(&state.tags);
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(table.as_bytes())
            .context("Failed to write to stdout")?;
        if table.is_empty() && !cli.quiet {
            eprintln!("{}", dim("No tags extracted."));
        }
        if let Some(ref link) = link {
            if !cli.quiet {
                eprintln!("Download processed file: {}", bold(link));
            }
        }
    }

    // ── Download ─────────────────────────────────────────────────────────
    if let (Some(dest), Some(locator)) = (cli.download.as_ref(), state.download_url.as_deref()) {
        let written = session
            .backend()
            .download(locator, dest)
            .await
            .context("Download failed")?;
        if !cli.quiet {
            eprintln!("{}  →  {}", green("✔"), bold(&written.display().to_string()));
        }
    }

    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder().base_url(cli.backend.as_str());
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    builder.build().context("Invalid configuration")
}
