//! CLI binary for anyflip2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `DownloadConfig`, runs the download and turns the outcome into an exit
//! status: 0 on success, 1 on any failure.

use anyhow::{Context, Result};
use clap::Parser;
use anyflip2pdf::{
    download, output_path, plan, resolve, DownloadConfig, DownloadProgressCallback, PageFormat,
    ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress bar. Pages finish out of order, so the bar counts
/// completions rather than tracking a current page.
struct CliProgressCallback {
    bar: ProgressBar,
    bytes: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Preparing");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            bytes: AtomicUsize::new(0),
        })
    }
}

impl DownloadProgressCallback for CliProgressCallback {
    fn on_download_start(&self, total_pages: usize) {
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ");

        self.bar.set_length(total_pages as u64);
        self.bar.set_style(style);
        self.bar.set_prefix("Downloading");
        self.bar.reset_eta();
    }

    fn on_page_fetched(&self, _page_num: usize, _total_pages: usize, bytes: usize) {
        let total = self.bytes.fetch_add(bytes, Ordering::Relaxed) + bytes;
        self.bar.set_message(dim(&format!("{} KiB", total / 1024)));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            red("✗"),
            page_num,
            total_pages,
            red(error),
        ));
        self.bar.abandon();
    }

    fn on_download_complete(&self, _total_pages: usize, _fetched_pages: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Download a 228-page book to output/candlekeep.pdf
  anyflip2pdf https://online.anyflip.com/npkza/pwft/mobile/index.html --pages 228 --name candlekeep

  # Name defaults to the book id (output/pwft.pdf)
  anyflip2pdf https://anyflip.com/npkza/pwft --pages 228

  # Letter-sized pages, at most 4 requests at a time
  anyflip2pdf https://anyflip.com/npkza/pwft -n 228 --page-size letter -c 4

  # Only print the image URLs that would be fetched
  anyflip2pdf https://anyflip.com/npkza/pwft -n 3 --list-urls

EXIT STATUS:
  0  the PDF was written
  1  anything failed; no file is left under the output name
"#;

/// Download an AnyFlip flipbook and save it as a PDF.
#[derive(Parser, Debug)]
#[command(
    name = "anyflip2pdf",
    version,
    about = "Download an AnyFlip flipbook and save it as a PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Book URL on anyflip.com or online.anyflip.com.
    url: String,

    /// Number of pages to download, starting at page 1.
    #[arg(short = 'n', long, env = "ANYFLIP2PDF_PAGES",
          value_parser = clap::value_parser!(u64).range(1..))]
    pages: u64,

    /// Output file name without extension. Default: the book id.
    #[arg(long, env = "ANYFLIP2PDF_NAME")]
    name: Option<String>,

    /// Directory the PDF is written to.
    #[arg(short, long, env = "ANYFLIP2PDF_OUTPUT_DIR", default_value = "output")]
    output_dir: PathBuf,

    /// Maximum concurrent page requests.
    #[arg(short, long, env = "ANYFLIP2PDF_CONCURRENCY", default_value_t = 16)]
    concurrency: usize,

    /// Page size of the output PDF.
    #[arg(long, env = "ANYFLIP2PDF_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// Scheme and host serving the page images.
    #[arg(long, env = "ANYFLIP2PDF_BASE_URL", default_value = anyflip2pdf::DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds (default: none).
    #[arg(long, env = "ANYFLIP2PDF_TIMEOUT")]
    timeout: Option<u64>,

    /// User-Agent header for page requests.
    #[arg(long, env = "ANYFLIP2PDF_USER_AGENT")]
    user_agent: Option<String>,

    /// Print the page image URLs and exit without downloading.
    #[arg(long)]
    list_urls: bool,

    /// Print a JSON summary of the run on stdout.
    #[arg(long, env = "ANYFLIP2PDF_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "ANYFLIP2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ANYFLIP2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ANYFLIP2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PageSizeArg {
    A4,
    Letter,
}

impl From<PageSizeArg> for PageFormat {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageFormat::A4,
            PageSizeArg::Letter => PageFormat::Letter,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO logs; errors are always shown.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && !cli.list_urls;
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

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} Error generating PDF: {e:#}", red("✘"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let page_count = usize::try_from(cli.pages).context("Page count does not fit in memory")?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn DownloadProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, progress_cb)?;

    // ── List-only mode ───────────────────────────────────────────────────
    if cli.list_urls {
        for page in plan(&cli.url, page_count, &config)? {
            println!("{}", page.url);
        }
        return Ok(());
    }

    let name = match cli.name {
        Some(ref name) => name.clone(),
        None => resolve(&cli.url)?.book,
    };
    let path = output_path(&cli.output_dir, &name)?;

    let stats = download(&cli.url, page_count, &path, &config)
        .await
        .context("Download failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&stats).context("Failed to serialise summary")?;
        println!("{json}");
    } else if !cli.quiet {
        eprintln!(
            "{}  {} pages  {} KiB  {}ms  →  {}",
            green("✔"),
            stats.pages,
            stats.output_bytes / 1024,
            stats.total_duration_ms,
            bold(&stats.output_path.display().to_string()),
        );
    }

    Ok(())
}

/// Map CLI args to `DownloadConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<DownloadConfig> {
    let mut builder = DownloadConfig::builder()
        .concurrency(cli.concurrency)
        .page_format(cli.page_size.clone().into())
        .base_url(cli.base_url.clone());

    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(ref ua) = cli.user_agent {
        builder = builder.user_agent(ua.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
