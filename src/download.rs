//! Download entry points: book URL in, PDF file out.
//!
//! [`download`] drives the four pipeline stages in order and returns a typed
//! result; nothing here exits the process or prints. [`download_with_fetcher`]
//! is the same pipeline with the HTTP layer swapped out, which is how the
//! tests run it against fakes.

use crate::config::DownloadConfig;
use crate::error::Anyflip2PdfError;
use crate::output::DownloadStats;
use crate::pipeline::fetch::{HttpFetcher, PageFetcher};
use crate::pipeline::sequence::PageUrl;
use crate::pipeline::{assemble, fetch, resolve, sequence};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Download `page_count` pages of the book at `url` and write them as one
/// PDF to `output_path`.
///
/// # Arguments
/// * `url`         — book URL on `anyflip.com` or `online.anyflip.com`
/// * `page_count`  — number of pages to fetch, starting at page 1
/// * `output_path` — destination file; see [`output_path`] for the usual
///   `<dir>/<name>.pdf` layout
/// * `config`      — download configuration
///
/// # Errors
/// Any failure aborts the run; no file is left at `output_path`:
/// - the URL is not an AnyFlip book URL, or `page_count` is zero
/// - any page request fails (first failure reported, the rest cancelled)
/// - any page is not a decodable image
/// - the output file cannot be written
pub async fn download(
    url: impl AsRef<str>,
    page_count: usize,
    output_path: impl AsRef<Path>,
    config: &DownloadConfig,
) -> Result<DownloadStats, Anyflip2PdfError> {
    let fetcher = HttpFetcher::new(config)?;
    download_with_fetcher(&fetcher, url, page_count, output_path, config).await
}

/// [`download`] with a caller-supplied [`PageFetcher`].
pub async fn download_with_fetcher(
    fetcher: &dyn PageFetcher,
    url: impl AsRef<str>,
    page_count: usize,
    output_path: impl AsRef<Path>,
    config: &DownloadConfig,
) -> Result<DownloadStats, Anyflip2PdfError> {
    let total_start = Instant::now();
    let url = url.as_ref();
    let output_path = output_path.as_ref().to_path_buf();
    info!("Starting download: {}", url);

    // ── Step 1-2: Resolve identifier, build page URLs ────────────────────
    let identifier = resolve::resolve(url)?;
    let pages = sequence::sequence(&identifier, page_count, &config.base_url)?;
    let total_pages = pages.len();

    if let Some(ref cb) = config.progress_callback {
        cb.on_download_start(total_pages);
    }

    // ── Step 3: Fetch every page ─────────────────────────────────────────
    let fetch_start = Instant::now();
    let images = fetch::fetch_all(
        fetcher,
        &pages,
        config.concurrency,
        config.progress_callback.as_deref(),
    )
    .await?;
    let fetch_duration_ms = fetch_start.elapsed().as_millis() as u64;
    let bytes_downloaded: u64 = images.iter().map(|i| i.bytes.len() as u64).sum();
    info!(
        "Fetched {} pages ({} bytes) in {}ms",
        images.len(),
        bytes_downloaded,
        fetch_duration_ms
    );

    // ── Step 4: Assemble and write the PDF ───────────────────────────────
    let assemble_start = Instant::now();
    let format = config.page_format;
    let path = output_path.clone();
    let output_bytes =
        tokio::task::spawn_blocking(move || assemble::assemble(&images, format, &path))
            .await
            .map_err(|e| Anyflip2PdfError::Internal(format!("Assembly task panicked: {e}")))??;
    let assemble_duration_ms = assemble_start.elapsed().as_millis() as u64;

    let stats = DownloadStats {
        identifier: identifier.to_string(),
        pages: total_pages,
        bytes_downloaded,
        output_bytes,
        output_path,
        fetch_duration_ms,
        assemble_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Download complete: {} pages → {} ({}ms total)",
        stats.pages,
        stats.output_path.display(),
        stats.total_duration_ms
    );

    if let Some(ref cb) = config.progress_callback {
        cb.on_download_complete(total_pages, total_pages);
    }

    Ok(stats)
}

/// Synchronous wrapper around [`download`].
///
/// Creates a temporary tokio runtime internally.
pub fn download_sync(
    url: impl AsRef<str>,
    page_count: usize,
    output_path: impl AsRef<Path>,
    config: &DownloadConfig,
) -> Result<DownloadStats, Anyflip2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Anyflip2PdfError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(download(url, page_count, output_path, config))
}

/// Resolve `url` and list the page image URLs a download would request,
/// without touching the network.
pub fn plan(
    url: &str,
    page_count: usize,
    config: &DownloadConfig,
) -> Result<Vec<PageUrl>, Anyflip2PdfError> {
    let identifier = resolve::resolve(url)?;
    let pages = sequence::sequence(&identifier, page_count, &config.base_url)?;
    debug!("{} → {} page URLs", identifier, pages.len());
    Ok(pages)
}

/// `<dir>/<name>.pdf`, the conventional location of a named output.
///
/// A trailing `.pdf` on `name` is not doubled. Names that are empty or that
/// contain a path separator are rejected.
pub fn output_path(dir: impl AsRef<Path>, name: &str) -> Result<PathBuf, Anyflip2PdfError> {
    let stem = name.strip_suffix(".pdf").unwrap_or(name);
    if stem.is_empty() || stem.contains(['/', '\\']) || stem == "." || stem == ".." {
        return Err(Anyflip2PdfError::InvalidConfig(format!(
            "Output name '{name}' must be a plain file name"
        )));
    }
    Ok(dir.as_ref().join(format!("{stem}.pdf")))
}
