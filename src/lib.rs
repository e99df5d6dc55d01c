//! # anyflip2pdf
//!
//! Download an AnyFlip flipbook page by page and assemble it into one PDF.
//!
//! AnyFlip serves every page of a book as a standalone JPEG under a
//! predictable path. Given the book URL and its page count this crate builds
//! those paths, downloads all pages concurrently, and writes them, in page
//! order, into a PDF with one uniform-size page per image.
//!
//! ## Pipeline Overview
//!
//! ```text
//! book URL
//!  │
//!  ├─ 1. Resolve   https://online.anyflip.com/<owner>/<book>/… → owner/book
//!  ├─ 2. Sequence  owner/book × N → …/files/mobile/1.jpg … N.jpg
//!  ├─ 3. Fetch     bounded concurrent GETs, page order kept, first failure aborts
//!  └─ 4. Assemble  decode → PDF pages → temp file → atomic rename
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use anyflip2pdf::{download, output_path, DownloadConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DownloadConfig::default();
//!     let path = output_path("output", "candlekeep")?;
//!     let stats = download(
//!         "https://online.anyflip.com/npkza/pwft/mobile/index.html",
//!         228,
//!         &path,
//!         &config,
//!     )
//!     .await?;
//!     eprintln!("{} pages, {} bytes", stats.pages, stats.output_bytes);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `anyflip2pdf` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! anyflip2pdf = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod download;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DownloadConfig, DownloadConfigBuilder, PageFormat, DEFAULT_BASE_URL};
pub use download::{download, download_sync, download_with_fetcher, output_path, plan};
pub use error::{Anyflip2PdfError, FetchError};
pub use output::DownloadStats;
pub use pipeline::fetch::{HttpFetcher, PageFetcher, PageImage};
pub use pipeline::resolve::{resolve, Identifier};
pub use pipeline::sequence::PageUrl;
pub use progress::{DownloadProgressCallback, NoopProgressCallback, ProgressCallback};
