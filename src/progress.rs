//! Progress-callback trait for per-page download events.
//!
//! Inject an [`Arc<dyn DownloadProgressCallback>`] via
//! [`crate::config::DownloadConfigBuilder::progress_callback`] to receive
//! events as the fetcher retrieves each page.
//!
//! # Example
//!
//! ```rust
//! use anyflip2pdf::{DownloadConfig, DownloadProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     fetched: AtomicUsize,
//! }
//!
//! impl DownloadProgressCallback for CountingCallback {
//!     fn on_page_fetched(&self, page_num: usize, total_pages: usize, bytes: usize) {
//!         self.fetched.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} fetched ({} bytes)", page_num, total_pages, bytes);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { fetched: AtomicUsize::new(0) });
//!
//! let config = DownloadConfig::builder()
//!     .progress_callback(counter as Arc<dyn DownloadProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::sync::Arc;

/// Called by the download pipeline as it retrieves each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Page events arrive in completion order, not page
/// order, so implementations must not assume `page_num` is increasing.
pub trait DownloadProgressCallback: Send + Sync {
    /// Called once before the first request is issued.
    fn on_download_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called when the request for a page is about to be sent.
    fn on_page_start(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called when a page image has been received in full.
    fn on_page_fetched(&self, page_num: usize, total_pages: usize, bytes: usize) {
        let _ = (page_num, total_pages, bytes);
    }

    /// Called when a page request fails. The run aborts right after.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after the document has been written.
    ///
    /// # Arguments
    /// * `total_pages`   — pages requested
    /// * `fetched_pages` — pages that were retrieved
    fn on_download_complete(&self, total_pages: usize, fetched_pages: usize) {
        let _ = (total_pages, fetched_pages);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl DownloadProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::DownloadConfig`].
pub type ProgressCallback = Arc<dyn DownloadProgressCallback>;
