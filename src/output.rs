//! Result types returned by a successful download.

use serde::Serialize;
use std::path::PathBuf;

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct DownloadStats {
    /// The `owner/book` key the URLs were built from.
    pub identifier: String,
    /// Pages fetched and written; always equal to the requested page count.
    pub pages: usize,
    /// Sum of all image bodies received.
    pub bytes_downloaded: u64,
    /// Size of the written PDF.
    pub output_bytes: u64,
    /// Where the PDF was written.
    pub output_path: PathBuf,
    pub fetch_duration_ms: u64,
    pub assemble_duration_ms: u64,
    pub total_duration_ms: u64,
}
