//! Error types for the anyflip2pdf library.
//!
//! Two error types mirror the two places a run can go wrong:
//!
//! * [`Anyflip2PdfError`] — **Fatal**: the run cannot produce a document
//!   (unrecognised URL, bad configuration, a page could not be fetched or
//!   decoded, the output could not be written). Returned as
//!   `Err(Anyflip2PdfError)` from the top-level `download*` functions.
//!
//! * [`FetchError`] — a single HTTP request failed. The fetcher never
//!   retries, so the first `FetchError` observed is wrapped into
//!   [`Anyflip2PdfError::Fetch`] together with its page number and aborts
//!   the whole run.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the anyflip2pdf library.
#[derive(Debug, Error)]
pub enum Anyflip2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The source URL is not an `anyflip.com` / `online.anyflip.com` book URL.
    #[error("Invalid URL format: {url}\nExpected https://online.anyflip.com/<owner>/<book>/...")]
    InvalidUrlFormat { url: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder or argument validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Network errors ────────────────────────────────────────────────────
    /// A page image could not be retrieved.
    #[error("Failed to fetch page {page}: {source}")]
    Fetch {
        page: usize,
        #[source]
        source: FetchError,
    },

    // ── Encoding errors ───────────────────────────────────────────────────
    /// A downloaded buffer is not a decodable raster image, or the PDF
    /// encoder rejected it.
    #[error("Page {page} could not be encoded: {detail}")]
    Encoding { page: usize, detail: String },

    /// The assembler was handed zero images.
    #[error("Refusing to write a document with no pages")]
    EmptyDocument,

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A failed retrieval of a single page image.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum FetchError {
    /// The server answered with a non-success status code.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// The request never produced a usable response (DNS, TLS, reset
    /// connection, truncated body, client-side timeout).
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },
}

impl FetchError {
    /// The URL of the request that failed.
    pub fn url(&self) -> &str {
        match self {
            FetchError::Status { url, .. } | FetchError::Transport { url, .. } => url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_url_display() {
        let e = Anyflip2PdfError::InvalidUrlFormat {
            url: "https://example.com/a/b".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("Invalid URL format"), "got: {msg}");
        assert!(msg.contains("example.com/a/b"), "got: {msg}");
    }

    #[test]
    fn fetch_error_display_names_url() {
        let e = Anyflip2PdfError::Fetch {
            page: 7,
            source: FetchError::Status {
                url: "https://online.anyflip.com/a/b/files/mobile/7.jpg".into(),
                status: 404,
            },
        };
        let msg = e.to_string();
        assert!(msg.contains("page 7"), "got: {msg}");
        assert!(msg.contains("HTTP 404"), "got: {msg}");
        assert!(msg.contains("/files/mobile/7.jpg"), "got: {msg}");
    }

    #[test]
    fn fetch_error_url_accessor() {
        let e = FetchError::Transport {
            url: "https://x/1.jpg".into(),
            reason: "connection reset".into(),
        };
        assert_eq!(e.url(), "https://x/1.jpg");
        assert!(e.to_string().contains("connection reset"));
    }

    #[test]
    fn output_write_failed_has_source() {
        use std::error::Error as _;
        let e = Anyflip2PdfError::OutputWriteFailed {
            path: PathBuf::from("output/book.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(e.to_string().contains("output/book.pdf"));
        assert!(e.source().is_some());
    }
}
