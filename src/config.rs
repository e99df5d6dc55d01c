//! Configuration types for flipbook downloads.
//!
//! Every knob of a run lives in [`DownloadConfig`], built via its
//! [`DownloadConfigBuilder`]. The page count and output location are not part
//! of the config: they are per-run arguments to [`crate::download::download`].

use crate::error::Anyflip2PdfError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host serving the per-page images of every AnyFlip book.
pub const DEFAULT_BASE_URL: &str = "https://online.anyflip.com";

/// Configuration for a flipbook download.
///
/// Built via [`DownloadConfig::builder()`] or using
/// [`DownloadConfig::default()`].
///
/// # Example
/// ```rust
/// use anyflip2pdf::{DownloadConfig, PageFormat};
///
/// let config = DownloadConfig::builder()
///     .concurrency(8)
///     .page_format(PageFormat::Letter)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct DownloadConfig {
    /// Maximum number of page requests in flight at once. Default: 16.
    ///
    /// A value at or above the page count sends every request at once.
    pub concurrency: usize,

    /// Page size used for every page of the output PDF. Default: A4.
    pub page_format: PageFormat,

    /// Scheme and host the page image URLs are built on.
    /// Default: [`DEFAULT_BASE_URL`].
    pub base_url: String,

    /// Per-request timeout in seconds. Default: None (transport default).
    pub request_timeout_secs: Option<u64>,

    /// `User-Agent` header sent with every request. Default: reqwest's.
    pub user_agent: Option<String>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            concurrency: 16,
            page_format: PageFormat::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: None,
            user_agent: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for DownloadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadConfig")
            .field("concurrency", &self.concurrency)
            .field("page_format", &self.page_format)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field(
                "progress_callback",
                &self
                    .progress_callback
                    .as_ref()
                    .map(|_| "<dyn DownloadProgressCallback>"),
            )
            .finish()
    }
}

impl DownloadConfig {
    /// Create a new builder for `DownloadConfig`.
    pub fn builder() -> DownloadConfigBuilder {
        DownloadConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`DownloadConfig`].
#[derive(Debug)]
pub struct DownloadConfigBuilder {
    config: DownloadConfig,
}

impl DownloadConfigBuilder {
    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn page_format(mut self, format: PageFormat) -> Self {
        self.config.page_format = format;
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = Some(secs);
        self
    }

    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.config.user_agent = Some(ua.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<DownloadConfig, Anyflip2PdfError> {
        let c = &self.config;
        if c.concurrency == 0 {
            return Err(Anyflip2PdfError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
            return Err(Anyflip2PdfError::InvalidConfig(format!(
                "Base URL must start with http:// or https://, got '{}'",
                c.base_url
            )));
        }
        if c.request_timeout_secs == Some(0) {
            return Err(Anyflip2PdfError::InvalidConfig(
                "Request timeout must be ≥ 1 second".into(),
            ));
        }
        let (w, h) = c.page_format.dimensions_pt();
        if !(w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0) {
            return Err(Anyflip2PdfError::InvalidConfig(format!(
                "Page size must be positive, got {w}×{h} pt"
            )));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// The uniform page size of the output PDF.
///
/// Every page gets the same media box; each image is scaled to fit inside it
/// with its aspect ratio preserved and centred.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum PageFormat {
    /// ISO A4, 210 × 297 mm. (default)
    #[default]
    A4,
    /// US Letter, 8.5 × 11 in.
    Letter,
    /// Arbitrary size in PDF points (1/72 in).
    Custom { width_pt: f32, height_pt: f32 },
}

impl PageFormat {
    /// Width and height in PDF points.
    pub fn dimensions_pt(&self) -> (f32, f32) {
        match self {
            PageFormat::A4 => (595.28, 841.89),
            PageFormat::Letter => (612.0, 792.0),
            PageFormat::Custom {
                width_pt,
                height_pt,
            } => (*width_pt, *height_pt),
        }
    }
}
