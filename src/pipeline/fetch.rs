//! Concurrent page retrieval.
//!
//! Requests are driven as a `buffer_unordered` stream on the calling task, so
//! at most `concurrency` are in flight and no task is spawned. Each finished
//! request is written into a slot array indexed by its position in the input,
//! which keeps the output in page order no matter which request lands first.
//!
//! The first failure ends the run: the stream is dropped on return, which
//! cancels every request still in flight, and no partial result is handed
//! back.

use super::sequence::PageUrl;
use crate::config::DownloadConfig;
use crate::error::{Anyflip2PdfError, FetchError};
use crate::progress::DownloadProgressCallback;
use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Raw bytes of one page image, tagged with its 1-indexed page number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub page: usize,
    pub bytes: Vec<u8>,
}

/// Retrieves the body of a single URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`PageFetcher`] backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build a client honouring the timeout and user agent in `config`.
    pub fn new(config: &DownloadConfig) -> Result<Self, Anyflip2PdfError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua.clone());
        }
        let client = builder
            .build()
            .map_err(|e| Anyflip2PdfError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an already configured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        debug!("Downloading image from url: {}", url);

        let transport = |e: reqwest::Error| FetchError::Transport {
            url: url.to_string(),
            reason: if e.is_timeout() {
                format!("timed out: {e}")
            } else {
                e.to_string()
            },
        };

        let response = self.client.get(url).send().await.map_err(transport)?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        debug!("Downloaded {} bytes from url: {}", bytes.len(), url);
        Ok(bytes.to_vec())
    }
}

/// Fetch every page, returning images in the same order as `pages`.
///
/// At most `concurrency` requests run at once (clamped to `1..=pages.len()`).
/// Fails with [`Anyflip2PdfError::Fetch`] for the first page whose request
/// fails; the remaining requests are cancelled.
pub async fn fetch_all(
    fetcher: &dyn PageFetcher,
    pages: &[PageUrl],
    concurrency: usize,
    progress: Option<&dyn DownloadProgressCallback>,
) -> Result<Vec<PageImage>, Anyflip2PdfError> {
    let total = pages.len();
    let limit = concurrency.clamp(1, total.max(1));
    info!("Fetching {} pages ({} in flight)", total, limit);

    let mut slots: Vec<Option<Vec<u8>>> = vec![None; total];

    let mut in_flight = stream::iter(pages.iter().enumerate().map(|(idx, page)| async move {
        if let Some(cb) = progress {
            cb.on_page_start(page.page, total);
        }
        (idx, fetcher.fetch(&page.url).await)
    }))
    .buffer_unordered(limit);

    while let Some((idx, result)) = in_flight.next().await {
        let page = &pages[idx];
        match result {
            Ok(bytes) => {
                if let Some(cb) = progress {
                    cb.on_page_fetched(page.page, total, bytes.len());
                }
                slots[idx] = Some(bytes);
            }
            Err(e) => {
                warn!("Page {} failed: {}", page.page, e);
                if let Some(cb) = progress {
                    cb.on_page_error(page.page, total, &e.to_string());
                }
                return Err(Anyflip2PdfError::Fetch {
                    page: page.page,
                    source: e,
                });
            }
        }
    }

    slots
        .into_iter()
        .zip(pages)
        .map(|(slot, page)| {
            slot.map(|bytes| PageImage {
                page: page.page,
                bytes,
            })
            .ok_or_else(|| Anyflip2PdfError::Internal(format!("page {} was never fetched", page.page)))
        })
        .collect()
}
