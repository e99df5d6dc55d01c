//! Identifier resolution: turn a flipbook URL into its `owner/book` key.
//!
//! Every AnyFlip book lives under `/<owner>/<book>/` on either the short host
//! (`anyflip.com`) or the reader host (`online.anyflip.com`). Those two path
//! segments are all the later stages need.

use crate::error::Anyflip2PdfError;
use serde::Serialize;
use std::fmt;
use tracing::debug;

const SECURE_PREFIX: &str = "https://";
const KNOWN_HOSTS: [&str; 2] = ["online.anyflip.com/", "anyflip.com/"];

/// The two-segment key naming a book on AnyFlip. Both segments are non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Identifier {
    pub owner: String,
    pub book: String,
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.book)
    }
}

/// Resolve a book URL such as
/// `https://online.anyflip.com/npkza/pwft/mobile/index.html` to `npkza/pwft`.
pub fn resolve(url: &str) -> Result<Identifier, Anyflip2PdfError> {
    let invalid = || Anyflip2PdfError::InvalidUrlFormat {
        url: url.to_string(),
    };

    let stripped = url.strip_prefix(SECURE_PREFIX).unwrap_or(url);
    if !KNOWN_HOSTS.iter().any(|host| stripped.starts_with(host)) {
        return Err(invalid());
    }

    // A query or fragment belongs to the page, not the book.
    let path = stripped
        .split(['?', '#'])
        .next()
        .unwrap_or(stripped);

    let mut segments = path.split('/').skip(1);
    let owner = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let book = segments.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

    let id = Identifier {
        owner: owner.to_string(),
        book: book.to_string(),
    };
    debug!("Resolved {} → {}", url, id);
    Ok(id)
}
