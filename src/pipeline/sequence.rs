//! Page URL generation. Pure: no request is made and nothing checks that the
//! pages exist; a missing page only shows up when the fetcher asks for it.

use super::resolve::Identifier;
use crate::error::Anyflip2PdfError;

/// One page image location, 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageUrl {
    pub page: usize,
    pub url: String,
}

/// Build the image URL of every page `1..=page_count` of a book.
///
/// `base_url` is the scheme and host, e.g. `https://online.anyflip.com`.
pub fn sequence(
    id: &Identifier,
    page_count: usize,
    base_url: &str,
) -> Result<Vec<PageUrl>, Anyflip2PdfError> {
    if page_count == 0 {
        return Err(Anyflip2PdfError::InvalidConfig(
            "Page count must be ≥ 1".into(),
        ));
    }

    let base = base_url.trim_end_matches('/');
    Ok((1..=page_count)
        .map(|page| PageUrl {
            page,
            url: format!("{base}/{}/{}/files/mobile/{page}.jpg", id.owner, id.book),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_BASE_URL;

    fn book() -> Identifier {
        Identifier {
            owner: "npkza".into(),
            book: "pwft".into(),
        }
    }

    #[test]
    fn builds_one_url_per_page_in_order() {
        let urls = sequence(&book(), 3, DEFAULT_BASE_URL).unwrap();
        assert_eq!(
            urls.iter().map(|p| p.url.as_str()).collect::<Vec<_>>(),
            vec![
                "https://online.anyflip.com/npkza/pwft/files/mobile/1.jpg",
                "https://online.anyflip.com/npkza/pwft/files/mobile/2.jpg",
                "https://online.anyflip.com/npkza/pwft/files/mobile/3.jpg",
            ]
        );
    }

    #[test]
    fn pages_are_strictly_increasing_without_gaps() {
        let urls = sequence(&book(), 228, DEFAULT_BASE_URL).unwrap();
        assert_eq!(urls.len(), 228);
        for (i, p) in urls.iter().enumerate() {
            assert_eq!(p.page, i + 1);
            assert!(p.url.contains("npkza/pwft"));
            assert!(p.url.ends_with(&format!("/{}.jpg", i + 1)));
        }
    }

    #[test]
    fn trailing_slash_on_base_is_ignored() {
        let urls = sequence(&book(), 1, "http://127.0.0.1:8080/").unwrap();
        assert_eq!(urls[0].url, "http://127.0.0.1:8080/npkza/pwft/files/mobile/1.jpg");
    }

    #[test]
    fn zero_pages_is_a_config_error() {
        let err = sequence(&book(), 0, DEFAULT_BASE_URL).unwrap_err();
        assert!(matches!(err, Anyflip2PdfError::InvalidConfig(_)));
    }
}
