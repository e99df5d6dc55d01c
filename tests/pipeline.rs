//! End-to-end tests for anyflip2pdf against a local mock of the image host.
//!
//! Every test starts a `wiremock` server and points `base_url` at it, so the
//! whole pipeline (resolve → sequence → fetch → assemble) runs over real HTTP
//! without touching the network.

use anyflip2pdf::{download, output_path, Anyflip2PdfError, DownloadConfig};
use flate2::read::ZlibDecoder;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use lopdf::Document;
use std::io::{Cursor, Read};
use std::path::Path;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOOK_URL: &str = "https://online.anyflip.com/npkza/pwft/mobile/index.html";

// ── Test helpers ─────────────────────────────────────────────────────────────

fn png(img: &RgbImage) -> Vec<u8> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img.clone())
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode test image");
    buf
}

fn page_path(page: usize) -> String {
    format!("/npkza/pwft/files/mobile/{page}.jpg")
}

fn config_for(server: &MockServer) -> DownloadConfig {
    DownloadConfig::builder()
        .base_url(server.uri())
        .build()
        .expect("valid config")
}

async fn serve_page(server: &MockServer, page: usize, body: Vec<u8>, delay_ms: u64) {
    Mock::given(method("GET"))
        .and(path(page_path(page)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body)
                .set_delay(Duration::from_millis(delay_ms)),
        )
        .mount(server)
        .await;
}

async fn serve_missing(server: &MockServer, page: usize) {
    Mock::given(method("GET"))
        .and(path(page_path(page)))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;
}

/// Raw RGB pixels of the image drawn on each page, in page order.
fn page_pixels(pdf: &Path) -> Vec<Vec<u8>> {
    let doc = Document::load(pdf).expect("output is a readable PDF");
    doc.get_pages()
        .values()
        .map(|&page_id| {
            let page = doc.get_dictionary(page_id).unwrap();
            let resources = page.get(b"Resources").unwrap().as_dict().unwrap();
            let xobjects = resources.get(b"XObject").unwrap().as_dict().unwrap();
            let (_, image_ref) = xobjects.iter().next().unwrap();
            let stream = doc
                .get_object(image_ref.as_reference().unwrap())
                .unwrap()
                .as_stream()
                .unwrap();
            // lopdf leaves image streams compressed; inflate the Flate data here.
            let mut raw = Vec::new();
            ZlibDecoder::new(stream.content.as_slice())
                .read_to_end(&mut raw)
                .expect("image stream is zlib data");
            raw
        })
        .collect()
}

// ── Library ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn single_page_book_produces_one_page_pdf() {
    let server = MockServer::start().await;
    let pixel = RgbImage::from_pixel(1, 1, Rgb([12, 34, 56]));
    serve_page(&server, 1, png(&pixel), 0).await;

    let out = tempfile::tempdir().unwrap();
    let target = output_path(out.path(), "candlekeep").unwrap();

    let stats = download(BOOK_URL, 1, &target, &config_for(&server))
        .await
        .expect("download should succeed");

    assert_eq!(stats.pages, 1);
    assert_eq!(target.file_name().unwrap(), "candlekeep.pdf");
    assert_eq!(page_pixels(&target), vec![vec![12, 34, 56]]);
}

#[tokio::test]
async fn pages_keep_their_order_when_responses_arrive_reversed() {
    let server = MockServer::start().await;
    let colours: [[u8; 3]; 4] = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [9, 9, 9]];
    for (i, colour) in colours.iter().enumerate() {
        // Page 1 answers last, page 4 first.
        let delay = 40 * (colours.len() - i) as u64;
        serve_page(&server, i + 1, png(&RgbImage::from_pixel(2, 2, Rgb(*colour))), delay).await;
    }

    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("ordered.pdf");
    download(BOOK_URL, colours.len(), &target, &config_for(&server))
        .await
        .expect("download should succeed");

    let pixels = page_pixels(&target);
    assert_eq!(pixels.len(), 4);
    for (got, colour) in pixels.iter().zip(colours) {
        assert_eq!(got, &colour.repeat(4));
    }
}

#[tokio::test]
async fn missing_page_fails_and_writes_nothing() {
    let server = MockServer::start().await;
    serve_missing(&server, 1).await;

    let out = tempfile::tempdir().unwrap();
    let target = output_path(out.path(), "candlekeep").unwrap();

    let err = download(BOOK_URL, 1, &target, &config_for(&server))
        .await
        .unwrap_err();

    match &err {
        Anyflip2PdfError::Fetch { page, source } => {
            assert_eq!(*page, 1);
            assert_eq!(source.url(), format!("{}{}", server.uri(), page_path(1)));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().contains(&page_path(1)));
    assert!(!target.exists());
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn trailing_404_fails_whole_book() {
    let server = MockServer::start().await;
    let img = png(&RgbImage::new(1, 1));
    serve_page(&server, 1, img.clone(), 0).await;
    serve_page(&server, 2, img, 0).await;
    serve_missing(&server, 3).await;

    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("book.pdf");
    let err = download(BOOK_URL, 3, &target, &config_for(&server))
        .await
        .unwrap_err();

    assert!(matches!(err, Anyflip2PdfError::Fetch { page: 3, .. }));
    assert!(!target.exists());
}

#[tokio::test]
async fn bounded_concurrency_still_fetches_every_page() {
    let server = MockServer::start().await;
    for page in 1..=9 {
        let shade = (page * 20) as u8;
        serve_page(&server, page, png(&RgbImage::from_pixel(1, 1, Rgb([shade; 3]))), 5).await;
    }

    let out = tempfile::tempdir().unwrap();
    let target = out.path().join("bounded.pdf");
    let config = DownloadConfig::builder()
        .base_url(server.uri())
        .concurrency(2)
        .build()
        .unwrap();

    let stats = download(BOOK_URL, 9, &target, &config).await.unwrap();

    assert_eq!(stats.pages, 9);
    let pixels = page_pixels(&target);
    for (i, got) in pixels.iter().enumerate() {
        assert_eq!(got, &vec![((i + 1) * 20) as u8; 3]);
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 9);
}

// ── Binary ───────────────────────────────────────────────────────────────────

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use tokio::process::Command;

    async fn run(server: &MockServer, out: &Path, url: &str) -> std::process::Output {
        run_with(server, out, url, &["--no-progress"]).await
    }

    async fn run_with(
        server: &MockServer,
        out: &Path,
        url: &str,
        extra: &[&str],
    ) -> std::process::Output {
        Command::new(env!("CARGO_BIN_EXE_anyflip2pdf"))
            .arg(url)
            .args(["--pages", "1", "--name", "candlekeep"])
            .args(extra)
            .arg("--output-dir")
            .arg(out)
            .arg("--base-url")
            .arg(server.uri())
            .env_remove("RUST_LOG")
            .output()
            .await
            .expect("binary runs")
    }

    #[tokio::test]
    async fn exits_zero_and_writes_named_pdf() {
        let server = MockServer::start().await;
        serve_page(&server, 1, png(&RgbImage::new(1, 1)), 0).await;
        let out = tempfile::tempdir().unwrap();

        let output = run(&server, out.path(), BOOK_URL).await;

        assert_eq!(output.status.code(), Some(0), "{output:?}");
        assert_eq!(page_pixels(&out.path().join("candlekeep.pdf")).len(), 1);
    }

    #[tokio::test]
    async fn exits_one_and_names_failing_url_on_404() {
        let server = MockServer::start().await;
        serve_missing(&server, 1).await;
        let out = tempfile::tempdir().unwrap();

        let output = run(&server, out.path(), BOOK_URL).await;

        assert_eq!(output.status.code(), Some(1), "{output:?}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains(&page_path(1)), "stderr: {stderr}");
        assert!(!out.path().join("candlekeep.pdf").exists());
    }

    #[tokio::test]
    async fn failure_is_reported_once_in_progress_mode() {
        let server = MockServer::start().await;
        serve_missing(&server, 1).await;
        let out = tempfile::tempdir().unwrap();

        let output = run_with(&server, out.path(), BOOK_URL, &[]).await;

        assert_eq!(output.status.code(), Some(1), "{output:?}");
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert_eq!(stderr.matches(&page_path(1)).count(), 1, "stderr: {stderr}");
        assert_eq!(stderr.matches("Error generating PDF").count(), 1, "stderr: {stderr}");
    }

    #[tokio::test]
    async fn list_urls_prints_plan_without_requests() {
        let server = MockServer::start().await;
        let out = tempfile::tempdir().unwrap();

        let output = run_with(&server, out.path(), BOOK_URL, &["--list-urls", "-q"]).await;

        assert_eq!(output.status.code(), Some(0), "{output:?}");
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert_eq!(stdout.trim(), format!("{}{}", server.uri(), page_path(1)));
        assert!(server.received_requests().await.unwrap().is_empty());
        assert!(!out.path().join("candlekeep.pdf").exists());
    }

    #[tokio::test]
    async fn exits_one_without_requests_on_foreign_url() {
        let server = MockServer::start().await;
        let out = tempfile::tempdir().unwrap();

        let output = run(&server, out.path(), "https://example.com/npkza/pwft").await;

        assert_eq!(output.status.code(), Some(1), "{output:?}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid URL format"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
