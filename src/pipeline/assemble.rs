//! PDF assembly: one uniform-size page per downloaded image.
//!
//! Each image is decoded with the `image` crate, flattened to 8-bit RGB and
//! embedded as a Flate-compressed image XObject. The page draws it scaled to
//! fit inside the media box with its aspect ratio kept and centred on the
//! page.
//!
//! [`assemble`] never exposes a half-written file under the final name:
//! the PDF is serialised into a [`tempfile::NamedTempFile`] next to the
//! target and renamed over it only after the last byte is flushed.

use super::fetch::PageImage;
use crate::config::PageFormat;
use crate::error::Anyflip2PdfError;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Name under which every page refers to its image in `/Resources`.
const IMAGE_NAME: &str = "Im0";

/// Encode `images` as an in-memory PDF document, one page per image.
pub fn build_document(
    images: &[PageImage],
    format: PageFormat,
) -> Result<Document, Anyflip2PdfError> {
    if images.is_empty() {
        return Err(Anyflip2PdfError::EmptyDocument);
    }

    let (page_w, page_h) = format.dimensions_pt();
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let mut kids: Vec<Object> = Vec::with_capacity(images.len());

    for page in images {
        let encoding_error = |detail: String| Anyflip2PdfError::Encoding {
            page: page.page,
            detail,
        };

        let decoded =
            image::load_from_memory(&page.bytes).map_err(|e| encoding_error(e.to_string()))?;
        let rgb = decoded.to_rgb8();
        let (img_w, img_h) = rgb.dimensions();
        let pixels = deflate(rgb.as_raw()).map_err(|e| encoding_error(e.to_string()))?;
        debug!(
            "Page {}: {}×{} px, {} bytes compressed",
            page.page,
            img_w,
            img_h,
            pixels.len()
        );

        let xobject = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => img_w as i64,
                "Height" => img_h as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "FlateDecode",
            },
            pixels,
        )
        .with_compression(false);
        let image_id = doc.add_object(xobject);

        let placement = fit(img_w, img_h, page_w, page_h);
        let content = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new(
                    "cm",
                    vec![
                        placement.width.into(),
                        0.into(),
                        0.into(),
                        placement.height.into(),
                        placement.x.into(),
                        placement.y.into(),
                    ],
                ),
                Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
                Operation::new("Q", vec![]),
            ],
        };
        let content_bytes = content
            .encode()
            .map_err(|e| encoding_error(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), page_w.into(), page_h.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_NAME => image_id,
                },
            },
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    Ok(doc)
}

/// Encode `images` as a PDF and write it to `path`, atomically.
///
/// The parent directory is created if needed. Every image is decoded before
/// the output is touched, so an undecodable page fails without creating any
/// file. The serialised document is streamed into a temporary file in the
/// same directory and renamed onto `path` once flushed; on failure the
/// temporary file is removed and `path` is left as it was.
///
/// Returns the size of the written file in bytes.
pub fn assemble(
    images: &[PageImage],
    format: PageFormat,
    path: &Path,
) -> Result<u64, Anyflip2PdfError> {
    let mut doc = build_document(images, format)?;

    let write_failed = |source: io::Error| Anyflip2PdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_failed)?;

    let tmp = tempfile::Builder::new()
        .prefix(".anyflip2pdf-")
        .suffix(".pdf.part")
        .tempfile_in(dir)
        .map_err(write_failed)?;

    let mut writer = BufWriter::new(tmp);
    doc.save_to(&mut writer)
        .map_err(|e| write_failed(io::Error::other(e.to_string())))?;
    let tmp = writer
        .into_inner()
        .map_err(|e| write_failed(e.into_error()))?;
    tmp.as_file().sync_all().map_err(write_failed)?;

    let file = tmp.persist(path).map_err(|e| write_failed(e.error))?;
    let bytes = file.metadata().map_err(write_failed)?.len();

    info!(
        "Wrote {} pages ({} bytes) to {}",
        images.len(),
        bytes,
        path.display()
    );
    Ok(bytes)
}

/// Where an image lands on the page, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Placement {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Largest aspect-preserving box for a `img_w`×`img_h` image inside the
/// page, centred.
fn fit(img_w: u32, img_h: u32, page_w: f32, page_h: f32) -> Placement {
    let (iw, ih) = (img_w.max(1) as f32, img_h.max(1) as f32);
    let scale = (page_w / iw).min(page_h / ih);
    let (width, height) = (iw * scale, ih * scale);
    Placement {
        x: (page_w - width) / 2.0,
        y: (page_h - height) / 2.0,
        width,
        height,
    }
}

fn deflate(raw: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raw)?;
    encoder.finish()
}
