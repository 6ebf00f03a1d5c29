//! Single-page PDF assembly around a raster image.
//!
//! The page is A4 width (210 mm) and as tall as the image's aspect ratio requires,
//! so the capture is placed at full page width without cropping.

use std::io::Write;

use chrono::Utc;
use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::export::ExportError;
use crate::layout::RasterImage;

/// A4 width in millimetres.
pub const PAGE_WIDTH_MM: f64 = 210.0;
const PT_PER_MM: f64 = 72.0 / 25.4;

/// Page size in points for an image of the given pixel dimensions.
pub fn page_size_pt(width_px: u32, height_px: u32) -> (f64, f64) {
    let width_pt = PAGE_WIDTH_MM * PT_PER_MM;
    let height_mm = height_px as f64 * PAGE_WIDTH_MM / width_px as f64;
    (width_pt, height_mm * PT_PER_MM)
}

/// Builds a PDF whose only page shows `image` at full width.
pub fn assemble_pdf(image: &RasterImage, title: &str) -> Result<Vec<u8>, ExportError> {
    if image.is_empty() {
        return Err(ExportError::Assembly("captured image is empty".to_string()));
    }

    let (width_pt, height_pt) = page_size_pt(image.width(), image.height());
    let image_data = deflate(image.rgb())?;
    let content = format!(
        "q\n{:.2} 0 0 {:.2} 0 0 cm\n/Im1 Do\nQ\n",
        width_pt, height_pt
    );

    let mut pdf = Vec::new();
    pdf.extend_from_slice(b"%PDF-1.4\n");
    pdf.extend_from_slice(b"%\xE2\xE3\xCF\xD3\n");

    let mut xref_positions: Vec<usize> = Vec::new();

    // 1: Catalog
    xref_positions.push(pdf.len());
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    // 2: Pages
    xref_positions.push(pdf.len());
    pdf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

    // 3: Page
    xref_positions.push(pdf.len());
    let page_obj = format!(
        "3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] /Contents 4 0 R /Resources << /XObject << /Im1 5 0 R >> >> >>\nendobj\n",
        width_pt, height_pt
    );
    pdf.extend_from_slice(page_obj.as_bytes());

    // 4: Content stream
    xref_positions.push(pdf.len());
    let content_obj = format!(
        "4 0 obj\n<< /Length {} >>\nstream\n{}\nendstream\nendobj\n",
        content.len(),
        content
    );
    pdf.extend_from_slice(content_obj.as_bytes());

    // 5: Image XObject
    xref_positions.push(pdf.len());
    let image_header = format!(
        "5 0 obj\n<< /Type /XObject /Subtype /Image /Width {} /Height {} /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode /Length {} >>\nstream\n",
        image.width(),
        image.height(),
        image_data.len()
    );
    pdf.extend_from_slice(image_header.as_bytes());
    pdf.extend_from_slice(&image_data);
    pdf.extend_from_slice(b"\nendstream\nendobj\n");

    // 6: Info
    xref_positions.push(pdf.len());
    let info_obj = format!(
        "6 0 obj\n<< /Title ({}) /Producer (resume-builder) /CreationDate ({}) >>\nendobj\n",
        escape_pdf_string(title),
        Utc::now().format("D:%Y%m%d%H%M%S")
    );
    pdf.extend_from_slice(info_obj.as_bytes());

    let xref_start = pdf.len();
    pdf.extend_from_slice(b"xref\n");
    pdf.extend_from_slice(format!("0 {}\n", xref_positions.len() + 1).as_bytes());
    pdf.extend_from_slice(b"0000000000 65535 f \n");
    for pos in &xref_positions {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", pos).as_bytes());
    }

    pdf.extend_from_slice(b"trailer\n");
    pdf.extend_from_slice(
        format!(
            "<< /Size {} /Root 1 0 R /Info 6 0 R >>\n",
            xref_positions.len() + 1
        )
        .as_bytes(),
    );
    pdf.extend_from_slice(b"startxref\n");
    pdf.extend_from_slice(format!("{}\n", xref_start).as_bytes());
    pdf.extend_from_slice(b"%%EOF\n");

    Ok(pdf)
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| ExportError::Assembly(format!("compressing image: {e}")))?;
    encoder
        .finish()
        .map_err(|e| ExportError::Assembly(format!("compressing image: {e}")))
}

/// Escapes a string for a PDF literal. Characters outside printable ASCII are dropped.
fn escape_pdf_string(s: &str) -> String {
    let mut result = String::new();
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '(' => result.push_str("\\("),
            ')' => result.push_str("\\)"),
            c if c.is_ascii() && !c.is_ascii_control() => result.push(c),
            _ => {}
        }
    }
    result
}
