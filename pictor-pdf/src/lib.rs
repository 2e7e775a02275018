//! PDF output backend for the pictor canvas engine.
//!
//! Consumes SVG content produced by a recording canvas
//! (`Canvas2dContext::get_content`) and converts it to PDF bytes via
//! `usvg` + `svg2pdf`. A document with no pages closes to zero bytes;
//! a converted document always begins with the `%PDF-` marker.

use std::sync::Arc;
use thiserror::Error;

/// Errors from PDF conversion.
#[derive(Debug, Error)]
pub enum PdfError {
    /// The SVG input failed to parse.
    #[error("failed to parse SVG: {0}")]
    SvgParse(String),
    /// The PDF conversion failed.
    #[error("failed to convert SVG to PDF: {0}")]
    Conversion(String),
    /// Multi-page assembly is not supported by this backend.
    #[error("multi-page documents are not supported")]
    MultiPageUnsupported,
}

/// Document metadata and conversion knobs.
#[derive(Debug, Clone, Default)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub keywords: Vec<String>,
    pub creator: Option<String>,
    /// Emit PDF/A-conformant output.
    pub pdfa: bool,
    /// Compress content streams (default true).
    pub compress: bool,
}

impl PdfMetadata {
    /// Metadata with compression enabled and nothing else set.
    pub fn new() -> Self {
        Self {
            compress: true,
            ..Default::default()
        }
    }
}

/// Convert a single SVG document to PDF bytes.
///
/// Text is converted using the provided font database, so the same fonts
/// that shaped the canvas output shape the PDF.
pub fn svg_to_pdf(
    svg: &str,
    font_db: &fontdb::Database,
    metadata: &PdfMetadata,
) -> Result<Vec<u8>, PdfError> {
    let mut options = usvg::Options::default();
    options.fontdb = Arc::new(font_db.clone());

    let tree = usvg::Tree::from_str(svg, &options).map_err(|e| PdfError::SvgParse(e.to_string()))?;

    let conversion = svg2pdf::ConversionOptions {
        compress: metadata.compress,
        pdfa: metadata.pdfa,
        ..Default::default()
    };
    let pages = svg2pdf::PageOptions::default();

    let bytes = svg2pdf::to_pdf(&tree, conversion, pages)
        .map_err(|e| PdfError::Conversion(e.to_string()))?;

    debug_assert!(bytes.starts_with(b"%PDF-"));
    Ok(bytes)
}

/// A PDF document assembled from SVG pages.
///
/// The current backend converts one page; closing an empty document
/// yields zero bytes.
#[derive(Debug, Default)]
pub struct PdfDocument {
    pages: Vec<String>,
    metadata: PdfMetadata,
}

impl PdfDocument {
    /// Create an empty document.
    pub fn new(metadata: PdfMetadata) -> Self {
        Self {
            pages: Vec::new(),
            metadata,
        }
    }

    /// Append an SVG page.
    pub fn add_svg_page(&mut self, svg: impl Into<String>) {
        self.pages.push(svg.into());
    }

    /// Number of pages added.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Close the document and produce its bytes.
    ///
    /// An empty document closes to zero bytes. More than one page is a
    /// synchronous error (single-page backend).
    pub fn into_bytes(self, font_db: &fontdb::Database) -> Result<Vec<u8>, PdfError> {
        match self.pages.len() {
            0 => Ok(Vec::new()),
            1 => svg_to_pdf(&self.pages[0], font_db, &self.metadata),
            _ => Err(PdfError::MultiPageUnsupported),
        }
    }
}
