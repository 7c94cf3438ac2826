//! Text extraction from uploaded documents.
//!
//! PDFs are read through their text layer with `lopdf`; images are decoded with `image`,
//! normalized to RGB and handed to an [`OcrEngine`]. [`resolve_and_extract`] decides which path
//! a document takes based on its [`DocumentFormat`], including the single PDF-then-OCR fallback
//! used for unrecognized extensions.

mod format;
mod ocr;
mod pdf;

use std::sync::Arc;
use thiserror::Error;

pub use format::{DocumentFormat, Extraction, ExtractionMethod, resolve_and_extract};
pub use ocr::{OcrEngine, TesseractEngine, normalize_image};
pub use pdf::extract_pdf_text;

#[cfg(test)]
pub(crate) use pdf::fixtures::pdf_with_pages;

/// Errors raised while turning document bytes into text.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Bytes are not a readable PDF container.
    #[error("invalid PDF: {0}")]
    InvalidPdf(String),
    /// Bytes could not be decoded as a supported image format.
    #[error("undecodable image: {0}")]
    UndecodableImage(String),
    /// The OCR engine could not be run or reported a failure.
    #[error("OCR failed: {0}")]
    Ocr(String),
}

/// Format-specific extraction primitives consumed by [`resolve_and_extract`].
pub trait TextExtractor: Send + Sync {
    /// Extract the text layer of a PDF, one page per line group, trimmed.
    fn extract_pdf(&self, bytes: &[u8]) -> Result<String, ExtractionError>;

    /// Decode an image and run OCR over it, returning trimmed text.
    fn extract_image(&self, bytes: &[u8]) -> Result<String, ExtractionError>;
}

/// Production extractor: `lopdf` for PDFs, `image` + an OCR engine for pictures.
pub struct DocumentExtractor {
    ocr: Arc<dyn OcrEngine>,
}

impl DocumentExtractor {
    /// Build an extractor that delegates recognition to `ocr`.
    pub fn new(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr }
    }

    /// Build an extractor backed by the Tesseract command-line tool.
    pub fn with_tesseract(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self::new(Arc::new(TesseractEngine::new(command, language)))
    }
}

impl TextExtractor for DocumentExtractor {
    fn extract_pdf(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        extract_pdf_text(bytes)
    }

    fn extract_image(&self, bytes: &[u8]) -> Result<String, ExtractionError> {
        let png = normalize_image(bytes)?;
        let text = self.ocr.recognize(&png)?;
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;
    use std::sync::Mutex;

    struct RecordingOcr {
        inputs: Mutex<Vec<Vec<u8>>>,
    }

    impl OcrEngine for RecordingOcr {
        fn recognize(&self, png: &[u8]) -> Result<String, ExtractionError> {
            self.inputs.lock().expect("lock").push(png.to_vec());
            Ok("  recognized text \n\n".into())
        }
    }

    #[test]
    fn image_extraction_normalizes_and_trims() {
        let image = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        let mut rgba_png = Cursor::new(Vec::new());
        image
            .write_to(&mut rgba_png, ImageFormat::Png)
            .expect("encode fixture");

        let ocr = Arc::new(RecordingOcr {
            inputs: Mutex::new(Vec::new()),
        });
        let extractor = DocumentExtractor::new(ocr.clone());
        let text = extractor
            .extract_image(&rgba_png.into_inner())
            .expect("ocr text");

        assert_eq!(text, "recognized text");
        let inputs = ocr.inputs.lock().expect("lock");
        assert_eq!(inputs.len(), 1);
        let decoded = image::load_from_memory(&inputs[0]).expect("normalized png");
        assert_eq!(decoded.color(), image::ColorType::Rgb8);
    }

    #[test]
    fn undecodable_image_never_reaches_ocr() {
        let ocr = Arc::new(RecordingOcr {
            inputs: Mutex::new(Vec::new()),
        });
        let extractor = DocumentExtractor::new(ocr.clone());
        let error = extractor
            .extract_image(b"definitely not an image")
            .expect_err("decode failure");

        assert!(matches!(error, ExtractionError::UndecodableImage(_)));
        assert!(ocr.inputs.lock().expect("lock").is_empty());
    }
}
