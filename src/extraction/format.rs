use std::path::Path;

use super::{ExtractionError, TextExtractor};

const PDF_EXTENSIONS: &[&str] = &["pdf"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff", "webp"];

/// Format class derived from an upload's file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// `.pdf`
    Pdf,
    /// A raster image extension understood by the OCR path.
    Image,
    /// Anything else, including names without an extension.
    Unknown,
}

impl DocumentFormat {
    /// Classify a file name by its lower-cased extension.
    pub fn from_filename(name: &str) -> Self {
        let extension = Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some(ext) if PDF_EXTENSIONS.contains(&ext) => Self::Pdf,
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => Self::Image,
            _ => Self::Unknown,
        }
    }

    /// Stable lowercase label used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::Unknown => "unknown",
        }
    }
}

/// Which extraction path produced the text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionMethod {
    /// PDF text layer.
    PdfText,
    /// OCR on a declared image.
    Ocr,
    /// OCR after the PDF attempt on an unknown extension was rejected.
    OcrFallback,
}

/// Extracted text together with the path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// Trimmed document text; empty means "no content".
    pub text: String,
    /// Path taken to obtain `text`.
    pub method: ExtractionMethod,
}

/// Outcome of inspecting the first (PDF) attempt for an unknown extension.
#[derive(Debug)]
enum PdfAttempt {
    Accept(String),
    FallBack(&'static str),
    Fail(ExtractionError),
}

fn inspect_pdf_attempt(result: Result<String, ExtractionError>) -> PdfAttempt {
    match result {
        Ok(text) if text.is_empty() => PdfAttempt::FallBack("empty text layer"),
        Ok(text) => PdfAttempt::Accept(text),
        Err(ExtractionError::InvalidPdf(_)) => PdfAttempt::FallBack("not a PDF container"),
        Err(other) => PdfAttempt::Fail(other),
    }
}

/// Extract text for a document of the given format.
///
/// Declared formats take exactly one attempt and their failure is terminal. For
/// [`DocumentFormat::Unknown`] the PDF reader runs first; an empty text layer or an
/// [`ExtractionError::InvalidPdf`] triggers one OCR attempt on the same bytes, whose result is
/// final.
pub fn resolve_and_extract(
    extractor: &dyn TextExtractor,
    format: DocumentFormat,
    bytes: &[u8],
) -> Result<Extraction, ExtractionError> {
    match format {
        DocumentFormat::Pdf => Ok(Extraction {
            text: extractor.extract_pdf(bytes)?,
            method: ExtractionMethod::PdfText,
        }),
        DocumentFormat::Image => Ok(Extraction {
            text: extractor.extract_image(bytes)?,
            method: ExtractionMethod::Ocr,
        }),
        DocumentFormat::Unknown => match inspect_pdf_attempt(extractor.extract_pdf(bytes)) {
            PdfAttempt::Accept(text) => Ok(Extraction {
                text,
                method: ExtractionMethod::PdfText,
            }),
            PdfAttempt::FallBack(reason) => {
                tracing::debug!(reason, "PDF attempt rejected; falling back to OCR");
                Ok(Extraction {
                    text: extractor.extract_image(bytes)?,
                    method: ExtractionMethod::OcrFallback,
                })
            }
            PdfAttempt::Fail(error) => Err(error),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Scripted extractor recording which primitives were called.
    struct ScriptedExtractor {
        pdf: fn() -> Result<String, ExtractionError>,
        image: fn() -> Result<String, ExtractionError>,
        calls: Mutex<Vec<&'static str>>,
    }

    impl ScriptedExtractor {
        fn new(
            pdf: fn() -> Result<String, ExtractionError>,
            image: fn() -> Result<String, ExtractionError>,
        ) -> Self {
            Self {
                pdf,
                image,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().expect("lock").clone()
        }
    }

    impl TextExtractor for ScriptedExtractor {
        fn extract_pdf(&self, _bytes: &[u8]) -> Result<String, ExtractionError> {
            self.calls.lock().expect("lock").push("pdf");
            (self.pdf)()
        }

        fn extract_image(&self, _bytes: &[u8]) -> Result<String, ExtractionError> {
            self.calls.lock().expect("lock").push("image");
            (self.image)()
        }
    }

    fn pdf_text() -> Result<String, ExtractionError> {
        Ok("pdf text".into())
    }

    fn ocr_text() -> Result<String, ExtractionError> {
        Ok("ocr text".into())
    }

    fn empty() -> Result<String, ExtractionError> {
        Ok(String::new())
    }

    fn invalid_pdf() -> Result<String, ExtractionError> {
        Err(ExtractionError::InvalidPdf("no header".into()))
    }

    fn bad_image() -> Result<String, ExtractionError> {
        Err(ExtractionError::UndecodableImage("garbage".into()))
    }

    fn ocr_crash() -> Result<String, ExtractionError> {
        Err(ExtractionError::Ocr("engine crashed".into()))
    }

    #[test]
    fn classifies_extensions_case_insensitively() {
        assert_eq!(DocumentFormat::from_filename("Report.PDF"), DocumentFormat::Pdf);
        assert_eq!(DocumentFormat::from_filename("scan.JpEg"), DocumentFormat::Image);
        assert_eq!(DocumentFormat::from_filename("photo.webp"), DocumentFormat::Image);
        assert_eq!(DocumentFormat::from_filename("report.xyz"), DocumentFormat::Unknown);
        assert_eq!(DocumentFormat::from_filename("README"), DocumentFormat::Unknown);
        assert_eq!(DocumentFormat::from_filename(".pdf"), DocumentFormat::Unknown);
        assert_eq!(DocumentFormat::from_filename("archive.pdf.png"), DocumentFormat::Image);
    }

    #[test]
    fn declared_pdf_failure_is_terminal() {
        let extractor = ScriptedExtractor::new(invalid_pdf, ocr_text);
        let error = resolve_and_extract(&extractor, DocumentFormat::Pdf, b"x").expect_err("fail");
        assert!(matches!(error, ExtractionError::InvalidPdf(_)));
        assert_eq!(extractor.calls(), vec!["pdf"]);
    }

    #[test]
    fn declared_pdf_with_empty_text_does_not_fall_back() {
        let extractor = ScriptedExtractor::new(empty, ocr_text);
        let extraction = resolve_and_extract(&extractor, DocumentFormat::Pdf, b"x").expect("ok");
        assert_eq!(extraction.text, "");
        assert_eq!(extractor.calls(), vec!["pdf"]);
    }

    #[test]
    fn declared_image_failure_is_terminal() {
        let extractor = ScriptedExtractor::new(pdf_text, bad_image);
        let error = resolve_and_extract(&extractor, DocumentFormat::Image, b"x").expect_err("e");
        assert!(matches!(error, ExtractionError::UndecodableImage(_)));
        assert_eq!(extractor.calls(), vec!["image"]);
    }

    #[test]
    fn unknown_prefers_pdf_text() {
        let extractor = ScriptedExtractor::new(pdf_text, ocr_text);
        let extraction = resolve_and_extract(&extractor, DocumentFormat::Unknown, b"x").expect("ok");
        assert_eq!(extraction.text, "pdf text");
        assert_eq!(extraction.method, ExtractionMethod::PdfText);
        assert_eq!(extractor.calls(), vec!["pdf"]);
    }

    #[test]
    fn unknown_falls_back_to_ocr_on_invalid_pdf() {
        let extractor = ScriptedExtractor::new(invalid_pdf, ocr_text);
        let extraction = resolve_and_extract(&extractor, DocumentFormat::Unknown, b"x").expect("ok");
        assert_eq!(extraction.text, "ocr text");
        assert_eq!(extraction.method, ExtractionMethod::OcrFallback);
        assert_eq!(extractor.calls(), vec!["pdf", "image"]);
    }

    #[test]
    fn unknown_falls_back_to_ocr_on_empty_pdf_text() {
        let extractor = ScriptedExtractor::new(empty, ocr_text);
        let extraction = resolve_and_extract(&extractor, DocumentFormat::Unknown, b"x").expect("ok");
        assert_eq!(extraction.method, ExtractionMethod::OcrFallback);
    }

    #[test]
    fn unknown_fallback_attempts_at_most_twice() {
        let extractor = ScriptedExtractor::new(invalid_pdf, bad_image);
        let error =
            resolve_and_extract(&extractor, DocumentFormat::Unknown, b"x").expect_err("fail");
        assert!(matches!(error, ExtractionError::UndecodableImage(_)));
        assert_eq!(extractor.calls(), vec!["pdf", "image"]);
    }

    #[test]
    fn unknown_does_not_mask_non_format_errors() {
        let extractor = ScriptedExtractor::new(ocr_crash, ocr_text);
        let error =
            resolve_and_extract(&extractor, DocumentFormat::Unknown, b"x").expect_err("fail");
        assert!(matches!(error, ExtractionError::Ocr(_)));
        assert_eq!(extractor.calls(), vec!["pdf"]);
    }
}
