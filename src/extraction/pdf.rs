use lopdf::Document;

use super::ExtractionError;

/// Extract the text layer of an in-memory PDF.
///
/// Pages are visited in page-number order and joined with `\n`. A page whose content cannot be
/// read or carries no text contributes an empty string. Only a stream that is not a PDF
/// container at all is an error.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractionError> {
    let document =
        Document::load_mem(bytes).map_err(|error| ExtractionError::InvalidPdf(error.to_string()))?;

    let pages = document.get_pages();
    let mut page_texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        let text = match document.extract_text(&[*page_number]) {
            Ok(text) => text,
            Err(error) => {
                tracing::debug!(
                    page = page_number,
                    error = %error,
                    "Page has no extractable text layer"
                );
                String::new()
            }
        };
        page_texts.push(text);
    }

    tracing::debug!(pages = page_texts.len(), "Extracted PDF text layer");
    Ok(join_pages(&page_texts))
}

/// Join page texts with `\n` and trim the whole document.
///
/// Only the line break lopdf appends after each page is dropped, so leading indentation and
/// interior spacing inside a page survive.
fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|page| page.trim_end_matches(['\r', '\n']))
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}


#[cfg(test)]
mod tests {
    use super::fixtures::pdf_with_pages;
    use super::*;

    #[test]
    fn extracts_text_layer() {
        let bytes = pdf_with_pages(&[Some("Quarterly report")]);
        let text = extract_pdf_text(&bytes).expect("text");
        assert_eq!(text, "Quarterly report");
    }

    #[test]
    fn page_without_text_contributes_empty_line() {
        let bytes = pdf_with_pages(&[Some("First page"), None, Some("Third page")]);
        let text = extract_pdf_text(&bytes).expect("text");
        assert_eq!(text, "First page\n\nThird page");
    }

    #[test]
    fn page_join_keeps_interior_whitespace() {
        let pages = vec![
            "  Indented heading\n".to_string(),
            "col a    col b\r\n".to_string(),
            "\n".to_string(),
            "tail\n\n".to_string(),
        ];
        assert_eq!(
            join_pages(&pages),
            "Indented heading\ncol a    col b\n\ntail"
        );

        let pages = vec!["intro\n".to_string(), "  - nested item\n".to_string()];
        assert_eq!(join_pages(&pages), "intro\n  - nested item");
    }

    #[test]
    fn image_only_pdf_yields_empty_text() {
        let bytes = pdf_with_pages(&[None]);
        assert_eq!(extract_pdf_text(&bytes).expect("text"), "");
    }

    #[test]
    fn rejects_non_pdf_bytes() {
        let error = extract_pdf_text(b"\x89PNG not a pdf").expect_err("invalid");
        assert!(matches!(error, ExtractionError::InvalidPdf(_)));
    }
}
