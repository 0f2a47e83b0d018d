//! Embedded-text extraction with OCR fallback, using lopdf and pdf-extract.

use lopdf::Document;
use tracing::debug;

use super::{Result, ocr};
use crate::error::PdfError;
use crate::models::config::OcrConfig;

/// PDF text extractor.
///
/// Extracts the embedded text layer in page order; when a document has
/// none (a scanned invoice), falls back to rasterization plus OCR.
pub struct PdfTextExtractor {
    ocr: OcrConfig,
}

impl PdfTextExtractor {
    /// Create an extractor with the given OCR fallback configuration.
    pub fn new(ocr: OcrConfig) -> Self {
        Self { ocr }
    }

    /// Extract all text from a PDF given as raw bytes.
    ///
    /// The returned string may be empty when neither extraction path
    /// found any text.
    pub fn extract(&self, data: &[u8]) -> Result<String> {
        let data = load_validated(data)?;

        let text = pdf_extract::extract_text_from_mem(&data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        if !text.trim().is_empty() {
            return Ok(text);
        }

        debug!("PDF has no embedded text layer, falling back to OCR");
        ocr::ocr_pdf_bytes(&data, &self.ocr)
    }
}

/// Load the PDF with lopdf to validate it before text extraction.
///
/// PDFs encrypted with an empty password are decrypted and re-saved so
/// the text extractor sees plain content. Returns the bytes to extract
/// from.
fn load_validated(data: &[u8]) -> Result<Vec<u8>> {
    let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

    let data = if doc.is_encrypted() {
        if doc.decrypt("").is_err() {
            return Err(PdfError::Encrypted);
        }
        debug!("decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
        decrypted
    } else {
        data.to_vec()
    };

    if doc.get_pages().is_empty() {
        return Err(PdfError::NoPages);
    }

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_garbage_bytes() {
        let extractor = PdfTextExtractor::new(OcrConfig::default());
        let result = extractor.extract(b"definitely not a pdf");
        assert!(matches!(result, Err(PdfError::Parse(_))));
    }

    #[test]
    fn rejects_empty_input() {
        let extractor = PdfTextExtractor::new(OcrConfig::default());
        assert!(extractor.extract(&[]).is_err());
    }
}
