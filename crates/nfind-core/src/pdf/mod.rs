//! PDF processing module.

mod extractor;
mod ocr;

pub use extractor::PdfTextExtractor;
pub use ocr::{is_ocr_available, ocr_pdf_bytes};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;
