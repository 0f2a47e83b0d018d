//! Error types for the nfind-core library.

use thiserror::Error;

/// Main error type for the nfind library.
#[derive(Error, Debug)]
pub enum NfindError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// NFe XML processing error.
    #[error("NFe error: {0}")]
    Nfe(#[from] NfeError),

    /// Index construction or query error.
    #[error("index error: {0}")]
    Index(#[from] IndexError),

    /// Result packaging error.
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract the embedded text layer.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// The external OCR tooling is not installed.
    #[error("OCR tooling unavailable: {0}")]
    OcrUnavailable(String),

    /// Rasterization or recognition failed.
    #[error("OCR failed: {0}")]
    Ocr(String),

    /// I/O error while materializing transient artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to NFe XML processing.
#[derive(Error, Debug)]
pub enum NfeError {
    /// The document is not well-formed XML.
    #[error("failed to parse XML: {0}")]
    Parse(String),
}

/// Errors related to the document index.
#[derive(Error, Debug)]
pub enum IndexError {
    /// A query arrived before any build.
    #[error("index has not been built; rebuild it from the document batch first")]
    NotBuilt,

    /// A non-empty batch produced zero records.
    #[error("no text could be extracted from any of the {total} documents")]
    NoDocumentsIndexed { total: usize },

    /// The build was cancelled between documents.
    #[error("index build was cancelled")]
    Cancelled,
}

/// Errors related to result packaging.
#[derive(Error, Debug)]
pub enum ExportError {
    /// A matched identity has no corresponding document in the batch.
    #[error("matched document not found in the batch: {0}")]
    DocumentMissing(String),

    /// Archive construction failed.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the nfind library.
pub type Result<T> = std::result::Result<T, NfindError>;
