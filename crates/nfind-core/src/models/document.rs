//! Raw documents and extracted index records.

use serde::{Deserialize, Serialize};

/// Declared format of a fiscal document.
///
/// New formats require a new variant; every dispatch on this enum is an
/// exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Digital or scanned PDF invoice.
    Pdf,
    /// NFe XML invoice.
    Xml,
}

impl DocumentKind {
    /// Classify a document from its identity via a case-insensitive
    /// suffix check.
    ///
    /// Unsupported suffixes are filtered by the ingestion surface and
    /// never reach this point; anything that is not a `.pdf` is NFe XML.
    pub fn classify(identity: &str) -> Self {
        if identity.to_lowercase().ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Xml
        }
    }

    /// Content-type hint for single-file retrieval.
    pub fn content_type(self) -> &'static str {
        match self {
            DocumentKind::Pdf => "application/pdf",
            DocumentKind::Xml => "application/xml",
        }
    }
}

impl std::fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentKind::Pdf => write!(f, "PDF"),
            DocumentKind::Xml => write!(f, "XML"),
        }
    }
}

/// A raw fiscal document supplied by the ingestion surface.
///
/// The batch collection is owned by the caller; documents are never
/// mutated here.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// File identity (name) as declared by the ingestion surface.
    pub identity: String,

    /// Declared format, classified from the identity.
    pub kind: DocumentKind,

    /// Original file bytes, verbatim.
    pub bytes: Vec<u8>,
}

impl RawDocument {
    /// Create a document, classifying its kind from the identity.
    pub fn new(identity: impl Into<String>, bytes: Vec<u8>) -> Self {
        let identity = identity.into();
        let kind = DocumentKind::classify(&identity);
        Self {
            identity,
            kind,
            bytes,
        }
    }
}

/// One row of the search index: a successfully extracted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    /// Identity of the source document.
    pub identity: String,

    /// Declared format of the source document.
    pub kind: DocumentKind,

    /// Extracted searchable text; non-empty by construction.
    pub text: String,
}
