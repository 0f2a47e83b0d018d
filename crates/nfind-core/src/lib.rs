//! Core library for fiscal document search.
//!
//! This crate provides:
//! - PDF text extraction with OCR fallback for scanned invoices
//! - NFe XML extraction into canonical searchable text
//! - Per-batch indexing with progress reporting and failure isolation
//! - Literal and code (CNPJ/NCM) query matching with context snippets
//! - Result packaging (ZIP archives, single-file retrieval)

pub mod error;
pub mod export;
pub mod index;
pub mod models;
pub mod nfe;
pub mod pdf;
pub mod search;
pub mod service;

pub use error::{NfindError, Result};
pub use export::{SingleFile, build_archive, single_file};
pub use index::{BuildReport, DocumentIndexer, IndexTable, SkipReason, SkippedDocument};
pub use models::config::{NfindConfig, OcrConfig, SearchConfig};
pub use models::document::{DocumentKind, ExtractedRecord, RawDocument};
pub use nfe::NFE_NAMESPACE;
pub use pdf::PdfTextExtractor;
pub use search::{QueryKind, SearchEngine, SearchHit, SearchQuery};
pub use service::SearchService;
